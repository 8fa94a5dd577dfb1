//! Classification of class nodes into named slices.

use crate::model::{Node, ParentAwareNode, SimpleNode};
use crate::pattern::NamePattern;

/// A named classification: an ordered list of patterns assigning class names
/// to slice labels. The first matching pattern wins.
#[derive(Debug, Clone)]
pub struct Slicing {
    name: String,
    patterns: Vec<NamePattern>,
}

impl Slicing {
    pub fn new(name: impl Into<String>, patterns: Vec<NamePattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
        }
    }

    /// The default slicing grouping classes by their immediate package.
    pub fn package_default() -> Self {
        let pattern = NamePattern::parse("(**).*")
            .unwrap_or_else(|e| panic!("default package pattern failed to compile: {e}"));
        Self::new("package", vec![pattern])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[NamePattern] {
        &self.patterns
    }

    /// Slice label for a class name, from the first matching pattern.
    pub fn label_for(&self, class_name: &str) -> Option<String> {
        self.patterns.iter().find_map(|p| p.matches(class_name))
    }
}

/// A suppression rule for class-to-class references.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    from: NamePattern,
    to: NamePattern,
}

impl IgnoreRule {
    pub fn new(from: NamePattern, to: NamePattern) -> Self {
        Self { from, to }
    }

    pub fn suppresses(&self, from_class: &str, to_class: &str) -> bool {
        self.from.is_match(from_class) && self.to.is_match(to_class)
    }
}

/// Maps class nodes to their parent slice nodes across all configured
/// slicings. Non-class nodes are their own category.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    slicings: Vec<Slicing>,
}

impl Categorizer {
    pub fn new(slicings: Vec<Slicing>) -> Self {
        Self { slicings }
    }

    pub fn slicings(&self) -> &[Slicing] {
        &self.slicings
    }

    /// The category of a node: itself when no slicing matches, the single
    /// matching slice node, or a parent-aware node over all matches in
    /// slicing declaration order.
    pub fn categorize(&self, node: &Node) -> Node {
        let Node::Simple(simple) = node else {
            return node.clone();
        };
        if !simple.is_class() {
            return node.clone();
        }

        let parents: Vec<(String, &str)> = self
            .slicings
            .iter()
            .filter_map(|slicing| {
                slicing
                    .label_for(simple.name())
                    .map(|label| (label, slicing.name()))
            })
            .collect();

        match parents.len() {
            0 => node.clone(),
            1 => {
                let (label, slicing) = parents.into_iter().next().expect("one parent");
                if label == simple.name() {
                    // A class classified as itself stays a class leaf while
                    // also becoming a slice group.
                    Node::Simple(SimpleNode::self_slice_node(label, slicing))
                } else {
                    Node::Simple(SimpleNode::slice_node(label, slicing))
                }
            }
            _ => Node::Parent(ParentAwareNode::new(
                parents
                    .into_iter()
                    .map(|(label, slicing)| SimpleNode::slice_node(label, slicing))
                    .collect(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CLASS;

    fn slicing(name: &str, patterns: &[&str]) -> Slicing {
        Slicing::new(
            name,
            patterns
                .iter()
                .map(|p| NamePattern::parse(p).unwrap())
                .collect(),
        )
    }

    #[test]
    fn unmatched_class_is_its_own_category() {
        let categorizer = Categorizer::new(vec![slicing("module", &["com.(*).**"])]);
        let node = Node::class_node("org.Other");
        assert_eq!(categorizer.categorize(&node), node);
    }

    #[test]
    fn single_slicing_yields_a_slice_node() {
        let categorizer = Categorizer::new(vec![slicing("module", &["com.(*).**"])]);
        let node = Node::class_node("com.web.Controller");
        assert_eq!(
            categorizer.categorize(&node),
            Node::slice_node("web", "module")
        );
    }

    #[test]
    fn first_pattern_wins_within_a_slicing() {
        let categorizer = Categorizer::new(vec![slicing(
            "module",
            &["com.special.**=special", "com.(*).**"],
        )]);
        let node = Node::class_node("com.special.Foo");
        assert_eq!(
            categorizer.categorize(&node),
            Node::slice_node("special", "module")
        );
    }

    #[test]
    fn multiple_slicings_yield_a_parent_aware_node() {
        let categorizer = Categorizer::new(vec![
            slicing("module", &["com.(*).**"]),
            slicing("layer", &["com.*.(*).**"]),
        ]);
        let node = Node::class_node("com.web.api.Handler");
        let category = categorizer.categorize(&node);
        match category {
            Node::Parent(parent) => {
                assert_eq!(parent.vals()[0], SimpleNode::slice_node("web", "module"));
                assert_eq!(parent.vals()[1], SimpleNode::slice_node("api", "layer"));
            }
            other => panic!("expected parent-aware node, got {other:?}"),
        }
    }

    #[test]
    fn slice_nodes_are_fixed_points() {
        let categorizer = Categorizer::new(vec![slicing("module", &["**"])]);
        let slice = Node::slice_node("web", "module");
        assert_eq!(categorizer.categorize(&slice), slice);
    }

    #[test]
    fn class_matching_itself_keeps_the_class_marker() {
        let categorizer = Categorizer::new(vec![slicing("module", &["com.Foo"])]);
        let node = Node::class_node("com.Foo");
        let category = categorizer.categorize(&node);
        let simple = category.as_simple().unwrap();
        assert!(simple.has_type("module"));
        assert!(simple.has_type(CLASS));
        // and the merged node is the categorizer's fixed point
        assert_eq!(categorizer.categorize(&category), category);
    }
}
