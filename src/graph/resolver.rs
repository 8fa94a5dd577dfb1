use crate::model::{Node, SimpleNode};
use im::HashSet;

use super::DependencyGraph;

/// Lifts arbitrary nodes to their slice node under one slicing, walking the
/// containment chain upward where the node itself carries no slice.
pub struct SliceResolver<'a> {
    slicing: &'a str,
    graph: &'a DependencyGraph,
}

impl<'a> SliceResolver<'a> {
    pub fn new(slicing: &'a str, graph: &'a DependencyGraph) -> Self {
        Self { slicing, graph }
    }

    /// The slice node the given node belongs to, if it has one.
    ///
    /// Multi-parent nodes resolve to their first slice in declaration order;
    /// one without a matching slice falls back to its container, like any
    /// other node.
    pub fn lift(&self, node: &Node) -> Option<SimpleNode> {
        let mut current = node.clone();
        // visited guard: containment forms a forest, but resolution must not
        // hang on a malformed graph
        let mut seen: HashSet<Node> = HashSet::new();
        loop {
            match &current {
                Node::Simple(simple) if simple.has_type(self.slicing) => {
                    return Some(simple.clone());
                }
                Node::Parent(parent) => {
                    if let Some(val) = parent
                        .vals()
                        .iter()
                        .find(|val| val.has_type(self.slicing))
                    {
                        return Some(val.clone());
                    }
                }
                _ => {}
            }
            if seen.contains(&current) {
                return None;
            }
            seen.insert(current.clone());
            current = self.graph.container_of(&current)?;
        }
    }

    /// Whether [`lift`](Self::lift) would succeed for the node.
    pub fn is_defined_at(&self, node: &Node) -> bool {
        self.lift(node).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParentAwareNode;
    use crate::pattern::NamePattern;
    use crate::slicer::{Categorizer, Slicing};

    fn two_slicing_graph() -> DependencyGraph {
        let module = Slicing::new("module", vec![NamePattern::parse("com.(*).**").unwrap()]);
        let layer = Slicing::new("layer", vec![NamePattern::parse("com.*.(*).**").unwrap()]);
        DependencyGraph::new(Categorizer::new(vec![module, layer]))
    }

    #[test]
    fn slice_nodes_lift_to_themselves() {
        let graph = two_slicing_graph();
        let resolver = SliceResolver::new("module", &graph);
        let slice = SimpleNode::slice_node("web", "module");
        assert_eq!(resolver.lift(&Node::Simple(slice.clone())), Some(slice));
    }

    #[test]
    fn classes_lift_through_their_container() {
        let mut graph = two_slicing_graph();
        let class = Node::class_node("com.web.Controller");
        graph.add(class.clone());

        let resolver = SliceResolver::new("module", &graph);
        assert_eq!(
            resolver.lift(&class),
            Some(SimpleNode::slice_node("web", "module"))
        );
        assert!(resolver.is_defined_at(&class));
    }

    #[test]
    fn multi_parent_nodes_resolve_per_slicing() {
        let mut graph = two_slicing_graph();
        let class = Node::class_node("com.web.api.Handler");
        graph.add(class.clone());

        assert_eq!(
            SliceResolver::new("module", &graph).lift(&class),
            Some(SimpleNode::slice_node("web", "module"))
        );
        assert_eq!(
            SliceResolver::new("layer", &graph).lift(&class),
            Some(SimpleNode::slice_node("api", "layer"))
        );
    }

    #[test]
    fn parent_node_without_matching_slice_is_unresolved() {
        let graph = two_slicing_graph();
        let parent = Node::Parent(ParentAwareNode::new(vec![
            SimpleNode::slice_node("web", "module"),
            SimpleNode::slice_node("api", "layer"),
        ]));
        let resolver = SliceResolver::new("feature", &graph);
        assert_eq!(resolver.lift(&parent), None);
        assert!(!resolver.is_defined_at(&parent));
    }

    #[test]
    fn unknown_classes_are_unresolved() {
        let graph = two_slicing_graph();
        let resolver = SliceResolver::new("module", &graph);
        assert_eq!(resolver.lift(&Node::class_node("org.Other")), None);
    }
}
