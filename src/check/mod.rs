//! Constraints over slice projections and the violations they produce.

mod cycles;
mod layering;

pub use cycles::CycleFree;
pub use layering::Layering;

use crate::model::SimpleNode;
use serde::Serialize;
use std::fmt;

/// One slicing's view of the graph: its name, its slice nodes, and the
/// projected reference edges. Parallel references may occur and count once.
pub trait SliceSource {
    fn slicing_name(&self) -> &str;
    fn slice_nodes(&self) -> Vec<SimpleNode>;
    fn references(&self) -> Vec<(SimpleNode, SimpleNode)>;
}

/// A directed slice-level dependency carried by a violation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Dependency {
    pub from: SimpleNode,
    pub to: SimpleNode,
}

impl Dependency {
    pub fn new(from: SimpleNode, to: SimpleNode) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A constraint failure: the slicing it was found in, the constraint's short
/// description, and the offending slice dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub slicing: String,
    pub short_description: String,
    pub dependencies: Vec<Dependency>,
}

/// An architectural rule evaluated against one slicing's projection.
pub trait Constraint: Send + Sync {
    /// The slicing this constraint applies to.
    fn slicing_name(&self) -> &str;

    /// Compact rendering of the rule for reports.
    fn short_description(&self) -> String;

    /// All violations of this constraint in the given slice source. Sources
    /// for a different slicing yield no violations.
    fn violations(&self, source: &dyn SliceSource) -> Vec<Violation>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Members may not reference each other.
    Strict,
    /// Members may reference each other.
    Lenient,
}

/// One layer of a layering constraint: a kind and the slice names it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    kind: LayerKind,
    members: Vec<String>,
}

impl Layer {
    pub fn strict<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: LayerKind::Strict,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lenient<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: LayerKind::Lenient,
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }

    /// `a` for a single member, `[a, x]` for strict layers, `(a, x)` for
    /// lenient ones.
    pub(crate) fn short_string(&self) -> String {
        if self.members.len() == 1 {
            return self.members[0].clone();
        }
        let joined = self.members.join(", ");
        match self.kind {
            LayerKind::Strict => format!("[{joined}]"),
            LayerKind::Lenient => format!("({joined})"),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A hand-built slice source for exercising constraints directly.
    pub(crate) struct StubSliceSource {
        name: String,
        references: Vec<(SimpleNode, SimpleNode)>,
    }

    impl StubSliceSource {
        pub(crate) fn new(name: &str, deps: &[(&str, &str)]) -> Self {
            let references = deps
                .iter()
                .map(|(from, to)| {
                    (
                        SimpleNode::slice_node(*from, name),
                        SimpleNode::slice_node(*to, name),
                    )
                })
                .collect();
            Self {
                name: name.to_string(),
                references,
            }
        }
    }

    impl SliceSource for StubSliceSource {
        fn slicing_name(&self) -> &str {
            &self.name
        }

        fn slice_nodes(&self) -> Vec<SimpleNode> {
            let mut nodes: Vec<SimpleNode> = self
                .references
                .iter()
                .flat_map(|(from, to)| [from.clone(), to.clone()])
                .collect();
            nodes.sort();
            nodes.dedup();
            nodes
        }

        fn references(&self) -> Vec<(SimpleNode, SimpleNode)> {
            self.references.clone()
        }
    }

    /// The dependency a violation is expected to carry.
    pub(crate) fn dep(slicing: &str, from: &str, to: &str) -> Dependency {
        Dependency::new(
            SimpleNode::slice_node(from, slicing),
            SimpleNode::slice_node(to, slicing),
        )
    }
}
