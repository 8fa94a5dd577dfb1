use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Node type marking concrete class leaves.
pub const CLASS: &str = "class";

/// A named node carrying the set of slicings it belongs to.
///
/// A `SimpleNode` is either a concrete class (its `types` contain [`CLASS`])
/// or a slice group (its `types` is the slicing it groups for). A class that
/// is its own slice carries both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SimpleNode {
    name: String,
    types: BTreeSet<String>,
}

impl SimpleNode {
    /// A concrete class node, named by its fully qualified class name.
    pub fn class_node(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: BTreeSet::from([CLASS.to_string()]),
        }
    }

    /// A slice group node for the given slicing.
    pub fn slice_node(name: impl Into<String>, slicing: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: BTreeSet::from([slicing.into()]),
        }
    }

    /// A slice node for a class that is classified as itself: the node keeps
    /// the class marker in addition to the slicing type.
    pub fn self_slice_node(name: impl Into<String>, slicing: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: BTreeSet::from([slicing.into(), CLASS.to_string()]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    pub fn has_type(&self, t: &str) -> bool {
        self.types.contains(t)
    }

    pub fn is_class(&self) -> bool {
        self.types.contains(CLASS)
    }
}

impl fmt::Display for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The image of a class under several slicings at once.
///
/// Holds one slice node per matching slicing, in slicing declaration order.
/// The vals belong to pairwise distinct slicings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParentAwareNode {
    vals: Vec<SimpleNode>,
}

impl ParentAwareNode {
    pub fn new(vals: Vec<SimpleNode>) -> Self {
        debug_assert!(vals.len() >= 2, "a parent-aware node groups two or more slices");
        Self { vals }
    }

    pub fn vals(&self) -> &[SimpleNode] {
        &self.vals
    }
}

/// A node of the dependency graph: a single class or slice, or the
/// multi-slicing parent of a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Node {
    Simple(SimpleNode),
    Parent(ParentAwareNode),
}

impl Node {
    pub fn class_node(name: impl Into<String>) -> Self {
        Node::Simple(SimpleNode::class_node(name))
    }

    pub fn slice_node(name: impl Into<String>, slicing: impl Into<String>) -> Self {
        Node::Simple(SimpleNode::slice_node(name, slicing))
    }

    pub fn as_simple(&self) -> Option<&SimpleNode> {
        match self {
            Node::Simple(simple) => Some(simple),
            Node::Parent(_) => None,
        }
    }

    /// True for concrete class leaves.
    pub fn is_class(&self) -> bool {
        matches!(self, Node::Simple(simple) if simple.is_class())
    }
}

impl From<SimpleNode> for Node {
    fn from(simple: SimpleNode) -> Self {
        Node::Simple(simple)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Simple(simple) => write!(f, "{simple}"),
            Node::Parent(parent) => {
                let names: Vec<&str> = parent.vals().iter().map(SimpleNode::name).collect();
                write!(f, "{}", names.join(" & "))
            }
        }
    }
}
