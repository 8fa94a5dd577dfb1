//! The dependency multigraph over class and slice nodes.
//!
//! Two edge kinds: `Contains` edges run from a slice group down to the nodes
//! it groups, `References` edges run between nodes on the same level. The
//! graph is written during ingest and read during constraint evaluation.

mod resolver;

pub use resolver::SliceResolver;

use crate::check::SliceSource;
use crate::model::{Node, SimpleNode};
use crate::slicer::Categorizer;
use im::{HashMap, HashSet, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    Contains,
    References,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: Node,
    pub to: Node,
    pub label: EdgeLabel,
}

type NodeFilter = Box<dyn Fn(&Node) -> bool + Send + Sync>;
type EdgeFilter = Box<dyn Fn(&Node, &Node) -> bool + Send + Sync>;

/// A mutable directed multigraph of classes and their slice groups.
///
/// Nodes and edges are only ever added. An optional node filter decides which
/// nodes participate at all; an optional edge filter suppresses individual
/// references. Filters apply to the nodes handed in from ingest, not to the
/// slice nodes derived from them.
pub struct DependencyGraph {
    categorizer: Categorizer,
    node_filter: Option<NodeFilter>,
    edge_filter: Option<EdgeFilter>,
    nodes: HashSet<Node>,
    edges: Vector<Edge>,
    edge_index: HashSet<Edge>,
    out_refs: HashMap<Node, HashSet<Node>>,
    out_contains: HashMap<Node, HashSet<Node>>,
    in_contains: HashMap<Node, HashSet<Node>>,
}

impl DependencyGraph {
    pub fn new(categorizer: Categorizer) -> Self {
        Self {
            categorizer,
            node_filter: None,
            edge_filter: None,
            nodes: HashSet::new(),
            edges: Vector::new(),
            edge_index: HashSet::new(),
            out_refs: HashMap::new(),
            out_contains: HashMap::new(),
            in_contains: HashMap::new(),
        }
    }

    pub fn with_node_filter(
        mut self,
        filter: impl Fn(&Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.node_filter = Some(Box::new(filter));
        self
    }

    pub fn with_edge_filter(
        mut self,
        filter: impl Fn(&Node, &Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.edge_filter = Some(Box::new(filter));
        self
    }

    fn accepts_node(&self, node: &Node) -> bool {
        self.node_filter.as_ref().map_or(true, |f| f(node))
    }

    fn accepts_edge(&self, from: &Node, to: &Node) -> bool {
        self.edge_filter.as_ref().map_or(true, |f| f(from, to))
    }

    /// Record a reference between two nodes, then seed both containment
    /// chains. The reference itself is subject to both filters and the
    /// no-self-loop rule; the nodes are still added when only the edge is
    /// suppressed.
    pub fn connect(&mut self, from: Node, to: Node) {
        if from != to
            && self.accepts_node(&from)
            && self.accepts_node(&to)
            && self.accepts_edge(&from, &to)
        {
            self.insert_edge(from.clone(), to.clone(), EdgeLabel::References);
        }
        self.add(from);
        self.add(to);
    }

    /// Insert a node together with its containment chain up to the
    /// categorizer's fixed point.
    pub fn add(&mut self, node: Node) {
        if self.accepts_node(&node) {
            self.insert_with_ancestry(node);
        }
    }

    fn insert_with_ancestry(&mut self, node: Node) {
        let mut current = node;
        // Bounded walk: a well-formed categorizer reaches its fixed point,
        // the visited set catches one that does not.
        let mut seen: HashSet<Node> = HashSet::new();
        loop {
            let category = self.categorizer.categorize(&current);
            if category == current || seen.contains(&category) {
                self.nodes.insert(current);
                return;
            }
            seen.insert(current.clone());
            self.insert_edge(category.clone(), current, EdgeLabel::Contains);
            current = category;
        }
    }

    fn insert_edge(&mut self, from: Node, to: Node, label: EdgeLabel) {
        let edge = Edge {
            from: from.clone(),
            to: to.clone(),
            label,
        };
        if self.edge_index.contains(&edge) {
            return;
        }
        self.edge_index.insert(edge.clone());
        self.edges.push_back(edge);
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        match label {
            EdgeLabel::References => {
                self.out_refs.entry(from).or_default().insert(to);
            }
            EdgeLabel::Contains => {
                self.out_contains
                    .entry(from.clone())
                    .or_default()
                    .insert(to.clone());
                self.in_contains.entry(to).or_default().insert(from);
            }
        }
    }

    /// All nodes, sorted for stable iteration.
    pub fn all_nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.nodes.iter().cloned().collect();
        nodes.sort();
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Roots of the containment forest: nodes without a containing slice.
    pub fn top_nodes(&self) -> Vec<Node> {
        let mut tops: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| {
                self.in_contains
                    .get(*n)
                    .map_or(true, |containers| containers.is_empty())
            })
            .cloned()
            .collect();
        tops.sort();
        tops
    }

    /// Nodes directly contained in the given group.
    pub fn contents_of(&self, group: &Node) -> Vec<Node> {
        self.sorted_neighbors(&self.out_contains, group)
    }

    /// Nodes directly referenced by the given node.
    pub fn connections_of(&self, node: &Node) -> Vec<Node> {
        self.sorted_neighbors(&self.out_refs, node)
    }

    fn sorted_neighbors(&self, index: &HashMap<Node, HashSet<Node>>, node: &Node) -> Vec<Node> {
        let mut neighbors: Vec<Node> = index
            .get(node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        neighbors.sort();
        neighbors
    }

    /// The slice containing the node, if any. When several containers exist
    /// the smallest is picked, keeping resolution deterministic.
    pub(crate) fn container_of(&self, node: &Node) -> Option<Node> {
        self.in_contains
            .get(node)
            .and_then(|containers| containers.iter().min().cloned())
    }

    /// Project the reference edges onto the slice nodes of one slicing.
    ///
    /// Every reference whose endpoints both lift into the slicing becomes an
    /// edge between the lifted slice nodes; references collapsing onto a
    /// single slice node are dropped.
    pub fn slice(&self, name: &str) -> SliceGraph {
        let mut slice_nodes: Vec<SimpleNode> = self
            .nodes
            .iter()
            .filter_map(Node::as_simple)
            .filter(|simple| simple.has_type(name))
            .cloned()
            .collect();
        slice_nodes.sort();

        let resolver = SliceResolver::new(name, self);
        let mut references = Vec::new();
        for edge in self.edges.iter().filter(|e| e.label == EdgeLabel::References) {
            let (Some(from), Some(to)) = (resolver.lift(&edge.from), resolver.lift(&edge.to))
            else {
                continue;
            };
            if from == to {
                continue;
            }
            for endpoint in [&from, &to] {
                if let Err(position) = slice_nodes.binary_search(endpoint) {
                    slice_nodes.insert(position, endpoint.clone());
                }
            }
            references.push((from, to));
        }

        SliceGraph {
            name: name.to_string(),
            nodes: slice_nodes,
            references,
        }
    }
}

/// The projection of the graph onto one slicing: its slice nodes and the
/// lifted reference edges, in insertion order.
#[derive(Debug, Clone)]
pub struct SliceGraph {
    name: String,
    nodes: Vec<SimpleNode>,
    references: Vec<(SimpleNode, SimpleNode)>,
}

impl SliceSource for SliceGraph {
    fn slicing_name(&self) -> &str {
        &self.name
    }

    fn slice_nodes(&self) -> Vec<SimpleNode> {
        self.nodes.clone()
    }

    fn references(&self) -> Vec<(SimpleNode, SimpleNode)> {
        self.references.clone()
    }
}
