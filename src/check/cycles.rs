//! Cycle detection over slice projections.

use super::{Constraint, Dependency, SliceSource, Violation};
use crate::model::SimpleNode;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet};

/// Requires the projection of one slicing to be free of reference cycles.
///
/// Every strongly-connected component of two or more slices (or a slice
/// referencing itself) yields one violation carrying a representative cycle
/// through the component.
#[derive(Debug, Clone)]
pub struct CycleFree {
    slicing: String,
}

impl CycleFree {
    pub fn new(slicing: impl Into<String>) -> Self {
        Self {
            slicing: slicing.into(),
        }
    }
}

impl Constraint for CycleFree {
    fn slicing_name(&self) -> &str {
        &self.slicing
    }

    fn short_description(&self) -> String {
        "no cycles".to_string()
    }

    fn violations(&self, source: &dyn SliceSource) -> Vec<Violation> {
        if source.slicing_name() != self.slicing {
            return Vec::new();
        }

        let adjacency = dedup_adjacency(source);
        let graph = build_petgraph(&adjacency);

        let mut violations: Vec<Violation> = Vec::new();
        for component in tarjan_scc(&graph) {
            let members: BTreeSet<String> = component
                .iter()
                .map(|index| graph[*index].clone())
                .collect();
            let cyclic = members.len() >= 2
                || members.iter().any(|name| {
                    adjacency
                        .get(name)
                        .is_some_and(|targets| targets.contains(name))
                });
            if !cyclic {
                continue;
            }
            let dependencies = representative_cycle(&members, &adjacency)
                .into_iter()
                .map(|(from, to)| {
                    Dependency::new(
                        SimpleNode::slice_node(from, &self.slicing),
                        SimpleNode::slice_node(to, &self.slicing),
                    )
                })
                .collect();
            violations.push(Violation {
                slicing: self.slicing.clone(),
                short_description: self.short_description(),
                dependencies,
            });
        }

        // one violation per component, ordered by the cycle's starting slice
        violations.sort_by(|a, b| a.dependencies[0].from.cmp(&b.dependencies[0].from));
        violations
    }
}

/// Collapse parallel projected references into one edge per slice pair.
fn dedup_adjacency(source: &dyn SliceSource) -> BTreeMap<String, BTreeSet<String>> {
    let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for node in source.slice_nodes() {
        adjacency.entry(node.name().to_string()).or_default();
    }
    for (from, to) in source.references() {
        adjacency
            .entry(from.name().to_string())
            .or_default()
            .insert(to.name().to_string());
        adjacency.entry(to.name().to_string()).or_default();
    }
    adjacency
}

fn build_petgraph(adjacency: &BTreeMap<String, BTreeSet<String>>) -> DiGraph<String, ()> {
    let mut graph = DiGraph::new();
    let mut indices: BTreeMap<&String, NodeIndex> = BTreeMap::new();
    for name in adjacency.keys() {
        let index = graph.add_node(name.clone());
        indices.insert(name, index);
    }
    for (from, targets) in adjacency {
        for to in targets {
            graph.add_edge(indices[from], indices[to], ());
        }
    }
    graph
}

/// A deterministic cycle through the component: depth-first from the
/// lexicographically smallest member, closing each dead end back into the
/// already visited part.
fn representative_cycle(
    members: &BTreeSet<String>,
    adjacency: &BTreeMap<String, BTreeSet<String>>,
) -> Vec<(String, String)> {
    let start = members
        .iter()
        .next()
        .expect("a strongly-connected component is never empty")
        .clone();
    if members.len() == 1 {
        return vec![(start.clone(), start)];
    }

    let mut dependencies: Vec<(String, String)> = Vec::new();
    let mut recorded: BTreeSet<(String, String)> = BTreeSet::new();
    let mut visited: BTreeSet<String> = BTreeSet::from([start.clone()]);
    let mut stack: Vec<String> = vec![start.clone()];

    while let Some(current) = stack.last().cloned() {
        let next = scc_neighbors(adjacency, members, &current)
            .find(|n| !visited.contains(*n))
            .cloned();
        if let Some(next) = next {
            recorded.insert((current.clone(), next.clone()));
            dependencies.push((current, next.clone()));
            visited.insert(next.clone());
            stack.push(next);
        } else {
            if current != start {
                if let Some(back) = scc_neighbors(adjacency, members, &current).next().cloned() {
                    if recorded.insert((current.clone(), back.clone())) {
                        dependencies.push((current, back));
                    }
                }
            }
            stack.pop();
        }
    }
    dependencies
}

fn scc_neighbors<'a>(
    adjacency: &'a BTreeMap<String, BTreeSet<String>>,
    members: &'a BTreeSet<String>,
    name: &str,
) -> impl Iterator<Item = &'a String> + 'a {
    adjacency
        .get(name)
        .into_iter()
        .flatten()
        .filter(move |n| members.contains(*n))
}
