//! Layering constraints: references must follow the declared layer order.

use super::{Constraint, Dependency, Layer, LayerKind, SliceSource, Violation};
use crate::model::SimpleNode;
use std::collections::BTreeSet;

/// An ordered stack of layers over one slicing.
///
/// In the relaxed form references may flow forward across any number of
/// layers; the direct form additionally forbids skipping a layer. Both forms
/// forbid references against the declared order, and strict layers forbid
/// references between their own members.
#[derive(Debug, Clone)]
pub struct Layering {
    slicing: String,
    layers: Vec<Layer>,
    direct: bool,
}

impl Layering {
    /// Layering that only forbids backward references.
    pub fn relaxed(slicing: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            slicing: slicing.into(),
            layers,
            direct: false,
        }
    }

    /// Layering that forbids backward references and layer skipping.
    pub fn direct(slicing: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            slicing: slicing.into(),
            layers,
            direct: true,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn is_direct(&self) -> bool {
        self.direct
    }

    fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.contains(name))
    }

    fn violated_by(&self, from_index: Option<usize>, to_index: Option<usize>) -> bool {
        match (from_index, to_index) {
            // within one layer only the kind decides
            (Some(i), Some(j)) if i == j => self.layers[i].kind() == LayerKind::Strict,
            (Some(i), Some(j)) => {
                if self.direct {
                    j < i || i + 1 < j
                } else {
                    j < i
                }
            }
            // a known source may reach outside only from the last layer
            (Some(i), None) => i + 1 != self.layers.len(),
            // a known target may be reached from outside only in the first layer
            (None, Some(j)) => j != 0,
            (None, None) => false,
        }
    }
}

impl Constraint for Layering {
    fn slicing_name(&self) -> &str {
        &self.slicing
    }

    fn short_description(&self) -> String {
        self.layers
            .iter()
            .map(Layer::short_string)
            .collect::<Vec<_>>()
            .join(" => ")
    }

    fn violations(&self, source: &dyn SliceSource) -> Vec<Violation> {
        if source.slicing_name() != self.slicing {
            return Vec::new();
        }

        let mut offending: BTreeSet<(String, String)> = BTreeSet::new();
        for (from, to) in source.references() {
            if from.name() == to.name() {
                continue;
            }
            let from_index = self.layer_index(from.name());
            let to_index = self.layer_index(to.name());
            if self.violated_by(from_index, to_index) {
                offending.insert((from.name().to_string(), to.name().to_string()));
            }
        }

        if offending.is_empty() {
            return Vec::new();
        }
        let dependencies = offending
            .into_iter()
            .map(|(from, to)| {
                Dependency::new(
                    SimpleNode::slice_node(from, &self.slicing),
                    SimpleNode::slice_node(to, &self.slicing),
                )
            })
            .collect();
        vec![Violation {
            slicing: self.slicing.clone(),
            short_description: self.short_description(),
            dependencies,
        }]
    }
}
