//! Feeding class references into the graph.
//!
//! Reading compiled classes is the job of an external collaborator; the core
//! only defines the callback contract ([`ClassSink`]) and adapts it onto the
//! graph. A plain-text dependency listing reader is provided for the CLI and
//! for tests.

use crate::graph::DependencyGraph;
use crate::model::Node;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;

/// Receiver for the classes and class-to-class references a source emits.
pub trait ClassSink {
    /// A class was visited, whether or not it references anything.
    fn visit_class(&mut self, class_name: &str);

    /// A reference from one class to another.
    fn visit_reference(&mut self, from_class: &str, to_class: &str);
}

/// A producer of class-level dependencies, e.g. a bytecode reader.
pub trait ClassSource {
    fn scan(&mut self, sink: &mut dyn ClassSink) -> Result<()>;
}

/// Adapter writing sink callbacks into a [`DependencyGraph`].
///
/// Nested class names (`com.example.Foo$Inner`) are collapsed onto their
/// outer class; references that collapse onto themselves are dropped.
pub struct GraphSink<'a> {
    graph: &'a mut DependencyGraph,
}

impl<'a> GraphSink<'a> {
    pub fn new(graph: &'a mut DependencyGraph) -> Self {
        Self { graph }
    }
}

impl ClassSink for GraphSink<'_> {
    fn visit_class(&mut self, class_name: &str) {
        self.graph.add(Node::class_node(outer_class(class_name)));
    }

    fn visit_reference(&mut self, from_class: &str, to_class: &str) {
        let from = outer_class(from_class);
        let to = outer_class(to_class);
        if from == to {
            return;
        }
        self.graph
            .connect(Node::class_node(from), Node::class_node(to));
    }
}

fn outer_class(class_name: &str) -> &str {
    class_name.split('$').next().unwrap_or(class_name)
}

/// Reads a text file of class dependencies, one per line:
/// `com.example.a.Foo -> com.example.b.Bar`. Lines without an arrow declare
/// a class without outgoing references; `#` starts a comment.
pub struct DependencyListSource {
    path: PathBuf,
}

impl DependencyListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClassSource for DependencyListSource {
    fn scan(&mut self, sink: &mut dyn ClassSink) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read dependency listing {}", self.path.display()))?;
        for (number, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once("->") {
                Some((from, to)) => {
                    let from = from.trim();
                    let to = to.trim();
                    if from.is_empty() || to.is_empty() {
                        bail!(
                            "{}:{}: malformed dependency '{}'",
                            self.path.display(),
                            number + 1,
                            raw.trim()
                        );
                    }
                    sink.visit_reference(from, to);
                }
                None => sink.visit_class(line),
            }
        }
        Ok(())
    }
}
