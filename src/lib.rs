//! # Decycle
//!
//! An architecture checker for compiled class artifacts: it builds a
//! dependency graph over classes, groups them into user-named *slices* via
//! glob-like patterns, and verifies that the slice-level dependencies are
//! free of cycles and respect declared layerings.
//!
//! ## How it works
//!
//! 1. A [`ClassSource`](ingest::ClassSource) emits visited classes and
//!    class-to-class references (bytecode reading itself is an external
//!    collaborator; a plain-text listing reader is bundled).
//! 2. The [`Categorizer`](slicer::Categorizer) assigns every class to a
//!    slice per configured [`Slicing`](slicer::Slicing).
//! 3. The [`DependencyGraph`](graph::DependencyGraph) holds classes and
//!    slices with containment and reference edges, and projects the
//!    references of any slicing onto its slice nodes.
//! 4. [`Constraint`](check::Constraint)s — [`CycleFree`](check::CycleFree)
//!    and [`Layering`](check::Layering) — evaluate each projection and
//!    report [`Violation`](check::Violation)s.
//!
//! ## Quick start
//!
//! ```rust
//! use decycle::config::Configuration;
//! use decycle::ingest::{ClassSink, ClassSource};
//!
//! struct Fixed;
//!
//! impl ClassSource for Fixed {
//!     fn scan(&mut self, sink: &mut dyn ClassSink) -> anyhow::Result<()> {
//!         sink.visit_reference("com.example.a.Foo", "com.example.b.Bar");
//!         sink.visit_reference("com.example.b.Baz", "com.example.a.Qux");
//!         Ok(())
//!     }
//! }
//!
//! let configuration = Configuration::builder()
//!     .slicing("module", ["com.example.(*).**"])
//!     .build()
//!     .unwrap();
//! let violations = configuration.check(&mut Fixed).unwrap();
//! assert_eq!(violations.len(), 1); // a <-> b form a cycle
//! ```

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod model;
pub mod observability;
pub mod output;
pub mod pattern;
pub mod slicer;

pub use crate::check::{Constraint, CycleFree, Dependency, Layer, LayerKind, Layering, Violation};
pub use crate::config::{Configuration, ConfigurationBuilder, DecycleConfig};
pub use crate::error::ConfigError;
pub use crate::graph::{DependencyGraph, SliceResolver};
pub use crate::ingest::{ClassSink, ClassSource, DependencyListSource};
pub use crate::model::{Node, ParentAwareNode, SimpleNode};
pub use crate::output::{create_writer, violation_line, OutputFormat, ReportWriter};
pub use crate::pattern::{NamePattern, PatternError};
pub use crate::slicer::{Categorizer, IgnoreRule, Slicing};
