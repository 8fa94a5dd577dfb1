//! Configuration: what to scan, how to slice it, and which rules to check.
//!
//! A [`DecycleConfig`] is the declarative form (built in code or loaded from
//! `decycle.toml`); compiling it yields a [`Configuration`] with patterns
//! parsed and constraints constructed, whose [`check`](Configuration::check)
//! drives a class source through the graph and the constraint engine.

use crate::check::{Constraint, CycleFree, Layer, Layering, Violation};
use crate::error::ConfigError;
use crate::graph::DependencyGraph;
use crate::ingest::{ClassSource, DependencyListSource, GraphSink};
use crate::pattern::NamePattern;
use crate::slicer::{Categorizer, IgnoreRule, Slicing};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Declarative configuration, mirroring the `decycle.toml` file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecycleConfig {
    /// Input containing the class-level dependencies to scan.
    pub classpath: Option<PathBuf>,

    /// When non-empty, only classes matching one of these patterns
    /// participate.
    pub including: Vec<String>,

    /// Classes matching any of these patterns are excluded.
    pub excluding: Vec<String>,

    /// References dropped before constraint evaluation.
    pub ignoring: Vec<IgnoreSpec>,

    /// Named slicings, each an ordered pattern list.
    pub slicings: Vec<SlicingSpec>,

    /// Constraints, evaluated in declaration order.
    pub constraints: Vec<ConstraintSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreSpec {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlicingSpec {
    pub name: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", deny_unknown_fields)]
pub enum ConstraintSpec {
    CycleFree {
        slicing: String,
    },
    Layering {
        slicing: String,
        #[serde(default)]
        direct: bool,
        layers: Vec<LayerSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerSpec {
    #[serde(default)]
    pub kind: LayerKindSpec,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKindSpec {
    Strict,
    #[default]
    Lenient,
}

impl DecycleConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::InvalidConfigFile {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml(&contents, &path.display().to_string())?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Look for `decycle.toml` in the working directory and its ancestors.
    pub fn discover() -> Option<Self> {
        const MAX_TRAVERSAL_DEPTH: usize = 10;
        let current = std::env::current_dir().ok()?;
        std::iter::successors(Some(current), |dir| dir.parent().map(Path::to_path_buf))
            .take(MAX_TRAVERSAL_DEPTH)
            .map(|dir| dir.join("decycle.toml"))
            .find(|path| path.is_file())
            .and_then(|path| match Self::load(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("ignoring unreadable {}: {}", path.display(), e);
                    None
                }
            })
    }

    /// Compile into a checkable [`Configuration`].
    pub fn compile(self) -> Result<Configuration, ConfigError> {
        Configuration::from_config(self)
    }
}

fn parse_pattern(pattern: &str) -> Result<NamePattern, ConfigError> {
    NamePattern::parse(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn parse_patterns(patterns: &[String]) -> Result<Vec<NamePattern>, ConfigError> {
    patterns.iter().map(|p| parse_pattern(p)).collect()
}

/// A compiled configuration, ready to check class sources.
pub struct Configuration {
    classpath: Option<PathBuf>,
    including: Vec<NamePattern>,
    excluding: Vec<NamePattern>,
    ignoring: Vec<IgnoreRule>,
    slicings: Vec<Slicing>,
    constraints: Vec<Box<dyn Constraint>>,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("classpath", &self.classpath)
            .field("including", &self.including)
            .field("excluding", &self.excluding)
            .field("ignoring", &self.ignoring)
            .field("slicings", &self.slicings)
            .field(
                "constraints",
                &self
                    .constraints
                    .iter()
                    .map(|c| c.short_description())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Compile the declarative form, validating patterns, slicing names and
    /// constraint wiring.
    pub fn from_config(config: DecycleConfig) -> Result<Self, ConfigError> {
        let including = parse_patterns(&config.including)?;
        let excluding = parse_patterns(&config.excluding)?;
        let ignoring = config
            .ignoring
            .iter()
            .map(|spec| {
                Ok(IgnoreRule::new(
                    parse_pattern(&spec.from)?,
                    parse_pattern(&spec.to)?,
                ))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut slicings = Vec::new();
        let mut names = BTreeSet::new();
        for spec in &config.slicings {
            if !names.insert(spec.name.clone()) {
                return Err(ConfigError::DuplicateSlicing(spec.name.clone()));
            }
            slicings.push(Slicing::new(&spec.name, parse_patterns(&spec.patterns)?));
        }
        if slicings.is_empty() {
            slicings.push(Slicing::package_default());
        }

        let specs = if config.constraints.is_empty() {
            // cycle freedom is the default expectation for every slicing
            slicings
                .iter()
                .map(|s| ConstraintSpec::CycleFree {
                    slicing: s.name().to_string(),
                })
                .collect()
        } else {
            config.constraints.clone()
        };
        let mut constraints: Vec<Box<dyn Constraint>> = Vec::new();
        for spec in &specs {
            constraints.push(build_constraint(spec, &slicings)?);
        }

        Ok(Self {
            classpath: config.classpath,
            including,
            excluding,
            ignoring,
            slicings,
            constraints,
        })
    }

    pub fn classpath(&self) -> Option<&Path> {
        self.classpath.as_deref()
    }

    pub fn slicings(&self) -> &[Slicing] {
        &self.slicings
    }

    pub fn constraints(&self) -> &[Box<dyn Constraint>] {
        &self.constraints
    }

    /// Run the whole pipeline: ingest the source into a fresh graph, project
    /// each constraint's slicing, and collect violations in constraint
    /// declaration order.
    pub fn check(&self, source: &mut dyn ClassSource) -> Result<Vec<Violation>> {
        let mut graph = self.build_graph();
        {
            let mut sink = GraphSink::new(&mut graph);
            source.scan(&mut sink)?;
        }
        log::debug!(
            "ingested dependency graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let mut violations = Vec::new();
        for constraint in &self.constraints {
            let projection = graph.slice(constraint.slicing_name());
            let found = constraint.violations(&projection);
            log::debug!(
                "constraint '{}' on slicing '{}': {} violation(s)",
                constraint.short_description(),
                constraint.slicing_name(),
                found.len()
            );
            violations.extend(found);
        }
        Ok(violations)
    }

    /// Check the configured classpath with the bundled dependency-list
    /// reader.
    pub fn check_classpath(&self) -> Result<Vec<Violation>> {
        let classpath = self
            .classpath
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no classpath configured"))?;
        let mut source = DependencyListSource::new(classpath);
        self.check(&mut source)
    }

    fn build_graph(&self) -> DependencyGraph {
        let categorizer = Categorizer::new(self.slicings.clone());
        let mut graph = DependencyGraph::new(categorizer);

        if !self.including.is_empty() || !self.excluding.is_empty() {
            let including = self.including.clone();
            let excluding = self.excluding.clone();
            graph = graph.with_node_filter(move |node| {
                let Some(simple) = node.as_simple() else {
                    return true;
                };
                if !node.is_class() {
                    return true;
                }
                let included = including.is_empty()
                    || including.iter().any(|p| p.is_match(simple.name()));
                included && !excluding.iter().any(|p| p.is_match(simple.name()))
            });
        }

        if !self.ignoring.is_empty() {
            let rules = self.ignoring.clone();
            graph = graph.with_edge_filter(move |from, to| {
                match (from.as_simple(), to.as_simple()) {
                    (Some(u), Some(v)) => {
                        !rules.iter().any(|rule| rule.suppresses(u.name(), v.name()))
                    }
                    _ => true,
                }
            });
        }

        graph
    }
}

fn build_constraint(
    spec: &ConstraintSpec,
    slicings: &[Slicing],
) -> Result<Box<dyn Constraint>, ConfigError> {
    let known = |name: &str| slicings.iter().any(|s| s.name() == name);
    match spec {
        ConstraintSpec::CycleFree { slicing } => {
            if !known(slicing) {
                return Err(ConfigError::UnknownSlicing(slicing.clone()));
            }
            Ok(Box::new(CycleFree::new(slicing.clone())))
        }
        ConstraintSpec::Layering {
            slicing,
            direct,
            layers,
        } => {
            if !known(slicing) {
                return Err(ConfigError::UnknownSlicing(slicing.clone()));
            }
            if layers.is_empty() {
                return Err(ConfigError::EmptyLayering(slicing.clone()));
            }
            let mut seen = BTreeSet::new();
            for layer in layers {
                for member in &layer.members {
                    if !seen.insert(member.clone()) {
                        return Err(ConfigError::DuplicateLayerMember(member.clone()));
                    }
                }
            }
            let layers: Vec<Layer> = layers
                .iter()
                .map(|spec| match spec.kind {
                    LayerKindSpec::Strict => Layer::strict(spec.members.clone()),
                    LayerKindSpec::Lenient => Layer::lenient(spec.members.clone()),
                })
                .collect();
            let layering = if *direct {
                Layering::direct(slicing.clone(), layers)
            } else {
                Layering::relaxed(slicing.clone(), layers)
            };
            Ok(Box::new(layering))
        }
    }
}

/// Incremental construction of a [`Configuration`] in code.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    config: DecycleConfig,
}

impl ConfigurationBuilder {
    pub fn classpath(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.classpath = Some(path.into());
        self
    }

    pub fn including(mut self, pattern: impl Into<String>) -> Self {
        self.config.including.push(pattern.into());
        self
    }

    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.config.excluding.push(pattern.into());
        self
    }

    pub fn ignoring(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.ignoring.push(IgnoreSpec {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn slicing<I, S>(mut self, name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.slicings.push(SlicingSpec {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn constraint(mut self, spec: ConstraintSpec) -> Self {
        self.config.constraints.push(spec);
        self
    }

    pub fn build(self) -> Result<Configuration, ConfigError> {
        Configuration::from_config(self.config)
    }
}
