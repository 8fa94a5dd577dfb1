use decycle::config::{ConstraintSpec, LayerKindSpec, LayerSpec};
use decycle::ingest::{ClassSink, ClassSource};
use decycle::{Configuration, Violation};

/// A class source replaying a fixed set of references.
struct FixedSource {
    references: Vec<(&'static str, &'static str)>,
}

impl FixedSource {
    fn new(references: &[(&'static str, &'static str)]) -> Self {
        Self {
            references: references.to_vec(),
        }
    }
}

impl ClassSource for FixedSource {
    fn scan(&mut self, sink: &mut dyn ClassSink) -> anyhow::Result<()> {
        for (from, to) in &self.references {
            sink.visit_reference(from, to);
        }
        Ok(())
    }
}

fn layering_spec(direct: bool) -> ConstraintSpec {
    ConstraintSpec::Layering {
        slicing: "t".to_string(),
        direct,
        layers: vec![
            LayerSpec {
                kind: LayerKindSpec::Strict,
                members: vec!["a".to_string()],
            },
            LayerSpec {
                kind: LayerKindSpec::Lenient,
                members: vec!["b".to_string()],
            },
            LayerSpec {
                kind: LayerKindSpec::Lenient,
                members: vec!["c".to_string()],
            },
        ],
    }
}

fn layered_configuration(direct: bool) -> Configuration {
    Configuration::builder()
        .slicing("t", ["(*).**"])
        .constraint(layering_spec(direct))
        .build()
        .unwrap()
}

fn dependency_names(violation: &Violation) -> Vec<(String, String)> {
    violation
        .dependencies
        .iter()
        .map(|d| (d.from.name().to_string(), d.to.name().to_string()))
        .collect()
}

#[test]
fn skipping_a_layer_is_one_violation() {
    let configuration = layered_configuration(true);
    let violations = configuration
        .check(&mut FixedSource::new(&[("a.X", "c.Y")]))
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        dependency_names(&violations[0]),
        vec![("a".to_string(), "c".to_string())]
    );
}

#[test]
fn inverse_references_are_one_violation() {
    let configuration = layered_configuration(true);
    let violations = configuration
        .check(&mut FixedSource::new(&[("b.X", "a.Y")]))
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        dependency_names(&violations[0]),
        vec![("b".to_string(), "a".to_string())]
    );
}

#[test]
fn references_at_the_outer_layers_to_unknown_slices_are_allowed() {
    let configuration = layered_configuration(true);
    let violations = configuration
        .check(&mut FixedSource::new(&[("c.X", "x.Y"), ("x.Z", "a.W")]))
        .unwrap();
    assert!(violations.is_empty());
}

#[test]
fn references_to_unknown_slices_in_the_middle_are_reported() {
    let configuration = layered_configuration(true);
    let violations = configuration
        .check(&mut FixedSource::new(&[("b.X", "x.Y")]))
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        dependency_names(&violations[0]),
        vec![("b".to_string(), "x".to_string())]
    );
}

#[test]
fn module_cycles_are_reported_once_per_component() {
    let configuration = Configuration::builder()
        .slicing("module", ["(*).**"])
        .constraint(ConstraintSpec::CycleFree {
            slicing: "module".to_string(),
        })
        .build()
        .unwrap();
    let violations = configuration
        .check(&mut FixedSource::new(&[("m1.A", "m2.B"), ("m2.C", "m1.D")]))
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].short_description, "no cycles");
    assert_eq!(
        dependency_names(&violations[0]),
        vec![
            ("m1".to_string(), "m2".to_string()),
            ("m2".to_string(), "m1".to_string()),
        ]
    );
}

#[test]
fn repeated_checks_are_deterministic() {
    let configuration = Configuration::builder()
        .slicing("module", ["(*).**"])
        .build()
        .unwrap();
    let references = [
        ("z.A", "a.B"),
        ("a.C", "z.D"),
        ("m.E", "n.F"),
        ("n.G", "m.H"),
    ];
    let first = configuration
        .check(&mut FixedSource::new(&references))
        .unwrap();
    let second = configuration
        .check(&mut FixedSource::new(&references))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn excluding_a_class_never_adds_violations() {
    let references = [("m1.A", "m2.B"), ("m2.C", "m1.D")];
    let unfiltered = Configuration::builder()
        .slicing("module", ["(*).**"])
        .build()
        .unwrap()
        .check(&mut FixedSource::new(&references))
        .unwrap();
    assert_eq!(unfiltered.len(), 1);

    let filtered = Configuration::builder()
        .slicing("module", ["(*).**"])
        .excluding("m2.C")
        .build()
        .unwrap()
        .check(&mut FixedSource::new(&references))
        .unwrap();
    assert!(filtered.len() <= unfiltered.len());
    assert!(filtered.is_empty(), "dropping m2.C breaks the only cycle");
}

#[test]
fn ignore_rules_matching_no_edges_change_nothing() {
    let references = [("m1.A", "m2.B"), ("m2.C", "m1.D")];
    let plain = Configuration::builder()
        .slicing("module", ["(*).**"])
        .build()
        .unwrap()
        .check(&mut FixedSource::new(&references))
        .unwrap();
    let with_inert_ignore = Configuration::builder()
        .slicing("module", ["(*).**"])
        .ignoring("nothing.**", "**")
        .build()
        .unwrap()
        .check(&mut FixedSource::new(&references))
        .unwrap();
    assert_eq!(plain, with_inert_ignore);
}

#[test]
fn ignore_rules_suppress_matching_references() {
    let references = [("m1.A", "m2.B"), ("m2.C", "m1.D")];
    let violations = Configuration::builder()
        .slicing("module", ["(*).**"])
        .ignoring("m2.**", "m1.**")
        .build()
        .unwrap()
        .check(&mut FixedSource::new(&references))
        .unwrap();
    assert!(violations.is_empty());
}

#[test]
fn constraints_run_in_declaration_order() {
    let configuration = Configuration::builder()
        .slicing("t", ["(*).**"])
        .constraint(layering_spec(false))
        .constraint(ConstraintSpec::CycleFree {
            slicing: "t".to_string(),
        })
        .build()
        .unwrap();
    let violations = configuration
        .check(&mut FixedSource::new(&[("b.X", "a.Y"), ("a.Z", "b.W")]))
        .unwrap();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].short_description, "a => b => c");
    assert_eq!(violations[1].short_description, "no cycles");
}
