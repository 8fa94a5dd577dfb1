use decycle::{violation_line, Configuration, DecycleConfig, DependencyListSource};
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn toml_config_drives_a_full_check() {
    let dir = TempDir::new().unwrap();
    let listing = write_fixture(
        &dir,
        "deps.txt",
        "# app dependencies\n\
         com.shop.order.Order -> com.shop.billing.Invoice\n\
         com.shop.billing.Billing -> com.shop.order.OrderService\n\
         com.shop.util.Strings\n",
    );
    let config_file = write_fixture(
        &dir,
        "decycle.toml",
        &format!(
            r#"
            classpath = "{}"

            [[slicings]]
            name = "module"
            patterns = ["com.shop.(*).**"]

            [[constraints]]
            type = "cycle-free"
            slicing = "module"
            "#,
            listing.display()
        ),
    );

    let configuration = DecycleConfig::load(&config_file)
        .unwrap()
        .compile()
        .unwrap();
    let violations = configuration.check_classpath().unwrap();

    assert_eq!(violations.len(), 1);
    assert_eq!(
        violation_line(&violations[0]),
        "module: no cycles: billing -> order, order -> billing"
    );
}

#[test]
fn nested_classes_are_collapsed_before_slicing() {
    let dir = TempDir::new().unwrap();
    let listing = write_fixture(
        &dir,
        "deps.txt",
        "com.shop.order.Order$Builder -> com.shop.billing.Invoice\n\
         com.shop.billing.Invoice$Line -> com.shop.order.Order\n",
    );

    let configuration = Configuration::builder()
        .slicing("module", ["com.shop.(*).**"])
        .build()
        .unwrap();
    let violations = configuration
        .check(&mut DependencyListSource::new(listing))
        .unwrap();
    assert_eq!(violations.len(), 1, "cycle must survive the collapse");
}

#[test]
fn include_patterns_restrict_the_scan() {
    let dir = TempDir::new().unwrap();
    let listing = write_fixture(
        &dir,
        "deps.txt",
        "com.shop.a.X -> org.vendor.b.Y\n\
         org.vendor.b.Y -> com.shop.a.X\n",
    );

    let configuration = Configuration::builder()
        .including("com.shop.**")
        .slicing("module", ["**.(*).*"])
        .build()
        .unwrap();
    let violations = configuration
        .check(&mut DependencyListSource::new(listing))
        .unwrap();
    assert!(violations.is_empty(), "vendor classes are out of scope");
}

#[test]
fn default_configuration_checks_package_cycles() {
    let dir = TempDir::new().unwrap();
    let listing = write_fixture(
        &dir,
        "deps.txt",
        "com.shop.a.X -> com.shop.b.Y\n\
         com.shop.b.Y -> com.shop.a.Z\n",
    );

    let configuration = Configuration::builder().build().unwrap();
    let violations = configuration
        .check(&mut DependencyListSource::new(listing))
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violation_line(&violations[0]),
        "package: no cycles: com.shop.a -> com.shop.b, com.shop.b -> com.shop.a"
    );
}

#[test]
fn malformed_config_names_the_offending_pattern() {
    let error = Configuration::builder()
        .slicing("module", ["com.(("])
        .build()
        .unwrap_err();
    assert!(error.to_string().contains("com.(("), "{error}");
}
