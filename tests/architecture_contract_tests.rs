//! Architecture contract tests.

mod support;

use support::architecture::{find_lines_containing, find_non_export_lines_in_mod_files, path_exists};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::runtime",
            "crate::port",
            "tokio::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::runtime",
        ],
    );

    assert!(hits.is_empty(), "found outer layer imports in ports: {hits:#?}");
}

#[test]
fn application_does_not_reach_into_adapters_or_bootstrap() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter", "crate::infrastructure", "crate::runtime"],
    );

    assert!(
        hits.is_empty(),
        "application layer should only see domain and ports: {hits:#?}"
    );
}

#[test]
fn runtime_is_wired_through_ports() {
    let hits = find_lines_containing("src/runtime", &["crate::adapter", "crate::infrastructure"]);

    assert!(
        hits.is_empty(),
        "runtime tasks should not name concrete adapters: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn translation_table_lives_in_domain() {
    assert!(
        path_exists("src/domain/translation.rs"),
        "symbol translation table should live under domain"
    );
}
