//! End-to-end tests for the mutating create mode.

use crate::harness::{fixture_content, manifest_json, run, Project};
use crate::{no_line_has, some_line_has, stdout_of};

#[test]
fn creates_missing_fixtures_from_the_default_template() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Unterminated string", "segment": "unterminated-string"}]]"#,
    ));

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(some_line_has(&out, "CREATE:", "unterminated-string.spec.js"));
    assert!(out.contains("Created: 1"));
    assert!(p.exists("parser/errors", "unterminated-string.spec.js"));

    let content = p.read("parser/errors", "unterminated-string.spec.js");
    assert!(content.contains("describe(\"Unterminated string\""));
    // Module references resolve relative to the fixture's own directory.
    assert!(content.contains("require(\"../../../../src/view.js\")"));
    assert!(content.contains("require(\"../../../../src/context.js\")"));
}

#[test]
fn relocates_instead_of_recreating() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Alpha", "segment": "alpha"}]]"#,
    ));
    // A marker comment the default template would never produce proves the
    // file was moved, not deleted and regenerated.
    let body = format!("// hand-edited assertions\n{}", fixture_content("Alpha"));
    p.write_raw("parser/errors", "alpha-old.spec.js", &body);

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(some_line_has(
        &out,
        "RELOCATE:",
        "alpha-old.spec.js -> "
    ));
    assert!(out.contains("Relocated: 1"));
    assert!(out.contains("Created: 0"));
    assert_eq!(p.list("parser/errors"), vec!["alpha.spec.js"]);
    assert!(p
        .read("parser/errors", "alpha.spec.js")
        .contains("// hand-edited assertions"));
}

#[test]
fn relocation_stamps_the_registered_title() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "New label", "segment": "renamed"}]]"#,
    ));
    p.write_fixture("parser/errors", "old-name.spec.js", "Old label");

    run(&p, "create", &manifest, &[]).code(0);

    assert_eq!(p.list("parser/errors"), vec!["renamed.spec.js"]);
    let content = p.read("parser/errors", "renamed.spec.js");
    assert!(content.contains("describe(\"New label\""));
    assert!(!content.contains("Old label"));
}

#[test]
fn greedy_relocation_picks_the_closest_candidate() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Deep nesting", "segment": "deep-nesting"}]]"#,
    ));
    p.write_fixture("parser/errors", "deep-nestng.spec.js", "Deep nestng");
    p.write_fixture("parser/errors", "shallow.spec.js", "Shallow");

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(some_line_has(
        &out,
        "RELOCATE:",
        "deep-nestng.spec.js -> "
    ));
    // The weaker candidate is left for the prune step.
    assert!(some_line_has(&out, "PRUNE:", "shallow.spec.js"));
    assert_eq!(p.list("parser/errors"), vec!["deep-nesting.spec.js"]);
}

#[test]
fn failed_relocation_releases_the_candidate() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Alpha deep", "segment": "primary/alpha"}],
            [{"label": "Alpha", "segment": "alpha"}]]"#,
    ));
    // A plain file where the first target's parent directory must go makes
    // that relocation fail.
    p.write_raw("parser/errors", "primary", "in the way\n");
    let body = format!("// survivor\n{}", fixture_content("Old"));
    p.write_raw("parser/errors", "primary-alpha.spec.js", &body);

    let assert = run(&p, "create", &manifest, &[]).code(1);
    let out = stdout_of(&assert);

    assert!(some_line_has(&out, "ERROR:", "primary-alpha.spec.js"));
    // The candidate the failed move could not consume still serves the next
    // missing path instead of being pruned.
    assert!(some_line_has(&out, "RELOCATE:", "primary-alpha.spec.js -> "));
    assert!(some_line_has(&out, "RELOCATE:", "alpha.spec.js"));
    assert!(out.contains("Relocated: 1"));
    assert!(out.contains("Pruned: 0"));
    assert!(p.exists("parser/errors", "alpha.spec.js"));
    assert!(p
        .read("parser/errors", "alpha.spec.js")
        .contains("// survivor"));
}

#[test]
fn retitles_in_place_when_only_the_title_drifted() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Fresh title", "segment": "alpha"}]]"#,
    ));
    let body = format!("// keep me\n{}", fixture_content("Stale title"));
    p.write_raw("parser/errors", "alpha.spec.js", &body);

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(some_line_has(&out, "RETITLE:", "alpha.spec.js"));
    assert!(out.contains("Retitled: 1"));
    let content = p.read("parser/errors", "alpha.spec.js");
    assert!(content.contains("// keep me"));
    assert!(content.contains("describe(\"Fresh title\""));
    assert!(!content.contains("Stale title"));
}

#[test]
fn prunes_everything_when_nothing_is_expected() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json("parser", "errors", "[]"));
    p.write_fixture("parser/errors", "a.spec.js", "A");
    p.write_fixture("parser/errors", "b.spec.js", "B");
    p.write_raw("parser/errors", "helper.js", "// not a fixture\n");

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(some_line_has(&out, "PRUNE:", "a.spec.js"));
    assert!(some_line_has(&out, "PRUNE:", "b.spec.js"));
    assert!(out.contains("Pruned: 2"));
    // Only fixture-suffixed files are in scope.
    assert_eq!(p.list("parser/errors"), vec!["helper.js"]);
}

#[test]
fn second_run_is_a_no_op() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Alpha", "segment": "alpha"}], [{"label": "Beta", "segment": "beta"}]]"#,
    ));
    p.write_fixture("parser/errors", "drifted.spec.js", "Alpha");

    run(&p, "create", &manifest, &[]).code(0);
    let first = p.read("parser/errors", "alpha.spec.js");

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(out.contains("Created: 0"));
    assert!(out.contains("Relocated: 0"));
    assert!(out.contains("Retitled: 0"));
    assert!(out.contains("Pruned: 0"));
    assert!(out.contains("Up-to-date: 2"));
    assert_eq!(p.read("parser/errors", "alpha.spec.js"), first);
}

#[test]
fn custom_template_placeholders_are_substituted() {
    let p = Project::new();
    let manifest = p.manifest(
        r#"{"suites": [{
            "domain": "parser",
            "kind": "errors",
            "scenarios": [[{"label": "Alpha", "segment": "alpha"}]],
            "template": "// {{title}}\nconst v = require(\"{{view}}\");\nconst c = require(\"{{context}}\");\ndescribe(\"{{title}}\", () => {});\n"
        }]}"#,
    );

    run(&p, "create", &manifest, &[]).code(0);

    let content = p.read("parser/errors", "alpha.spec.js");
    assert!(content.contains("// Alpha"));
    assert!(content.contains("describe(\"Alpha\""));
    assert!(content.contains("require(\"../../../../src/view.js\")"));
    assert!(content.contains("require(\"../../../../src/context.js\")"));
}

#[test]
fn matrix_paths_reverse_present_segments() {
    let p = Project::new();
    let manifest = p.manifest(
        r#"{"suites": [{
            "domain": "render",
            "kind": "widgets",
            "scenarios": [],
            "matrix": [
                [{"label": "Button", "segment": "button"}],
                [{"label": "hover", "segment": null}],
                [{"label": "disabled", "segment": "disabled"}]
            ]
        }]}"#,
    );

    run(&p, "create", &manifest, &[]).code(0);

    // Segment order inverts label order, and absent segments vanish.
    assert_eq!(p.list("render/widgets"), vec!["disabled.button.spec.js"]);
    let content = p.read("render/widgets", "disabled.button.spec.js");
    assert!(content.contains("describe(\"Button > hover > disabled\""));
}

#[test]
fn multiple_suites_converge_independently() {
    let p = Project::new();
    let manifest = p.manifest(
        r#"{"suites": [
            {"domain": "parser", "kind": "errors",
             "scenarios": [[{"label": "Alpha", "segment": "alpha"}]]},
            {"domain": "render", "kind": "widgets",
             "scenarios": [[{"label": "Button", "segment": "button"}]]}
        ]}"#,
    );
    p.write_fixture("render/widgets", "orphan.spec.js", "Orphan");

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert_eq!(p.list("parser/errors"), vec!["alpha.spec.js"]);
    assert_eq!(p.list("render/widgets"), vec!["button.spec.js"]);
    // The orphan lives in widgets; it must not be relocated across suites
    // into the parser directory.
    assert!(some_line_has(&out, "RELOCATE:", "orphan.spec.js -> "));
    assert!(some_line_has(&out, "RELOCATE:", "button.spec.js"));
    assert!(some_line_has(&out, "CREATE:", "alpha.spec.js"));
}

#[test]
fn file_without_declaration_survives_with_a_report() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json(
        "parser",
        "errors",
        r#"[[{"label": "Alpha", "segment": "alpha"}]]"#,
    ));
    p.write_raw("parser/errors", "alpha.spec.js", "module.exports = {};\n");

    let assert = run(&p, "create", &manifest, &[]).code(0);
    let out = stdout_of(&assert);

    assert!(some_line_has(&out, "NO-DECLARATION:", "alpha.spec.js"));
    assert!(out.contains("Missing declaration: 1"));
    // The file stays byte-identical; only its owner can add a declaration.
    assert_eq!(p.read("parser/errors", "alpha.spec.js"), "module.exports = {};\n");
}

#[test]
fn non_fixture_files_are_never_touched() {
    let p = Project::new();
    let manifest = p.manifest(&manifest_json("parser", "errors", "[]"));
    p.write_raw("parser/errors", "README.md", "# notes\n");
    p.write_raw("parser/errors", "data.json", "{}\n");

    let assert = run(&p, "create", &manifest, &[]).code(0);
    assert!(no_line_has(&stdout_of(&assert), "PRUNE:", ""));
    assert_eq!(p.list("parser/errors"), vec!["README.md", "data.json"]);
}
