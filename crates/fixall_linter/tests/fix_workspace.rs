//! Linting and fixing a multi-project workspace with every builtin rule.

use std::sync::Arc;

use fixall_engine::{CancellationToken, FixAllEngine, FixAllStatus, Scope, Workspace};
use fixall_java_parser::JavaParser;
use fixall_linter::{Linter, Properties, RuleRegistry, lint_workspace};
use pretty_assertions::assert_eq;

const ORDERS: &str = "class Orders {\n\tlong total(long a) {  \n\t\treturn(a + 1l);\n\t}\n}\n";
const ITEMS: &str = "class Items {\n    long count = (10l);\n}\n";
const CLEAN: &str = "class Clean {\n    int size() {\n        return 0;\n    }\n}\n";

fn workspace() -> Arc<Workspace> {
    let mut parser = JavaParser::new();
    let mut builder = Workspace::builder();
    let app = builder.add_project("app");
    builder.add_unit(app, "Orders.java", parser.parse_syntax(ORDERS).unwrap());
    builder.add_unit(app, "Items.java", parser.parse_syntax(ITEMS).unwrap());
    let lib = builder.add_project("lib");
    builder.add_unit(lib, "Clean.java", parser.parse_syntax(CLEAN).unwrap());
    builder.build()
}

fn linter() -> Linter {
    let registry = RuleRegistry::builtin();
    let props = Properties::new();
    let rules = registry
        .rule_names()
        .into_iter()
        .filter_map(|name| registry.create_rule(name, &props))
        .collect();
    Linter::new(rules)
}

fn texts(workspace: &Workspace) -> Vec<String> {
    workspace.units().map(|unit| unit.text().to_string()).collect()
}

#[test]
fn test_findings_per_rule() {
    let findings = lint_workspace(&workspace(), linter().rules());
    let count = |rule: &str| findings.iter().filter(|f| f.rule_id == rule).count();

    assert_eq!(count("UnnecessaryParentheses"), 4);
    assert_eq!(count("UpperEll"), 2);
    assert_eq!(count("FileTabCharacter"), 1);
    assert_eq!(count("TrailingWhitespace"), 1);
}

#[test]
fn test_fix_every_rule_then_nothing_left() {
    let linter = linter();
    let engine = FixAllEngine::default();
    let cancel = CancellationToken::new();
    let mut workspace = workspace();
    let origin = workspace.units().next().unwrap().id();

    for name in [
        "UnnecessaryParentheses",
        "UpperEll",
        "FileTabCharacter",
        "TrailingWhitespace",
    ] {
        let outcome = linter
            .fix_rule(&engine, &workspace, name, Scope::Workspace, origin, &cancel)
            .unwrap();
        assert!(outcome.status.is_applied(), "{name} changed nothing");
        workspace = outcome.workspace;
    }

    assert_eq!(
        texts(&workspace),
        vec![
            "class Orders {\n    long total(long a) {\n        return a + 1L;\n    }\n}\n".to_string(),
            "class Items {\n    long count = 10L;\n}\n".to_string(),
            CLEAN.to_string(),
        ]
    );
    assert!(linter.findings(&workspace).is_empty());
}

#[test]
fn test_project_scope_leaves_other_projects() {
    let linter = linter();
    let workspace = workspace();
    let clean = workspace.units().nth(2).unwrap().id();

    let outcome = linter
        .fix_rule(
            &FixAllEngine::default(),
            &workspace,
            "UpperEll",
            Scope::Project,
            clean,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.status, FixAllStatus::NoChange);
    assert!(Arc::ptr_eq(&outcome.workspace, &workspace));
}

#[test]
fn test_single_unit_scope() {
    let linter = linter();
    let workspace = workspace();
    let items = workspace.units().nth(1).unwrap().id();

    let outcome = linter
        .fix_rule(
            &FixAllEngine::default(),
            &workspace,
            "UpperEll",
            Scope::SingleUnit,
            items,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.status, FixAllStatus::Applied { changed_units: 1 });
    let after = texts(&outcome.workspace);
    assert_eq!(after[0], ORDERS);
    assert_eq!(after[1], "class Items {\n    long count = (10L);\n}\n");
}

#[test]
fn test_findings_are_cached_per_snapshot() {
    let linter = linter();
    let workspace = workspace();

    let first = linter.findings(&workspace);
    let second = linter.findings(&workspace);
    assert!(Arc::ptr_eq(&first, &second));

    linter.invalidate(workspace.id());
    let third = linter.findings(&workspace);
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first, third);
}

#[test]
fn test_unknown_rule() {
    let linter = linter();
    let workspace = workspace();
    let origin = workspace.units().next().unwrap().id();
    assert!(
        linter
            .fix_rule(
                &FixAllEngine::default(),
                &workspace,
                "NoSuchRule",
                Scope::Workspace,
                origin,
                &CancellationToken::new(),
            )
            .is_none()
    );
}
