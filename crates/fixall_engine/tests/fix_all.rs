//! End-to-end fix-all passes over parsed Java sources.

use std::sync::Arc;

use fixall_diagnostics::{Finding, Severity, UnitId};
use fixall_engine::{
    BatchedTagRemediator, CancellationToken, EngineOptions, FixAllEngine, FixAllRequest,
    FixAllStatus, FixError, IndependentRemediator, ProjectId, Scope, SourceUnit, Workspace,
};
use fixall_java_parser::JavaParser;
use fixall_syntax::{SyntaxNode, SyntaxToken};
use fixall_text_size::{TextRange, TextSize};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const RULE: &str = "UnnecessaryParentheses";

struct Fixture {
    workspace: Arc<Workspace>,
    projects: Vec<ProjectId>,
    units: Vec<UnitId>,
}

fn method(body: &str) -> String {
    format!("class A {{\n    int f(int foo) {{\n        {body}\n    }}\n}}\n")
}

/// One project per entry, one unit per source.
fn fixture(projects: Vec<Vec<String>>) -> Fixture {
    let mut parser = JavaParser::new();
    let mut builder = Workspace::builder();
    let mut project_ids = Vec::new();
    let mut units = Vec::new();
    for (p, sources) in projects.into_iter().enumerate() {
        let project = builder.add_project(format!("project{p}"));
        project_ids.push(project);
        for (u, source) in sources.into_iter().enumerate() {
            let root = parser.parse_syntax(&source).unwrap();
            units.push(builder.add_unit(project, format!("U{p}_{u}.java"), root));
        }
    }
    Fixture {
        workspace: builder.build(),
        projects: project_ids,
        units,
    }
}

fn finding(unit: &SourceUnit, offset: usize) -> Finding {
    let start = TextSize::new(u32::try_from(offset).unwrap());
    Finding {
        rule_id: RULE.to_string(),
        unit_id: unit.id(),
        range: TextRange::at(start, TextSize::new(1)),
        severity: Severity::Warning,
        message: "Unnecessary parentheses.".to_string(),
        arguments: vec![],
    }
}

/// A finding on each parenthesis of every `return(...);`.
fn paren_findings(workspace: &Workspace) -> Vec<Finding> {
    let mut findings = Vec::new();
    for unit in workspace.units() {
        let text = unit.text();
        for (at, _) in text.match_indices("return(") {
            let open = at + "return".len();
            let close = open + text[open..].find(");").unwrap();
            findings.push(finding(unit, open));
            findings.push(finding(unit, close));
        }
    }
    findings
}

fn unwrap_parens(node: &SyntaxNode) -> Result<SyntaxNode, FixError> {
    if node.kind() != "parenthesized_expression" {
        return Err(FixError::message(format!("not parenthesized: {}", node.kind())));
    }
    let inner = node.child_nodes().next().ok_or_else(|| FixError::UnexpectedNode {
        kind: node.kind(),
        reason: "empty parentheses".to_string(),
    })?;
    if node.has_leading_trivia() {
        Ok(inner.with_leading_trivia(node.leading_trivia().cloned()))
    } else {
        Ok(inner.with_leading_trivia([SyntaxToken::whitespace(" ")]))
    }
}

fn request(scope: Scope, origin: UnitId, findings: Vec<Finding>) -> FixAllRequest {
    FixAllRequest {
        scope,
        origin,
        rule_id: RULE.to_string(),
        findings,
    }
}

fn texts(workspace: &Workspace) -> Vec<String> {
    workspace.units().map(|unit| unit.text().to_string()).collect()
}

#[test]
fn test_adjacent_findings_do_not_drift() {
    let f = fixture(vec![vec![method("return(foo);")]]);
    let findings = paren_findings(&f.workspace);
    assert_eq!(findings.len(), 2);

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::SingleUnit, f.units[0], findings),
        &BatchedTagRemediator::new(unwrap_parens),
        &CancellationToken::new(),
    );

    assert_eq!(outcome.status, FixAllStatus::Applied { changed_units: 1 });
    assert_eq!(texts(&outcome.workspace), vec![method("return foo;")]);
}

#[test]
fn test_nested_parentheses_fix_in_one_pass() {
    let f = fixture(vec![vec![method("return((foo));")]]);
    let unit = f.workspace.unit(f.units[0]).unwrap();
    let open = unit.text().find("((").unwrap();
    let findings = vec![finding(unit, open), finding(unit, open + 1)];

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::SingleUnit, f.units[0], findings),
        &BatchedTagRemediator::new(unwrap_parens),
        &CancellationToken::new(),
    );

    assert_eq!(texts(&outcome.workspace), vec![method("return foo;")]);
}

#[test]
fn test_failing_unit_is_isolated() {
    let f = fixture(vec![vec![
        method("return(foo);"),
        method("return(foo + 1);"),
        method("return(foo * 2);"),
    ]]);
    let remediator = BatchedTagRemediator::new(|node: &SyntaxNode| {
        if node.text().contains('+') {
            Err(FixError::message("refusing to unwrap a sum"))
        } else {
            unwrap_parens(node)
        }
    });

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
        &remediator,
        &CancellationToken::new(),
    );

    assert_eq!(outcome.status, FixAllStatus::Applied { changed_units: 2 });
    assert_eq!(
        texts(&outcome.workspace),
        vec![
            method("return foo;"),
            method("return(foo + 1);"),
            method("return foo * 2;"),
        ]
    );
    let failed = outcome.unit(f.units[1]).unwrap();
    assert!(failed.failure.is_some());
    assert!(Arc::ptr_eq(
        outcome.workspace.unit(f.units[1]).unwrap(),
        f.workspace.unit(f.units[1]).unwrap()
    ));
}

#[test]
fn test_project_scope_stays_in_project() {
    let source = method("return(foo);");
    let f = fixture(vec![vec![source.clone(), source.clone()], vec![source.clone()]]);

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::Project, f.units[1], paren_findings(&f.workspace)),
        &BatchedTagRemediator::new(unwrap_parens),
        &CancellationToken::new(),
    );

    assert_eq!(outcome.status, FixAllStatus::Applied { changed_units: 2 });
    assert_eq!(
        texts(&outcome.workspace),
        vec![method("return foo;"), method("return foo;"), source.clone()]
    );
    assert!(Arc::ptr_eq(
        outcome.workspace.project(f.projects[1]).unwrap(),
        f.workspace.project(f.projects[1]).unwrap()
    ));
    assert_eq!(outcome.workspace.id(), f.workspace.id());
    assert_ne!(outcome.workspace.snapshot(), f.workspace.snapshot());
}

#[test]
fn test_single_unit_scope_ignores_other_units() {
    let source = method("return(foo);");
    let f = fixture(vec![vec![source.clone(), source.clone()]]);

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::SingleUnit, f.units[1], paren_findings(&f.workspace)),
        &BatchedTagRemediator::new(unwrap_parens),
        &CancellationToken::new(),
    );

    assert_eq!(texts(&outcome.workspace), vec![source.clone(), method("return foo;")]);
    assert_eq!(outcome.reports.len(), 1);
}

#[test]
fn test_no_surviving_findings_returns_same_snapshot() {
    let f = fixture(vec![vec![method("return(foo);")]]);
    let unit = f.workspace.unit(f.units[0]).unwrap();
    let mut other_rule = finding(unit, 0);
    other_rule.rule_id = "UpperEll".to_string();
    let out_of_range = finding(unit, unit.text().len() + 10);

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::Workspace, f.units[0], vec![other_rule, out_of_range]),
        &BatchedTagRemediator::new(|_: &SyntaxNode| -> Result<SyntaxNode, FixError> {
            panic!("no node should be replaced")
        }),
        &CancellationToken::new(),
    );

    assert_eq!(outcome.status, FixAllStatus::NoChange);
    assert!(Arc::ptr_eq(&outcome.workspace, &f.workspace));
    let report = outcome.unit(f.units[0]).unwrap();
    assert_eq!(report.dropped, 1);
    assert!(report.failure.is_none());
}

#[test]
fn test_custom_scope_is_unsupported_no_op() {
    let f = fixture(vec![vec![method("return(foo);")]]);
    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::Custom, f.units[0], paren_findings(&f.workspace)),
        &BatchedTagRemediator::new(unwrap_parens),
        &CancellationToken::new(),
    );
    assert_eq!(outcome.status, FixAllStatus::Unsupported);
    assert!(Arc::ptr_eq(&outcome.workspace, &f.workspace));
}

#[test]
fn test_cancelled_before_start() {
    let f = fixture(vec![vec![method("return(foo);")]]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
        &BatchedTagRemediator::new(unwrap_parens),
        &cancel,
    );
    assert_eq!(outcome.status, FixAllStatus::Cancelled);
    assert!(Arc::ptr_eq(&outcome.workspace, &f.workspace));
}

#[test]
fn test_cancelled_mid_pass_discards_completed_units() {
    let source = method("return(foo);");
    let f = fixture(vec![vec![source.clone(), source.clone(), source.clone()]]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let remediator = IndependentRemediator::new(move |unit: &SourceUnit, _: &[Finding]| {
        trigger.cancel();
        Ok(SyntaxNode::leaf("program", format!("// fixed {}", unit.id())))
    });

    let engine = FixAllEngine::new(EngineOptions { parallel: false });
    let outcome = engine.fix_all(
        &f.workspace,
        &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
        &remediator,
        &cancel,
    );

    assert_eq!(outcome.status, FixAllStatus::Cancelled);
    assert!(Arc::ptr_eq(&outcome.workspace, &f.workspace));
    assert!(outcome.reports.is_empty());
}

#[test]
fn test_cancelled_while_last_unit_is_fixed() {
    let f = fixture(vec![vec![method("return(foo);")]]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let remediator = IndependentRemediator::new(move |_: &SourceUnit, _: &[Finding]| {
        trigger.cancel();
        Ok(SyntaxNode::leaf("program", "XYZ"))
    });

    let outcome = FixAllEngine::default().fix_all(
        &f.workspace,
        &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
        &remediator,
        &cancel,
    );

    assert_eq!(outcome.status, FixAllStatus::Cancelled);
    assert!(Arc::ptr_eq(&outcome.workspace, &f.workspace));
    assert_eq!(texts(&outcome.workspace), vec![method("return(foo);")]);
}

#[test]
fn test_fix_unit_cancelled_while_fixing() {
    let f = fixture(vec![vec![method("return(foo);")]]);
    let unit = f.workspace.unit(f.units[0]).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let remediator = IndependentRemediator::new(move |_: &SourceUnit, _: &[Finding]| {
        trigger.cancel();
        Ok(SyntaxNode::leaf("program", "XYZ"))
    });

    let result = FixAllEngine::default().fix_unit(
        unit,
        &paren_findings(&f.workspace),
        &remediator,
        &cancel,
    );
    assert!(result.is_err());
}

#[test]
fn test_panicking_unit_is_isolated() {
    let f = fixture(vec![vec![method("return(foo);"), method("return(foo + 1);")]]);
    let remediator = BatchedTagRemediator::new(|node: &SyntaxNode| {
        assert!(!node.text().contains('+'), "sums are not supported");
        unwrap_parens(node)
    });

    for parallel in [true, false] {
        let outcome = FixAllEngine::new(EngineOptions { parallel }).fix_all(
            &f.workspace,
            &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
            &remediator,
            &CancellationToken::new(),
        );

        assert_eq!(outcome.status, FixAllStatus::Applied { changed_units: 1 });
        assert_eq!(
            texts(&outcome.workspace),
            vec![method("return foo;"), method("return(foo + 1);")]
        );
        let failure = outcome.unit(f.units[1]).unwrap().failure.clone().unwrap();
        assert!(failure.to_string().contains("sums are not supported"));
    }
}

#[test]
fn test_second_pass_finds_nothing() {
    let f = fixture(vec![vec![method("return(foo);"), method("return(foo + 1);")]]);
    let engine = FixAllEngine::default();
    let remediator = BatchedTagRemediator::new(unwrap_parens);

    let first = engine.fix_all(
        &f.workspace,
        &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
        &remediator,
        &CancellationToken::new(),
    );
    let findings = paren_findings(&first.workspace);
    assert!(findings.is_empty());

    let second = engine.fix_all(
        &first.workspace,
        &request(Scope::Workspace, f.units[0], findings),
        &remediator,
        &CancellationToken::new(),
    );
    assert_eq!(second.status, FixAllStatus::NoChange);
    assert!(Arc::ptr_eq(&second.workspace, &first.workspace));
}

#[test]
fn test_parallel_and_sequential_agree() {
    let f = fixture(vec![
        vec![method("return(foo);"), method("return(foo - 1);")],
        vec![method("return foo;"), method("return(foo);")],
    ]);
    let run = |parallel| {
        FixAllEngine::new(EngineOptions { parallel })
            .fix_all(
                &f.workspace,
                &request(Scope::Workspace, f.units[0], paren_findings(&f.workspace)),
                &BatchedTagRemediator::new(unwrap_parens),
                &CancellationToken::new(),
            )
            .workspace
    };
    assert_eq!(texts(&run(true)), texts(&run(false)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn finding_order_does_not_matter(
        order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let f = fixture(vec![
            vec![method("return(foo);"), method("return((foo));")],
            vec![method("return(foo + 1);"), method("return(foo);")],
        ]);
        let findings = paren_findings(&f.workspace);
        prop_assert_eq!(findings.len(), 8);
        let shuffled: Vec<Finding> = order.iter().map(|i| findings[*i].clone()).collect();

        let engine = FixAllEngine::default();
        let remediator = BatchedTagRemediator::new(unwrap_parens);
        let expected = engine.fix_all(
            &f.workspace,
            &request(Scope::Workspace, f.units[0], findings),
            &remediator,
            &CancellationToken::new(),
        );
        let actual = engine.fix_all(
            &f.workspace,
            &request(Scope::Workspace, f.units[0], shuffled),
            &remediator,
            &CancellationToken::new(),
        );
        for (a, b) in expected.workspace.units().zip(actual.workspace.units()) {
            prop_assert!(a.root().structurally_eq(b.root()));
        }
        prop_assert_eq!(texts(&expected.workspace), texts(&actual.workspace));
    }
}
