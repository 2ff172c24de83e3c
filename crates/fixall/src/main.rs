//! fixall - fix every finding of a Java lint rule across files, projects or
//! a whole workspace in one pass.

mod diff;
mod loader;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use fixall_config::{FixScope, FixallConfig};
use fixall_diagnostics::{Finding, UnitId};
use fixall_engine::{
    CancellationToken, EngineOptions, FixAllEngine, FixAllRequest, FixAllStatus, Scope, SourceUnit,
    Workspace,
};
use fixall_linter::{Linter, Properties, Rule, RuleRegistry, remediator_for};
use fixall_source_file::{LineIndex, SourceCode};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fixall")]
#[command(about = "Fix every finding of a Java lint rule across files, projects or a workspace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    File,
    Project,
    Workspace,
}

impl From<ScopeArg> for FixScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::File => FixScope::File,
            ScopeArg::Project => FixScope::Project,
            ScopeArg::Workspace => FixScope::Workspace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check files for violations
    Check {
        /// Directories or files to check; each path is one project
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to fixall.toml config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Fix violations in files
    Fix {
        /// Directories or files to fix; each path is one project
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to fixall.toml config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only fix this rule (repeatable)
        #[arg(short, long = "rule")]
        rules: Vec<String>,

        /// How far each fix-all pass reaches (overrides the config)
        #[arg(short, long, value_enum)]
        scope: Option<ScopeArg>,

        /// Show diff without applying fixes
        #[arg(long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { paths, config } => {
            let config = load_config(config.as_deref())?;
            if run_check(&paths, &config)? > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Fix {
            paths,
            config,
            rules,
            scope,
            diff,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(scope) = scope {
                config.fix.scope = scope.into();
            }
            run_fix(&paths, &config, &rules, diff).map(|_| ())
        }
    }
}

/// Run the check command. Returns the number of violations found.
fn run_check(paths: &[PathBuf], config: &FixallConfig) -> Result<usize> {
    let linter = Linter::new(load_rules(config));
    if linter.rules().is_empty() {
        eprintln!("{}", "Warning: No rules configured".yellow());
        return Ok(0);
    }
    let rule_names: Vec<_> = linter.rules().iter().map(|r| r.name()).collect();
    eprintln!(
        "Checking with {} rule(s): {}",
        rule_names.len(),
        rule_names.join(", ")
    );

    let workspace = loader::load_workspace(paths)?;
    let findings = linter.findings(&workspace);
    print_findings(&workspace, &findings);

    let fixable = findings
        .iter()
        .filter(|finding| {
            config.should_fix(&finding.rule_id)
                && linter
                    .rule(&finding.rule_id)
                    .is_some_and(|rule| rule.fix_strategy().is_some())
        })
        .count();

    if findings.is_empty() {
        println!("{}", "No violations found".green());
    } else {
        println!(
            "\nFound {} violations ({} fixable)",
            findings.len().to_string().red(),
            fixable.to_string().yellow()
        );
    }
    Ok(findings.len())
}

fn print_findings(workspace: &Workspace, findings: &[Finding]) {
    let mut by_unit: HashMap<UnitId, Vec<&Finding>> = HashMap::new();
    for finding in findings {
        by_unit.entry(finding.unit_id).or_default().push(finding);
    }

    for unit in workspace.units() {
        let Some(unit_findings) = by_unit.get(&unit.id()) else {
            continue;
        };
        let line_index = LineIndex::from_source_text(unit.text());
        let source_code = SourceCode::new(unit.text(), &line_index);
        for finding in unit_findings {
            let loc = source_code.line_column(finding.range.start());
            println!(
                "{}:{}:{}: {} {}",
                unit.path().display(),
                loc.line.get(),
                loc.column.get(),
                format!("[{}]", finding.rule_id).blue(),
                finding.message
            );
        }
    }
}

/// Totals of one `fix` invocation.
#[derive(Debug, Default, PartialEq, Eq)]
struct FixSummary {
    /// Unit substitutions across all rules; a file fixed by two rules counts twice.
    fixes: usize,
    /// Units a rule's fix failed on.
    failures: usize,
    files_changed: usize,
}

/// Run the fix command.
fn run_fix(
    paths: &[PathBuf],
    config: &FixallConfig,
    only: &[String],
    diff_only: bool,
) -> Result<FixSummary> {
    let linter = Linter::new(load_rules(config));
    for name in only {
        if linter.rule(name).is_none() {
            eprintln!(
                "{}: Rule '{}' is unknown or disabled, skipping",
                "Warning".yellow(),
                name
            );
        }
    }

    let rule_names: Vec<&'static str> = linter
        .rules()
        .iter()
        .map(|rule| rule.name())
        .filter(|name| only.is_empty() || only.iter().any(|o| o == name))
        .filter(|name| config.should_fix(name))
        .collect();
    if rule_names.is_empty() {
        eprintln!("{}", "Warning: No fixable rules selected".yellow());
        return Ok(FixSummary::default());
    }
    eprintln!(
        "Fixing with {} rule(s): {} ({:?} scope)",
        rule_names.len(),
        rule_names.join(", "),
        config.fix.scope
    );

    let original = loader::load_workspace(paths)?;
    let engine = FixAllEngine::new(EngineOptions {
        parallel: config.fix.parallel,
    });
    let cancel = CancellationToken::new();

    let mut summary = FixSummary::default();
    let mut workspace = Arc::clone(&original);
    for name in rule_names {
        let pass = fix_rule(&linter, &engine, &workspace, name, config.fix.scope, &cancel);
        summary.fixes += pass.changed;
        summary.failures += pass.failed;
        workspace = pass.workspace;
    }

    for (before, after) in changed_units(&original, &workspace) {
        summary.files_changed += 1;
        if diff_only {
            diff::print_diff(after.path(), before.text(), after.text());
        } else {
            std::fs::write(after.path(), after.text())
                .with_context(|| format!("Failed to write {}", after.path().display()))?;
            eprintln!("{}: fixed", after.path().display());
        }
    }

    if diff_only {
        println!(
            "\n{} file(s) would change",
            summary.files_changed.to_string().green()
        );
    } else if summary.files_changed > 0 {
        println!(
            "\n{} file(s) fixed",
            summary.files_changed.to_string().green()
        );
    } else {
        println!("{}", "No fixes to apply".green());
    }
    if summary.failures > 0 {
        eprintln!(
            "{} file(s) could not be fixed automatically",
            summary.failures.to_string().yellow()
        );
    }

    Ok(summary)
}

struct RulePass {
    workspace: Arc<Workspace>,
    changed: usize,
    failed: usize,
}

/// Fix every finding of one rule, one fix-all invocation per scope batch.
///
/// Findings are computed once on the incoming snapshot. Batches never share
/// units, so each batch's findings still describe its units exactly when
/// earlier batches have already been substituted.
fn fix_rule(
    linter: &Linter,
    engine: &FixAllEngine,
    workspace: &Arc<Workspace>,
    name: &str,
    scope: FixScope,
    cancel: &CancellationToken,
) -> RulePass {
    let mut pass = RulePass {
        workspace: Arc::clone(workspace),
        changed: 0,
        failed: 0,
    };
    let Some(remediator) = linter.rule(name).and_then(remediator_for) else {
        return pass;
    };

    let mut by_unit: HashMap<UnitId, Vec<Finding>> = HashMap::new();
    for finding in linter.findings(workspace).iter().filter(|f| f.rule_id == name) {
        by_unit
            .entry(finding.unit_id)
            .or_default()
            .push(finding.clone());
    }

    for (engine_scope, origin, units) in scope_batches(workspace, scope) {
        let findings: Vec<Finding> = units
            .iter()
            .filter_map(|unit| by_unit.remove(unit))
            .flatten()
            .collect();
        if findings.is_empty() {
            continue;
        }

        let request = FixAllRequest {
            scope: engine_scope,
            origin,
            rule_id: name.to_string(),
            findings,
        };
        let outcome = engine.fix_all(&pass.workspace, &request, remediator.as_ref(), cancel);
        for report in &outcome.reports {
            if let (Some(err), Some(unit)) = (&report.failure, outcome.workspace.unit(report.unit_id)) {
                eprintln!(
                    "{}: {} fix failed: {}",
                    unit.path().display(),
                    name,
                    err.to_string().yellow()
                );
                pass.failed += 1;
            }
        }
        if let FixAllStatus::Applied { changed_units } = outcome.status {
            pass.changed += changed_units;
        }
        pass.workspace = outcome.workspace;
    }

    info!(rule = name, changed = pass.changed, failed = pass.failed, "rule fixed");
    pass
}

/// Split the workspace into fix-all invocations for `scope`: the engine
/// scope, the origin unit and the units the invocation covers.
fn scope_batches(workspace: &Workspace, scope: FixScope) -> Vec<(Scope, UnitId, Vec<UnitId>)> {
    match scope {
        FixScope::File => workspace
            .units()
            .map(|unit| (Scope::SingleUnit, unit.id(), vec![unit.id()]))
            .collect(),
        FixScope::Project => workspace
            .projects()
            .iter()
            .filter_map(|project| {
                let origin = project.units().first()?.id();
                let units = project.units().iter().map(|unit| unit.id()).collect();
                Some((Scope::Project, origin, units))
            })
            .collect(),
        FixScope::Workspace => workspace
            .units()
            .next()
            .map(|origin| {
                let units = workspace.units().map(|unit| unit.id()).collect();
                (Scope::Workspace, origin.id(), units)
            })
            .into_iter()
            .collect(),
    }
}

/// Units whose text differs between two snapshots of the same workspace.
fn changed_units(
    original: &Workspace,
    fixed: &Workspace,
) -> Vec<(Arc<SourceUnit>, Arc<SourceUnit>)> {
    original
        .units()
        .zip(fixed.units())
        .filter(|(before, after)| !Arc::ptr_eq(before, after) && before.text() != after.text())
        .map(|(before, after)| (Arc::clone(before), Arc::clone(after)))
        .collect()
}

/// Build the enabled rules with their configured properties.
fn load_rules(config: &FixallConfig) -> Vec<Box<dyn Rule>> {
    let registry = RuleRegistry::builtin();
    let names = registry.rule_names();
    for unknown in config.unknown_rules(&names) {
        eprintln!(
            "{}: Unknown rule '{}', skipping",
            "Warning".yellow(),
            unknown
        );
    }

    names
        .into_iter()
        .filter(|name| config.is_rule_enabled(name))
        .filter_map(|name| {
            let owned = config.rule_properties(name);
            let props: Properties = owned
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            debug!(rule = name, properties = ?props, "creating rule");
            registry.create_rule(name, &props)
        })
        .collect()
}

/// Load fixall.toml from `path`, or from the first common location that has
/// one. Without a config file every builtin rule runs in fix mode.
fn load_config(path: Option<&Path>) -> Result<FixallConfig> {
    if let Some(path) = path {
        let config = FixallConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        eprintln!("Loaded config from: {}", path.display());
        return Ok(config);
    }

    let candidates = ["fixall.toml", ".fixall.toml", "config/fixall.toml"];
    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            let config = FixallConfig::from_file(path)
                .with_context(|| format!("Failed to load {candidate}"))?;
            eprintln!("Loaded config from: {candidate}");
            return Ok(config);
        }
    }
    Ok(FixallConfig::default())
}
