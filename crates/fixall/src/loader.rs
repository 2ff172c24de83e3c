//! Building the first workspace snapshot from paths on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use fixall_engine::Workspace;
use fixall_java_parser::JavaParser;
use fixall_syntax::SyntaxNode;
use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

/// Parse every Java file under `paths` into one workspace, one project per
/// path. Files that fail to parse cleanly are reported and left out.
pub(crate) fn load_workspace(paths: &[PathBuf]) -> Result<Arc<Workspace>> {
    let mut builder = Workspace::builder();
    for path in paths {
        let files = collect_java_files(path);
        let parsed: Vec<(PathBuf, Option<SyntaxNode>)> = files
            .into_par_iter()
            .map_init(JavaParser::new, |parser, file| {
                let root = parse_file(parser, &file)?;
                Ok((file, root))
            })
            .collect::<Result<_>>()?;

        let project = builder.add_project(path.display().to_string());
        let mut units = 0;
        for (file, root) in parsed {
            if let Some(root) = root {
                builder.add_unit(project, file, root);
                units += 1;
            }
        }
        debug!(project = %path.display(), units, "loaded project");
    }
    Ok(builder.build())
}

fn parse_file(parser: &mut JavaParser, path: &Path) -> Result<Option<SyntaxNode>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let result = match parser.parse(&source) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{}: Failed to parse: {err}", path.display());
            return Ok(None);
        }
    };
    if result.has_errors() {
        eprintln!(
            "{}: {}",
            path.display(),
            "contains syntax errors, skipping".yellow()
        );
        return Ok(None);
    }
    Ok(Some(result.syntax()))
}

fn collect_java_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return if path.extension().is_some_and(|e| e == "java") {
            vec![path.to_path_buf()]
        } else {
            vec![]
        };
    }
    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "java"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}
