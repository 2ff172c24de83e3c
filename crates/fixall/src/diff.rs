//! Line-based unified diff for `fix --diff`.

use std::path::Path;

use colored::Colorize;

const CONTEXT: usize = 3;

struct Hunk {
    original_start: usize,
    fixed_start: usize,
    original_len: usize,
    fixed_len: usize,
    lines: Vec<String>,
    trailing_context: usize,
}

impl Hunk {
    /// A hunk for a change at `original[i]` / `fixed[j]`, with up to
    /// [`CONTEXT`] preceding lines that were not printed yet.
    fn open(original: &[&str], i: usize, j: usize, printed: usize) -> Self {
        let context_start = i.saturating_sub(CONTEXT).max(printed);
        let lines: Vec<String> = original[context_start..i]
            .iter()
            .map(|line| format!(" {line}"))
            .collect();
        Self {
            original_start: context_start + 1,
            fixed_start: j + context_start - i + 1,
            original_len: lines.len(),
            fixed_len: lines.len(),
            lines,
            trailing_context: 0,
        }
    }

    fn render(&self, out: &mut String) {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            self.original_start, self.original_len, self.fixed_start, self.fixed_len
        ));
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// Render the changes from `original` to `fixed` as an uncoloured unified
/// diff. Lines are compared position by position, which is exact for fixes
/// that never add or remove lines.
pub(crate) fn render_diff(path: &Path, original: &str, fixed: &str) -> String {
    let before: Vec<&str> = original.lines().collect();
    let after: Vec<&str> = fixed.lines().collect();

    let mut out = format!("--- a/{0}\n+++ b/{0}\n", path.display());
    let mut hunk: Option<Hunk> = None;
    let mut printed = 0;
    let (mut i, mut j) = (0, 0);

    while i < before.len() || j < after.len() {
        match (before.get(i), after.get(j)) {
            (Some(a), Some(b)) if a == b => {
                i += 1;
                j += 1;
                if let Some(open) = hunk.as_mut() {
                    open.lines.push(format!(" {a}"));
                    open.original_len += 1;
                    open.fixed_len += 1;
                    open.trailing_context += 1;
                    if open.trailing_context >= CONTEXT {
                        open.render(&mut out);
                        hunk = None;
                        printed = i;
                    }
                }
            }
            (a, b) => {
                let open = hunk.get_or_insert_with(|| Hunk::open(&before, i, j, printed));
                open.trailing_context = 0;
                if let Some(a) = a {
                    open.lines.push(format!("-{a}"));
                    open.original_len += 1;
                    i += 1;
                }
                if let Some(b) = b {
                    open.lines.push(format!("+{b}"));
                    open.fixed_len += 1;
                    j += 1;
                }
            }
        }
    }
    if let Some(open) = hunk {
        open.render(&mut out);
    }
    out
}

/// Print a coloured unified diff between original and fixed source.
pub(crate) fn print_diff(path: &Path, original: &str, fixed: &str) {
    for line in render_diff(path, original, fixed).lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
}
