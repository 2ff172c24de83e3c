//! Finding types shared by rules, the remediation engine and the CLI.

pub use finding::{Finding, Severity, UnitId};
pub use violation::{FixStrategy, Violation};

mod finding;
mod violation;
