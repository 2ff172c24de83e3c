//! Finding types for reporting violations.

use std::fmt;

use fixall_text_size::{Ranged, TextRange};
use get_size2::GetSize;

use crate::Violation;

/// Stable identifier of one source unit within a workspace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, GetSize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(u32);

impl UnitId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, GetSize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Hidden,
    Info,
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One located rule violation inside one source unit.
///
/// The range always refers to the unit's tree as it was when the finding
/// was produced.
#[derive(Debug, Clone, PartialEq, Eq, GetSize)]
pub struct Finding {
    /// The rule that reported this finding (e.g. "UpperEll").
    pub rule_id: String,
    /// The unit the range points into.
    pub unit_id: UnitId,
    /// The range in the source where the violation occurs.
    pub range: TextRange,
    pub severity: Severity,
    /// The message body.
    pub message: String,
    pub arguments: Vec<String>,
}

impl Finding {
    /// Create a new finding from a violation.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new<V: Violation>(violation: V, unit_id: UnitId, range: TextRange) -> Self {
        Self {
            rule_id: V::RULE_ID.to_string(),
            unit_id,
            range,
            severity: violation.severity(),
            message: violation.message(),
            arguments: violation.arguments(),
        }
    }

    pub fn sort_key(&self) -> (UnitId, fixall_text_size::TextSize, &str) {
        (self.unit_id, self.range.start(), &self.rule_id)
    }
}

impl Ranged for Finding {
    fn range(&self) -> TextRange {
        self.range
    }
}
