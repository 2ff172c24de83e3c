use crate::Severity;

/// How a rule's fix is applied to one source unit.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, is_macro::Is)]
pub enum FixStrategy {
    /// The rule rebuilds the whole unit in one shot from its findings.
    Independent,
    /// Every finding's node is located and tagged first, then all tagged
    /// nodes are rewritten in one pass by a per-node replace function.
    BatchedTag,
}

/// A trait for violations that can be reported as findings.
pub trait Violation: std::fmt::Debug + Clone + Send + Sync {
    /// The id of the rule reporting this violation.
    const RULE_ID: &'static str;

    /// Returns the message describing the violation.
    fn message(&self) -> String;

    /// Severity the violation is reported with.
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Message arguments, in the order the message uses them.
    fn arguments(&self) -> Vec<String> {
        Vec::new()
    }
}
