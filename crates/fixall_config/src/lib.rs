//! Parser for fixall.toml configuration files.
//!
//! fixall.toml selects the rules to run, how each one treats its findings,
//! and how wide a fix-all pass reaches. Example:
//!
//! ```toml
//! [fix]
//! scope = "workspace"
//! parallel = true
//!
//! [fix.rules]
//! UnnecessaryParentheses = "fix"
//! FileTabCharacter = "check"
//! TrailingWhitespace = "disabled"
//!
//! [rules.FileTabCharacter]
//! tabWidth = 4
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// How a rule should handle violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleMode {
    /// Report and auto-fix findings.
    #[default]
    Fix,
    /// Only report findings.
    Check,
    /// Skip the rule entirely.
    Disabled,
}

impl<'de> Deserialize<'de> for RuleMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "fix" => Ok(RuleMode::Fix),
            "check" => Ok(RuleMode::Check),
            "disabled" | "disable" | "off" => Ok(RuleMode::Disabled),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid rule mode: {s}. Expected fix, check, or disabled"
            ))),
        }
    }
}

/// How far one fix-all pass reaches from the file it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixScope {
    File,
    Project,
    #[default]
    Workspace,
}

impl<'de> Deserialize<'de> for FixScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "file" | "document" => Ok(FixScope::File),
            "project" => Ok(FixScope::Project),
            "workspace" | "solution" => Ok(FixScope::Workspace),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid fix scope: {s}. Expected file, project, or workspace"
            ))),
        }
    }
}

/// A rule property value. Numbers and booleans are kept in their TOML
/// spelling so rules parse every property from a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(value) => f.write_str(value),
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Float(value) => write!(f, "{value}"),
            PropertyValue::Boolean(value) => write!(f, "{value}"),
        }
    }
}

fn default_parallel() -> bool {
    true
}

/// Fix-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FixConfig {
    #[serde(default)]
    pub scope: FixScope,

    /// Fix units in parallel.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Per-rule mode overrides.
    #[serde(default)]
    pub rules: HashMap<String, RuleMode>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            scope: FixScope::default(),
            parallel: true,
            rules: HashMap::new(),
        }
    }
}

/// Root fixall.toml configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FixallConfig {
    #[serde(default)]
    pub fix: FixConfig,

    /// Per-rule properties, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, HashMap<String, PropertyValue>>,
}

impl FixallConfig {
    /// Parse a fixall.toml file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse fixall.toml content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get the mode for a specific rule.
    /// Returns the configured mode or the default (Fix).
    pub fn rule_mode(&self, rule_name: &str) -> RuleMode {
        self.fix
            .rules
            .get(rule_name)
            .copied()
            .unwrap_or(RuleMode::Fix)
    }

    /// Check if a rule is enabled.
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rule_mode(rule_name) != RuleMode::Disabled
    }

    /// Check if a rule should be auto-fixed.
    pub fn should_fix(&self, rule_name: &str) -> bool {
        self.rule_mode(rule_name) == RuleMode::Fix
    }

    /// The configured properties of a rule, rendered as strings.
    pub fn rule_properties(&self, rule_name: &str) -> HashMap<String, String> {
        self.rules
            .get(rule_name)
            .map(|props| {
                props
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rule names the config mentions that are not in `known`.
    pub fn unknown_rules<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        let mut unknown: Vec<&str> = self
            .fix
            .rules
            .keys()
            .chain(self.rules.keys())
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect();
        unknown.sort_unstable();
        unknown.dedup();
        unknown
    }
}
