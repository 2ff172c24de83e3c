//! Rule registry for mapping rule names to rule implementations.

use std::collections::HashMap;

use crate::Rule;

/// Properties from a rule's configuration table.
pub type Properties<'a> = HashMap<&'a str, &'a str>;

/// Trait for rules that can be constructed from config properties.
pub trait FromConfig: Rule + Sized {
    /// The name this rule is configured under.
    const MODULE_NAME: &'static str;

    /// Create a rule instance from config properties.
    fn from_config(properties: &Properties) -> Self;
}

/// A factory function that creates a boxed rule from properties.
type RuleFactory = fn(&Properties) -> Box<dyn Rule>;

/// Registry mapping rule names to rule factories.
pub struct RuleRegistry {
    factories: HashMap<&'static str, RuleFactory>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with all built-in rules registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register a rule type that implements FromConfig.
    pub fn register<R: FromConfig + 'static>(&mut self) {
        self.factories
            .insert(R::MODULE_NAME, |props| Box::new(R::from_config(props)));
    }

    fn register_builtins(&mut self) {
        use crate::rules::{FileTabCharacter, TrailingWhitespace, UnnecessaryParentheses, UpperEll};
        // Batched rules
        self.register::<UnnecessaryParentheses>();
        self.register::<UpperEll>();
        // Independent rules
        self.register::<FileTabCharacter>();
        self.register::<TrailingWhitespace>();
    }

    /// Create a rule from its name and properties.
    /// Returns None if the name is not recognized.
    pub fn create_rule(&self, name: &str, properties: &Properties) -> Option<Box<dyn Rule>> {
        self.factories.get(name).map(|factory| factory(properties))
    }

    /// Check if a rule name is registered.
    pub fn has_rule(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// All registered rule names, sorted.
    pub fn rule_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
