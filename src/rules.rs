use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::value::FieldValue;

/// Outcome of a named validation rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuleOutcome {
    Pass,
    /// Failure, optionally carrying the message shown to the user. `None`
    /// falls back to the generic invalid-input message.
    Fail(Option<String>),
}

impl RuleOutcome {
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(Some(message.into()))
    }
}

pub type RuleFn = Arc<dyn Fn(&FieldValue) -> RuleOutcome + Send + Sync>;

/// Named validation rules, registered up front and looked up by the
/// `validation-callback` annotation at validation time. Registering under an
/// existing name replaces the previous rule.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Arc<RwLock<BTreeMap<String, RuleFn>>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        rule: impl Fn(&FieldValue) -> RuleOutcome + Send + Sync + 'static,
    ) {
        let mut rules = match self.rules.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rules.insert(name.into(), Arc::new(rule));
    }

    pub fn lookup(&self, name: &str) -> Option<RuleFn> {
        let rules = match self.rules.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rules.get(name).cloned()
    }
}
