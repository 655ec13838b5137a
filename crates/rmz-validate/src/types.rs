use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Structural,
    Reference,
    Naming,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warn,
    Fail,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub rule_id: String,
    pub category: ValidationCategory,
    pub severity: Severity,
    pub message: String,
    /// Name of the offending entity, when there is one.
    #[serde(default)]
    pub subject: Option<String>,
}

impl Finding {
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Fail
    }
}
