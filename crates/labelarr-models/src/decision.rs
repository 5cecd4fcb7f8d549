use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Add,
    Remove,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Add => f.write_str("add"),
            SyncAction::Remove => f.write_str("remove"),
        }
    }
}

/// One label change computed by a reconciler, consumed by the apply step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncDecision {
    pub title: String,
    pub year: Option<u32>,
    pub label: String,
    pub action: SyncAction,
}

impl SyncDecision {
    pub fn new(title: impl Into<String>, year: Option<u32>, label: impl Into<String>, action: SyncAction) -> Self {
        Self {
            title: title.into(),
            year,
            label: label.into(),
            action,
        }
    }

    /// Year rendered the way it is logged ("2010", or "unknown")
    pub fn year_display(&self) -> String {
        self.year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Label: {} | Title: {} | Year: {} | Add/Remove: {}",
            self.label,
            self.title,
            self.year_display(),
            self.action
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_display() {
        let decision = SyncDecision::new("Inception", Some(2010), "Kids", SyncAction::Add);
        assert_eq!(
            decision.to_string(),
            "Label: Kids | Title: Inception | Year: 2010 | Add/Remove: add"
        );
    }

    #[test]
    fn test_decision_serializes_action_lowercase() {
        let decision = SyncDecision::new("Alien", None, "Horror", SyncAction::Remove);
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["action"], "remove");
        assert_eq!(json["year"], serde_json::Value::Null);
    }
}
