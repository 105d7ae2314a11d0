//! Findings produced by analysis rules

use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue category, one per rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Testing,
    Maintainability,
    Documentation,
    Security,
    Dependencies,
    Naming,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testing => "testing",
            Self::Maintainability => "maintainability",
            Self::Documentation => "documentation",
            Self::Security => "security",
            Self::Dependencies => "dependencies",
            Self::Naming => "naming",
        }
    }

    fn default_suggestion(&self) -> &'static str {
        match self {
            Self::Testing => "Add automated tests covering the main code paths.",
            Self::Maintainability => "Refactor the affected code into smaller, focused units.",
            Self::Documentation => "Document the project so new contributors can get started.",
            Self::Security => "Remove the sensitive value and rotate any exposed credentials.",
            Self::Dependencies => "Pin dependency versions and commit a lockfile.",
            Self::Naming => "Adopt one naming convention and apply it consistently.",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Id of the rule that produced the finding
    pub rule: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    pub suggestion: String,
    pub file_path: Option<String>,
}

impl Finding {
    /// Start a finding; the suggestion defaults to the category's generic advice
    pub fn new(
        rule: &str,
        category: Category,
        severity: Severity,
        title: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.to_string(),
            title: title.into(),
            description: String::new(),
            category,
            severity,
            suggestion: category.default_suggestion().to_string(),
            file_path: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Empty suggestions are ignored
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        let suggestion = suggestion.into();
        if !suggestion.trim().is_empty() {
            self.suggestion = suggestion;
        }
        self
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_is_never_empty() {
        let finding = Finding::new("r", Category::Naming, Severity::Info, "t").with_suggestion("  ");
        assert!(!finding.suggestion.is_empty());

        let finding = finding.with_suggestion("Rename it");
        assert_eq!(finding.suggestion, "Rename it");
    }

    #[test]
    fn serializes_enums_in_lower_case() {
        let finding = Finding::new("r", Category::Maintainability, Severity::Critical, "t")
            .at("src/main.rs");
        let json = serde_json::to_value(&finding).unwrap();

        assert_eq!(json["category"], "maintainability");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["file_path"], "src/main.rs");
    }

    #[test]
    fn severity_orders_by_impact() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }
}
