//! Detects repositories without any automated tests

use super::{is_source_file, Rule};
use crate::finding::{Category, Finding, Severity};
use repovitals_collector::{RepoInfo, SourceFile};

const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "spec", "specs", "testing", "e2e"];

/// Reports a repository that has source code but no tests
pub struct MissingTestsRule;

impl MissingTestsRule {
    fn is_test_file(file: &SourceFile) -> bool {
        let lower = file.path.to_ascii_lowercase();
        let mut parts: Vec<&str> = lower.split('/').collect();
        let name = parts.pop().unwrap_or_default();

        if parts.iter().any(|dir| TEST_DIRS.contains(dir)) {
            return true;
        }

        let stem = name.split('.').next().unwrap_or(name);
        if stem.ends_with("_test") || stem.ends_with("_spec") || stem.starts_with("test_") {
            return true;
        }
        if name.contains(".test.") || name.contains(".spec.") {
            return true;
        }

        // Java/Kotlin/C# class naming
        let original = file.file_name();
        if original.ends_with("Test.java")
            || original.ends_with("Tests.java")
            || original.ends_with("Test.kt")
            || original.ends_with("Tests.cs")
        {
            return true;
        }

        // Rust unit tests live next to the code
        file.extension().as_deref() == Some("rs")
            && file
                .content
                .as_deref()
                .is_some_and(|c| c.contains("#[cfg(test)]") || c.contains("#[test]"))
    }
}

impl Rule for MissingTestsRule {
    fn id(&self) -> &'static str {
        "missing-tests"
    }

    fn category(&self) -> Category {
        Category::Testing
    }

    fn analyze(&self, _repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        let source_count = files.iter().filter(|f| is_source_file(f)).count();
        if source_count == 0 || files.iter().any(Self::is_test_file) {
            return Vec::new();
        }

        vec![Finding::new(self.id(), self.category(), Severity::Warning, "No automated tests found")
            .with_description(format!(
                "Scanned {} source files without finding any test files or test modules.",
                source_count
            ))
            .with_suggestion(
                "Add a test suite (for example a tests/ directory or *_test files) and run it in CI.",
            )]
    }
}
