//! Flags source files that have grown too large

use super::{check_each_file, content_of, is_source_file, Rule, RuleError};
use crate::finding::{Category, Finding, Severity};
use repovitals_collector::{FetchLimits, RepoInfo, SourceFile, DEFAULT_MAX_FILE_BYTES};

/// Reports source files above line-count thresholds
pub struct OversizedFileRule {
    pub warning_lines: usize,
    pub critical_lines: usize,
    /// Must match [`FetchLimits::max_file_bytes`] of the collector that
    /// fetched the files
    pub max_bytes: u64,
}

impl Default for OversizedFileRule {
    fn default() -> Self {
        Self {
            warning_lines: 500,
            critical_lines: 1000,
            max_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl OversizedFileRule {
    pub fn for_limits(limits: &FetchLimits) -> Self {
        Self {
            max_bytes: limits.max_file_bytes,
            ..Self::default()
        }
    }

    fn check(&self, file: &SourceFile) -> Result<Vec<Finding>, RuleError> {
        if file.content.is_none() && file.size > self.max_bytes {
            return Ok(vec![Finding::new(
                self.id(),
                self.category(),
                Severity::Warning,
                format!("File too large to analyze: {}", file.file_name()),
            )
            .with_description(format!(
                "{} is {} KB, above the {} KB analysis limit.",
                file.path,
                file.size / 1024,
                self.max_bytes / 1024
            ))
            .with_suggestion("Split the file, or move generated code out of the repository.")
            .at(&file.path)]);
        }

        let lines = content_of(file)?.lines().count();
        let severity = if lines > self.critical_lines {
            Severity::Critical
        } else if lines > self.warning_lines {
            Severity::Warning
        } else {
            return Ok(Vec::new());
        };

        Ok(vec![Finding::new(
            self.id(),
            self.category(),
            severity,
            format!("Oversized file: {}", file.file_name()),
        )
        .with_description(format!(
            "{} has {} lines (threshold {}).",
            file.path, lines, self.warning_lines
        ))
        .with_suggestion("Break the file into smaller modules with a single responsibility each.")
        .at(&file.path)])
    }
}

impl Rule for OversizedFileRule {
    fn id(&self) -> &'static str {
        "oversized-files"
    }

    fn category(&self) -> Category {
        Category::Maintainability
    }

    fn analyze(&self, _repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        let mut findings = check_each_file(
            self.id(),
            files.iter().filter(|f| is_source_file(f)),
            |file| self.check(file),
        );
        findings.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        findings
    }
}
