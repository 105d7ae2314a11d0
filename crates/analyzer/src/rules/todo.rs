//! Accumulated TODO/FIXME markers

use super::{is_source_file, Rule};
use crate::finding::{Category, Finding, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use repovitals_collector::{RepoInfo, SourceFile};

static DEBT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:TODO|FIXME|HACK|XXX)\b").expect("valid marker regex"));

/// Reports repositories with many unresolved debt markers
pub struct TodoDebtRule {
    /// Markers tolerated before a finding is raised
    pub threshold: usize,
}

impl Default for TodoDebtRule {
    fn default() -> Self {
        Self { threshold: 20 }
    }
}

impl Rule for TodoDebtRule {
    fn id(&self) -> &'static str {
        "todo-debt"
    }

    fn category(&self) -> Category {
        Category::Maintainability
    }

    fn analyze(&self, _repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        let counts: Vec<(&SourceFile, usize)> = files
            .iter()
            .filter(|f| is_source_file(f))
            .filter_map(|f| {
                let n = DEBT_MARKER.find_iter(f.content.as_deref()?).count();
                (n > 0).then_some((f, n))
            })
            .collect();

        let total: usize = counts.iter().map(|(_, n)| n).sum();
        if total <= self.threshold {
            return Vec::new();
        }

        // Ties go to the earliest file in tree order
        let mut worst: Option<(&SourceFile, usize)> = None;
        for &(file, n) in &counts {
            if worst.map_or(true, |(_, best)| n > best) {
                worst = Some((file, n));
            }
        }
        let Some((file, most)) = worst else {
            return Vec::new();
        };

        vec![Finding::new(
            self.id(),
            self.category(),
            Severity::Info,
            format!("{} TODO/FIXME markers", total),
        )
        .with_description(format!(
            "Found {} TODO, FIXME, HACK or XXX markers across {} files; {} has the most ({}).",
            total,
            counts.len(),
            file.path,
            most
        ))
        .with_suggestion("Resolve the markers or move them into the issue tracker.")
        .at(&file.path)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(n: usize) -> String {
        "// TODO: tidy up\n".repeat(n)
    }

    #[test]
    fn below_threshold_is_quiet() {
        let files = [
            SourceFile::new("src/a.rs", markers(10)),
            SourceFile::new("src/b.rs", markers(10)),
        ];
        assert!(TodoDebtRule::default().analyze(&RepoInfo::default(), &files).is_empty());
    }

    #[test]
    fn above_threshold_points_at_worst_file() {
        let files = [
            SourceFile::new("src/a.rs", markers(6)),
            SourceFile::new("src/b.py", "# FIXME\n# HACK\n".repeat(8)),
            SourceFile::new("NOTES.md", markers(100)),
        ];

        let findings = TodoDebtRule::default().analyze(&RepoInfo::default(), &files);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "22 TODO/FIXME markers");
        assert_eq!(findings[0].file_path.as_deref(), Some("src/b.py"));
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn markers_need_word_boundaries() {
        let files = [SourceFile::new("src/a.ts", "const TODOS = []; // XXXL\n".repeat(30))];
        assert!(TodoDebtRule::default().analyze(&RepoInfo::default(), &files).is_empty());
    }
}
