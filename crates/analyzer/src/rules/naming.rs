//! Filename convention consistency

use super::Rule;
use crate::finding::{Category, Finding, Severity};
use repovitals_collector::{RepoInfo, SourceFile};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Convention {
    Kebab,
    Snake,
    Camel,
    Pascal,
}

impl Convention {
    fn label(&self) -> &'static str {
        match self {
            Self::Kebab => "kebab-case",
            Self::Snake => "snake_case",
            Self::Camel => "camelCase",
            Self::Pascal => "PascalCase",
        }
    }

    /// Classify a filename stem; single lowercase words fit every convention
    fn of(stem: &str) -> Option<Self> {
        let stem = stem.trim_matches(['_', '.']);
        let first = stem.chars().next()?;
        let has_upper = stem.chars().any(|c| c.is_ascii_uppercase());
        let has_dash = stem.contains('-');
        let has_underscore = stem.contains('_');

        match (has_dash, has_underscore) {
            (true, false) if !has_upper => Some(Self::Kebab),
            (false, true) if !has_upper => Some(Self::Snake),
            (false, false) if first.is_ascii_uppercase() => Some(Self::Pascal),
            (false, false) if has_upper => Some(Self::Camel),
            _ => None,
        }
    }
}

fn language_of(ext: &str) -> Option<&'static str> {
    match ext {
        "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Some("JavaScript/TypeScript"),
        "py" => Some("Python"),
        "rs" => Some("Rust"),
        "go" => Some("Go"),
        _ => None,
    }
}

/// Reports language groups whose filenames mix conventions
pub struct NamingConsistencyRule {
    /// Classified files a language needs before it is judged
    pub min_files: usize,
}

impl Default for NamingConsistencyRule {
    fn default() -> Self {
        Self { min_files: 4 }
    }
}

impl Rule for NamingConsistencyRule {
    fn id(&self) -> &'static str {
        "naming-consistency"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn analyze(&self, _repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        let mut groups: BTreeMap<&'static str, BTreeMap<Convention, usize>> = BTreeMap::new();

        for file in files {
            let Some(ext) = file.extension() else {
                continue;
            };
            let Some(language) = language_of(&ext) else {
                continue;
            };

            let stem = file.file_name().split('.').next().unwrap_or_default();
            let Some(convention) = Convention::of(stem) else {
                continue;
            };

            // React components are PascalCase by convention
            if convention == Convention::Pascal && matches!(ext.as_str(), "jsx" | "tsx") {
                continue;
            }

            *groups.entry(language).or_default().entry(convention).or_insert(0) += 1;
        }

        groups
            .into_iter()
            .filter(|(_, counts)| counts.len() > 1)
            .filter(|(_, counts)| counts.values().sum::<usize>() >= self.min_files)
            .map(|(language, counts)| {
                let dominant = counts
                    .iter()
                    .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                    .map(|(c, _)| *c)
                    .unwrap_or(Convention::Kebab);

                let breakdown = counts
                    .iter()
                    .map(|(c, n)| format!("{}: {}", c.label(), n))
                    .collect::<Vec<_>>()
                    .join(", ");

                Finding::new(
                    self.id(),
                    self.category(),
                    Severity::Info,
                    format!("Inconsistent file naming in {} files", language),
                )
                .with_description(format!("Filenames mix conventions ({}).", breakdown))
                .with_suggestion(format!(
                    "Rename files to the dominant {} convention.",
                    dominant.label()
                ))
            })
            .collect()
    }
}
