//! Heuristic analysis rules
//!
//! Every rule inspects the same fetched file set and reports findings of a
//! single category. Rules that work file by file go through
//! [`check_each_file`], which skips any file the rule fails on so that one
//! malformed file never aborts a rule or the run.

mod dependencies;
mod documentation;
mod file_size;
mod naming;
mod secrets;
mod test_presence;
mod todo;

pub use dependencies::DependencyRiskRule;
pub use documentation::DocumentationRule;
pub use file_size::OversizedFileRule;
pub use naming::NamingConsistencyRule;
pub use secrets::HardcodedSecretsRule;
pub use test_presence::MissingTestsRule;
pub use todo::TodoDebtRule;

use crate::finding::{Category, Finding};
use repovitals_collector::{FetchLimits, RepoInfo, SourceFile};
use thiserror::Error;
use tracing::debug;

/// Why a rule could not inspect one file
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("file content is not available")]
    Unreadable,

    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// One independent heuristic check
pub trait Rule: Send + Sync {
    /// Stable identifier recorded on every finding
    fn id(&self) -> &'static str;

    fn category(&self) -> Category;

    fn analyze(&self, repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding>;
}

/// Ordered set of rules run against every repository
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// A registry with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The default rules, tuned to the limits the files were fetched with
    pub fn for_limits(limits: &FetchLimits) -> Self {
        Self::empty()
            .with(MissingTestsRule)
            .with(OversizedFileRule::for_limits(limits))
            .with(DocumentationRule)
            .with(HardcodedSecretsRule)
            .with(DependencyRiskRule)
            .with(NamingConsistencyRule::default())
            .with(TodoDebtRule::default())
    }

    /// Append a rule; rules run in registration order
    pub fn register(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.register(rule);
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule and concatenate the findings
    pub fn run(&self, repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for rule in &self.rules {
            let found = rule.analyze(repo, files);
            debug!(rule = rule.id(), count = found.len(), "Rule finished");
            findings.extend(found);
        }

        findings
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::for_limits(&FetchLimits::default())
    }
}

/// Run a fallible per-file check, skipping files it fails on
pub fn check_each_file<'a, I, F>(rule: &str, files: I, mut check: F) -> Vec<Finding>
where
    I: IntoIterator<Item = &'a SourceFile>,
    F: FnMut(&'a SourceFile) -> Result<Vec<Finding>, RuleError>,
{
    let mut findings = Vec::new();

    for file in files {
        match check(file) {
            Ok(found) => findings.extend(found),
            Err(e) => debug!(rule = rule, path = file.path, error = %e, "Skipping file"),
        }
    }

    findings
}

/// Content of a file or [`RuleError::Unreadable`]
pub(crate) fn content_of(file: &SourceFile) -> Result<&str, RuleError> {
    file.content.as_deref().ok_or(RuleError::Unreadable)
}

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "js", "jsx", "mjs", "cjs", "ts", "tsx", "py", "go", "java", "kt", "kts", "rb", "php",
    "cs", "c", "cc", "cpp", "cxx", "h", "hpp", "swift", "scala", "ex", "exs", "vue", "svelte",
    "dart", "lua", "sh",
];

/// Whether the file is program source rather than data or docs
pub(crate) fn is_source_file(file: &SourceFile) -> bool {
    file.extension()
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    struct FailsOnBadFiles;

    impl Rule for FailsOnBadFiles {
        fn id(&self) -> &'static str {
            "fails-on-bad"
        }

        fn category(&self) -> Category {
            Category::Maintainability
        }

        fn analyze(&self, _repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
            check_each_file(self.id(), files, |file| {
                let content = content_of(file)?;
                if content.contains("bad") {
                    return Err(RuleError::Parse {
                        format: "text",
                        message: "bad marker".to_string(),
                    });
                }
                Ok(vec![Finding::new(
                    self.id(),
                    self.category(),
                    Severity::Info,
                    "Seen",
                )
                .at(&file.path)])
            })
        }
    }

    #[test]
    fn bad_files_are_skipped_not_fatal() {
        let files = vec![
            SourceFile::new("a.rs", "fine"),
            SourceFile::new("b.rs", "bad"),
            SourceFile::without_content("c.rs", 10),
            SourceFile::new("d.rs", "fine"),
        ];

        let registry = RuleRegistry::empty().with(FailsOnBadFiles);
        let findings = registry.run(&RepoInfo::default(), &files);

        let paths: Vec<_> = findings.iter().filter_map(|f| f.file_path.as_deref()).collect();
        assert_eq!(paths, vec!["a.rs", "d.rs"]);
    }

    #[test]
    fn malformed_manifest_leaves_other_rules_running() {
        let files = vec![
            SourceFile::new("package.json", "{ \"dependencies\": { \"left-pad\": "),
            SourceFile::new("src/engine.ts", "const x = 1;\n".repeat(600)),
            SourceFile::new("src/index.ts", "export * from './engine';\n"),
        ];
        let repo = RepoInfo {
            license: Some("MIT".to_string()),
            ..RepoInfo::default()
        };

        let findings = RuleRegistry::default().run(&repo, &files);
        let hit = |id: &str| findings.iter().any(|f| f.rule == id);

        assert!(!hit("dependency-risk"));
        assert!(hit("missing-tests"));
        assert!(findings
            .iter()
            .any(|f| f.rule == "oversized-files"
                && f.file_path.as_deref() == Some("src/engine.ts")));
    }

    #[test]
    fn default_registry_order_is_stable() {
        let registry = RuleRegistry::default();
        let ids: Vec<_> = registry.rules().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec![
                "missing-tests",
                "oversized-files",
                "documentation",
                "hardcoded-secrets",
                "dependency-risk",
                "naming-consistency",
                "todo-debt",
            ]
        );
    }

    #[test]
    fn source_file_detection() {
        assert!(is_source_file(&SourceFile::new("src/App.TSX", "")));
        assert!(is_source_file(&SourceFile::new("main.go", "")));
        assert!(!is_source_file(&SourceFile::new("package.json", "")));
        assert!(!is_source_file(&SourceFile::new("Makefile", "")));
    }
}
