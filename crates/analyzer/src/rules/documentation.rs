//! README and license presence

use super::Rule;
use crate::finding::{Category, Finding, Severity};
use repovitals_collector::{RepoInfo, SourceFile};

const MIN_README_LINES: usize = 5;

/// Reports missing or minimal project documentation
pub struct DocumentationRule;

fn root_file_starting_with<'a>(files: &'a [SourceFile], prefixes: &[&str]) -> Option<&'a SourceFile> {
    files.iter().filter(|f| f.is_root()).find(|f| {
        let name = f.file_name().to_ascii_lowercase();
        prefixes.iter().any(|p| name.starts_with(p))
    })
}

impl Rule for DocumentationRule {
    fn id(&self) -> &'static str {
        "documentation"
    }

    fn category(&self) -> Category {
        Category::Documentation
    }

    fn analyze(&self, repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        let mut findings = Vec::new();

        match root_file_starting_with(files, &["readme"]) {
            None => findings.push(
                Finding::new(self.id(), self.category(), Severity::Warning, "Missing README")
                    .with_description("The repository root has no README file.")
                    .with_suggestion(
                        "Add a README.md describing what the project does, how to build it and how to use it.",
                    ),
            ),
            Some(readme) => {
                // An unreadable README is left alone
                let meaningful = readme
                    .content
                    .as_deref()
                    .map(|c| c.lines().filter(|l| !l.trim().is_empty()).count());

                if let Some(count) = meaningful.filter(|c| *c < MIN_README_LINES) {
                    findings.push(
                        Finding::new(self.id(), self.category(), Severity::Info, "README is minimal")
                            .with_description(format!(
                                "{} has only {} non-empty lines.",
                                readme.path, count
                            ))
                            .with_suggestion(
                                "Expand the README with setup instructions, usage examples and contribution notes.",
                            )
                            .at(&readme.path),
                    );
                }
            }
        }

        let has_license_file = root_file_starting_with(files, &["license", "licence", "copying"]).is_some();
        if repo.license.is_none() && !has_license_file {
            findings.push(
                Finding::new(self.id(), self.category(), Severity::Info, "No license")
                    .with_description("No license was detected for this repository.")
                    .with_suggestion("Add a LICENSE file so others know how they may use the code."),
            );
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn licensed() -> RepoInfo {
        RepoInfo {
            license: Some("MIT".to_string()),
            ..RepoInfo::default()
        }
    }

    #[test]
    fn missing_readme_is_a_warning() {
        let findings = DocumentationRule.analyze(&licensed(), &[SourceFile::new("docs/README.md", "x")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "Missing README");
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn short_readme_is_info() {
        let findings = DocumentationRule.analyze(&licensed(), &[SourceFile::new("README.md", "# Hi\n\n")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].file_path.as_deref(), Some("README.md"));
    }

    #[test]
    fn complete_docs_have_no_findings() {
        let readme = "# Project\nWhat it does\n## Install\ncargo install\n## Usage\nrun it\n";
        let files = [
            SourceFile::new("readme.markdown", readme),
            SourceFile::new("LICENSE-MIT", "MIT License"),
        ];
        let findings = DocumentationRule.analyze(&RepoInfo::default(), &files);
        assert!(findings.is_empty());
    }

    #[test]
    fn missing_license() {
        let files = [SourceFile::without_content("README.md", 10)];
        let findings = DocumentationRule.analyze(&RepoInfo::default(), &files);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, "No license");
    }
}
