//! Dependency manifest hygiene

use super::{check_each_file, content_of, Rule, RuleError};
use crate::finding::{Category, Finding, Severity};
use repovitals_collector::{RepoInfo, SourceFile};
use serde_json::Value;

const NPM_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

const NPM_LOCKFILES: &[&str] = &[
    "package-lock.json",
    "npm-shrinkwrap.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "bun.lock",
];

const CARGO_SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// How many offending names a description lists
const LISTED_NAMES: usize = 5;

/// Reports unpinned dependencies and missing lockfiles
pub struct DependencyRiskRule;

impl DependencyRiskRule {
    fn check(&self, file: &SourceFile, files: &[SourceFile]) -> Result<Vec<Finding>, RuleError> {
        let name = file.file_name();
        if name == "package.json" {
            self.check_package_json(file, files)
        } else if name == "Cargo.toml" {
            self.check_cargo_toml(file)
        } else if name.starts_with("requirements") && name.ends_with(".txt") {
            self.check_requirements(file)
        } else {
            Ok(Vec::new())
        }
    }

    fn check_package_json(
        &self,
        file: &SourceFile,
        files: &[SourceFile],
    ) -> Result<Vec<Finding>, RuleError> {
        let manifest: Value = serde_json::from_str(content_of(file)?).map_err(|e| RuleError::Parse {
            format: "package.json",
            message: e.to_string(),
        })?;

        let mut total = 0;
        let mut risky = Vec::new();
        for section in NPM_SECTIONS {
            let Some(deps) = manifest.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (dep, version) in deps {
                total += 1;
                if version.as_str().map_or(true, is_risky_npm_version) {
                    risky.push(dep.clone());
                }
            }
        }

        let mut findings = Vec::new();
        if !risky.is_empty() {
            findings.push(self.unpinned(file, &risky, Severity::Warning));
        }

        let dir = file.dir();
        let has_lockfile = files
            .iter()
            .any(|f| f.dir() == dir && NPM_LOCKFILES.contains(&f.file_name()));
        if total > 0 && !has_lockfile {
            findings.push(
                Finding::new(self.id(), self.category(), Severity::Info, "No lockfile committed")
                    .with_description(format!(
                        "{} declares {} dependencies but no lockfile sits next to it.",
                        file.path, total
                    ))
                    .with_suggestion(
                        "Commit the package manager's lockfile so installs are reproducible.",
                    )
                    .at(&file.path),
            );
        }

        Ok(findings)
    }

    fn check_cargo_toml(&self, file: &SourceFile) -> Result<Vec<Finding>, RuleError> {
        let manifest: toml::Table = content_of(file)?.parse().map_err(|e: toml::de::Error| {
            RuleError::Parse {
                format: "Cargo.toml",
                message: e.message().to_string(),
            }
        })?;

        let workspace_deps = manifest
            .get("workspace")
            .and_then(|w| w.get("dependencies"))
            .and_then(toml::Value::as_table);
        let tables = CARGO_SECTIONS
            .iter()
            .filter_map(|s| manifest.get(*s).and_then(toml::Value::as_table))
            .chain(workspace_deps);

        let mut risky = Vec::new();
        for table in tables {
            for (dep, spec) in table {
                if is_risky_cargo_spec(spec) {
                    risky.push(dep.clone());
                }
            }
        }

        if risky.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![self.unpinned(file, &risky, Severity::Warning)])
    }

    fn check_requirements(&self, file: &SourceFile) -> Result<Vec<Finding>, RuleError> {
        let risky: Vec<String> = content_of(file)?
            .lines()
            .map(|l| l.split('#').next().unwrap_or_default().trim())
            .filter(|l| !l.is_empty() && !l.starts_with('-'))
            .filter(|l| !(l.contains("==") || l.contains("~=") || l.contains(" @ ")))
            .map(|l| {
                l.split(|c: char| "<>=!;[ ".contains(c))
                    .next()
                    .unwrap_or(l)
                    .to_string()
            })
            .collect();

        if risky.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![self.unpinned(file, &risky, Severity::Info)])
    }

    fn unpinned(&self, file: &SourceFile, names: &[String], severity: Severity) -> Finding {
        let mut listed = names
            .iter()
            .take(LISTED_NAMES)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if names.len() > LISTED_NAMES {
            listed.push_str(&format!(" and {} more", names.len() - LISTED_NAMES));
        }

        Finding::new(
            self.id(),
            self.category(),
            severity,
            format!("Unpinned dependencies in {}", file.file_name()),
        )
        .with_description(format!(
            "{} has {} dependencies without a pinned version: {}.",
            file.path,
            names.len(),
            listed
        ))
        .with_suggestion("Specify explicit version ranges instead of wildcards, tags or branches.")
        .at(&file.path)
    }
}

fn is_risky_npm_version(version: &str) -> bool {
    let v = version.trim();
    matches!(v, "" | "*" | "x" | "latest" | "next")
        || v.starts_with("git")
        || v.starts_with("http:")
        || v.starts_with("https:")
        || v.starts_with("github:")
}

fn is_risky_cargo_spec(spec: &toml::Value) -> bool {
    match spec {
        toml::Value::String(v) => v.trim() == "*",
        toml::Value::Table(t) => {
            let wildcard = t
                .get("version")
                .and_then(toml::Value::as_str)
                .is_some_and(|v| v.trim() == "*");
            let floating_git = t.contains_key("git")
                && !["rev", "tag", "branch"].iter().any(|k| t.contains_key(*k));
            wildcard || floating_git
        }
        _ => false,
    }
}

impl Rule for DependencyRiskRule {
    fn id(&self) -> &'static str {
        "dependency-risk"
    }

    fn category(&self) -> Category {
        Category::Dependencies
    }

    fn analyze(&self, _repo: &RepoInfo, files: &[SourceFile]) -> Vec<Finding> {
        check_each_file(self.id(), files, |file| self.check(file, files))
    }
}
