//! Finding aggregation and health scoring

use crate::finding::{Category, Finding, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate view of one run's findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_findings: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub health_score: u8,
}

impl AnalysisSummary {
    /// Letter grade for display
    pub fn grade(&self) -> char {
        match self.health_score {
            90..=100 => 'A',
            80..=89 => 'B',
            70..=79 => 'C',
            60..=69 => 'D',
            _ => 'F',
        }
    }
}

/// Health score analyzer
pub struct Analyzer;

impl Analyzer {
    /// Tally findings and compute the health score
    pub fn summarize(findings: &[Finding]) -> AnalysisSummary {
        let mut by_category = BTreeMap::new();
        let mut by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();

        for finding in findings {
            *by_category.entry(finding.category).or_insert(0) += 1;
            *by_severity.entry(finding.severity).or_insert(0) += 1;
        }

        AnalysisSummary {
            total_findings: findings.len(),
            by_category,
            by_severity,
            health_score: Self::health_score(findings),
        }
    }

    /// Calculate the health score (0-100).
    ///
    /// Every finding subtracts a fixed penalty for its severity from 100,
    /// so the score only depends on how many findings of each tier exist.
    pub fn health_score(findings: &[Finding]) -> u8 {
        let penalty: u32 = findings
            .iter()
            .map(|f| Self::severity_penalty(f.severity))
            .fold(0u32, |acc, p| acc.saturating_add(p));

        (100 - penalty.min(100)) as u8
    }

    fn severity_penalty(severity: Severity) -> u32 {
        match severity {
            Severity::Critical => 15,
            Severity::Warning => 5,
            Severity::Info => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn finding(category: Category, severity: Severity) -> Finding {
        Finding::new("test-rule", category, severity, "Something")
    }

    #[test]
    fn empty_findings_score_100() {
        let summary = Analyzer::summarize(&[]);
        assert_eq!(summary.total_findings, 0);
        assert_eq!(summary.health_score, 100);
        assert!(summary.by_category.is_empty());
        assert_eq!(summary.by_severity.values().sum::<usize>(), 0);
        assert_eq!(summary.by_severity.len(), 3);
        assert_eq!(summary.grade(), 'A');
    }

    #[test]
    fn penalties_per_tier() {
        let findings = vec![
            finding(Category::Security, Severity::Critical),
            finding(Category::Testing, Severity::Warning),
            finding(Category::Naming, Severity::Info),
            finding(Category::Naming, Severity::Info),
        ];

        let summary = Analyzer::summarize(&findings);
        assert_eq!(summary.health_score, 100 - 15 - 5 - 1 - 1);
        assert_eq!(summary.by_category[&Category::Naming], 2);
        assert_eq!(summary.by_severity[&Severity::Info], 2);
        assert_eq!(summary.by_severity[&Severity::Critical], 1);
        assert_eq!(summary.grade(), 'C');
    }

    #[test]
    fn score_clamps_at_zero() {
        let findings: Vec<_> = (0..20)
            .map(|_| finding(Category::Security, Severity::Critical))
            .collect();

        assert_eq!(Analyzer::health_score(&findings), 0);
        assert_eq!(Analyzer::summarize(&findings).grade(), 'F');
    }

    #[test]
    fn summary_serializes_with_string_keys() {
        let summary = Analyzer::summarize(&[finding(Category::Dependencies, Severity::Warning)]);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["by_category"]["dependencies"], 1);
        assert_eq!(json["by_severity"]["warning"], 1);
        assert_eq!(json["by_severity"]["critical"], 0);

        let back: AnalysisSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }

    fn arb_category() -> impl Strategy<Value = Category> {
        prop_oneof![
            Just(Category::Testing),
            Just(Category::Maintainability),
            Just(Category::Documentation),
            Just(Category::Security),
            Just(Category::Dependencies),
            Just(Category::Naming),
        ]
    }

    fn arb_severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Info),
            Just(Severity::Warning),
            Just(Severity::Critical),
        ]
    }

    fn arb_findings() -> impl Strategy<Value = Vec<Finding>> {
        prop::collection::vec(
            (arb_category(), arb_severity()).prop_map(|(c, s)| finding(c, s)),
            0..60,
        )
    }

    proptest! {
        #[test]
        fn counts_sum_to_total(findings in arb_findings()) {
            let summary = Analyzer::summarize(&findings);
            prop_assert_eq!(summary.total_findings, findings.len());
            prop_assert_eq!(summary.by_severity.values().sum::<usize>(), findings.len());
            prop_assert_eq!(summary.by_category.values().sum::<usize>(), findings.len());
        }

        #[test]
        fn score_stays_in_bounds(findings in arb_findings()) {
            let score = Analyzer::health_score(&findings);
            prop_assert!(score <= 100);
            prop_assert!(findings.is_empty() || score < 100);
        }

        #[test]
        fn extra_critical_never_raises_score(findings in arb_findings(), category in arb_category()) {
            let before = Analyzer::health_score(&findings);
            let mut more = findings.clone();
            more.push(finding(category, Severity::Critical));
            prop_assert!(Analyzer::health_score(&more) <= before);
        }

        #[test]
        fn score_ignores_order(findings in arb_findings()) {
            let mut reversed = findings.clone();
            reversed.reverse();
            prop_assert_eq!(Analyzer::summarize(&findings), Analyzer::summarize(&reversed));
        }
    }
}
