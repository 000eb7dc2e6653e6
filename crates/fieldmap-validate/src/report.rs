//! Validation result containing every finding for one mapping set.

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::issue::{Issue, Severity};
use crate::rules::Category;

/// An issue with its resolved severity and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub issue: Issue,
}

impl Finding {
    pub fn new(issue: Issue, config: &ValidationConfig) -> Self {
        Self {
            severity: issue.severity(config),
            category: issue.category(),
            message: issue.message(),
            issue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no finding has [`Severity::Error`].
    pub ok: bool,
    pub issues: Vec<Finding>,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<Issue>, config: &ValidationConfig) -> Self {
        let issues: Vec<Finding> = issues
            .into_iter()
            .map(|issue| Finding::new(issue, config))
            .collect();
        Self {
            ok: !issues.iter().any(|f| f.severity == Severity::Error),
            issues,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        !self.ok
    }

    /// Findings whose issue has the given [`Issue::code`].
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.issues.iter().filter(move |f| f.issue.code() == code)
    }

    /// Findings sorted by severity (errors first), stable otherwise.
    pub fn sorted_by_severity(&self) -> Vec<&Finding> {
        let mut findings: Vec<_> = self.issues.iter().collect();
        findings.sort_by_key(|f| f.severity);
        findings
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|f| f.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::FieldPath;

    fn unmapped(p: &str) -> Issue {
        Issue::UnmappedRequiredTarget {
            path: FieldPath::parse(p).unwrap(),
        }
    }

    #[test]
    fn ok_follows_error_severity() {
        let issues = vec![unmapped("/a"), unmapped("/b")];
        let deploy = ValidationResult::from_issues(issues.clone(), &ValidationConfig::deploy());
        assert!(!deploy.ok);
        assert_eq!(deploy.error_count(), 2);

        let draft = ValidationResult::from_issues(issues, &ValidationConfig::draft());
        assert!(draft.ok);
        assert_eq!(draft.warning_count(), 2);
    }

    #[test]
    fn empty_result_is_ok() {
        let result = ValidationResult::from_issues(Vec::new(), &ValidationConfig::deploy());
        assert!(result.ok);
        assert!(result.is_empty());
    }
}
