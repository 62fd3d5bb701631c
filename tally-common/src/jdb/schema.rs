//! Validation capability injected into a store
//!
//! A schema only has to list the rules a record breaks. `safe_parse`
//! (validate-or-error) and `parse` (validate-or-`?`) are derived from that.

use serde::Serialize;
use thiserror::Error;

use super::record::Record;

/// One broken rule, addressed by field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Structured validation failure carrying every issue found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Issue accumulator used by schema implementations
#[derive(Debug, Default)]
pub struct Issues {
    issues: Vec<Issue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue when `ok` is false
    pub fn check(&mut self, ok: bool, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.issues.push(Issue::new(path, message));
        }
        self
    }

    pub fn non_empty(&mut self, path: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), path, "must not be empty")
    }

    pub fn finite(&mut self, path: &str, value: f64) -> &mut Self {
        self.check(value.is_finite(), path, "must be a finite number")
    }

    pub fn push(&mut self, issue: Issue) -> &mut Self {
        self.issues.push(issue);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.issues
    }

    /// `Ok(())` when nothing was recorded
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}

/// Per record type validation rules
pub trait Schema {
    type Record: Record;

    /// Every rule `record` breaks; empty when valid
    fn issues(&self, record: &Self::Record) -> Vec<Issue>;

    /// Validate-or-error: the record back, or the full issue list
    fn safe_parse(&self, record: Self::Record) -> Result<Self::Record, ValidationError> {
        let issues = self.issues(&record);
        if issues.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Validate-or-propagate through [`crate::Error`]
    fn parse(&self, record: Self::Record) -> crate::Result<Self::Record> {
        Ok(self.safe_parse(record)?)
    }
}
