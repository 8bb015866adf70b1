//! Validation issue types

use serde::{Deserialize, Serialize};

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueLevel::Info => write!(f, "INFO"),
            IssueLevel::Warning => write!(f, "WARNING"),
            IssueLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A single validation issue
///
/// Immutable once produced. Callers may reclassify levels wholesale as a
/// post-processing step (e.g. promote every warning to an error) via
/// [`with_level`]; the engine itself never does.
///
/// [`with_level`]: ValidationIssue::with_level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: IssueLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    /// Create an issue attached to an item
    pub fn for_item(
        level: IssueLevel,
        uid: impl Into<String>,
        prefix: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            uid: Some(uid.into()),
            prefix: Some(prefix.into()),
            message: message.into(),
        }
    }

    /// Create an issue attached to a document
    pub fn for_document(
        level: IssueLevel,
        prefix: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            uid: None,
            prefix: Some(prefix.into()),
            message: message.into(),
        }
    }

    /// Create an issue with no item or document attribution
    pub fn global(level: IssueLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            uid: None,
            prefix: None,
            message: message.into(),
        }
    }

    /// Return the same issue reclassified at a different level
    pub fn with_level(mut self, level: IssueLevel) -> Self {
        self.level = level;
        self
    }

    /// Whether this issue is an error
    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.level)?;
        if let Some(uid) = &self.uid {
            write!(f, " {}", uid)?;
        } else if let Some(prefix) = &self.prefix {
            write!(f, " {}", prefix)?;
        }
        write!(f, " {}", self.message)
    }
}
