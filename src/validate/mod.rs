//! Validation engine: structural and semantic checks over the hierarchy

mod checks;
mod issue;

pub use checks::Validation;
pub use issue::{IssueLevel, ValidationIssue};
