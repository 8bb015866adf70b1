//! Matrix data types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::Item;

/// Outcome of a single test execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
    Error,
    Unknown,
}

impl TestOutcome {
    /// Whether this outcome counts as a failure for rollup purposes
    pub fn is_failure(&self) -> bool {
        matches!(self, TestOutcome::Failed | TestOutcome::Error)
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestOutcome::Passed => write!(f, "passed"),
            TestOutcome::Failed => write!(f, "failed"),
            TestOutcome::Skipped => write!(f, "skipped"),
            TestOutcome::Error => write!(f, "error"),
            TestOutcome::Unknown => write!(f, "unknown"),
        }
    }
}

/// One observed test execution, linked to an item by the test runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Identifier of the test (e.g. a runner node id)
    pub test_id: String,
    /// Observed outcome
    pub outcome: TestOutcome,
    /// Free-form notes captured during execution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// When the test ran, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

impl TestRecord {
    /// Create a record with no notes or timestamp
    pub fn new(test_id: impl Into<String>, outcome: TestOutcome) -> Self {
        Self {
            test_id: test_id.into(),
            outcome,
            notes: Vec::new(),
            executed_at: None,
        }
    }

    /// Append a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Set the execution timestamp
    pub fn executed_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.executed_at = Some(timestamp);
        self
    }
}

/// Test records keyed by item UID, supplied by the test-runner collaborator
///
/// UIDs absent from the graph are tolerated; reporting them is the
/// collaborator's concern.
pub type TestIndex = HashMap<String, Vec<TestRecord>>;

/// Aggregated coverage state of a chain row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupStatus {
    Passed,
    Failed,
    Partial,
    Skipped,
    NotCovered,
    NotApplicable,
}

impl std::fmt::Display for RollupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollupStatus::Passed => write!(f, "Passed"),
            RollupStatus::Failed => write!(f, "Failed"),
            RollupStatus::Partial => write!(f, "Partial"),
            RollupStatus::Skipped => write!(f, "Skipped"),
            RollupStatus::NotCovered => write!(f, "Not Covered"),
            RollupStatus::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// One coverage row for a single document path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRow {
    /// Item at each level of the path, keyed by prefix in path order;
    /// `None` marks a gap where the trace chain has no item
    pub chain: IndexMap<String, Option<Item>>,
    /// Aggregated status over the row's tests
    pub rollup_status: RollupStatus,
    /// Tests gathered from the row's deepest item and its descendants
    pub descendant_tests: Vec<TestRecord>,
    /// Ancestor UIDs of the row's first item, when requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestor_uids: Vec<String>,
}

/// Per-status row counts for one matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub partial: usize,
    pub skipped: usize,
    pub not_covered: usize,
    pub not_applicable: usize,
}

impl MatrixSummary {
    /// Tally rows by rollup status
    pub fn from_rows(rows: &[ChainRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Self::default()
        };
        for row in rows {
            match row.rollup_status {
                RollupStatus::Passed => summary.passed += 1,
                RollupStatus::Failed => summary.failed += 1,
                RollupStatus::Partial => summary.partial += 1,
                RollupStatus::Skipped => summary.skipped += 1,
                RollupStatus::NotCovered => summary.not_covered += 1,
                RollupStatus::NotApplicable => summary.not_applicable += 1,
            }
        }
        summary
    }
}

/// A full chain trace matrix for one document path
///
/// A starting document with diverging children produces one matrix per
/// path from it to a leaf document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullChainMatrix {
    /// Human-readable path, e.g. `"UN -> SYS -> SRS"`
    pub path_name: String,
    /// Ordered document prefixes in this path
    pub document_hierarchy: Vec<String>,
    /// Data rows
    pub rows: Vec<ChainRow>,
    /// Per-status counts over `rows`
    pub summary: MatrixSummary,
    /// Whether rows carry ancestor UIDs
    pub include_ancestors: bool,
}

/// Everything produced by one matrix build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixResult {
    /// One matrix per document path from the starting document
    pub matrices: Vec<FullChainMatrix>,
    /// Active requirement items in the spanned documents that appear in
    /// no row: their trace chains are incomplete from this start
    pub orphaned: Vec<String>,
}
