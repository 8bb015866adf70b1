//! Rollup status calculation

use std::collections::HashSet;

use crate::graph::{Item, TraceGraph};

use super::types::{RollupStatus, TestIndex, TestOutcome, TestRecord};

/// Calculate the rollup status for a set of test records
///
/// A pure function of the records plus, when no records exist, the
/// testability of the item and its active descendants: a non-testable
/// item with no testable descendant is `N/A`, anything else without
/// records is `Not Covered`. With records, failures and passes mix to
/// `Partial`, failures alone roll up `Failed`, passes alone `Passed`,
/// an all-skipped set `Skipped`, and any other mixture (e.g. only
/// unknown outcomes) `Partial`.
pub fn rollup_status(records: &[TestRecord], item: Option<&Item>, graph: &TraceGraph) -> RollupStatus {
    if records.is_empty() {
        if let Some(item) = item {
            if !item.testable {
                let has_testable_descendant = graph
                    .descendants_of(&item.uid)
                    .iter()
                    .any(|d| d.active && d.testable);
                return if has_testable_descendant {
                    RollupStatus::NotCovered
                } else {
                    RollupStatus::NotApplicable
                };
            }
        }
        return RollupStatus::NotCovered;
    }

    let mut has_passed = false;
    let mut has_failed = false;
    for record in records {
        match record.outcome {
            TestOutcome::Passed => has_passed = true,
            outcome if outcome.is_failure() => has_failed = true,
            _ => {}
        }
    }

    if has_failed && has_passed {
        RollupStatus::Partial
    } else if has_failed {
        RollupStatus::Failed
    } else if has_passed {
        RollupStatus::Passed
    } else if records.iter().all(|r| r.outcome == TestOutcome::Skipped) {
        RollupStatus::Skipped
    } else {
        RollupStatus::Partial
    }
}

/// Gather test records from an item and all its active descendants
///
/// Records are deduplicated by test id so a test linked to several items
/// in one subtree is counted once.
pub(super) fn collect_tests(graph: &TraceGraph, item: &Item, tests: &TestIndex) -> Vec<TestRecord> {
    let mut records = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    append_records(&item.uid, tests, &mut records, &mut seen);
    for descendant in graph.descendants_of(&item.uid) {
        if !descendant.active {
            continue;
        }
        append_records(&descendant.uid, tests, &mut records, &mut seen);
    }
    records
}

fn append_records<'a>(
    uid: &str,
    tests: &'a TestIndex,
    records: &mut Vec<TestRecord>,
    seen: &mut HashSet<&'a str>,
) {
    if let Some(linked) = tests.get(uid) {
        for record in linked {
            if seen.insert(record.test_id.as_str()) {
                records.push(record.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Item;

    fn record(id: &str, outcome: TestOutcome) -> TestRecord {
        TestRecord::new(id, outcome)
    }

    #[test]
    fn no_records_on_testable_item_is_not_covered() {
        let graph = TraceGraph::new();
        let item = Item::new("SRS001", "req", "SRS");
        assert_eq!(rollup_status(&[], Some(&item), &graph), RollupStatus::NotCovered);
    }

    #[test]
    fn no_records_on_non_testable_item_is_not_applicable() {
        let graph = TraceGraph::new();
        let item = Item::new("SRS001", "req", "SRS").not_testable();
        assert_eq!(
            rollup_status(&[], Some(&item), &graph),
            RollupStatus::NotApplicable
        );
    }

    #[test]
    fn testable_descendant_turns_na_into_not_covered() {
        let mut graph = TraceGraph::new();
        graph.add_item(Item::new("SYS001", "sys", "SYS").not_testable());
        graph.add_item(Item::new("SRS001", "req", "SRS").with_links(["SYS001"]));
        let item = graph.get("SYS001").unwrap();
        assert_eq!(rollup_status(&[], Some(item), &graph), RollupStatus::NotCovered);
    }

    #[test]
    fn inactive_descendants_do_not_count_as_testable() {
        let mut graph = TraceGraph::new();
        graph.add_item(Item::new("SYS001", "sys", "SYS").not_testable());
        graph.add_item(Item::new("SRS001", "req", "SRS").with_links(["SYS001"]).inactive());
        let item = graph.get("SYS001").unwrap();
        assert_eq!(
            rollup_status(&[], Some(item), &graph),
            RollupStatus::NotApplicable
        );
    }

    #[test]
    fn mixed_pass_and_fail_is_partial() {
        let graph = TraceGraph::new();
        let records = [record("t1", TestOutcome::Passed), record("t2", TestOutcome::Failed)];
        assert_eq!(rollup_status(&records, None, &graph), RollupStatus::Partial);
    }

    #[test]
    fn failures_without_passes_roll_up_failed() {
        let graph = TraceGraph::new();
        let records = [record("t1", TestOutcome::Failed), record("t2", TestOutcome::Skipped)];
        assert_eq!(rollup_status(&records, None, &graph), RollupStatus::Failed);
    }

    #[test]
    fn error_counts_as_failure() {
        let graph = TraceGraph::new();
        let records = [record("t1", TestOutcome::Error), record("t2", TestOutcome::Passed)];
        assert_eq!(rollup_status(&records, None, &graph), RollupStatus::Partial);
    }

    #[test]
    fn passes_without_failures_roll_up_passed() {
        let graph = TraceGraph::new();
        let records = [record("t1", TestOutcome::Passed), record("t2", TestOutcome::Skipped)];
        assert_eq!(rollup_status(&records, None, &graph), RollupStatus::Passed);
    }

    #[test]
    fn all_skipped_rolls_up_skipped() {
        let graph = TraceGraph::new();
        let records = [record("t1", TestOutcome::Skipped), record("t2", TestOutcome::Skipped)];
        assert_eq!(rollup_status(&records, None, &graph), RollupStatus::Skipped);
    }

    #[test]
    fn unknown_outcomes_roll_up_partial() {
        let graph = TraceGraph::new();
        let records = [record("t1", TestOutcome::Unknown)];
        assert_eq!(rollup_status(&records, None, &graph), RollupStatus::Partial);

        let mixed = [record("t1", TestOutcome::Skipped), record("t2", TestOutcome::Unknown)];
        assert_eq!(rollup_status(&mixed, None, &graph), RollupStatus::Partial);
    }

    #[test]
    fn collect_tests_gathers_descendants_and_dedups() {
        let mut graph = TraceGraph::new();
        graph.add_item(Item::new("SYS001", "sys", "SYS"));
        graph.add_item(Item::new("SRS001", "req", "SRS").with_links(["SYS001"]));
        graph.add_item(Item::new("SRS002", "req", "SRS").with_links(["SYS001"]));

        let mut tests = TestIndex::new();
        tests.insert("SRS001".into(), vec![record("shared", TestOutcome::Passed)]);
        tests.insert("SRS002".into(), vec![
            record("shared", TestOutcome::Passed),
            record("extra", TestOutcome::Failed),
        ]);

        let item = graph.get("SYS001").unwrap();
        let collected = collect_tests(&graph, item, &tests);
        assert_eq!(collected.len(), 2);
        let ids: Vec<&str> = collected.iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(ids, ["shared", "extra"]);
    }

    #[test]
    fn collect_tests_skips_inactive_descendants() {
        let mut graph = TraceGraph::new();
        graph.add_item(Item::new("SYS001", "sys", "SYS"));
        graph.add_item(Item::new("SRS001", "req", "SRS").with_links(["SYS001"]).inactive());

        let mut tests = TestIndex::new();
        tests.insert("SRS001".into(), vec![record("t1", TestOutcome::Passed)]);

        let item = graph.get("SYS001").unwrap();
        assert!(collect_tests(&graph, item, &tests).is_empty());
    }
}
