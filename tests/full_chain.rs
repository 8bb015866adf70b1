//! End-to-end coverage matrix behavior over the medical corpus

mod common;

use common::{medical_graph, passing_tests};
use tracery::{
    Item, MatrixQuery, RollupStatus, TestIndex, TestOutcome, TestRecord, TraceryError,
};

#[test]
fn one_matrix_per_path_from_the_root() {
    let result = MatrixQuery::from("UN")
        .execute(&medical_graph(), &passing_tests())
        .unwrap();

    assert_eq!(result.matrices.len(), 2);
    let names: Vec<&str> = result
        .matrices
        .iter()
        .map(|m| m.path_name.as_str())
        .collect();
    assert!(names.contains(&"UN -> SYS -> SRS"));
    assert!(names.contains(&"UN -> HAZ -> RC -> SRS"));
}

#[test]
fn every_summary_sums_to_its_row_count() {
    let result = MatrixQuery::from("UN")
        .execute(&medical_graph(), &passing_tests())
        .unwrap();

    for matrix in &result.matrices {
        let s = &matrix.summary;
        assert_eq!(s.total, matrix.rows.len());
        assert_eq!(
            s.passed + s.failed + s.partial + s.skipped + s.not_covered + s.not_applicable,
            s.total,
            "summary counts must partition the rows of {}",
            matrix.path_name
        );
    }
}

#[test]
fn passing_leaf_tests_roll_up_along_both_paths() {
    let result = MatrixQuery::from("UN")
        .execute(&medical_graph(), &passing_tests())
        .unwrap();

    for matrix in &result.matrices {
        assert_eq!(matrix.rows.len(), 1, "{}", matrix.path_name);
        assert_eq!(matrix.rows[0].rollup_status, RollupStatus::Passed);
        assert_eq!(matrix.summary.passed, 1);
    }
}

#[test]
fn mixed_outcomes_roll_up_partial() {
    let mut tests = TestIndex::new();
    tests.insert(
        "SRS001".into(),
        vec![
            TestRecord::new("t::pass", TestOutcome::Passed),
            TestRecord::new("t::fail", TestOutcome::Failed),
        ],
    );
    let result = MatrixQuery::from("UN").execute(&medical_graph(), &tests).unwrap();
    for matrix in &result.matrices {
        assert_eq!(matrix.rows[0].rollup_status, RollupStatus::Partial);
    }
}

#[test]
fn all_skipped_rolls_up_skipped() {
    let mut tests = TestIndex::new();
    tests.insert(
        "SRS001".into(),
        vec![TestRecord::new("t::skip", TestOutcome::Skipped)],
    );
    let result = MatrixQuery::from("UN").execute(&medical_graph(), &tests).unwrap();
    for matrix in &result.matrices {
        assert_eq!(matrix.rows[0].rollup_status, RollupStatus::Skipped);
    }
}

#[test]
fn no_tests_at_all_rolls_up_not_covered() {
    let result = MatrixQuery::from("UN")
        .execute(&medical_graph(), &TestIndex::new())
        .unwrap();
    for matrix in &result.matrices {
        assert_eq!(matrix.rows[0].rollup_status, RollupStatus::NotCovered);
    }
}

#[test]
fn orphans_are_listed_exactly_once_across_paths() {
    let mut graph = medical_graph();
    // SRS is spanned by both paths; the orphan must still be unique
    graph.add_item(Item::new("SRS999", "An unlinked requirement.", "SRS"));

    let result = MatrixQuery::from("UN")
        .execute(&graph, &passing_tests())
        .unwrap();
    assert_eq!(result.orphaned, ["SRS999"]);
}

#[test]
fn tests_against_unknown_uids_are_tolerated() {
    let mut tests = passing_tests();
    tests.insert(
        "GHOST42".into(),
        vec![TestRecord::new("t::ghost", TestOutcome::Failed)],
    );
    let result = MatrixQuery::from("UN").execute(&medical_graph(), &tests).unwrap();
    for matrix in &result.matrices {
        assert_eq!(matrix.rows[0].rollup_status, RollupStatus::Passed);
    }
}

#[test]
fn unknown_start_document_is_a_structural_error() {
    let err = MatrixQuery::from("MISSING")
        .execute(&medical_graph(), &TestIndex::new())
        .unwrap_err();
    assert!(matches!(err, TraceryError::UnknownDocument(_)));
    assert!(err.to_string().contains("MISSING"));
}
