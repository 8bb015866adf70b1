//! Shared fixtures: a small medical-device traceability corpus
//!
//! Document hierarchy:
//!
//! ```text
//!        UN
//!       /  \
//!     SYS   HAZ
//!      |     |
//!      |     RC
//!       \   /
//!        SRS
//! ```

use tracery::digest::item_digest;
use tracery::{
    DocumentDescriptor, DocumentHierarchy, Item, TestIndex, TestOutcome, TestRecord, TraceGraph,
};

pub fn medical_hierarchy() -> DocumentHierarchy {
    let mut hierarchy = DocumentHierarchy::new();
    hierarchy.insert(DocumentDescriptor::new("UN"));
    hierarchy.insert(DocumentDescriptor::new("SYS").with_parent("UN"));
    hierarchy.insert(DocumentDescriptor::new("HAZ").with_parent("UN"));
    hierarchy.insert(DocumentDescriptor::new("RC").with_parent("HAZ"));
    hierarchy.insert(
        DocumentDescriptor::new("SRS")
            .with_parent("SYS")
            .with_parent("RC"),
    );
    hierarchy
}

/// Build the item graph for [`medical_hierarchy`], fully linked, verified,
/// and reviewed so a default validation run is clean.
pub fn medical_graph() -> TraceGraph {
    let mut graph = TraceGraph::new();
    graph.set_document_parents("UN", Vec::<String>::new());
    graph.set_document_parents("SYS", ["UN"]);
    graph.set_document_parents("HAZ", ["UN"]);
    graph.set_document_parents("RC", ["HAZ"]);
    graph.set_document_parents("SRS", ["SYS", "RC"]);

    let un001 = Item::new("UN001", "Clinicians can authenticate to the device.", "UN")
        .reviewed_now();
    let sys001 = Item::new("SYS001", "The system shall authenticate users.", "SYS")
        .with_link("UN001")
        .with_link_hash("UN001", item_digest(&un001))
        .reviewed_now();
    let haz001 = Item::new("HAZ001", "Unauthorized access to patient data.", "HAZ")
        .with_link("UN001")
        .with_link_hash("UN001", item_digest(&un001))
        .reviewed_now();
    let rc001 = Item::new("RC001", "Accounts lock after repeated failures.", "RC")
        .with_link("HAZ001")
        .with_link_hash("HAZ001", item_digest(&haz001))
        .reviewed_now();
    let srs001 = Item::new("SRS001", "Passwords are stored as salted hashes.", "SRS")
        .with_link("SYS001")
        .with_link_hash("SYS001", item_digest(&sys001))
        .with_link("RC001")
        .with_link_hash("RC001", item_digest(&rc001))
        .reviewed_now();

    for item in [un001, sys001, haz001, rc001, srs001] {
        graph.add_item(item);
    }
    graph
}

pub fn passing_tests() -> TestIndex {
    let mut tests = TestIndex::new();
    tests.insert(
        "SRS001".into(),
        vec![
            TestRecord::new("tests/test_auth.py::test_hash_storage", TestOutcome::Passed)
                .with_note("verified bcrypt parameters"),
        ],
    );
    tests
}
