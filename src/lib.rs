//! Tracery: Requirements Traceability Graph Engine
//!
//! An in-memory engine for versioned requirement hierarchies: documents
//! form a DAG, items trace to parent items through links, and derived
//! views (validation issues, full-chain coverage matrices) are computed
//! over a fully materialized graph per invocation.
//!
//! # Core Concepts
//!
//! - **Items**: requirement-like records (requirements, info notes,
//!   headings) keyed by UID, owned by a document
//! - **Documents**: prefixed containers arranged in a multi-parent DAG
//! - **Validation**: a battery of structural and semantic checks that
//!   collects issues without ever failing hard
//! - **Chain matrices**: per-path coverage rollups from a starting
//!   document down to leaf documents
//!
//! # Example
//!
//! ```
//! use tracery::{DocumentDescriptor, DocumentHierarchy, Item, TraceGraph};
//!
//! let mut hierarchy = DocumentHierarchy::new();
//! hierarchy.insert(DocumentDescriptor::new("SYS"));
//! hierarchy.insert(DocumentDescriptor::new("SRS").with_parent("SYS"));
//!
//! let mut graph = TraceGraph::new();
//! graph.set_document_parents("SYS", Vec::<String>::new());
//! graph.set_document_parents("SRS", ["SYS"]);
//! graph.add_item(Item::new("SYS001", "The system shall log in users.", "SYS"));
//! graph.add_item(Item::new("SRS001", "Login accepts a username.", "SRS").with_links(["SYS001"]));
//!
//! assert_eq!(graph.item_children("SYS001"), ["SRS001"]);
//! ```

pub mod digest;
mod graph;
pub mod matrix;
pub mod validate;

pub use graph::{
    AttributeValue, DocumentDescriptor, DocumentHierarchy, Item, ItemType, TraceGraph,
    TraceryError, TraceryResult,
};
pub use matrix::{
    ChainRow, FullChainMatrix, MatrixQuery, MatrixResult, MatrixSummary, RollupStatus,
    TestIndex, TestOutcome, TestRecord,
};
pub use validate::{IssueLevel, Validation, ValidationIssue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
