//! Full-chain matrix construction

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::graph::{Item, TraceGraph, TraceryError, TraceryResult};

use super::rollup::{collect_tests, rollup_status};
use super::types::{
    ChainRow, FullChainMatrix, MatrixResult, MatrixSummary, RollupStatus, TestIndex, TestRecord,
};

/// Maximum depth for document-path enumeration
///
/// Validation normally rejects cyclic hierarchies before a matrix is
/// built, but path enumeration must terminate even when validation was
/// skipped; branches deeper than this are abandoned with a warning.
pub const MAX_TRAVERSAL_DEPTH: usize = 100;

/// Query for building full chain trace matrices from a starting document
///
/// Enumerates every document path from the starting prefix to a leaf
/// document and produces one [`FullChainMatrix`] per path, plus the list
/// of items orphaned from every path.
///
/// # Example
///
/// ```
/// use tracery::{Item, MatrixQuery, TestIndex, TraceGraph};
///
/// let mut graph = TraceGraph::new();
/// graph.set_document_parents("SYS", Vec::<String>::new());
/// graph.set_document_parents("SRS", ["SYS"]);
/// graph.add_item(Item::new("SYS001", "System req", "SYS"));
/// graph.add_item(Item::new("SRS001", "Software req", "SRS").with_links(["SYS001"]));
///
/// let result = MatrixQuery::from("SYS")
///     .execute(&graph, &TestIndex::new())
///     .unwrap();
/// assert_eq!(result.matrices.len(), 1);
/// assert_eq!(result.matrices[0].path_name, "SYS -> SRS");
/// ```
#[derive(Debug, Clone)]
pub struct MatrixQuery {
    start: String,
    include_ancestors: bool,
    ignore_prefixes: HashSet<String>,
}

impl MatrixQuery {
    /// Create a query starting from the given document prefix
    pub fn from(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            include_ancestors: false,
            ignore_prefixes: HashSet::new(),
        }
    }

    /// Populate each row's ancestor UID column
    pub fn include_ancestors(mut self, include: bool) -> Self {
        self.include_ancestors = include;
        self
    }

    /// Exclude a document prefix from matrix output
    pub fn ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefixes.insert(prefix.into());
        self
    }

    /// Exclude several document prefixes from matrix output
    pub fn ignore_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_prefixes
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Build the matrices against a graph and externally supplied tests
    ///
    /// Fails with [`TraceryError::UnknownDocument`] when the starting
    /// prefix has no recorded document parents; everything else degrades
    /// to warnings and empty output.
    pub fn execute(&self, graph: &TraceGraph, tests: &TestIndex) -> TraceryResult<MatrixResult> {
        if !graph.has_document(&self.start) {
            return Err(TraceryError::UnknownDocument(self.start.clone()));
        }

        let doc_paths = self.document_paths(graph);

        let mut matrices = Vec::new();
        for doc_path in &doc_paths {
            let filtered: Vec<String> = doc_path
                .iter()
                .filter(|p| !self.ignore_prefixes.contains(*p))
                .cloned()
                .collect();
            if filtered.is_empty() {
                tracing::warn!(
                    path = %doc_path.join(" -> "),
                    "all documents filtered from path; skipping"
                );
                continue;
            }

            let rows = self.build_rows(graph, tests, doc_path);
            let summary = MatrixSummary::from_rows(&rows);
            matrices.push(FullChainMatrix {
                path_name: filtered.join(" -> "),
                document_hierarchy: filtered,
                rows,
                summary,
                include_ancestors: self.include_ancestors,
            });
        }

        if matrices.is_empty() {
            tracing::warn!(start = %self.start, "no traceability matrices generated");
        }

        let orphaned = self.orphans(graph, &matrices, &doc_paths);
        Ok(MatrixResult { matrices, orphaned })
    }

    /// Enumerate every simple document path from the start to a leaf
    fn document_paths(&self, graph: &TraceGraph) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        let mut path = Vec::new();
        Self::traverse(graph, &self.start, &mut path, 0, &mut paths);
        paths
    }

    fn traverse(
        graph: &TraceGraph,
        current: &str,
        path: &mut Vec<String>,
        depth: usize,
        paths: &mut Vec<Vec<String>>,
    ) {
        if depth >= MAX_TRAVERSAL_DEPTH {
            tracing::warn!(
                document = current,
                limit = MAX_TRAVERSAL_DEPTH,
                "maximum depth exceeded while enumerating document paths; possible cycle"
            );
            return;
        }

        path.push(current.to_string());
        let children = graph.document_children(current);
        if children.is_empty() {
            paths.push(path.clone());
        } else {
            for child in &children {
                Self::traverse(graph, child, path, depth + 1, paths);
            }
        }
        path.pop();
    }

    /// Build the rows for a single document path
    fn build_rows(
        &self,
        graph: &TraceGraph,
        tests: &TestIndex,
        doc_path: &[String],
    ) -> Vec<ChainRow> {
        let Some(start_prefix) = doc_path.first() else {
            return Vec::new();
        };
        let mut start_items: Vec<&Item> = graph
            .items_by_document(start_prefix)
            .into_iter()
            .filter(|i| i.active)
            .collect();
        if start_items.is_empty() {
            return Vec::new();
        }
        start_items.sort_by(|a, b| a.uid.cmp(&b.uid));

        let empty_chain: IndexMap<String, Option<Item>> =
            doc_path.iter().map(|p| (p.clone(), None)).collect();

        let mut rows = Vec::new();
        self.build_level(graph, tests, doc_path, 0, &empty_chain, &start_items, &mut rows);
        rows
    }

    /// Fan out one level of the path, carrying the partial chain forward
    fn build_level(
        &self,
        graph: &TraceGraph,
        tests: &TestIndex,
        doc_path: &[String],
        level: usize,
        parent_chain: &IndexMap<String, Option<Item>>,
        items: &[&Item],
        rows: &mut Vec<ChainRow>,
    ) {
        let current_prefix = &doc_path[level];
        let is_leaf = level == doc_path.len() - 1;

        for &item in items {
            let mut chain = parent_chain.clone();
            chain.insert(current_prefix.clone(), Some(item.clone()));

            if is_leaf {
                let records = collect_tests(graph, item, tests);
                let status = rollup_status(&records, Some(item), graph);
                rows.push(self.make_row(graph, doc_path, chain, status, records));
                continue;
            }

            let next_prefix = &doc_path[level + 1];
            let mut children: Vec<&Item> = graph
                .children_from_document(&item.uid, next_prefix)
                .into_iter()
                .filter(|i| i.active)
                .collect();
            children.sort_by(|a, b| a.uid.cmp(&b.uid));

            if children.is_empty() {
                // Dead end: a row with gaps at this and all later levels
                let records = collect_tests(graph, item, tests);
                let status = rollup_status(&records, Some(item), graph);
                rows.push(self.make_row(graph, doc_path, chain, status, records));
                continue;
            }

            // Tests attached directly to a non-leaf item get their own row
            // so they are not absorbed into the children's rows
            let direct = tests.get(&item.uid).map(Vec::as_slice).unwrap_or(&[]);
            if !direct.is_empty() {
                let records: Vec<TestRecord> = direct.to_vec();
                let status = rollup_status(&records, Some(item), graph);
                rows.push(self.make_row(graph, doc_path, chain.clone(), status, records));
            }

            self.build_level(graph, tests, doc_path, level + 1, &chain, &children, rows);
        }
    }

    fn make_row(
        &self,
        graph: &TraceGraph,
        doc_path: &[String],
        mut chain: IndexMap<String, Option<Item>>,
        rollup_status: RollupStatus,
        descendant_tests: Vec<TestRecord>,
    ) -> ChainRow {
        let ancestor_uids = if self.include_ancestors {
            chain
                .get(&doc_path[0])
                .and_then(Option::as_ref)
                .map(|start_item| {
                    graph
                        .ancestors_of(&start_item.uid)
                        .iter()
                        .filter(|a| !self.ignore_prefixes.contains(&a.document_prefix))
                        .map(|a| a.uid.clone())
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        if !self.ignore_prefixes.is_empty() {
            chain.retain(|prefix, _| !self.ignore_prefixes.contains(prefix));
        }

        ChainRow {
            chain,
            rollup_status,
            descendant_tests,
            ancestor_uids,
        }
    }

    /// Find active requirement items in the spanned documents that appear
    /// in no row of any matrix
    fn orphans(
        &self,
        graph: &TraceGraph,
        matrices: &[FullChainMatrix],
        doc_paths: &[Vec<String>],
    ) -> Vec<String> {
        let mut in_chains: HashSet<&str> = HashSet::new();
        for matrix in matrices {
            for row in &matrix.rows {
                for item in row.chain.values().flatten() {
                    in_chains.insert(item.uid.as_str());
                }
            }
        }

        let mut seen_prefixes: HashSet<&str> = HashSet::new();
        let mut orphaned: Vec<String> = Vec::new();
        for prefix in doc_paths.iter().flatten() {
            if !seen_prefixes.insert(prefix.as_str())
                || self.ignore_prefixes.contains(prefix.as_str())
            {
                continue;
            }
            for item in graph.items_by_document(prefix) {
                if item.active && item.is_normative() && !in_chains.contains(item.uid.as_str()) {
                    orphaned.push(item.uid.clone());
                }
            }
        }
        orphaned.sort_unstable();
        orphaned.dedup();

        if !orphaned.is_empty() {
            tracing::warn!(
                count = orphaned.len(),
                "items with incomplete trace chains do not reach the starting document"
            );
        }
        orphaned
    }
}
