//! TraceGraph: items plus derived parent/child link indices

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use super::item::Item;

/// The item-level traceability graph
///
/// Holds all items keyed by UID together with two derived indices: the
/// forward parent index (a materialized copy of each item's `links`) and
/// the reverse child index. [`add_item`] is the only mutation path and
/// keeps both indices consistent, so the graph is never observed
/// half-updated.
///
/// Document-level parent facts are mirrored in `document_parents` by
/// whoever populates the graph; they are not derived from a
/// [`DocumentHierarchy`](super::DocumentHierarchy) automatically.
///
/// [`add_item`]: TraceGraph::add_item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceGraph {
    items: IndexMap<String, Item>,
    item_parents: HashMap<String, Vec<String>>,
    item_children: HashMap<String, Vec<String>>,
    document_parents: IndexMap<String, Vec<String>>,
}

impl TraceGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, updating the forward and reverse link indices
    ///
    /// Re-inserting an item with the same UID first unwires its previous
    /// links, so insertion is idempotent. Dangling parent UIDs are stored
    /// as-is; they surface as validation issues, never as traversal
    /// failures.
    pub fn add_item(&mut self, item: Item) {
        let uid = item.uid.clone();

        if self.items.contains_key(&uid) {
            tracing::debug!(uid = %uid, "replacing existing item");
            for old_parent in self.item_parents.get(&uid).cloned().unwrap_or_default() {
                if let Some(children) = self.item_children.get_mut(&old_parent) {
                    children.retain(|c| c != &uid);
                }
            }
        }

        self.item_parents.insert(uid.clone(), item.links.clone());
        self.item_children.entry(uid.clone()).or_default();
        for parent_uid in &item.links {
            let children = self.item_children.entry(parent_uid.clone()).or_default();
            if !children.contains(&uid) {
                children.push(uid.clone());
            }
        }
        self.items.insert(uid, item);
    }

    /// Replace the parent documents recorded for a prefix
    pub fn set_document_parents<I, S>(&mut self, prefix: impl Into<String>, parents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document_parents
            .insert(prefix.into(), parents.into_iter().map(Into::into).collect());
    }

    /// Add a parent document without removing existing ones
    pub fn add_document_parent(&mut self, prefix: impl Into<String>, parent: impl Into<String>) {
        let parents = self.document_parents.entry(prefix.into()).or_default();
        let parent = parent.into();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    /// Get an item by UID
    pub fn get(&self, uid: &str) -> Option<&Item> {
        self.items.get(uid)
    }

    /// Check whether an item exists
    pub fn contains(&self, uid: &str) -> bool {
        self.items.contains_key(uid)
    }

    /// Number of items in the graph
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the graph holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, in insertion order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Parent UIDs recorded for an item; empty for unknown UIDs
    pub fn item_parents(&self, uid: &str) -> &[String] {
        self.item_parents.get(uid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Child UIDs recorded for an item; empty for unknown UIDs
    pub fn item_children(&self, uid: &str) -> &[String] {
        self.item_children
            .get(uid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All ancestors of an item, following links upward
    ///
    /// Breadth-first from immediate parents outward. A visited set
    /// terminates traversal if links form a cycle; UIDs absent from the
    /// graph are skipped silently.
    pub fn ancestors_of(&self, uid: &str) -> Vec<&Item> {
        self.walk(uid, &self.item_parents)
    }

    /// All descendants of an item, following the child index downward
    pub fn descendants_of(&self, uid: &str) -> Vec<&Item> {
        self.walk(uid, &self.item_children)
    }

    /// Self (if present) plus all ancestors and descendants, deduplicated
    pub fn neighbors_of(&self, uid: &str) -> Vec<&Item> {
        let mut neighbors = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        if let Some(item) = self.items.get(uid) {
            neighbors.push(item);
            seen.insert(item.uid.as_str());
        }
        for item in self.ancestors_of(uid) {
            if seen.insert(item.uid.as_str()) {
                neighbors.push(item);
            }
        }
        for item in self.descendants_of(uid) {
            if seen.insert(item.uid.as_str()) {
                neighbors.push(item);
            }
        }
        neighbors
    }

    /// Children of an item that belong to the given document
    pub fn children_from_document(&self, uid: &str, prefix: &str) -> Vec<&Item> {
        self.filter_by_document(self.item_children(uid), prefix)
    }

    /// Parents of an item that belong to the given document
    pub fn parents_from_document(&self, uid: &str, prefix: &str) -> Vec<&Item> {
        self.filter_by_document(self.item_parents(uid), prefix)
    }

    /// All items belonging to a document, in insertion order
    pub fn items_by_document(&self, prefix: &str) -> Vec<&Item> {
        self.items
            .values()
            .filter(|i| i.document_prefix == prefix)
            .collect()
    }

    /// Document prefixes recorded with no parents
    pub fn root_documents(&self) -> Vec<String> {
        self.document_parents
            .iter()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Document prefixes that are not a parent of any other document
    pub fn leaf_documents(&self) -> Vec<String> {
        let all_parents: HashSet<&str> = self
            .document_parents
            .values()
            .flat_map(|parents| parents.iter().map(String::as_str))
            .collect();
        self.document_parents
            .keys()
            .filter(|p| !all_parents.contains(p.as_str()))
            .cloned()
            .collect()
    }

    /// Child document prefixes recorded for a document
    pub fn document_children(&self, prefix: &str) -> Vec<String> {
        self.document_parents
            .iter()
            .filter(|(_, parents)| parents.iter().any(|p| p == prefix))
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Parent document prefixes recorded for a document
    pub fn document_parents(&self, prefix: &str) -> &[String] {
        self.document_parents
            .get(prefix)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a document prefix has been recorded
    pub fn has_document(&self, prefix: &str) -> bool {
        self.document_parents.contains_key(prefix)
    }

    fn walk<'a>(&'a self, uid: &str, index: &'a HashMap<String, Vec<String>>) -> Vec<&'a Item> {
        let mut found = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut to_visit: VecDeque<&str> = index
            .get(uid)
            .map(|next| next.iter().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(next_uid) = to_visit.pop_front() {
            if !visited.insert(next_uid) {
                continue;
            }
            if let Some(item) = self.items.get(next_uid) {
                found.push(item);
                if let Some(onward) = index.get(next_uid) {
                    to_visit.extend(onward.iter().map(String::as_str));
                }
            }
        }
        found
    }

    fn filter_by_document(&self, uids: &[String], prefix: &str) -> Vec<&Item> {
        uids.iter()
            .filter_map(|uid| self.items.get(uid))
            .filter(|item| item.document_prefix == prefix)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Item;

    fn linked_graph() -> TraceGraph {
        let mut graph = TraceGraph::new();
        graph.set_document_parents("UN", Vec::<String>::new());
        graph.set_document_parents("SYS", ["UN"]);
        graph.set_document_parents("SRS", ["SYS"]);
        graph.add_item(Item::new("UN001", "User need", "UN"));
        graph.add_item(Item::new("SYS001", "System req", "SYS").with_links(["UN001"]));
        graph.add_item(Item::new("SYS002", "Another system req", "SYS").with_links(["UN001"]));
        graph.add_item(Item::new("SRS001", "Software req", "SRS").with_links(["SYS001"]));
        graph
    }

    #[test]
    fn add_item_populates_both_indices() {
        let graph = linked_graph();
        assert_eq!(graph.item_parents("SRS001"), ["SYS001"]);
        assert_eq!(graph.item_children("SYS001"), ["SRS001"]);
        assert_eq!(graph.item_children("UN001"), ["SYS001", "SYS002"]);
        assert!(graph.item_children("SRS001").is_empty());
    }

    #[test]
    fn add_item_reinsertion_is_idempotent() {
        let mut graph = linked_graph();
        graph.add_item(Item::new("SRS001", "Software req", "SRS").with_links(["SYS001"]));
        assert_eq!(graph.item_children("SYS001"), ["SRS001"]);
    }

    #[test]
    fn add_item_reinsertion_unwires_old_links() {
        let mut graph = linked_graph();
        graph.add_item(Item::new("SRS001", "Software req", "SRS").with_links(["SYS002"]));
        assert!(graph.item_children("SYS001").is_empty());
        assert_eq!(graph.item_children("SYS002"), ["SRS001"]);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let graph = linked_graph();
        let ancestors = graph.ancestors_of("SRS001");
        let uids: Vec<&str> = ancestors.iter().map(|i| i.uid.as_str()).collect();
        assert_eq!(uids, ["SYS001", "UN001"]);
    }

    #[test]
    fn descendants_walk_to_leaves() {
        let graph = linked_graph();
        let uids: Vec<&str> = graph
            .descendants_of("UN001")
            .iter()
            .map(|i| i.uid.as_str())
            .collect();
        assert_eq!(uids, ["SYS001", "SYS002", "SRS001"]);
    }

    #[test]
    fn traversal_terminates_on_link_cycle() {
        let mut graph = TraceGraph::new();
        graph.add_item(Item::new("A", "a", "DOC").with_links(["B"]));
        graph.add_item(Item::new("B", "b", "DOC").with_links(["A"]));

        let ancestors = graph.ancestors_of("A");
        let uids: Vec<&str> = ancestors.iter().map(|i| i.uid.as_str()).collect();
        assert_eq!(uids, ["B", "A"]);

        let descendants = graph.descendants_of("A");
        assert_eq!(descendants.len(), 2);
    }

    #[test]
    fn dangling_links_are_skipped() {
        let mut graph = TraceGraph::new();
        graph.add_item(Item::new("SRS001", "req", "SRS").with_links(["GHOST"]));
        assert!(graph.ancestors_of("SRS001").is_empty());
        assert_eq!(graph.item_parents("SRS001"), ["GHOST"]);
    }

    #[test]
    fn neighbors_put_self_first() {
        let graph = linked_graph();
        let uids: Vec<&str> = graph
            .neighbors_of("SYS001")
            .iter()
            .map(|i| i.uid.as_str())
            .collect();
        assert_eq!(uids, ["SYS001", "UN001", "SRS001"]);
    }

    #[test]
    fn neighbors_of_unknown_uid_is_empty() {
        let graph = linked_graph();
        assert!(graph.neighbors_of("GHOST").is_empty());
    }

    #[test]
    fn document_filters() {
        let graph = linked_graph();
        let children: Vec<&str> = graph
            .children_from_document("UN001", "SYS")
            .iter()
            .map(|i| i.uid.as_str())
            .collect();
        assert_eq!(children, ["SYS001", "SYS002"]);
        assert!(graph.children_from_document("UN001", "SRS").is_empty());

        let parents: Vec<&str> = graph
            .parents_from_document("SRS001", "SYS")
            .iter()
            .map(|i| i.uid.as_str())
            .collect();
        assert_eq!(parents, ["SYS001"]);
    }

    #[test]
    fn items_by_document() {
        let graph = linked_graph();
        assert_eq!(graph.items_by_document("SYS").len(), 2);
        assert!(graph.items_by_document("NOPE").is_empty());
    }

    #[test]
    fn document_level_queries() {
        let graph = linked_graph();
        assert_eq!(graph.root_documents(), ["UN"]);
        assert_eq!(graph.leaf_documents(), ["SRS"]);
        assert_eq!(graph.document_children("UN"), ["SYS"]);
        assert_eq!(graph.document_parents("SRS"), ["SYS"]);
    }
}
