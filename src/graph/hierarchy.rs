//! Document hierarchy: a DAG of document descriptors

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Errors that can occur in tracery operations
///
/// These are the structural failures: everything else in the engine is
/// collected as soft validation issues instead of returned as errors.
#[derive(Debug, Error)]
pub enum TraceryError {
    #[error("document '{prefix}' references unknown parent '{parent}'")]
    MissingParentDocument { prefix: String, parent: String },

    #[error("document not found in hierarchy: {0}")]
    UnknownDocument(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for tracery operations
pub type TraceryResult<T> = Result<T, TraceryError>;

fn default_uid_digits() -> usize {
    3
}

/// Descriptor for a single requirements document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    /// Unique document prefix (e.g. `SRS`)
    pub prefix: String,
    /// Parent document prefixes; empty means root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Zero-padded width of item numbers in UIDs
    #[serde(default = "default_uid_digits")]
    pub uid_digits: usize,
    /// Separator between prefix and number in UIDs
    #[serde(default)]
    pub uid_separator: String,
}

impl DocumentDescriptor {
    /// Create a root document descriptor with default UID formatting
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            parents: Vec::new(),
            uid_digits: 3,
            uid_separator: String::new(),
        }
    }

    /// Add a parent document
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Replace the parent documents
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Set UID number width and separator
    pub fn with_uid_format(mut self, digits: usize, separator: impl Into<String>) -> Self {
        self.uid_digits = digits;
        self.uid_separator = separator.into();
        self
    }

    /// Compose the UID for an item number in this document
    pub fn format_uid(&self, number: usize) -> String {
        format!(
            "{}{}{:0width$}",
            self.prefix,
            self.uid_separator,
            number,
            width = self.uid_digits
        )
    }
}

/// A DAG of document descriptors keyed by prefix
///
/// Supports multiple parents per document. Lookup queries are defensive:
/// unknown prefixes yield empty collections. Only topological ordering
/// over a hierarchy with a dangling parent reference fails hard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentHierarchy {
    documents: IndexMap<String, DocumentDescriptor>,
}

impl DocumentHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document descriptor, replacing any existing one
    pub fn insert(&mut self, descriptor: DocumentDescriptor) {
        self.documents.insert(descriptor.prefix.clone(), descriptor);
    }

    /// Get a descriptor by prefix
    pub fn get(&self, prefix: &str) -> Option<&DocumentDescriptor> {
        self.documents.get(prefix)
    }

    /// Check whether a prefix is registered
    pub fn contains(&self, prefix: &str) -> bool {
        self.documents.contains_key(prefix)
    }

    /// Number of registered documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the hierarchy is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All registered prefixes, in insertion order
    pub fn prefixes(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    /// Parent prefixes of a document; empty for unknown prefixes
    pub fn parents_of(&self, prefix: &str) -> Vec<String> {
        self.documents
            .get(prefix)
            .map(|d| d.parents.clone())
            .unwrap_or_default()
    }

    /// Child prefixes of a document; empty for unknown prefixes
    pub fn children_of(&self, prefix: &str) -> Vec<String> {
        self.documents
            .iter()
            .filter(|(_, d)| d.parents.iter().any(|p| p == prefix))
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Documents with no parents
    pub fn root_documents(&self) -> Vec<String> {
        self.documents
            .iter()
            .filter(|(_, d)| d.parents.is_empty())
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Documents that are not a parent of any other document
    pub fn leaf_documents(&self) -> Vec<String> {
        let all_parents: HashSet<&str> = self
            .documents
            .values()
            .flat_map(|d| d.parents.iter().map(String::as_str))
            .collect();
        self.documents
            .keys()
            .filter(|p| !all_parents.contains(p.as_str()))
            .cloned()
            .collect()
    }

    /// Prefixes in topological order (parents before children)
    ///
    /// Kahn's algorithm with a FIFO ready-queue. If the hierarchy contains
    /// a cycle, all acyclic nodes come first in valid order and the cycle
    /// participants are appended in arbitrary order.
    ///
    /// Fails with [`TraceryError::MissingParentDocument`] if any descriptor
    /// references a prefix absent from the hierarchy.
    pub fn topological_order(&self) -> TraceryResult<Vec<String>> {
        let (mut in_degree, children_map) = self.in_degree_map(true)?;

        let mut queue: VecDeque<&str> = VecDeque::new();
        for (&prefix, &degree) in in_degree.iter() {
            if degree == 0 {
                queue.push_back(prefix);
            }
        }

        let mut result: Vec<String> = Vec::with_capacity(self.documents.len());
        while let Some(node) = queue.pop_front() {
            result.push(node.to_string());
            for &child in children_map.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                let degree = in_degree.get_mut(child).expect("child is registered");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(child);
                }
            }
        }

        // Cycle participants, if any, go last; their order carries no meaning
        if result.len() < self.documents.len() {
            let emitted: HashSet<&str> = result.iter().map(String::as_str).collect();
            let remaining: Vec<String> = self
                .documents
                .keys()
                .filter(|prefix| !emitted.contains(prefix.as_str()))
                .cloned()
                .collect();
            result.extend(remaining);
        }

        Ok(result)
    }

    /// Check for cycles, returning one message per disjoint cycle group
    ///
    /// Runs the same in-degree pass as [`topological_order`]; any prefix
    /// left unvisited after the queue drains participates in a cycle.
    /// Unknown parent references are ignored here — they surface as the
    /// hard error in [`topological_order`] instead.
    ///
    /// [`topological_order`]: DocumentHierarchy::topological_order
    pub fn validate_acyclic(&self) -> Vec<String> {
        let (mut in_degree, children_map) = self
            .in_degree_map(false)
            .expect("missing parents are skipped");

        let mut queue: VecDeque<&str> = VecDeque::new();
        for (&prefix, &degree) in in_degree.iter() {
            if degree == 0 {
                queue.push_back(prefix);
            }
        }

        let mut visited: HashSet<&str> = HashSet::new();
        while let Some(node) = queue.pop_front() {
            visited.insert(node);
            for &child in children_map.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                let degree = in_degree.get_mut(child).expect("child is registered");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(child);
                }
            }
        }

        let unvisited: HashSet<&str> = self
            .documents
            .keys()
            .map(String::as_str)
            .filter(|p| !visited.contains(p))
            .collect();
        if unvisited.is_empty() {
            return Vec::new();
        }

        // Partition the remainder into connected groups so two unrelated
        // cycles produce two messages rather than one lump.
        let mut errors = Vec::new();
        let mut grouped: HashSet<&str> = HashSet::new();
        for start in self.documents.keys().map(String::as_str) {
            if !unvisited.contains(start) || grouped.contains(start) {
                continue;
            }
            let mut members = vec![start];
            let mut frontier = VecDeque::from([start]);
            grouped.insert(start);
            while let Some(node) = frontier.pop_front() {
                for &other in &unvisited {
                    if grouped.contains(other) {
                        continue;
                    }
                    let linked = self.linked(node, other) || self.linked(other, node);
                    if linked {
                        grouped.insert(other);
                        members.push(other);
                        frontier.push_back(other);
                    }
                }
            }
            members.sort_unstable();
            errors.push(format!(
                "Cycle detected among documents: {}",
                members.join(", ")
            ));
        }
        errors
    }

    fn linked(&self, child: &str, parent: &str) -> bool {
        self.documents
            .get(child)
            .map(|d| d.parents.iter().any(|p| p == parent))
            .unwrap_or(false)
    }

    /// Build the in-degree and child-adjacency maps for Kahn's algorithm
    ///
    /// With `strict` set, a parent reference to an unregistered prefix is
    /// the structural error; otherwise such references are skipped.
    fn in_degree_map(
        &self,
        strict: bool,
    ) -> TraceryResult<(IndexMap<&str, usize>, HashMap<&str, Vec<&str>>)> {
        let mut in_degree: IndexMap<&str, usize> =
            self.documents.keys().map(|p| (p.as_str(), 0)).collect();
        let mut children_map: HashMap<&str, Vec<&str>> = HashMap::new();

        for (prefix, descriptor) in &self.documents {
            for parent in &descriptor.parents {
                if self.documents.contains_key(parent) {
                    *in_degree.get_mut(prefix.as_str()).expect("prefix is registered") += 1;
                    children_map
                        .entry(parent.as_str())
                        .or_default()
                        .push(prefix.as_str());
                } else if strict {
                    return Err(TraceryError::MissingParentDocument {
                        prefix: prefix.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        Ok((in_degree, children_map))
    }
}
