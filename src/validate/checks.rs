//! The validation check battery

use std::collections::{HashMap, HashSet};

use crate::digest::item_digest;
use crate::graph::{DocumentHierarchy, Item, TraceGraph};

use super::issue::{IssueLevel, ValidationIssue};

/// Validation run over a hierarchy and graph
///
/// Nine independently toggleable checks, all enabled by default. Every
/// check ignores inactive items and skipped document prefixes, collects
/// issues instead of failing, and leaves both structures untouched.
///
/// # Example
///
/// ```
/// use tracery::{DocumentDescriptor, DocumentHierarchy, TraceGraph, Validation};
///
/// let mut hierarchy = DocumentHierarchy::new();
/// hierarchy.insert(DocumentDescriptor::new("SRS").with_parent("SYS"));
/// hierarchy.insert(DocumentDescriptor::new("SYS"));
///
/// let issues = Validation::new()
///     .skip_prefix("LEGACY")
///     .run(&hierarchy, &TraceGraph::new());
/// assert!(issues.iter().all(|i| !i.is_error()));
/// ```
#[derive(Debug, Clone)]
pub struct Validation {
    check_hierarchy: bool,
    check_links: bool,
    check_suspect: bool,
    check_review: bool,
    check_children: bool,
    check_empty_documents: bool,
    check_empty_text: bool,
    check_item_cycles: bool,
    check_unlinked: bool,
    skip_prefixes: HashSet<String>,
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}

impl Validation {
    /// Create a validation run with every check enabled
    pub fn new() -> Self {
        Self {
            check_hierarchy: true,
            check_links: true,
            check_suspect: true,
            check_review: true,
            check_children: true,
            check_empty_documents: true,
            check_empty_text: true,
            check_item_cycles: true,
            check_unlinked: true,
            skip_prefixes: HashSet::new(),
        }
    }

    /// Toggle the document-hierarchy acyclicity check
    pub fn check_hierarchy(mut self, enabled: bool) -> Self {
        self.check_hierarchy = enabled;
        self
    }

    /// Toggle link validity and conformance checking
    pub fn check_links(mut self, enabled: bool) -> Self {
        self.check_links = enabled;
        self
    }

    /// Toggle suspect-link detection
    pub fn check_suspect(mut self, enabled: bool) -> Self {
        self.check_suspect = enabled;
        self
    }

    /// Toggle review-status checking
    pub fn check_review(mut self, enabled: bool) -> Self {
        self.check_review = enabled;
        self
    }

    /// Toggle the children-link-back check
    pub fn check_children(mut self, enabled: bool) -> Self {
        self.check_children = enabled;
        self
    }

    /// Toggle the empty-document check
    pub fn check_empty_documents(mut self, enabled: bool) -> Self {
        self.check_empty_documents = enabled;
        self
    }

    /// Toggle the empty-text check
    pub fn check_empty_text(mut self, enabled: bool) -> Self {
        self.check_empty_text = enabled;
        self
    }

    /// Toggle item-link cycle detection
    pub fn check_item_cycles(mut self, enabled: bool) -> Self {
        self.check_item_cycles = enabled;
        self
    }

    /// Toggle the unlinked-normative-item check
    pub fn check_unlinked(mut self, enabled: bool) -> Self {
        self.check_unlinked = enabled;
        self
    }

    /// Skip a document prefix during validation
    pub fn skip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.skip_prefixes.insert(prefix.into());
        self
    }

    /// Skip several document prefixes during validation
    pub fn skip_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Run the enabled checks and collect every issue in one pass
    pub fn run(&self, hierarchy: &DocumentHierarchy, graph: &TraceGraph) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.check_hierarchy {
            for message in hierarchy.validate_acyclic() {
                issues.push(ValidationIssue::global(IssueLevel::Error, message));
            }
        }
        if self.check_links {
            self.links(hierarchy, graph, &mut issues);
        }
        if self.check_suspect {
            self.suspect(graph, &mut issues);
        }
        if self.check_review {
            self.review(graph, &mut issues);
        }
        if self.check_children {
            self.children(hierarchy, graph, &mut issues);
        }
        if self.check_empty_documents {
            self.empty_documents(hierarchy, graph, &mut issues);
        }
        if self.check_empty_text {
            self.empty_text(graph, &mut issues);
        }
        if self.check_item_cycles {
            self.item_cycles(graph, &mut issues);
        }
        if self.check_unlinked {
            self.unlinked(hierarchy, graph, &mut issues);
        }

        issues
    }

    fn included(&self, item: &Item) -> bool {
        item.active && !self.skip_prefixes.contains(&item.document_prefix)
    }

    /// Check 2: link validity and conformance
    fn links(
        &self,
        hierarchy: &DocumentHierarchy,
        graph: &TraceGraph,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for item in graph.items() {
            if !self.included(item) {
                continue;
            }
            let declared_parents = hierarchy.parents_of(&item.document_prefix);

            for link in &item.links {
                if link == &item.uid {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Warning,
                        &item.uid,
                        &item.document_prefix,
                        "links to itself",
                    ));
                    continue;
                }
                let Some(target) = graph.get(link) else {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Error,
                        &item.uid,
                        &item.document_prefix,
                        format!("links to non-existent item: {link}"),
                    ));
                    continue;
                };
                if !target.active {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Error,
                        &item.uid,
                        &item.document_prefix,
                        format!("links to inactive item: {link}"),
                    ));
                    continue;
                }
                if !item.is_normative() {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Warning,
                        &item.uid,
                        &item.document_prefix,
                        format!("{} item links to {link}", item.item_type),
                    ));
                } else if !target.is_normative() {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Warning,
                        &item.uid,
                        &item.document_prefix,
                        format!("links to {} item: {link}", target.item_type),
                    ));
                }
                if !declared_parents.is_empty()
                    && !declared_parents.contains(&target.document_prefix)
                {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Warning,
                        &item.uid,
                        &item.document_prefix,
                        format!(
                            "links to {link} in document {}, which is not a parent document (expected: {})",
                            target.document_prefix,
                            declared_parents.join(", "),
                        ),
                    ));
                }
            }
        }
    }

    /// Check 3: suspect links (stored digest no longer matches the target)
    fn suspect(&self, graph: &TraceGraph, issues: &mut Vec<ValidationIssue>) {
        for item in graph.items() {
            if !self.included(item) {
                continue;
            }
            for link in &item.links {
                let Some(target) = graph.get(link) else {
                    continue;
                };
                if !target.active {
                    continue;
                }
                match item.link_hashes.get(link) {
                    None => issues.push(ValidationIssue::for_item(
                        IssueLevel::Warning,
                        &item.uid,
                        &item.document_prefix,
                        format!("unverified link to {link}"),
                    )),
                    Some(stored) if stored != &item_digest(target) => {
                        issues.push(ValidationIssue::for_item(
                            IssueLevel::Warning,
                            &item.uid,
                            &item.document_prefix,
                            format!("suspect link to {link} (content may have changed)"),
                        ));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    /// Check 4: review status of requirement items
    fn review(&self, graph: &TraceGraph, issues: &mut Vec<ValidationIssue>) {
        for item in graph.items() {
            if !self.included(item) || !item.is_normative() {
                continue;
            }
            match item.reviewed.as_deref() {
                None | Some("") => issues.push(ValidationIssue::for_item(
                    IssueLevel::Warning,
                    &item.uid,
                    &item.document_prefix,
                    "has not been reviewed",
                )),
                Some(stored) if stored != item_digest(item) => {
                    issues.push(ValidationIssue::for_item(
                        IssueLevel::Warning,
                        &item.uid,
                        &item.document_prefix,
                        "modified since last review",
                    ));
                }
                Some(_) => {}
            }
        }
    }

    /// Check 5: requirement items in non-leaf documents need child links
    fn children(
        &self,
        hierarchy: &DocumentHierarchy,
        graph: &TraceGraph,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let linked_to: HashSet<&str> = graph
            .items()
            .filter(|i| i.active)
            .flat_map(|i| i.links.iter().map(String::as_str))
            .collect();

        for item in graph.items() {
            if !self.included(item) || !item.is_normative() {
                continue;
            }
            if hierarchy.children_of(&item.document_prefix).is_empty() {
                continue;
            }
            if !linked_to.contains(item.uid.as_str()) {
                issues.push(ValidationIssue::for_item(
                    IssueLevel::Warning,
                    &item.uid,
                    &item.document_prefix,
                    "has no children linking to it from child documents",
                ));
            }
        }
    }

    /// Check 6: registered documents with no active items
    fn empty_documents(
        &self,
        hierarchy: &DocumentHierarchy,
        graph: &TraceGraph,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for prefix in hierarchy.prefixes() {
            if self.skip_prefixes.contains(prefix) {
                continue;
            }
            let has_items = graph.items_by_document(prefix).iter().any(|i| i.active);
            if !has_items {
                issues.push(ValidationIssue::for_document(
                    IssueLevel::Warning,
                    prefix,
                    "contains no items",
                ));
            }
        }
    }

    /// Check 7: active items with empty or all-whitespace text
    fn empty_text(&self, graph: &TraceGraph, issues: &mut Vec<ValidationIssue>) {
        for item in graph.items() {
            if !self.included(item) {
                continue;
            }
            if item.text.trim().is_empty() {
                issues.push(ValidationIssue::for_item(
                    IssueLevel::Warning,
                    &item.uid,
                    &item.document_prefix,
                    "has empty text",
                ));
            }
        }
    }

    /// Check 8: cycles in item links
    ///
    /// Iterative depth-first search with three-color marking over the
    /// subgraph of included items. A link back to an in-progress item is
    /// a cycle; each distinct cycle (keyed by its member set) is reported
    /// once, naming the full path.
    fn item_cycles(&self, graph: &TraceGraph, issues: &mut Vec<ValidationIssue>) {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut color: HashMap<&str, Color> = graph
            .items()
            .filter(|i| self.included(i))
            .map(|i| (i.uid.as_str(), Color::White))
            .collect();
        let mut reported: HashSet<Vec<String>> = HashSet::new();

        let in_scope: Vec<&str> = graph
            .items()
            .filter(|i| self.included(i))
            .map(|i| i.uid.as_str())
            .collect();

        for &start in &in_scope {
            if color[start] != Color::White {
                continue;
            }
            color.insert(start, Color::Gray);
            let mut stack: Vec<(&str, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let (uid, index) = *frame;
                let links = graph.item_parents(uid);
                if index >= links.len() {
                    color.insert(uid, Color::Black);
                    stack.pop();
                    continue;
                }
                frame.1 += 1;

                let next = links[index].as_str();
                match color.get(next).copied() {
                    None => {} // dangling, inactive, or skipped target
                    Some(Color::White) => {
                        color.insert(next, Color::Gray);
                        stack.push((next, 0));
                    }
                    Some(Color::Gray) => {
                        let position = stack
                            .iter()
                            .position(|(u, _)| *u == next)
                            .expect("gray item is on the stack");
                        let members: Vec<&str> = stack[position..].iter().map(|(u, _)| *u).collect();
                        let mut key: Vec<String> =
                            members.iter().map(|u| u.to_string()).collect();
                        key.sort_unstable();
                        if reported.insert(key) {
                            let mut path: Vec<&str> = members;
                            path.push(next);
                            let doc = graph
                                .get(next)
                                .map(|i| i.document_prefix.clone())
                                .unwrap_or_default();
                            issues.push(ValidationIssue::for_item(
                                IssueLevel::Error,
                                next,
                                doc,
                                format!("item links form a cycle: {}", path.join(" -> ")),
                            ));
                        }
                    }
                    Some(Color::Black) => {}
                }
            }
        }
    }

    /// Check 9: normative items missing upward links
    fn unlinked(
        &self,
        hierarchy: &DocumentHierarchy,
        graph: &TraceGraph,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for item in graph.items() {
            if !self.included(item) || !item.is_normative() || item.derived {
                continue;
            }
            if item.links.is_empty() && !hierarchy.parents_of(&item.document_prefix).is_empty() {
                issues.push(ValidationIssue::for_item(
                    IssueLevel::Warning,
                    &item.uid,
                    &item.document_prefix,
                    "has no links to parent documents",
                ));
            }
        }
    }
}
