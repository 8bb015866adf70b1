//! Item representation: a single requirement-like record

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item type classification
///
/// A closed set: validation and rollup logic branch on exactly these
/// three cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A binding, normative requirement
    #[default]
    Requirement,
    /// An informational note
    Info,
    /// A section heading
    Heading,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Requirement => write!(f, "requirement"),
            ItemType::Info => write!(f, "info"),
            ItemType::Heading => write!(f, "heading"),
        }
    }
}

/// Typed values for user-defined item attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<AttributeValue>),
    Object(HashMap<String, AttributeValue>),
}

fn default_true() -> bool {
    true
}

/// A single requirement-like record
///
/// Items are produced by an external storage layer and read-only once
/// inside the graph. `links` lists parent item UIDs in insertion order;
/// `link_hashes` carries the content digest of each linked target as it
/// was when the link was last verified, keyed by target UID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier across the whole graph (e.g. `SRS001`)
    pub uid: String,
    /// Body text
    pub text: String,
    /// Prefix of the owning document
    pub document_prefix: String,
    /// Inactive items are excluded from all checks and rollups
    #[serde(default = "default_true")]
    pub active: bool,
    /// Item type
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    /// Optional display title overriding truncated text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    /// UIDs of parent items this item traces to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    /// Content digest of each link target, captured at verification time
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub link_hashes: HashMap<String, String>,
    /// Content digest recorded at last review, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed: Option<String>,
    /// Derived items intentionally have no upward links
    #[serde(default)]
    pub derived: bool,
    /// Non-testable items show N/A instead of Not Covered in matrices
    #[serde(default = "default_true")]
    pub testable: bool,
    /// Arbitrary user-defined key-value pairs
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_attributes: HashMap<String, AttributeValue>,
}

impl Item {
    /// Create a new active requirement item
    pub fn new(
        uid: impl Into<String>,
        text: impl Into<String>,
        document_prefix: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            text: text.into(),
            document_prefix: document_prefix.into(),
            active: true,
            item_type: ItemType::Requirement,
            header: None,
            links: Vec::new(),
            link_hashes: HashMap::new(),
            reviewed: None,
            derived: false,
            testable: true,
            custom_attributes: HashMap::new(),
        }
    }

    /// Set the display header
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the item type
    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    /// Replace the parent links
    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Add a single parent link
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    /// Record the verified content digest for a link target
    pub fn with_link_hash(mut self, link: impl Into<String>, hash: impl Into<String>) -> Self {
        self.link_hashes.insert(link.into(), hash.into());
        self
    }

    /// Set the stored review digest
    pub fn with_reviewed(mut self, digest: impl Into<String>) -> Self {
        self.reviewed = Some(digest.into());
        self
    }

    /// Mark the item inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Mark the item as derived (exempt from upward-link checks)
    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Mark the item as not verifiable by testing
    pub fn not_testable(mut self) -> Self {
        self.testable = false;
        self
    }

    /// Add a user-defined attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.custom_attributes.insert(key.into(), value);
        self
    }

    /// Record the current content digest as the review digest
    pub fn reviewed_now(mut self) -> Self {
        self.reviewed = Some(crate::digest::item_digest(&self));
        self
    }

    /// Whether this item is a binding requirement
    pub fn is_normative(&self) -> bool {
        self.item_type == ItemType::Requirement
    }

    /// Header if present, otherwise body text truncated to 80 characters
    ///
    /// Truncation prefers a word boundary when one falls past position 60,
    /// and counts characters rather than bytes so multi-byte text is never
    /// split mid-codepoint.
    pub fn display_text(&self) -> String {
        if let Some(header) = self.header.as_deref().filter(|h| !h.is_empty()) {
            return header.to_string();
        }
        if self.text.chars().count() > 80 {
            let mut truncated: String = self.text.chars().take(80).collect();
            if let Some(pos) = truncated.rfind(' ') {
                if truncated[..pos].chars().count() > 60 {
                    truncated.truncate(pos);
                }
            }
            truncated.push_str("...");
            return truncated;
        }
        self.text.clone()
    }

    /// `"header - text"` when a header is present, otherwise the text
    ///
    /// Used by chain matrices where both title and body are wanted.
    pub fn full_display_text(&self) -> String {
        match self.header.as_deref().filter(|h| !h.is_empty()) {
            Some(header) => format!("{} - {}", header, self.text),
            None => self.text.clone(),
        }
    }
}
