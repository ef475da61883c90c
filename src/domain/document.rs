//! Document domain model
//!
//! A [`Document`] is the logical unit handed to a format converter. A
//! single session yields a one-section document; merging several sessions
//! concatenates their sections in order.

use super::ids::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content of one session inside a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Session this section was read from
    pub session_id: SessionId,

    /// Session title as authored
    pub title: String,

    /// Session body (Markdown)
    pub content: String,

    /// Free-form session metadata
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Section {
    /// Creates a section without metadata
    pub fn new(session_id: SessionId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            session_id,
            title: title.into(),
            content: content.into(),
            metadata: Map::new(),
        }
    }

    /// Attaches session metadata
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A logical document made of one or more session sections
///
/// # Examples
///
/// ```
/// use lectern::domain::document::{Document, Section};
/// use lectern::domain::ids::SessionId;
///
/// let first = Document::from_section(Section::new(
///     SessionId::new("s1").unwrap(),
///     "Intro Lecture",
///     "Welcome.",
/// ));
/// let second = Document::from_section(Section::new(
///     SessionId::new("s2").unwrap(),
///     "Second Lecture",
///     "Recap.",
/// ));
///
/// let merged = Document::merge(vec![first, second]).unwrap();
/// assert_eq!(merged.title, "Intro Lecture");
/// assert_eq!(merged.sections.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title, used by content-based naming
    pub title: String,

    /// Sections in session order
    pub sections: Vec<Section>,
}

impl Document {
    /// Creates a document holding a single session
    pub fn from_section(section: Section) -> Self {
        Self {
            title: section.title.clone(),
            sections: vec![section],
        }
    }

    /// Concatenates documents in order, keeping the first title
    ///
    /// Sections are neither reordered nor deduplicated. Returns `None`
    /// for an empty input.
    pub fn merge(documents: Vec<Document>) -> Option<Document> {
        let mut iter = documents.into_iter();
        let mut merged = iter.next()?;
        for doc in iter {
            merged.sections.extend(doc.sections);
        }
        Some(merged)
    }

    /// Session IDs in section order
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sections.iter().map(|s| s.session_id.clone()).collect()
    }

    /// Renders the document as Markdown, one heading per section
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str("# ");
            out.push_str(&section.title);
            out.push_str("\n\n");
            out.push_str(section.content.trim_end());
            out.push('\n');
        }
        out
    }
}
