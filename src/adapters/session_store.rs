//! Session store implementations
//!
//! - [`FileSessionStore`] reads `{root}/{id}.json` or `{root}/{id}.md`.
//! - [`InMemorySessionStore`] keeps documents in a map.

use super::traits::SessionStore;
use crate::domain::{Document, ExportError, Section, SessionId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// On-disk JSON session record
#[derive(Debug, Deserialize)]
struct SessionRecord {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

/// Session store backed by a directory of JSON or Markdown files
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_safe_id(id: &str) -> bool {
        !id.contains('/') && !id.contains('\\') && !id.contains("..") && !id.starts_with('.')
    }

    fn parse_json(session_id: &SessionId, raw: &str) -> Result<Document, ExportError> {
        let record: SessionRecord = serde_json::from_str(raw).map_err(|e| {
            ExportError::Io(format!("session '{session_id}' is not valid JSON: {e}"))
        })?;
        Ok(Document::from_section(
            Section::new(session_id.clone(), record.title, record.content)
                .with_metadata(record.metadata),
        ))
    }

    fn parse_markdown(session_id: &SessionId, raw: &str) -> Document {
        let title = raw
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| session_id.to_string());
        Document::from_section(Section::new(session_id.clone(), title, raw))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get_session_content(&self, session_id: &SessionId) -> Result<Document, ExportError> {
        if !Self::is_safe_id(session_id.as_str()) {
            tracing::warn!(session_id = %session_id, "Rejected unsafe session id");
            return Err(ExportError::SessionNotFound(session_id.to_string()));
        }

        let json_path = self.root.join(format!("{session_id}.json"));
        match tokio::fs::read_to_string(&json_path).await {
            Ok(raw) => return Self::parse_json(session_id, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ExportError::Io(format!("{}: {e}", json_path.display()))),
        }

        let md_path = self.root.join(format!("{session_id}.md"));
        match tokio::fs::read_to_string(&md_path).await {
            Ok(raw) => Ok(Self::parse_markdown(session_id, &raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    session_id = %session_id,
                    root = %self.root.display(),
                    "Session not found"
                );
                Err(ExportError::SessionNotFound(session_id.to_string()))
            }
            Err(e) => Err(ExportError::Io(format!("{}: {e}", md_path.display()))),
        }
    }
}

/// Session store holding documents in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: HashMap<SessionId, Document>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session with a title and Markdown body
    pub fn insert(&mut self, session_id: SessionId, title: &str, content: &str) {
        let doc = Document::from_section(Section::new(session_id.clone(), title, content));
        self.sessions.insert(session_id, doc);
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with_session(mut self, session_id: &str, title: &str, content: &str) -> Self {
        if let Ok(id) = SessionId::new(session_id) {
            self.insert(id, title, content);
        }
        self
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session_content(&self, session_id: &SessionId) -> Result<Document, ExportError> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| ExportError::SessionNotFound(session_id.to_string()))
    }
}
