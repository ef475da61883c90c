//! Output format identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output formats a job can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Standalone HTML page
    Html,
    /// PDF rendered by an external typesetting tool
    Pdf,
    /// Markdown source
    Markdown,
    /// Structured JSON
    Json,
    /// Plain text
    Text,
}

impl ExportFormat {
    /// All supported formats
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Html,
        ExportFormat::Pdf,
        ExportFormat::Markdown,
        ExportFormat::Json,
        ExportFormat::Text,
    ];

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    /// Lowercase identifier used in configuration and patterns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!(
                "Unknown export format '{other}'. Must be one of: html, pdf, markdown, json, text"
            )),
        }
    }
}
