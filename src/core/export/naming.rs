//! Output file naming
//!
//! Turns a [`NamingStrategy`] plus the context of one conversion into a
//! concrete, collision-free path. The [`PathRegistry`] is shared by every
//! job in a batch so two outputs never claim the same file.

use crate::domain::{ExportFormat, JobId, NamingError, NamingStrategy, SessionId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Placeholders accepted by `NamingStrategy::Custom`
pub const KNOWN_PLACEHOLDERS: [&str; 5] = ["job_id", "timestamp", "format", "title", "session_id"];

/// Everything a naming strategy may draw on
#[derive(Debug, Clone)]
pub struct NamingContext<'a> {
    pub job_id: &'a JobId,
    /// Sessions that feed the output (several for a merged document)
    pub session_ids: &'a [SessionId],
    /// Batch start time
    pub timestamp: DateTime<Utc>,
    pub format: ExportFormat,
    pub title: &'a str,
    pub compressed: bool,
}

impl NamingContext<'_> {
    /// File extension including `.gz` when compressing
    pub fn extension(&self) -> String {
        if self.compressed {
            format!("{}.gz", self.format.extension())
        } else {
            self.format.extension().to_string()
        }
    }

    fn session_part(&self) -> String {
        let joined = self
            .session_ids
            .iter()
            .map(|id| sanitize(id.as_str()))
            .collect::<Vec<_>>()
            .join("_");
        if joined.is_empty() {
            "untitled".to_string()
        } else {
            joined
        }
    }

    fn timestamp_part(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Make a string safe for use in a file name
///
/// Runs of characters that are not ASCII letters or digits collapse to a
/// single `_`; leading and trailing `_` are trimmed. An empty result
/// becomes `untitled`.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_sep = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }

    if out.is_empty() {
        "untitled".to_string()
    } else {
        out
    }
}

/// Placeholder names used in a custom pattern, in order of appearance
fn placeholders(pattern: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// Check that a custom pattern only uses known placeholders
///
/// # Errors
///
/// Returns `NamingError::UnresolvedPlaceholder` for the first unknown name
pub fn validate_pattern(pattern: &str) -> Result<(), NamingError> {
    match placeholders(pattern)
        .into_iter()
        .find(|name| !KNOWN_PLACEHOLDERS.contains(name))
    {
        Some(unknown) => Err(NamingError::UnresolvedPlaceholder(
            unknown.to_string(),
            pattern.to_string(),
        )),
        None => Ok(()),
    }
}

fn render_custom(pattern: &str, ctx: &NamingContext<'_>) -> Result<String, NamingError> {
    validate_pattern(pattern)?;

    let mut rendered = pattern.to_string();
    for name in placeholders(pattern) {
        let value = match name {
            "job_id" => sanitize(ctx.job_id.as_str()),
            "timestamp" => ctx.timestamp_part(),
            "format" => ctx.format.as_str().to_string(),
            "title" => sanitize(ctx.title),
            _ => ctx.session_part(),
        };
        rendered = rendered.replace(&format!("{{{name}}}"), &value);
    }

    // Literal text may not introduce directories
    let rendered: String = rendered
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();

    if rendered.is_empty() {
        return Err(NamingError::EmptyName(pattern.to_string()));
    }
    Ok(rendered)
}

/// Base name (without extension) for a strategy
///
/// # Errors
///
/// Returns a `NamingError` if a custom pattern cannot be resolved
pub fn base_name(strategy: &NamingStrategy, ctx: &NamingContext<'_>) -> Result<String, NamingError> {
    match strategy {
        NamingStrategy::SessionBased => Ok(ctx.session_part()),
        NamingStrategy::ContentBased => Ok(sanitize(ctx.title)),
        NamingStrategy::Sequential => Ok(format!("export_{}", ctx.timestamp_part())),
        NamingStrategy::Custom(pattern) => render_custom(pattern, ctx),
    }
}

/// Resolve a path in `dir` that `is_taken` does not report as used
///
/// Tries `dir/base.ext`, then `dir/base_1.ext`, `dir/base_2.ext`, ...
///
/// # Errors
///
/// Returns a `NamingError` if the base name cannot be produced
pub fn resolve(
    strategy: &NamingStrategy,
    ctx: &NamingContext<'_>,
    dir: &Path,
    is_taken: impl Fn(&Path) -> bool,
) -> Result<PathBuf, NamingError> {
    let base = base_name(strategy, ctx)?;
    let ext = ctx.extension();

    let mut candidate = dir.join(format!("{base}.{ext}"));
    let mut suffix = 1u32;
    while is_taken(&candidate) {
        candidate = dir.join(format!("{base}_{suffix}.{ext}"));
        suffix += 1;
    }
    Ok(candidate)
}

/// Batch-wide set of claimed output paths
///
/// Files already on disk count as taken too.
#[derive(Debug, Default)]
pub struct PathRegistry {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl PathRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and reserve a unique path
    ///
    /// The lock is held only for the duration of the lookup.
    ///
    /// # Errors
    ///
    /// Returns a `NamingError` if the base name cannot be produced
    pub fn claim(
        &self,
        strategy: &NamingStrategy,
        ctx: &NamingContext<'_>,
        dir: &Path,
    ) -> Result<PathBuf, NamingError> {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = resolve(strategy, ctx, dir, |p| claimed.contains(p) || p.exists())?;
        claimed.insert(path.clone());
        Ok(path)
    }

    /// Number of claimed paths
    pub fn len(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Check if nothing has been claimed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
