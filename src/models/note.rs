//! Note model and inline tag handling
//!
//! Notes are plain files on disk. Tags live inline in the content as `#name`
//! markers; the tag set on the model is derived by scanning the content and is
//! kept in sync by the tag operations in [`crate::actions`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters allowed inside a tag name.
const TAG_CHARS: &str = "A-Za-z0-9_/\\-";

/// Inline tag marker: `#name` at a line start or after whitespace.
static TAG_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?m)(^|\s)#([{TAG_CHARS}]+)")).expect("tag marker pattern")
});

/// A single note file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    /// Absolute path of the note file.
    pub path: PathBuf,
    /// Owning project.
    pub project_id: Uuid,
    pub content: String,
    /// Tags scanned from the content, deduplicated, in order of appearance.
    pub tags: Vec<String>,
    pub modified_at: DateTime<Utc>,
}

impl Note {
    pub fn new(path: impl Into<PathBuf>, project_id: Uuid, content: String) -> Self {
        let mut note = Self {
            path: path.into(),
            project_id,
            content,
            tags: Vec::new(),
            modified_at: Utc::now(),
        };
        note.scan_content_tags();
        note
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Rescan the content for inline tag markers and replace the tag set.
    pub fn scan_content_tags(&mut self) -> &[String] {
        let mut tags: Vec<String> = Vec::new();
        for capture in TAG_MARKER.captures_iter(&self.content) {
            let tag = &capture[2];
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        self.tags = tags;
        &self.tags
    }

    /// Rewrite every `#old` marker. `new` of `None` removes the marker,
    /// `Some(name)` turns it into `#name`. Longer tags sharing the prefix
    /// (`#old/sub`, `#oldest`) are left untouched.
    pub fn replace_tag(&mut self, old: &str, new: Option<&str>) {
        let pattern = Regex::new(&format!(
            r"(?m)#{}($|[^{TAG_CHARS}])",
            regex::escape(old)
        ))
        .expect("tag replace pattern");

        let replacement = match new {
            Some(name) => format!("#{name}${{1}}"),
            None => "${1}".to_string(),
        };

        self.content = pattern.replace_all(&self.content, replacement.as_str()).into_owned();
        self.tags.retain(|t| t != old);
        self.modified_at = Utc::now();
    }

    /// Load a note from disk.
    pub async fn load(path: impl AsRef<Path>, project_id: Uuid) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let modified_at = tokio::fs::metadata(path)
            .await
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(Utc::now);

        let mut note = Self::new(path, project_id, content);
        note.modified_at = modified_at;
        Ok(note)
    }

    /// Write the content back to disk.
    pub async fn save(&self) -> std::io::Result<()> {
        tokio::fs::write(&self.path, self.content.as_bytes()).await
    }
}

/// Whether a file looks like a note (by extension).
pub fn is_note_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("md") | Some("markdown") | Some("txt") | Some("rtf")
    )
}
