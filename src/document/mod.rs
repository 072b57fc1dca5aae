// Document module.
// Loads the README, rewrites its generated badge blocks, and saves it.

pub mod patch;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};

use crate::cache::write_text;
use crate::error::Result;

pub use patch::{MarkerPair, TIMESTAMP_PREFIX, replace_block, replace_timestamp};

/// Block holding the personal statistics card.
pub const PERSONAL_BLOCK: &str = "PERSONAL_IMG";
/// Block holding the domination card.
pub const DOMINATION_BLOCK: &str = "DOMINATION_IMG";
/// Block holding the weighted progress badge.
pub const PROGRESS_BLOCK: &str = "PROGRESS_BADGE";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A text document with generated marker blocks.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    content: String,
}

impl Document {
    /// Read the document, or start a new one headed by `title`.
    pub fn load(path: &Path, title: &str) -> Result<Self> {
        let content = if path.exists() {
            fs::read_to_string(path)?
        } else {
            tracing::info!(path = %path.display(), "document missing, starting a new one");
            format!("# {title}\n\n")
        };

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace (or append) the named block.
    pub fn set_block(&mut self, name: &str, content: &str) {
        self.content = replace_block(&self.content, &MarkerPair::named(name), content);
    }

    /// Record the update time in the trailing comment.
    pub fn set_updated_at<Tz: TimeZone>(&mut self, at: &DateTime<Tz>) {
        let stamp = at
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string();
        self.content = replace_timestamp(&self.content, &stamp);
    }

    pub fn save(&self) -> Result<()> {
        write_text(&self.path, &self.content)
    }
}

/// Markdown image reference.
pub fn image_markdown(alt: &str, target: &str) -> String {
    format!("![{alt}]({target})")
}
