//! Local copies of generated content

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::store::content_file_name;

/// Writes `{id}_content.txt` files into a directory
#[derive(Debug, Clone)]
pub struct ContentFileWriter {
    /// Directory receiving the files
    dir: PathBuf,
}

impl Default for ContentFileWriter {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ContentFileWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path the content for record `id` is written to
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(content_file_name(id))
    }

    /// Write `content` for record `id`, returning the file path
    ///
    /// The file is opened, written and closed within this call.
    pub async fn write(&self, id: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_for(id);
        fs::write(&path, content.as_bytes()).await?;

        debug!("Saved content: {} ({} bytes)", path.display(), content.len());
        Ok(path)
    }
}
