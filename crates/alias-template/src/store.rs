use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TemplateError;

/// Serves template files from a single directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads `filename` from the store root. Names that could escape the
    /// root are rejected before touching the filesystem.
    pub fn load(&self, filename: &str) -> Result<String, TemplateError> {
        if !is_plain_file_name(filename) {
            return Err(TemplateError::InvalidName(filename.to_string()));
        }

        let path = self.root.join(filename);
        match std::fs::read_to_string(&path) {
            Ok(markup) => {
                debug!(path = %path.display(), bytes = markup.len(), "template loaded");
                Ok(markup)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(TemplateError::NotFound(path)),
            Err(source) => Err(TemplateError::Io { path, source }),
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && !Path::new(name).is_absolute()
}
