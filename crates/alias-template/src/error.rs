use std::io;
use std::path::PathBuf;

use plate_alias_core::MarkupError;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid template name {0:?}")]
    InvalidName(String),

    #[error("template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read template {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template markup is malformed: {0}")]
    Markup(#[from] MarkupError),

    #[error("failed to decode page config: {0}")]
    Page(#[from] serde_json::Error),
}
