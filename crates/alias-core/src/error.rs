use crate::ops::Path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("path out of bounds at depth {depth}: {index} >= {len}")]
    OutOfBounds {
        depth: usize,
        index: usize,
        len: usize,
    },

    #[error("non-container node at depth {depth}")]
    NotContainer { depth: usize },

    #[error("expected a text node at {path:?}")]
    NotText { path: Path },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("selection does not resolve in the document")]
    InvalidSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unterminated tag at byte {offset}")]
    UnterminatedTag { offset: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to decode config: {0}")]
    Json(#[from] serde_json::Error),
}
