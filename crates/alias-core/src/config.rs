use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_DELETE_LABEL: &str = "삭제";
const DEFAULT_TOKEN_CLASS: &str = "custom-alias";

/// How alias tokens are rendered and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// Accessible text of the delete control inside each token.
    pub delete_label: String,
    pub token_class: String,
    /// Emit an input notification after a token is inserted, so upstream
    /// change observers see drops and mention selections.
    pub notify_on_insert: bool,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            delete_label: DEFAULT_DELETE_LABEL.to_string(),
            token_class: DEFAULT_TOKEN_CLASS.to_string(),
            notify_on_insert: true,
        }
    }
}

impl AliasConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.delete_label.trim().is_empty() {
            self.delete_label = DEFAULT_DELETE_LABEL.to_string();
        }
        if self.token_class.trim().is_empty() {
            self.token_class = DEFAULT_TOKEN_CLASS.to_string();
        }
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }
}

/// Settings of the in-memory editing surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub line_height: f32,
    pub char_width: f32,
    pub max_undo: usize,
}

impl SurfaceConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.line_height <= 0.0 {
            self.line_height = 20.0;
        }
        if self.char_width <= 0.0 {
            self.char_width = 8.0;
        }
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }
}
