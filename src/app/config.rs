//! Configuration for the engine

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::scene::FontSize;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root console width in cells
    pub width: usize,
    /// Root console height in cells
    pub height: usize,
    /// Font description file; the built-in IBM 8x16 font when unset
    pub font_path: Option<PathBuf>,
    pub font_size: FontSize,
    /// Default foreground color
    pub foreground: (u8, u8, u8),
    /// Default background color
    pub background: (u8, u8, u8),
    /// Run surface `print` through the markup parser
    pub use_print_processor: bool,
    /// Seed for the engine RNG; random when unset
    pub random_seed: Option<u64>,
    pub cursor: CursorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 25,
            font_path: None,
            font_size: FontSize::One,
            foreground: (255, 255, 255),
            background: (0, 0, 0),
            use_print_processor: false,
            random_seed: None,
            cursor: CursorConfig::default(),
        }
    }
}

/// Cursor defaults for the root console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub visible: bool,
    pub disable_word_break: bool,
    pub use_linux_line_endings: bool,
    pub use_string_parser: bool,
    pub auto_shift_rows_up: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            visible: false,
            disable_word_break: false,
            use_linux_line_endings: false,
            use_string_parser: true,
            auto_shift_rows_up: true,
        }
    }
}

impl EngineConfig {
    pub fn foreground_color(&self) -> Color {
        let (r, g, b) = self.foreground;
        Color::rgb(r, g, b)
    }

    pub fn background_color(&self) -> Color {
        let (r, g, b) = self.background;
        Color::rgb(r, g, b)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/sadconsole/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(error) => {
                        tracing::warn!(path = %config_path.display(), %error, "ignoring unreadable config")
                    },
                }
            }
        }
        Self::default()
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("sadconsole"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
