//! Glyph atlas description
//!
//! A font is a grid of equally sized glyphs in an image atlas. Only the
//! geometry is modelled here; loading the image is the renderer's business.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Point, Rect};

/// Glyph index of the solid block in CP437 atlases
pub const DEFAULT_SOLID_GLYPH: u32 = 219;

/// Errors loading a font description
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid font '{name}': {reason}")]
    Invalid { name: String, reason: &'static str },
}

/// Scale applied to a font's glyph size when drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontSize {
    Quarter,
    Half,
    #[default]
    One,
    Two,
    Three,
    Four,
}

impl FontSize {
    fn scale(self, value: i32) -> i32 {
        match self {
            FontSize::Quarter => value / 4,
            FontSize::Half => value / 2,
            FontSize::One => value,
            FontSize::Two => value * 2,
            FontSize::Three => value * 3,
            FontSize::Four => value * 4,
        }
    }
}

fn default_rows() -> i32 {
    16
}

fn default_solid_glyph() -> u32 {
    DEFAULT_SOLID_GLYPH
}

/// Font geometry, stored as JSON with PascalCase keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Font {
    pub name: String,
    /// Atlas image, relative to the description file
    #[serde(default)]
    pub file_path: String,
    pub glyph_width: i32,
    pub glyph_height: i32,
    /// Pixels between glyphs and around the atlas edge
    #[serde(default)]
    pub glyph_padding: i32,
    pub columns: i32,
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_solid_glyph")]
    pub solid_glyph_index: u32,
    /// Drawn for glyph indices beyond the atlas
    #[serde(default)]
    pub unsupported_glyph_index: u32,
}

impl Default for Font {
    fn default() -> Self {
        Self::ibm_8x16()
    }
}

impl Font {
    /// The built-in 8x16 CP437 font
    pub fn ibm_8x16() -> Self {
        Self {
            name: "IBM_8x16".to_string(),
            file_path: "IBM8x16.png".to_string(),
            glyph_width: 8,
            glyph_height: 16,
            glyph_padding: 0,
            columns: 16,
            rows: 16,
            solid_glyph_index: DEFAULT_SOLID_GLYPH,
            unsupported_glyph_index: 0,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let font: Font = serde_json::from_str(json)?;
        font.validate()?;
        Ok(font)
    }

    pub fn load(path: &Path) -> Result<Self, FontError> {
        let content = std::fs::read_to_string(path)?;
        let font = Self::from_json(&content)?;
        tracing::debug!(name = %font.name, path = %path.display(), "loaded font");
        Ok(font)
    }

    fn validate(&self) -> Result<(), FontError> {
        let reason = if self.glyph_width <= 0 || self.glyph_height <= 0 {
            "glyph size must be positive"
        } else if self.columns <= 0 || self.rows <= 0 {
            "atlas must have at least one column and row"
        } else if self.glyph_padding < 0 {
            "padding cannot be negative"
        } else {
            return Ok(());
        };
        Err(FontError::Invalid {
            name: self.name.clone(),
            reason,
        })
    }

    pub fn total_glyphs(&self) -> u32 {
        (self.columns.max(0) * self.rows.max(0)) as u32
    }

    /// Source rectangle of a glyph in the atlas
    pub fn glyph_rect(&self, glyph: u32) -> Rect {
        let glyph = if glyph < self.total_glyphs() {
            glyph
        } else {
            self.unsupported_glyph_index
        } as i32;
        let columns = self.columns.max(1);
        let (col, row) = (glyph % columns, glyph / columns);
        let pad = self.glyph_padding;
        Rect::new(
            col * self.glyph_width + pad * col + pad,
            row * self.glyph_height + pad * row + pad,
            self.glyph_width,
            self.glyph_height,
        )
    }

    pub fn solid_glyph_rect(&self) -> Rect {
        self.glyph_rect(self.solid_glyph_index)
    }

    /// Drawn size of one cell
    pub fn size(&self, size: FontSize) -> Point {
        Point::new(size.scale(self.glyph_width), size.scale(self.glyph_height))
    }

    /// Destination rectangle of cell (x, y)
    pub fn get_render_rect(&self, x: i32, y: i32, size: FontSize) -> Rect {
        let cell = self.size(size);
        Rect::new(x * cell.x, y * cell.y, cell.x, cell.y)
    }

    /// Pixel position of a cell position
    pub fn get_world_position(&self, position: Point, size: FontSize) -> Point {
        let cell = self.size(size);
        Point::new(position.x * cell.x, position.y * cell.y)
    }
}
