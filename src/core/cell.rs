//! Surface Cell
//!
//! Represents a single glyph position on a surface: the glyph index into a
//! font atlas, its colors, mirroring and any decorator glyphs painted on top.

use serde::{Deserialize, Serialize};

use super::color::Color;

/// How a glyph is flipped when drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Mirror {
    /// Numeric form used by markup (`0..=3`)
    pub fn from_index(index: u32) -> Option<Mirror> {
        match index {
            0 => Some(Mirror::None),
            1 => Some(Mirror::Horizontal),
            2 => Some(Mirror::Vertical),
            3 => Some(Mirror::Both),
            _ => None,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Mirror::None => 0,
            Mirror::Horizontal => 1,
            Mirror::Vertical => 2,
            Mirror::Both => 3,
        }
    }
}

/// A secondary glyph drawn over a cell's main glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellDecorator {
    pub color: Color,
    pub glyph: u32,
    pub mirror: Mirror,
}

impl CellDecorator {
    pub const fn new(color: Color, glyph: u32, mirror: Mirror) -> Self {
        Self {
            color,
            glyph,
            mirror,
        }
    }
}

/// Saved copy of a cell's appearance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub foreground: Color,
    pub background: Color,
    pub glyph: u32,
    pub mirror: Mirror,
    pub is_visible: bool,
    pub decorators: Vec<CellDecorator>,
}

/// A single cell in a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub foreground: Color,
    pub background: Color,
    /// Index of the glyph in the font atlas
    pub glyph: u32,
    pub mirror: Mirror,
    pub is_visible: bool,
    /// Painted back to front
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<CellDecorator>,
    /// Snapshot taken by [`Cell::save_state`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CellState>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::TRANSPARENT, 0)
    }
}

impl Cell {
    pub fn new(foreground: Color, background: Color, glyph: u32) -> Self {
        Self {
            foreground,
            background,
            glyph,
            mirror: Mirror::None,
            is_visible: true,
            decorators: Vec::new(),
            state: None,
        }
    }

    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = mirror;
        self
    }

    /// The glyph as a character, when it maps to one
    pub fn glyph_character(&self) -> char {
        char::from_u32(self.glyph).unwrap_or('\0')
    }

    /// Copy foreground, background, glyph and mirror onto another cell
    pub fn copy_appearance_to(&self, other: &mut Cell) {
        other.foreground = self.foreground;
        other.background = self.background;
        other.glyph = self.glyph;
        other.mirror = self.mirror;
    }

    /// Whether foreground, background, glyph and mirror all match
    pub fn matches_appearance(&self, other: &Cell) -> bool {
        self.foreground == other.foreground
            && self.background == other.background
            && self.glyph == other.glyph
            && self.mirror == other.mirror
    }

    /// Reset to the given colors, glyph 0, no mirror, no decorators
    pub fn reset(&mut self, foreground: Color, background: Color) {
        self.foreground = foreground;
        self.background = background;
        self.glyph = 0;
        self.mirror = Mirror::None;
        self.is_visible = true;
        self.decorators.clear();
    }

    pub fn save_state(&mut self) {
        self.state = Some(CellState {
            foreground: self.foreground,
            background: self.background,
            glyph: self.glyph,
            mirror: self.mirror,
            is_visible: self.is_visible,
            decorators: self.decorators.clone(),
        });
    }

    /// Restore and discard the saved state; no-op when nothing was saved
    pub fn restore_state(&mut self) {
        if let Some(state) = self.state.take() {
            self.foreground = state.foreground;
            self.background = state.background;
            self.glyph = state.glyph;
            self.mirror = state.mirror;
            self.is_visible = state.is_visible;
            self.decorators = state.decorators;
        }
    }

    pub fn clear_state(&mut self) {
        self.state = None;
    }
}
