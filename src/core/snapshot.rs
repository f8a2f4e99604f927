//! Deterministic snapshot generation
//!
//! Snapshots capture what a surface looks like in a serializable format for
//! golden tests and debugging. Given the same edits, a surface must produce
//! identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Mirror};
use super::color::Color;
use super::cursor::Cursor;
use super::editor::SurfaceEditor;
use super::surface::CellSurface;

/// A complete snapshot of a surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    /// Cell content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorSnapshot>,
    pub default_foreground: ColorSnapshot,
    pub default_background: ColorSnapshot,
    pub times_shifted_up: usize,
    /// Cells carrying an effect
    pub effects: usize,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub glyph: u32,
    pub fg: ColorSnapshot,
    pub bg: ColorSnapshot,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mirror_horizontal: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub mirror_vertical: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<u32>,
}

/// Snapshot of a color; alpha is omitted when opaque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSnapshot {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque", skip_serializing_if = "is_opaque")]
    pub a: u8,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn opaque() -> u8 {
    u8::MAX
}

fn is_opaque(a: &u8) -> bool {
    *a == u8::MAX
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: i32,
    pub row: i32,
    pub visible: bool,
}

impl From<Color> for ColorSnapshot {
    fn from(color: Color) -> Self {
        ColorSnapshot {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            glyph: cell.glyph,
            fg: cell.foreground.into(),
            bg: cell.background.into(),
            mirror_horizontal: matches!(cell.mirror, Mirror::Horizontal | Mirror::Both),
            mirror_vertical: matches!(cell.mirror, Mirror::Vertical | Mirror::Both),
            hidden: !cell.is_visible,
            decorators: cell.decorators.iter().map(|d| d.glyph).collect(),
        }
    }
}

impl From<&Cursor> for CursorSnapshot {
    fn from(cursor: &Cursor) -> Self {
        let position = cursor.position();
        CursorSnapshot {
            col: position.x,
            row: position.y,
            visible: cursor.is_visible,
        }
    }
}

impl Snapshot {
    /// Capture a surface, and optionally the cursor writing to it
    pub fn from_surface(surface: &CellSurface, cursor: Option<&Cursor>) -> Self {
        let grid = surface
            .cells()
            .chunks(surface.width().max(1))
            .map(|row| row.iter().map(CellSnapshot::from).collect())
            .collect();

        Snapshot {
            width: surface.width(),
            height: surface.height(),
            grid,
            cursor: cursor.map(CursorSnapshot::from),
            default_foreground: surface.default_foreground().into(),
            default_background: surface.default_background().into(),
            times_shifted_up: surface.times_shifted_up(),
            effects: surface.effects().len(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Glyphs as text, one line per row
    ///
    /// Glyph 0 and control glyphs print as spaces. Trailing spaces and
    /// trailing empty lines are dropped.
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                match char::from_u32(cell.glyph) {
                    Some(ch) if !ch.is_control() => result.push(ch),
                    _ => result.push(' '),
                }
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare cell content only
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.width == other.width && self.height == other.height && self.grid == other.grid
    }
}
