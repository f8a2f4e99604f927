//! Colored glyphs and strings
//!
//! A [`ColoredString`] is what the markup parser produces and what cursors
//! and surfaces print. Its `ignore_*` flags tell the consumer which channels
//! of each glyph to paint.

use std::fmt;
use std::ops::{Add, Deref, DerefMut, Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Mirror};
use super::color::Color;
use super::effect::CellEffect;

/// A cell paired with an optional effect it owns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColoredGlyph {
    #[serde(flatten)]
    pub cell: Cell,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<CellEffect>,
}

impl ColoredGlyph {
    pub fn new(foreground: Color, background: Color, character: char) -> Self {
        Self {
            cell: Cell::new(foreground, background, character as u32),
            effect: None,
        }
    }

    pub fn from_cell(cell: Cell) -> Self {
        Self { cell, effect: None }
    }

    pub fn set_character(&mut self, character: char) {
        self.cell.glyph = character as u32;
    }
}

impl Deref for ColoredGlyph {
    type Target = Cell;

    fn deref(&self) -> &Cell {
        &self.cell
    }
}

impl DerefMut for ColoredGlyph {
    fn deref_mut(&mut self) -> &mut Cell {
        &mut self.cell
    }
}

fn default_true() -> bool {
    true
}

/// An ordered run of colored glyphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoredString {
    glyphs: Vec<ColoredGlyph>,
    #[serde(default)]
    pub ignore_glyph: bool,
    #[serde(default)]
    pub ignore_foreground: bool,
    #[serde(default)]
    pub ignore_background: bool,
    #[serde(default)]
    pub ignore_mirror: bool,
    #[serde(default = "default_true")]
    pub ignore_effect: bool,
}

impl Default for ColoredString {
    fn default() -> Self {
        Self::from_glyphs(Vec::new())
    }
}

impl ColoredString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_glyphs(glyphs: Vec<ColoredGlyph>) -> Self {
        Self {
            glyphs,
            ignore_glyph: false,
            ignore_foreground: false,
            ignore_background: false,
            ignore_mirror: false,
            ignore_effect: true,
        }
    }

    /// Plain text in the given colors
    pub fn with_colors(text: &str, foreground: Color, background: Color) -> Self {
        Self::with_appearance(text, &Cell::new(foreground, background, 0))
    }

    /// Plain text copying colors and mirror from a template cell
    pub fn with_appearance(text: &str, template: &Cell) -> Self {
        let glyphs = text
            .chars()
            .map(|c| {
                let mut cell = Cell::new(template.foreground, template.background, c as u32);
                cell.mirror = template.mirror;
                ColoredGlyph::from_cell(cell)
            })
            .collect();
        Self::from_glyphs(glyphs)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyphs(&self) -> &[ColoredGlyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut [ColoredGlyph] {
        &mut self.glyphs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColoredGlyph> {
        self.glyphs.iter()
    }

    pub fn push(&mut self, glyph: ColoredGlyph) {
        self.glyphs.push(glyph);
    }

    /// The glyphs rendered back to plain text
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.glyph_character()).collect()
    }

    /// Copy of `count` glyphs starting at `start`, keeping the ignore flags
    pub fn substring(&self, start: usize, count: usize) -> ColoredString {
        let start = start.min(self.glyphs.len());
        let end = start.saturating_add(count).min(self.glyphs.len());
        ColoredString {
            glyphs: self.glyphs[start..end].to_vec(),
            ..self.with_flags_only()
        }
    }

    fn with_flags_only(&self) -> ColoredString {
        ColoredString {
            glyphs: Vec::new(),
            ignore_glyph: self.ignore_glyph,
            ignore_foreground: self.ignore_foreground,
            ignore_background: self.ignore_background,
            ignore_mirror: self.ignore_mirror,
            ignore_effect: self.ignore_effect,
        }
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.glyphs.iter_mut().for_each(|g| g.foreground = color);
    }

    pub fn set_background(&mut self, color: Color) {
        self.glyphs.iter_mut().for_each(|g| g.background = color);
    }

    pub fn set_glyph(&mut self, glyph: u32) {
        self.glyphs.iter_mut().for_each(|g| g.glyph = glyph);
    }

    pub fn set_mirror(&mut self, mirror: Mirror) {
        self.glyphs.iter_mut().for_each(|g| g.mirror = mirror);
    }

    /// Give every glyph its own copy of `effect`
    pub fn set_effect(&mut self, effect: Option<CellEffect>) {
        self.glyphs.iter_mut().for_each(|g| g.effect = effect.clone());
    }
}

impl fmt::Display for ColoredString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl Index<usize> for ColoredString {
    type Output = ColoredGlyph;

    fn index(&self, index: usize) -> &ColoredGlyph {
        &self.glyphs[index]
    }
}

impl IndexMut<usize> for ColoredString {
    fn index_mut(&mut self, index: usize) -> &mut ColoredGlyph {
        &mut self.glyphs[index]
    }
}

impl<'a> IntoIterator for &'a ColoredString {
    type Item = &'a ColoredGlyph;
    type IntoIter = std::slice::Iter<'a, ColoredGlyph>;

    fn into_iter(self) -> Self::IntoIter {
        self.glyphs.iter()
    }
}

impl Add<&ColoredString> for &ColoredString {
    type Output = ColoredString;

    /// Concatenate; each ignore flag is set only if both operands set it
    fn add(self, rhs: &ColoredString) -> ColoredString {
        let mut glyphs = Vec::with_capacity(self.len() + rhs.len());
        glyphs.extend_from_slice(&self.glyphs);
        glyphs.extend_from_slice(&rhs.glyphs);
        ColoredString {
            glyphs,
            ignore_glyph: self.ignore_glyph && rhs.ignore_glyph,
            ignore_foreground: self.ignore_foreground && rhs.ignore_foreground,
            ignore_background: self.ignore_background && rhs.ignore_background,
            ignore_mirror: self.ignore_mirror && rhs.ignore_mirror,
            ignore_effect: self.ignore_effect && rhs.ignore_effect,
        }
    }
}

impl Add<ColoredString> for ColoredString {
    type Output = ColoredString;

    fn add(self, rhs: ColoredString) -> ColoredString {
        &self + &rhs
    }
}

impl Add<&str> for ColoredString {
    type Output = ColoredString;

    /// Append plain text in the appearance of the last glyph
    fn add(mut self, rhs: &str) -> ColoredString {
        let template = self.glyphs.last().map(|g| g.cell.clone()).unwrap_or_default();
        self.glyphs
            .extend(ColoredString::with_appearance(rhs, &template).glyphs);
        self
    }
}

impl From<&str> for ColoredString {
    fn from(text: &str) -> Self {
        ColoredString::with_appearance(text, &Cell::default())
    }
}
