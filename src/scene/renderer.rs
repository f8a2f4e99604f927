//! Render protocol
//!
//! A console hands its renderer a [`RenderTarget`] every draw. The surface
//! dirty flag is the only signal a renderer needs: repaint when it is set,
//! then call [`RenderTarget::mark_clean`].

use crate::core::{Cell, CellSurface, Cursor, Point, Rect, SurfaceEditor};

use super::font::{Font, FontSize};

/// Draws consoles
pub trait Renderer {
    fn render(&mut self, target: &mut RenderTarget<'_>);
}

/// Everything a renderer may read from a console for one draw
#[derive(Debug)]
pub struct RenderTarget<'a> {
    pub(crate) surface: &'a mut CellSurface,
    pub(crate) view: Rect,
    pub(crate) render_cells: &'a [usize],
    pub(crate) render_rects: &'a [Rect],
    pub(crate) cursor: &'a Cursor,
    pub(crate) position: Point,
    pub(crate) font: &'a Font,
    pub(crate) font_size: FontSize,
}

impl RenderTarget<'_> {
    /// Visible cells, row by row, paired with [`RenderTarget::render_rects`]
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.render_cells.iter().filter_map(|&index| self.surface.cell(index))
    }

    /// Destination rectangle of every visible cell, relative to the console
    pub fn render_rects(&self) -> &[Rect] {
        self.render_rects
    }

    /// Visible region of the surface
    pub fn view(&self) -> Rect {
        self.view
    }

    pub fn is_dirty(&self) -> bool {
        self.surface.is_dirty()
    }

    pub fn mark_clean(&mut self) {
        self.surface.set_dirty(false);
    }

    pub fn cursor(&self) -> &Cursor {
        self.cursor
    }

    /// Absolute position of the console in cells
    pub fn position(&self) -> Point {
        self.position
    }

    /// Absolute position of the console in pixels
    pub fn pixel_position(&self) -> Point {
        self.font.get_world_position(self.position, self.font_size)
    }

    pub fn font(&self) -> &Font {
        self.font
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }
}

/// Headless renderer that paints the visible glyphs into a string
#[derive(Debug, Default)]
pub struct TextRenderer {
    output: String,
    repaints: usize,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last painted frame
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Frames actually painted
    pub fn repaints(&self) -> usize {
        self.repaints
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, target: &mut RenderTarget<'_>) {
        if !target.is_dirty() {
            return;
        }
        let width = target.view().width.max(1) as usize;
        let cursor = target.cursor();
        let caret = cursor.is_visible.then(|| cursor.position());
        let caret_glyph = cursor.render_appearance();

        self.output.clear();
        let view = target.view();
        for (i, cell) in target.cells().enumerate() {
            if i > 0 && i % width == 0 {
                self.output.push('\n');
            }
            let at = Point::new(view.x + (i % width) as i32, view.y + (i / width) as i32);
            let glyph = if caret == Some(at) && caret_glyph.is_visible {
                caret_glyph.glyph
            } else if cell.is_visible {
                cell.glyph
            } else {
                0
            };
            match char::from_u32(glyph) {
                Some(ch) if glyph != 0 && !ch.is_control() => self.output.push(ch),
                _ => self.output.push(' '),
            }
        }
        self.repaints += 1;
        target.mark_clean();
    }
}
