//! Console: a surface with a font, a cursor and cached render geometry

use crate::core::{CellSurface, Color, Cursor, CursorWriter, Point, Rect, SurfaceEditor};

use super::font::{Font, FontSize};
use super::renderer::{RenderTarget, Renderer};

/// A renderable cell surface
#[derive(Debug, Clone)]
pub struct Console {
    surface: CellSurface,
    pub cursor: Cursor,
    font: Font,
    font_size: FontSize,
    view: Rect,
    render_cells: Vec<usize>,
    render_rects: Vec<Rect>,
    /// Surface bounds, view and cell size the caches were built for
    cache_key: Option<(Rect, Rect, Point)>,
    cache_rebuilds: usize,
}

impl Console {
    pub fn new(width: usize, height: usize, font: Font) -> Self {
        Self::with_surface(CellSurface::new(width, height), font)
    }

    pub fn with_colors(width: usize, height: usize, foreground: Color, background: Color, font: Font) -> Self {
        Self::with_surface(CellSurface::with_colors(width, height, foreground, background), font)
    }

    /// Wrap an existing surface; the view covers all of it
    pub fn with_surface(surface: CellSurface, font: Font) -> Self {
        let mut cursor = Cursor::for_surface(&surface);
        cursor.is_visible = false;
        Self {
            view: surface.area(),
            surface,
            cursor,
            font,
            font_size: FontSize::One,
            render_cells: Vec::new(),
            render_rects: Vec::new(),
            cache_key: None,
            cache_rebuilds: 0,
        }
    }

    pub fn surface(&self) -> &CellSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut CellSurface {
        &mut self.surface
    }

    /// Print through the console's cursor
    pub fn cursor_writer(&mut self) -> CursorWriter<'_> {
        CursorWriter::new(&mut self.cursor, &mut self.surface)
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.surface.set_dirty(true);
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: FontSize) {
        if self.font_size != size {
            self.font_size = size;
            self.surface.set_dirty(true);
        }
    }

    /// Visible region of the surface
    pub fn view(&self) -> Rect {
        self.view
    }

    /// Scroll or shrink the visible region; clipped to the surface
    pub fn set_view(&mut self, view: Rect) {
        let view = view.intersect(&self.surface.area());
        if view != self.view {
            self.view = view;
            self.surface.set_dirty(true);
        }
    }

    /// Resize the surface; the view follows when it covered the whole surface
    pub fn resize(&mut self, width: usize, height: usize, clear: bool) {
        let full_view = self.view == self.surface.area();
        self.surface.resize(width, height, clear);
        self.view = if full_view {
            self.surface.area()
        } else {
            self.view.intersect(&self.surface.area())
        };
        self.cursor.attach(&self.surface);
    }

    /// Size of the console in pixels
    pub fn pixel_size(&self) -> Point {
        let cell = self.font.size(self.font_size);
        Point::new(self.view.width * cell.x, self.view.height * cell.y)
    }

    pub fn render_cells(&self) -> &[usize] {
        &self.render_cells
    }

    pub fn render_rects(&self) -> &[Rect] {
        &self.render_rects
    }

    /// How many times the render caches were rebuilt
    pub fn cache_rebuilds(&self) -> usize {
        self.cache_rebuilds
    }

    /// Rebuild the render caches if the surface size, view or cell size changed
    pub fn refresh_render_cache(&mut self) -> bool {
        // The surface may have shrunk under the view through `surface_mut`
        self.view = self.view.intersect(&self.surface.area());
        let key = (self.surface.area(), self.view, self.font.size(self.font_size));
        if self.cache_key == Some(key) {
            return false;
        }
        let width = self.surface.width();
        self.render_cells.clear();
        self.render_rects.clear();
        for point in self.view.points() {
            self.render_cells.push(point.to_index(width));
            self.render_rects.push(self.font.get_render_rect(
                point.x - self.view.x,
                point.y - self.view.y,
                self.font_size,
            ));
        }
        self.cache_key = Some(key);
        self.cache_rebuilds += 1;
        tracing::trace!(view = ?self.view, cells = self.render_cells.len(), "rebuilt render cache");
        true
    }

    /// Advance cell effects and the caret
    pub fn update(&mut self, elapsed: f64) {
        self.surface.update_effects(elapsed);
        if self.cursor.update(elapsed) {
            self.surface.set_dirty(true);
        }
    }

    /// Hand the visible cells to `renderer`
    pub fn draw(&mut self, position: Point, renderer: &mut dyn Renderer) {
        self.refresh_render_cache();
        let mut target = RenderTarget {
            surface: &mut self.surface,
            view: self.view,
            render_cells: &self.render_cells,
            render_rects: &self.render_rects,
            cursor: &self.cursor,
            position,
            font: &self.font,
            font_size: self.font_size,
        };
        renderer.render(&mut target);
    }
}
