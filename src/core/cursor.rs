//! Text cursor
//!
//! A caret that prints onto a surface: it advances after each glyph, wraps at
//! the right edge, word-wraps multi-character text and scrolls the surface up
//! when it runs off the last row. The cursor never owns the surface; every
//! operation that writes takes it as an argument.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::color::Color;
use super::colored_string::{ColoredGlyph, ColoredString};
use super::editor::SurfaceEditor;
use super::effect::{Blink, CellEffect};
use super::geometry::Point;
use super::surface::CellSurface;
use crate::parser::{ParseContext, StringParser};

/// Glyph drawn for the caret
pub const CURSOR_GLYPH: u32 = '_' as u32;

/// Seconds per caret blink cycle
pub const CURSOR_BLINK_PERIOD: f64 = 0.35;

/// Cursor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    position: Point,
    /// Size of the surface the cursor was last attached to
    bounds: (usize, usize),
    /// Appearance given to printed text
    pub print_appearance: Cell,
    /// How the caret itself is drawn
    pub render_cell: Cell,
    pub render_effect: Option<CellEffect>,
    /// Print character by character instead of word-wrapping
    pub disable_word_break: bool,
    /// Treat `\n` as carriage return plus line feed
    pub use_linux_line_endings: bool,
    /// Run printed text through the markup parser
    pub use_string_parser: bool,
    /// Only overwrite glyphs, never colors, mirror or effects
    pub print_only_character_data: bool,
    /// Scroll the surface up instead of stopping at the last row
    pub auto_shift_rows_up: bool,
    pub is_visible: bool,
    pub is_enabled: bool,
    /// The last printed glyph moved the cursor onto a new row
    #[serde(skip)]
    wrapped: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            bounds: (0, 0),
            print_appearance: Cell::default(),
            render_cell: Cell::new(Color::WHITE, Color::TRANSPARENT, CURSOR_GLYPH),
            render_effect: Some(CellEffect::Blink(Blink::new(CURSOR_BLINK_PERIOD))),
            disable_word_break: false,
            use_linux_line_endings: false,
            use_string_parser: false,
            print_only_character_data: false,
            auto_shift_rows_up: true,
            is_visible: true,
            is_enabled: true,
            wrapped: false,
        }
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor attached to `surface`, printing in its default colors
    pub fn for_surface<S: SurfaceEditor>(surface: &S) -> Self {
        let mut cursor = Self::default();
        cursor.print_appearance = Cell::new(surface.default_foreground(), surface.default_background(), 0);
        cursor.attach(surface);
        cursor
    }

    /// Bind to a (possibly different) surface, clamping the position to it
    pub fn attach<S: SurfaceEditor>(&mut self, surface: &S) {
        self.bounds = (surface.width(), surface.height());
        self.set_position(self.position);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the cursor; each axis is clamped to the attached surface
    pub fn set_position(&mut self, position: Point) {
        let max_x = self.bounds.0.saturating_sub(1) as i32;
        let max_y = self.bounds.1.saturating_sub(1) as i32;
        self.position = Point::new(position.x.clamp(0, max_x), position.y.clamp(0, max_y));
        self.wrapped = false;
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> &mut Self {
        self.set_position(Point::new(x, y));
        self
    }

    pub fn left(&mut self, amount: i32) -> &mut Self {
        self.set_position(Point::new(self.position.x - amount, self.position.y));
        self
    }

    pub fn right(&mut self, amount: i32) -> &mut Self {
        self.set_position(Point::new(self.position.x + amount, self.position.y));
        self
    }

    pub fn up(&mut self, amount: i32) -> &mut Self {
        self.set_position(Point::new(self.position.x, self.position.y - amount));
        self
    }

    pub fn down(&mut self, amount: i32) -> &mut Self {
        self.set_position(Point::new(self.position.x, self.position.y + amount));
        self
    }

    pub fn carriage_return(&mut self) -> &mut Self {
        self.position.x = 0;
        self.wrapped = false;
        self
    }

    /// Move down one row, scrolling the surface at the last row
    pub fn line_feed<S: SurfaceEditor>(&mut self, surface: &mut S) -> &mut Self {
        self.attach(surface);
        if self.position.y + 1 < surface.height() as i32 {
            self.position.y += 1;
        } else if self.auto_shift_rows_up {
            surface.shift_up(1, false);
        }
        self.wrapped = false;
        self
    }

    pub fn new_line<S: SurfaceEditor>(&mut self, surface: &mut S) -> &mut Self {
        self.carriage_return();
        self.line_feed(surface)
    }

    /// Print plain text, or markup through the surface's print parser when
    /// `use_string_parser` is set
    pub fn print<S: SurfaceEditor>(&mut self, surface: &mut S, text: &str) -> &mut Self {
        let parser = surface.print_parser().clone();
        self.print_with_parser(surface, &parser, text)
    }

    pub fn print_with_parser<S: SurfaceEditor>(
        &mut self,
        surface: &mut S,
        parser: &StringParser,
        text: &str,
    ) -> &mut Self {
        let colored = if self.use_string_parser {
            let context = ParseContext {
                template: Some(&self.print_appearance),
                default_foreground: surface.default_foreground(),
                default_background: surface.default_background(),
                ..ParseContext::default()
            };
            parser.parse_with(text, context)
        } else {
            ColoredString::with_appearance(text, &self.print_appearance)
        };
        self.print_colored(surface, &colored)
    }

    /// Print a colored string, word-wrapping unless `disable_word_break` is
    /// set or the string is a single glyph
    pub fn print_colored<S: SurfaceEditor>(&mut self, surface: &mut S, text: &ColoredString) -> &mut Self {
        self.attach(surface);
        if surface.is_empty() {
            return self;
        }
        if self.disable_word_break || text.len() == 1 {
            for glyph in text {
                self.print_char(surface, glyph, text);
            }
        } else {
            self.print_wrapped(surface, text);
        }
        self
    }

    fn print_char<S: SurfaceEditor>(&mut self, surface: &mut S, glyph: &ColoredGlyph, text: &ColoredString) {
        match glyph.glyph_character() {
            '\r' => {
                self.carriage_return();
            },
            '\n' => {
                self.line_break(surface);
            },
            _ => self.print_glyph(surface, glyph, text),
        }
    }

    fn line_break<S: SurfaceEditor>(&mut self, surface: &mut S) {
        if self.use_linux_line_endings {
            self.new_line(surface);
        } else {
            self.line_feed(surface);
        }
    }

    fn print_wrapped<S: SurfaceEditor>(&mut self, surface: &mut S, text: &ColoredString) {
        let glyphs = text.glyphs();
        let width = surface.width() as i32;
        let mut after_word = false;
        let mut i = 0;
        while i < glyphs.len() {
            if is_space(&glyphs[i]) {
                // A space that would start a freshly wrapped row is dropped
                if !(self.position.x == 0 && after_word) {
                    self.print_glyph(surface, &glyphs[i], text);
                }
                after_word = false;
                i += 1;
                continue;
            }

            let end = glyphs[i..]
                .iter()
                .position(is_space)
                .map_or(glyphs.len(), |offset| i + offset);
            for (segment_index, segment) in glyphs[i..end].split(|g| g.glyph == '\n' as u32).enumerate() {
                if segment_index > 0 {
                    if self.wrapped {
                        self.wrapped = false;
                    } else {
                        self.line_break(surface);
                    }
                }
                for (chunk_index, chunk) in segment.split(|g| g.glyph == '\r' as u32).enumerate() {
                    if chunk_index > 0 {
                        self.carriage_return();
                    }
                    let len = chunk.len() as i32;
                    if self.position.x != 0 && self.position.x + len > width && len <= width {
                        let filler = ColoredGlyph::from_cell(Cell::new(
                            self.print_appearance.foreground,
                            self.print_appearance.background,
                            ' ' as u32,
                        ));
                        while self.position.x != 0 {
                            self.print_glyph(surface, &filler, text);
                        }
                    }
                    for glyph in chunk {
                        self.print_glyph(surface, glyph, text);
                    }
                }
            }
            after_word = true;
            i = end;
        }
    }

    /// Write one glyph at the cursor and advance
    fn print_glyph<S: SurfaceEditor>(&mut self, surface: &mut S, glyph: &ColoredGlyph, text: &ColoredString) {
        let Some(index) = surface.index_of(self.position.x, self.position.y) else {
            return;
        };
        if let Some(cell) = surface.cell_mut(index) {
            if self.print_only_character_data {
                cell.glyph = glyph.glyph;
            } else {
                if !text.ignore_glyph {
                    cell.glyph = glyph.glyph;
                }
                if !text.ignore_foreground {
                    cell.foreground = glyph.foreground;
                }
                if !text.ignore_background {
                    cell.background = glyph.background;
                }
                if !text.ignore_mirror {
                    cell.mirror = glyph.mirror;
                }
            }
        }
        if !self.print_only_character_data && !text.ignore_effect {
            surface.set_cell_effect(index, glyph.effect.clone());
        }
        surface.set_dirty(true);

        self.position.x += 1;
        self.wrapped = false;
        if self.position.x >= surface.width() as i32 {
            self.position.x = 0;
            self.position.y += 1;
            self.wrapped = true;
        }
        if self.position.y >= surface.height() as i32 {
            self.position.y = surface.height() as i32 - 1;
            if self.auto_shift_rows_up {
                surface.shift_up(1, false);
            }
        }
    }

    /// Advance the caret effect; returns whether its look changed
    pub fn update(&mut self, elapsed: f64) -> bool {
        if !self.is_visible {
            return false;
        }
        let before = self.render_appearance();
        let Some(effect) = self.render_effect.as_mut() else {
            return false;
        };
        effect.update(elapsed);
        before != self.render_appearance()
    }

    /// The caret cell as it should be drawn this frame
    pub fn render_appearance(&self) -> Cell {
        let mut cell = self.render_cell.clone();
        cell.save_state();
        if let Some(effect) = &self.render_effect {
            effect.apply(&mut cell);
        }
        cell.state = None;
        cell
    }
}

fn is_space(glyph: &ColoredGlyph) -> bool {
    glyph.glyph == ' ' as u32
}

/// A cursor paired with the surface it writes to
#[derive(Debug)]
pub struct CursorWriter<'a> {
    pub cursor: &'a mut Cursor,
    pub surface: &'a mut CellSurface,
}

impl<'a> CursorWriter<'a> {
    pub fn new(cursor: &'a mut Cursor, surface: &'a mut CellSurface) -> Self {
        cursor.attach(&*surface);
        Self { cursor, surface }
    }

    pub fn print(&mut self, text: &str) -> &mut Self {
        self.cursor.print(&mut *self.surface, text);
        self
    }

    pub fn print_with_parser(&mut self, parser: &StringParser, text: &str) -> &mut Self {
        self.cursor.print_with_parser(&mut *self.surface, parser, text);
        self
    }

    pub fn print_colored(&mut self, text: &ColoredString) -> &mut Self {
        self.cursor.print_colored(&mut *self.surface, text);
        self
    }

    pub fn new_line(&mut self) -> &mut Self {
        self.cursor.new_line(&mut *self.surface);
        self
    }

    pub fn line_feed(&mut self) -> &mut Self {
        self.cursor.line_feed(&mut *self.surface);
        self
    }

    pub fn carriage_return(&mut self) -> &mut Self {
        self.cursor.carriage_return();
        self
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> &mut Self {
        self.cursor.move_to(x, y);
        self
    }

    pub fn position(&self) -> Point {
        self.cursor.position()
    }
}
