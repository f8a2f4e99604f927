//! Surface editing
//!
//! [`SurfaceEditor`] holds every cell-level and whole-surface edit as a
//! provided method on top of a handful of storage accessors, so an owned
//! [`CellSurface`](super::CellSurface) and a borrowed
//! [`SurfaceView`](super::SurfaceView) share one implementation.
//!
//! Coordinates are signed. Anything that falls outside the surface is
//! silently ignored; getters return `None` for it.

use rand::Rng;

use super::cell::{Cell, CellDecorator, Mirror};
use super::color::Color;
use super::colored_string::ColoredString;
use super::effect::CellEffect;
use super::geometry::{Point, Rect};
use crate::parser::{CommandStacks, ParseContext, StringParser};

/// Direction of a shift, for the `times_shifted_*` counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Editing operations over a width x height grid of cells
pub trait SurfaceEditor {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Cell by row-major index
    fn cell(&self, index: usize) -> Option<&Cell>;
    /// Mutable cell by row-major index; does not mark the surface dirty
    fn cell_mut(&mut self, index: usize) -> Option<&mut Cell>;

    fn default_foreground(&self) -> Color;
    fn default_background(&self) -> Color;

    fn is_dirty(&self) -> bool;
    fn set_dirty(&mut self, dirty: bool);

    /// Whether `print` routes text through the markup parser
    fn use_print_processor(&self) -> bool;
    /// Markup parser for `print` and cursor printing
    fn print_parser(&self) -> &StringParser;

    fn cell_effect(&self, index: usize) -> Option<&CellEffect>;
    /// Attach, replace or remove the effect on one cell
    fn set_cell_effect(&mut self, index: usize, effect: Option<CellEffect>);
    /// Remove every effect, restoring the affected cells
    fn clear_effects(&mut self);
    /// Move each effect from cell `i` to `map(i)`; effects mapped to `None`
    /// are dropped without touching any cell
    fn remap_effects(&mut self, map: &mut dyn FnMut(usize) -> Option<usize>);

    /// Accumulate a shift of `amount` rows/columns
    fn record_shift(&mut self, direction: ShiftDirection, amount: usize);

    fn len(&self) -> usize {
        self.width() * self.height()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole surface as a rectangle at the origin
    fn area(&self) -> Rect {
        Rect::with_size(self.width(), self.height())
    }

    fn is_valid_cell(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        self.is_valid_cell(x, y)
            .then(|| y as usize * self.width() + x as usize)
    }

    fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index_of(x, y).and_then(|i| self.cell(i))
    }

    /// Run `edit` on the cell at (x, y) and mark the surface dirty
    ///
    /// Returns false when the coordinate is out of bounds.
    fn edit_cell(&mut self, x: i32, y: i32, edit: impl FnOnce(&mut Cell)) -> bool
    where
        Self: Sized,
    {
        let Some(cell) = self.index_of(x, y).and_then(|i| self.cell_mut(i)) else {
            return false;
        };
        edit(cell);
        self.set_dirty(true);
        true
    }

    fn get_glyph(&self, x: i32, y: i32) -> Option<u32> {
        self.cell_at(x, y).map(|c| c.glyph)
    }

    fn set_glyph(&mut self, x: i32, y: i32, glyph: u32)
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| c.glyph = glyph);
    }

    fn get_foreground(&self, x: i32, y: i32) -> Option<Color> {
        self.cell_at(x, y).map(|c| c.foreground)
    }

    fn set_foreground(&mut self, x: i32, y: i32, color: Color)
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| c.foreground = color);
    }

    fn get_background(&self, x: i32, y: i32) -> Option<Color> {
        self.cell_at(x, y).map(|c| c.background)
    }

    fn set_background(&mut self, x: i32, y: i32, color: Color)
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| c.background = color);
    }

    fn get_mirror(&self, x: i32, y: i32) -> Option<Mirror> {
        self.cell_at(x, y).map(|c| c.mirror)
    }

    fn set_mirror(&mut self, x: i32, y: i32, mirror: Mirror)
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| c.mirror = mirror);
    }

    fn get_decorators(&self, x: i32, y: i32) -> Option<&[CellDecorator]> {
        self.cell_at(x, y).map(|c| c.decorators.as_slice())
    }

    /// Replace the decorators of a cell; an empty slice clears them
    fn set_decorators(&mut self, x: i32, y: i32, decorators: &[CellDecorator])
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| {
            c.decorators.clear();
            c.decorators.extend_from_slice(decorators);
        });
    }

    fn add_decorators(&mut self, x: i32, y: i32, decorators: &[CellDecorator])
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| c.decorators.extend_from_slice(decorators));
    }

    fn clear_decorators(&mut self, x: i32, y: i32)
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| c.decorators.clear());
    }

    fn get_effect(&self, x: i32, y: i32) -> Option<&CellEffect> {
        self.index_of(x, y).and_then(|i| self.cell_effect(i))
    }

    fn set_effect(&mut self, x: i32, y: i32, effect: Option<CellEffect>) {
        if let Some(index) = self.index_of(x, y) {
            self.set_cell_effect(index, effect);
            self.set_dirty(true);
        }
    }

    /// Copy glyph, colors, mirror and decorators from `appearance`
    fn set_cell_appearance(&mut self, x: i32, y: i32, appearance: &Cell)
    where
        Self: Sized,
    {
        self.edit_cell(x, y, |c| {
            appearance.copy_appearance_to(c);
            c.decorators.clone_from(&appearance.decorators);
        });
    }

    /// Print text at (x, y); see [`SurfaceEditor::print_with`]
    fn print(&mut self, x: i32, y: i32, text: &str)
    where
        Self: Sized,
    {
        self.print_with(x, y, text, None, None, None);
    }

    /// Print text, overwriting only the channels that are given
    ///
    /// With the print processor off each character becomes one glyph and the
    /// text continues across rows, stopping at the end of the surface. With it
    /// on, the text is run through the markup parser first.
    fn print_with(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        foreground: Option<Color>,
        background: Option<Color>,
        mirror: Option<Mirror>,
    ) where
        Self: Sized,
    {
        if self.use_print_processor() {
            let parser = self.print_parser().clone();
            self.print_with_parser(&parser, x, y, text, foreground, background, mirror);
            return;
        }
        let Some(start) = self.index_of(x, y) else {
            return;
        };
        for (index, ch) in (start..self.len()).zip(text.chars()) {
            if let Some(cell) = self.cell_mut(index) {
                cell.glyph = ch as u32;
                if let Some(fg) = foreground {
                    cell.foreground = fg;
                }
                if let Some(bg) = background {
                    cell.background = bg;
                }
                if let Some(m) = mirror {
                    cell.mirror = m;
                }
            }
        }
        self.set_dirty(true);
    }

    /// Parse `text` as markup and print it
    ///
    /// The given channels are forced through the parser as initial commands,
    /// and glyphs start from the appearance already on the surface.
    #[allow(clippy::too_many_arguments)]
    fn print_with_parser(
        &mut self,
        parser: &StringParser,
        x: i32,
        y: i32,
        text: &str,
        foreground: Option<Color>,
        background: Option<Color>,
        mirror: Option<Mirror>,
    ) where
        Self: Sized,
    {
        let Some(start) = self.index_of(x, y) else {
            return;
        };
        let seed: Vec<Cell> = (start..self.len())
            .take(text.chars().count())
            .filter_map(|i| self.cell(i).cloned())
            .collect();
        let context = ParseContext {
            seed: &seed,
            template: None,
            default_foreground: self.default_foreground(),
            default_background: self.default_background(),
            stacks: CommandStacks::with_forced(foreground, background, mirror),
        };
        let colored = parser.parse_with(text, context);
        self.print_colored(x, y, &colored);
    }

    /// Paint a colored string, honoring its ignore flags
    fn print_colored(&mut self, x: i32, y: i32, text: &ColoredString)
    where
        Self: Sized,
    {
        let Some(start) = self.index_of(x, y) else {
            return;
        };
        for (index, glyph) in (start..self.len()).zip(text.iter()) {
            if let Some(cell) = self.cell_mut(index) {
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
            if !text.ignore_effect {
                self.set_cell_effect(index, glyph.effect.clone());
            }
        }
        self.set_dirty(true);
    }

    /// Set the given channels on every cell and drop all decorators
    fn fill(
        &mut self,
        foreground: Option<Color>,
        background: Option<Color>,
        glyph: Option<u32>,
        mirror: Option<Mirror>,
    ) where
        Self: Sized,
    {
        let area = self.area();
        self.fill_area(area, foreground, background, glyph, mirror);
    }

    /// [`SurfaceEditor::fill`] restricted to an area (clipped)
    fn fill_area(
        &mut self,
        area: Rect,
        foreground: Option<Color>,
        background: Option<Color>,
        glyph: Option<u32>,
        mirror: Option<Mirror>,
    ) where
        Self: Sized,
    {
        let area = area.intersect(&self.area());
        for point in area.points() {
            let Some(cell) = self.index_of(point.x, point.y).and_then(|i| self.cell_mut(i)) else {
                continue;
            };
            if let Some(fg) = foreground {
                cell.foreground = fg;
            }
            if let Some(bg) = background {
                cell.background = bg;
            }
            if let Some(g) = glyph {
                cell.glyph = g;
            }
            if let Some(m) = mirror {
                cell.mirror = m;
            }
            cell.decorators.clear();
        }
        self.set_dirty(true);
    }

    /// Reset every cell to the default colors, glyph 0, no mirror
    fn clear(&mut self)
    where
        Self: Sized,
    {
        self.clear_effects();
        let (fg, bg) = (self.default_foreground(), self.default_background());
        for index in 0..self.len() {
            if let Some(cell) = self.cell_mut(index) {
                cell.reset(fg, bg);
            }
        }
        self.set_dirty(true);
    }

    fn clear_cell(&mut self, x: i32, y: i32)
    where
        Self: Sized,
    {
        self.clear_area(Rect::new(x, y, 1, 1));
    }

    /// Clear `length` cells starting at (x, y), continuing across rows
    fn clear_run(&mut self, x: i32, y: i32, length: usize)
    where
        Self: Sized,
    {
        let Some(start) = self.index_of(x, y) else {
            return;
        };
        let end = start.saturating_add(length).min(self.len());
        for index in start..end {
            self.reset_cell(index);
        }
        self.set_dirty(true);
    }

    fn clear_area(&mut self, area: Rect)
    where
        Self: Sized,
    {
        let area = area.intersect(&self.area());
        for point in area.points() {
            if let Some(index) = self.index_of(point.x, point.y) {
                self.reset_cell(index);
            }
        }
        self.set_dirty(true);
    }

    /// Remove a cell's effect and reset it to the defaults
    fn reset_cell(&mut self, index: usize) {
        if self.cell_effect(index).is_some() {
            self.set_cell_effect(index, None);
        }
        let (fg, bg) = (self.default_foreground(), self.default_background());
        if let Some(cell) = self.cell_mut(index) {
            cell.reset(fg, bg);
        }
    }

    /// Scroll content up; negative amounts scroll down
    fn shift_up(&mut self, amount: i32, wrap: bool)
    where
        Self: Sized,
    {
        let direction = if amount < 0 { ShiftDirection::Down } else { ShiftDirection::Up };
        shift(self, direction, amount.unsigned_abs() as usize, wrap);
    }

    /// Scroll content down; negative amounts scroll up
    fn shift_down(&mut self, amount: i32, wrap: bool)
    where
        Self: Sized,
    {
        let direction = if amount < 0 { ShiftDirection::Up } else { ShiftDirection::Down };
        shift(self, direction, amount.unsigned_abs() as usize, wrap);
    }

    /// Scroll content left; negative amounts scroll right
    fn shift_left(&mut self, amount: i32, wrap: bool)
    where
        Self: Sized,
    {
        let direction = if amount < 0 { ShiftDirection::Right } else { ShiftDirection::Left };
        shift(self, direction, amount.unsigned_abs() as usize, wrap);
    }

    /// Scroll content right; negative amounts scroll left
    fn shift_right(&mut self, amount: i32, wrap: bool)
    where
        Self: Sized,
    {
        let direction = if amount < 0 { ShiftDirection::Left } else { ShiftDirection::Right };
        shift(self, direction, amount.unsigned_abs() as usize, wrap);
    }

    /// Copy the appearance of every cell to `destination` at its origin
    fn copy_to<D: SurfaceEditor + ?Sized>(&self, destination: &mut D)
    where
        Self: Sized,
    {
        self.copy_area_to(self.area(), destination, 0, 0);
    }

    fn copy_to_at<D: SurfaceEditor + ?Sized>(&self, destination: &mut D, x: i32, y: i32)
    where
        Self: Sized,
    {
        self.copy_area_to(self.area(), destination, x, y);
    }

    /// Copy the appearance (glyph, colors, mirror) of `area` to `destination`
    /// with the area's top-left landing on (x, y); both sides are clipped
    fn copy_area_to<D: SurfaceEditor + ?Sized>(&self, area: Rect, destination: &mut D, x: i32, y: i32)
    where
        Self: Sized,
    {
        let clipped = area.intersect(&self.area());
        for point in clipped.points() {
            let Some(source) = self.cell_at(point.x, point.y) else {
                continue;
            };
            let target = Point::new(x + point.x - area.x, y + point.y - area.y);
            if let Some(cell) = destination
                .index_of(target.x, target.y)
                .and_then(|i| destination.cell_mut(i))
            {
                source.copy_appearance_to(cell);
            }
        }
        destination.set_dirty(true);
    }

    /// Clones of the cells inside `area`, clipped to the surface
    fn get_cells(&self, area: Rect) -> Vec<Cell> {
        area.intersect(&self.area())
            .points()
            .filter_map(|p| self.cell_at(p.x, p.y).cloned())
            .collect()
    }

    /// Cycle glyphs 0..=255 with random colors and mirroring
    fn fill_with_random_garbage<R: Rng + ?Sized>(&mut self, rng: &mut R)
    where
        Self: Sized,
    {
        for index in 0..self.len() {
            let foreground = Color::rgb(rng.gen(), rng.gen(), rng.gen());
            let background = Color::rgb(rng.gen(), rng.gen(), rng.gen());
            let mirror = Mirror::from_index(rng.gen_range(0..4)).unwrap_or_default();
            if let Some(cell) = self.cell_mut(index) {
                cell.glyph = (index % 256) as u32;
                cell.foreground = foreground;
                cell.background = background;
                cell.mirror = mirror;
            }
        }
        self.set_dirty(true);
    }
}

/// Move every cell's content `amount` steps in `direction`
///
/// Vacated rows/columns reset to the defaults unless `wrap` is set, in which
/// case the content pushed off one edge re-enters on the other. Amounts at or
/// beyond the extent clear everything (no wrap) or rotate by the remainder.
/// Cell effects and their saved state travel with the content; effects on
/// content pushed off the surface are dropped.
fn shift<S: SurfaceEditor + ?Sized>(surface: &mut S, direction: ShiftDirection, amount: usize, wrap: bool) {
    let (width, height) = (surface.width(), surface.height());
    surface.record_shift(direction, amount);
    if width == 0 || height == 0 || amount == 0 {
        surface.set_dirty(true);
        return;
    }
    let extent = match direction {
        ShiftDirection::Up | ShiftDirection::Down => height,
        ShiftDirection::Left | ShiftDirection::Right => width,
    };
    if amount >= extent {
        tracing::debug!(?direction, amount, extent, wrap, "shift amount covers the whole surface");
    }
    let n = if wrap { amount % extent } else { amount };

    // Source coordinate along the shifted axis for a destination coordinate
    let source = |d: usize| -> Option<usize> {
        match direction {
            ShiftDirection::Up | ShiftDirection::Left => {
                if wrap {
                    Some((d + n) % extent)
                } else {
                    d.checked_add(n).filter(|s| *s < extent)
                }
            },
            ShiftDirection::Down | ShiftDirection::Right => {
                if wrap {
                    Some((d + extent - n) % extent)
                } else {
                    d.checked_sub(n)
                }
            },
        }
    };

    let old: Vec<Cell> = (0..width * height)
        .filter_map(|i| surface.cell(i).cloned())
        .collect();
    if old.len() != width * height {
        return;
    }
    let (fg, bg) = (surface.default_foreground(), surface.default_background());
    let mut destination_of: Vec<Option<usize>> = vec![None; width * height];
    for y in 0..height {
        for x in 0..width {
            let from = match direction {
                ShiftDirection::Up | ShiftDirection::Down => source(y).map(|sy| sy * width + x),
                ShiftDirection::Left | ShiftDirection::Right => source(x).map(|sx| y * width + sx),
            };
            let index = y * width + x;
            let Some(cell) = surface.cell_mut(index) else {
                continue;
            };
            match from {
                Some(from) => {
                    *cell = old[from].clone();
                    destination_of[from] = Some(index);
                },
                None => {
                    cell.reset(fg, bg);
                    cell.state = None;
                },
            }
        }
    }
    surface.remap_effects(&mut |index| destination_of.get(index).copied().flatten());
    surface.set_dirty(true);
}
