//! Cell Surface
//!
//! A dense row-major grid of cells with default colors, a dirty flag that
//! observers can watch, per-cell effects and shift counters. All editing
//! goes through [`SurfaceEditor`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::color::Color;
use super::editor::{ShiftDirection, SurfaceEditor};
use super::effect::{CellEffect, EffectSet};
use super::geometry::{Point, Rect};
use crate::parser::StringParser;

/// Errors raised by surface construction and region requests
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("a {width}x{height} surface needs {expected} cells, got {actual}")]
    CellCountMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("area {area:?} is not inside the {width}x{height} surface")]
    AreaOutOfBounds { area: Rect, width: usize, height: usize },
    #[error("connected line style needs {expected} glyphs, got {actual}")]
    InvalidLineStyle { expected: usize, actual: usize },
}

/// Handle returned by [`CellSurface::subscribe_dirty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirtySubscription(u64);

type DirtyCallback = Box<dyn FnMut(bool)>;

/// Callbacks run whenever the dirty flag changes value
///
/// Observers are not carried over when a surface is cloned.
#[derive(Default)]
pub struct DirtyObservers {
    next_id: u64,
    observers: Vec<(DirtySubscription, DirtyCallback)>,
}

impl DirtyObservers {
    fn subscribe(&mut self, callback: DirtyCallback) -> DirtySubscription {
        let id = DirtySubscription(self.next_id);
        self.next_id += 1;
        self.observers.push((id, callback));
        id
    }

    fn unsubscribe(&mut self, id: DirtySubscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        before != self.observers.len()
    }

    fn notify(&mut self, dirty: bool) {
        for (_, callback) in self.observers.iter_mut() {
            callback(dirty);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Clone for DirtyObservers {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for DirtyObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyObservers")
            .field("count", &self.observers.len())
            .finish()
    }
}

/// Running totals of every shift applied to a surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCounters {
    pub up: usize,
    pub down: usize,
    pub left: usize,
    pub right: usize,
}

impl ShiftCounters {
    fn record(&mut self, direction: ShiftDirection, amount: usize) {
        let counter = match direction {
            ShiftDirection::Up => &mut self.up,
            ShiftDirection::Down => &mut self.down,
            ShiftDirection::Left => &mut self.left,
            ShiftDirection::Right => &mut self.right,
        };
        *counter = counter.saturating_add(amount);
    }
}

/// Persisted form of a surface
#[derive(Serialize, Deserialize)]
struct SurfaceData {
    width: usize,
    height: usize,
    default_foreground: Color,
    default_background: Color,
    cells: Vec<Cell>,
    #[serde(default)]
    effects: EffectSet,
    #[serde(default)]
    use_print_processor: bool,
    #[serde(default)]
    shifts: ShiftCounters,
}

/// A width x height grid of cells
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SurfaceData", into = "SurfaceData")]
pub struct CellSurface {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    default_foreground: Color,
    default_background: Color,
    is_dirty: bool,
    effects: EffectSet,
    /// Route `print` through the markup parser
    pub use_print_processor: bool,
    parser: StringParser,
    shifts: ShiftCounters,
    observers: DirtyObservers,
}

impl TryFrom<SurfaceData> for CellSurface {
    type Error = SurfaceError;

    fn try_from(data: SurfaceData) -> Result<Self, SurfaceError> {
        let mut surface = CellSurface::from_cells(data.width, data.height, data.cells)?;
        surface.default_foreground = data.default_foreground;
        surface.default_background = data.default_background;
        surface.effects = data.effects;
        surface.use_print_processor = data.use_print_processor;
        surface.shifts = data.shifts;
        Ok(surface)
    }
}

impl From<CellSurface> for SurfaceData {
    fn from(surface: CellSurface) -> Self {
        SurfaceData {
            width: surface.width,
            height: surface.height,
            default_foreground: surface.default_foreground,
            default_background: surface.default_background,
            cells: surface.cells,
            effects: surface.effects,
            use_print_processor: surface.use_print_processor,
            shifts: surface.shifts,
        }
    }
}

impl CellSurface {
    /// White on transparent surface
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_colors(width, height, Color::WHITE, Color::TRANSPARENT)
    }

    pub fn with_colors(width: usize, height: usize, foreground: Color, background: Color) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::new(foreground, background, 0); width * height],
            default_foreground: foreground,
            default_background: background,
            is_dirty: true,
            effects: EffectSet::new(),
            use_print_processor: false,
            parser: StringParser::default(),
            shifts: ShiftCounters::default(),
            observers: DirtyObservers::default(),
        }
    }

    /// Wrap existing cells; fails unless `cells.len() == width * height`
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, SurfaceError> {
        if cells.len() != width * height {
            return Err(SurfaceError::CellCountMismatch {
                width,
                height,
                expected: width * height,
                actual: cells.len(),
            });
        }
        let mut surface = Self::new(0, 0);
        surface.width = width;
        surface.height = height;
        surface.cells = cells;
        Ok(surface)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn set_default_foreground(&mut self, color: Color) {
        self.default_foreground = color;
    }

    pub fn set_default_background(&mut self, color: Color) {
        self.default_background = color;
    }

    pub fn point_of(&self, index: usize) -> Point {
        Point::from_index(index, self.width)
    }

    pub fn times_shifted_up(&self) -> usize {
        self.shifts.up
    }

    pub fn times_shifted_down(&self) -> usize {
        self.shifts.down
    }

    pub fn times_shifted_left(&self) -> usize {
        self.shifts.left
    }

    pub fn times_shifted_right(&self) -> usize {
        self.shifts.right
    }

    pub fn shift_counters(&self) -> ShiftCounters {
        self.shifts
    }

    pub fn reset_shift_counters(&mut self) {
        self.shifts = ShiftCounters::default();
    }

    /// Parser used by `print` when the print processor is on, and by
    /// cursors printing markup onto this surface
    pub fn set_print_parser(&mut self, parser: StringParser) {
        self.parser = parser;
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    /// Run `callback` every time the dirty flag changes value
    pub fn subscribe_dirty(&mut self, callback: impl FnMut(bool) + 'static) -> DirtySubscription {
        self.observers.subscribe(Box::new(callback))
    }

    pub fn unsubscribe_dirty(&mut self, subscription: DirtySubscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    /// Advance every cell effect; marks the surface dirty if a cell changed
    pub fn update_effects(&mut self, elapsed: f64) -> bool {
        let changed = self.effects.update(elapsed, &mut self.cells);
        if changed {
            self.set_dirty(true);
        }
        changed
    }

    /// Reallocate to a new size
    ///
    /// Cells in the overlap of the old and new sizes are kept, or reset to
    /// the defaults when `clear` is set. New cells get the defaults. Cell
    /// effects are dropped.
    pub fn resize(&mut self, width: usize, height: usize, clear: bool) {
        tracing::debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            clear,
            "resizing cell surface"
        );
        self.effects.clear(&mut self.cells);
        let (fg, bg) = (self.default_foreground, self.default_background);
        let mut old = std::mem::take(&mut self.cells);
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                if x < self.width && y < self.height {
                    let mut cell = std::mem::take(&mut old[y * self.width + x]);
                    if clear {
                        cell.reset(fg, bg);
                    }
                    cells.push(cell);
                } else {
                    cells.push(Cell::new(fg, bg, 0));
                }
            }
        }
        self.cells = cells;
        self.width = width;
        self.height = height;
        self.set_dirty(true);
    }

    /// A copy of the cells inside `area`, which must lie within the surface
    pub fn sub_surface(&self, area: Rect) -> Result<CellSurface, SurfaceError> {
        self.check_area(area)?;
        let cells = area.points().filter_map(|p| self.cell_at(p.x, p.y).cloned()).collect();
        let mut surface = CellSurface::from_cells(area.width as usize, area.height as usize, cells)?;
        surface.default_foreground = self.default_foreground;
        surface.default_background = self.default_background;
        surface.use_print_processor = self.use_print_processor;
        surface.parser = self.parser.clone();
        Ok(surface)
    }

    /// Edit `area` in place as its own surface, without copying
    pub fn view_mut(&mut self, area: Rect) -> Result<SurfaceView<'_>, SurfaceError> {
        self.check_area(area)?;
        Ok(SurfaceView {
            surface: self,
            area,
            shifts: ShiftCounters::default(),
        })
    }

    fn check_area(&self, area: Rect) -> Result<(), SurfaceError> {
        if self.area().contains_rect(&area) {
            Ok(())
        } else {
            Err(SurfaceError::AreaOutOfBounds {
                area,
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl SurfaceEditor for CellSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    fn default_foreground(&self) -> Color {
        self.default_foreground
    }

    fn default_background(&self) -> Color {
        self.default_background
    }

    fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        if self.is_dirty != dirty {
            self.is_dirty = dirty;
            self.observers.notify(dirty);
        }
    }

    fn use_print_processor(&self) -> bool {
        self.use_print_processor
    }

    fn print_parser(&self) -> &StringParser {
        &self.parser
    }

    fn cell_effect(&self, index: usize) -> Option<&CellEffect> {
        self.effects.get(index)
    }

    fn set_cell_effect(&mut self, index: usize, effect: Option<CellEffect>) {
        self.effects.set(index, effect, &mut self.cells);
    }

    fn clear_effects(&mut self) {
        self.effects.clear(&mut self.cells);
    }

    fn remap_effects(&mut self, map: &mut dyn FnMut(usize) -> Option<usize>) {
        self.effects.remap(map);
    }

    fn record_shift(&mut self, direction: ShiftDirection, amount: usize) {
        self.shifts.record(direction, amount);
    }
}

/// A mutable window onto part of a [`CellSurface`]
///
/// Edits land directly in the parent's cells and mark the parent dirty.
/// Shifts inside the view are counted on the view.
#[derive(Debug)]
pub struct SurfaceView<'a> {
    surface: &'a mut CellSurface,
    area: Rect,
    shifts: ShiftCounters,
}

impl SurfaceView<'_> {
    /// The window's rectangle on the parent surface
    pub fn bounds(&self) -> Rect {
        self.area
    }

    pub fn shift_counters(&self) -> ShiftCounters {
        self.shifts
    }

    fn parent_index(&self, index: usize) -> Option<usize> {
        let width = self.area.width as usize;
        if width == 0 || index >= self.len() {
            return None;
        }
        let x = self.area.x as usize + index % width;
        let y = self.area.y as usize + index / width;
        Some(y * self.surface.width + x)
    }
}

impl SurfaceEditor for SurfaceView<'_> {
    fn width(&self) -> usize {
        self.area.width as usize
    }

    fn height(&self) -> usize {
        self.area.height as usize
    }

    fn cell(&self, index: usize) -> Option<&Cell> {
        self.parent_index(index).and_then(|i| self.surface.cells.get(i))
    }

    fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        let parent = self.parent_index(index)?;
        self.surface.cells.get_mut(parent)
    }

    fn default_foreground(&self) -> Color {
        self.surface.default_foreground
    }

    fn default_background(&self) -> Color {
        self.surface.default_background
    }

    fn is_dirty(&self) -> bool {
        self.surface.is_dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.surface.set_dirty(dirty);
    }

    fn use_print_processor(&self) -> bool {
        self.surface.use_print_processor
    }

    fn print_parser(&self) -> &StringParser {
        &self.surface.parser
    }

    fn cell_effect(&self, index: usize) -> Option<&CellEffect> {
        self.parent_index(index).and_then(|i| self.surface.effects.get(i))
    }

    fn set_cell_effect(&mut self, index: usize, effect: Option<CellEffect>) {
        if let Some(parent) = self.parent_index(index) {
            self.surface.set_cell_effect(parent, effect);
        }
    }

    fn clear_effects(&mut self) {
        for index in 0..self.len() {
            if self.cell_effect(index).is_some() {
                self.set_cell_effect(index, None);
            }
        }
    }

    fn remap_effects(&mut self, map: &mut dyn FnMut(usize) -> Option<usize>) {
        let area = self.area;
        let parent_width = self.surface.width;
        let view_width = area.width as usize;
        self.surface.effects.remap(|parent| {
            let point = Point::from_index(parent, parent_width);
            if !area.contains(point) {
                return Some(parent);
            }
            let local = (point.y - area.y) as usize * view_width + (point.x - area.x) as usize;
            let moved = map(local)?;
            let x = area.x as usize + moved % view_width;
            let y = area.y as usize + moved / view_width;
            Some(y * parent_width + x)
        });
    }

    fn record_shift(&mut self, direction: ShiftDirection, amount: usize) {
        self.shifts.record(direction, amount);
    }
}
