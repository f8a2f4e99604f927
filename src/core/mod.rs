//! Surface Core Module
//!
//! Platform-independent cell grid state. This module contains:
//! - Cell representation with decorators and effects
//! - Colors, points and rectangles
//! - The cell surface and every editing operation on it
//! - Line, box and circle drawing
//! - The text cursor
//! - Deterministic snapshot generation
//!
//! The core is deterministic: given the same sequence of edits (and the same
//! random seed for the operations that take one), a surface always ends up
//! in the same state.

mod algorithms;
mod cell;
mod color;
mod colored_string;
mod cursor;
mod drawing;
mod editor;
mod effect;
mod geometry;
mod snapshot;
mod surface;

pub use algorithms::{clip_line, ellipse, flood_fill, line, LinePoints};
pub use cell::{Cell, CellDecorator, CellState, Mirror};
pub use color::{Color, ColorGradient};
pub use colored_string::{ColoredGlyph, ColoredString};
pub use cursor::{Cursor, CursorWriter, CURSOR_BLINK_PERIOD, CURSOR_GLYPH};
pub use drawing::{ConnectedLineIndex, Drawing, CONNECTED_LINE_THICK, CONNECTED_LINE_THIN};
pub use editor::{ShiftDirection, SurfaceEditor};
pub use effect::{Blink, CellEffect, EffectSet, Fade};
pub use geometry::{Point, Rect};
pub use snapshot::{CellSnapshot, ColorSnapshot, CursorSnapshot, Snapshot};
pub use surface::{CellSurface, DirtyObservers, DirtySubscription, ShiftCounters, SurfaceError, SurfaceView};
