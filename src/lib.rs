//! SadConsole Library
//!
//! A glyph-grid rendering core: consoles are rectangular grids of colored
//! glyph cells composed into a scene graph. This crate provides:
//!
//! - `core`: cells, colors, the cell surface and its editing operations,
//!   drawing, the text cursor and snapshots
//! - `parser`: the colored string markup parser
//! - `scene`: screen objects, consoles, fonts and the render protocol
//! - `app`: engine configuration and the engine context

pub mod app;
pub mod core;
pub mod parser;
pub mod scene;
