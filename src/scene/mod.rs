//! Scene Graph Module
//!
//! Screen objects arranged in a tree, consoles that bind a surface to a font
//! and a cursor, and the protocol consoles use to hand their cells to a
//! renderer.

mod console;
mod font;
mod object;
mod renderer;

pub use console::Console;
pub use font::{Font, FontError, FontSize, DEFAULT_SOLID_GLYPH};
pub use object::{Component, FrameContext, ObjectId, Scene, ScreenObject};
pub use renderer::{RenderTarget, Renderer, TextRenderer};

/// Errors from structural scene edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("unknown screen object {0:?}")]
    UnknownObject(ObjectId),
    #[error("cannot attach {child:?} under {parent:?}: it would become its own ancestor")]
    Cycle { parent: ObjectId, child: ObjectId },
}
