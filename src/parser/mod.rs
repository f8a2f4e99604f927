//! Colored string markup parser
//!
//! Converts text with inline `[c:...]` commands into a
//! [`ColoredString`](crate::core::ColoredString). Commands live on
//! per-channel stacks while the text is walked left to right; each emitted
//! glyph is built by the top command of every channel.
//!
//! | Command            | Parameters                              |
//! |--------------------|-----------------------------------------|
//! | `r`, `recolor`     | `f\|b:color[:count]`                    |
//! | `m`, `mirror`      | `0..3\|none\|h\|v\|both[:count]`        |
//! | `g`, `grad`        | `f\|b:color:color[:color...]:length`    |
//! | `b`, `blink`       | `[count][:period[:duty]]`               |
//! | `sg`               | `glyph[:count]`                         |
//! | `ceffect`          | `[count]`                               |
//! | `u`, `undo`        | `[times][:f\|b\|g\|m\|e\|a]`            |

mod commands;
mod markup;
mod stacks;

pub use commands::{
    BlinkCommand, BuildContext, ClearEffect, ColorSpec, CommandKind, CommandStatus, Counter, Gradient,
    MirrorCommand, ParseCommand, Recolor, SetGlyph, Undo, DEFAULT_BLINK_PERIOD,
};
pub use markup::{CustomCommandProcessor, ParseContext, StringParser};
pub use stacks::{CommandId, CommandStacks};

/// A markup command that could not be built
///
/// Never returned from parsing; the command is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("invalid color '{0}'")]
    InvalidColor(String),
    #[error("invalid parameters for {command}: '{parameters}'")]
    InvalidParameters {
        command: &'static str,
        parameters: String,
    },
}
