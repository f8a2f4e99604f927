//! Application glue module
//!
//! Configuration and the engine context that ties a scene to a frame loop.

mod config;
mod engine;

pub use config::{ConfigError, CursorConfig, EngineConfig};
pub use engine::{Engine, EngineError};
