//! Core module - configuration, errors and logging setup
//!
//! - [`settings`] - `ClientSettings` with JSON persistence and env overrides
//! - [`error`] - `CoreError`
//! - [`logging`] - tracing subscriber installation for the binary

pub mod error;
pub mod logging;
pub mod settings;

pub use error::{CoreError, CoreResult};
pub use settings::{ClientSettings, PlayerSide};
