//! Chess game logic - rules engine, board interaction and turn orchestration
//!
//! Keeps pure game logic apart from rendering and networking: the engine and
//! the board controller never perform I/O, and the orchestrator reaches the
//! AI service only through [`networking::client::AiService`].
//!
//! # Module Organization
//!
//! - `types` - Orientation, visual coordinates, move candidates
//! - `engine` - `ChessEngine`, the single source of truth for occupancy and turn
//! - `history` - Move records and PGN export
//! - `status` - Locally derived game status and service terminal tags
//! - `selection` - Idle / Selected click state
//! - `events` - Move notifications over typed channels
//! - `board` - `BoardController`: clicks, drops, undo, load, render
//! - `orchestrator` - Player move → AI reply loop
//!
//! # Data Flow
//!
//! ```text
//! click/drop ─▶ BoardController ─▶ ChessEngine
//!                     │
//!              MoveMadeEvent ─▶ Orchestrator ─▶ AiClient ─▶ BoardController
//!                                                  │
//!                                        NetworkVisualization
//! ```
//!
//! [`networking::client::AiService`]: crate::networking::client::AiService

pub mod board;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod orchestrator;
pub mod selection;
pub mod status;
pub mod types;


// Re-export commonly used items
pub use board::{BoardController, SelectionOutcome};
pub use engine::ChessEngine;
pub use error::{GameError, GameResult};
pub use events::MoveMadeEvent;
pub use orchestrator::{MoveDelay, NoDelay, Orchestrator, SessionConfig, TokioDelay};
pub use status::{GameStatus, TerminalState};
pub use types::{BoardCoord, MoveCandidate, Orientation};
