//! Game status tracking and result messages
//!
//! Two views of "is the game over":
//!
//! - [`GameStatus`] is derived locally from the rules engine after every
//!   applied move and drives the status line.
//! - [`TerminalState`] is the tag returned by the AI service's
//!   `check-game-state` endpoint and decides whether the orchestrator keeps
//!   asking for AI moves.
//!
//! # Draw Conditions
//!
//! - **Stalemate**: side to move has no legal moves and is not in check
//! - **Threefold repetition**: the current position occurred three times
//! - **Insufficient material**: neither side can deliver checkmate
//! - **Fifty-move rule**: 100 half-moves without a capture or pawn move

use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::fmt;

/// Human-readable side name
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// Status derived from the current position
///
/// Variants are listed in the order they are checked: a checkmate is never
/// reported as check, a stalemate never as a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Side to move is mated; `winner` is the other side
    Checkmate { winner: Color },
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    FiftyMoveRule,
    /// Side to move is in check but has legal moves
    Check { side: Color },
    /// Game in progress with nothing notable
    Normal { to_move: Color },
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::Normal {
            to_move: Color::White,
        }
    }
}

impl GameStatus {
    /// Check if the game has ended
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::Check { .. } | GameStatus::Normal { .. })
    }

    /// Winning side, if the game ended decisively
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.is_game_over() && self.winner().is_none()
    }

    /// PGN result token (`1-0`, `0-1`, `1/2-1/2`, `*`)
    pub fn result_token(&self) -> &'static str {
        match self {
            GameStatus::Checkmate {
                winner: Color::White,
            } => "1-0",
            GameStatus::Checkmate {
                winner: Color::Black,
            } => "0-1",
            s if s.is_draw() => "1/2-1/2",
            _ => "*",
        }
    }

    /// Status line text
    pub fn message(&self) -> String {
        match self {
            GameStatus::Checkmate { winner } => {
                format!("Checkmate! {} wins.", color_name(*winner))
            }
            GameStatus::Stalemate => "Draw by stalemate.".to_string(),
            GameStatus::ThreefoldRepetition => "Draw by threefold repetition.".to_string(),
            GameStatus::InsufficientMaterial => "Draw by insufficient material.".to_string(),
            GameStatus::FiftyMoveRule => "Draw by fifty-move rule.".to_string(),
            GameStatus::Check { side } => format!("{} is in check.", color_name(*side)),
            GameStatus::Normal { to_move } => format!("{} to move.", color_name(*to_move)),
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Terminal-state tag reported by the AI service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TerminalState {
    Ongoing,
    Checkmate,
    Stalemate,
    /// Insufficient material
    Draw,
    Repetition,
    FiftyMoves,
    /// The service failed to judge the position
    Error,
    /// Any tag this client does not know
    Other(String),
}

impl TerminalState {
    pub fn tag(&self) -> &str {
        match self {
            TerminalState::Ongoing => "ongoing",
            TerminalState::Checkmate => "checkmate",
            TerminalState::Stalemate => "stalemate",
            TerminalState::Draw => "draw",
            TerminalState::Repetition => "repetition",
            TerminalState::FiftyMoves => "fifty_moves",
            TerminalState::Error => "error",
            TerminalState::Other(tag) => tag,
        }
    }

    /// Whether the game must stop
    ///
    /// `Error` is not terminal: the service could not judge the position, so
    /// the caller falls back to its own status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminalState::Ongoing | TerminalState::Error)
    }
}

impl From<String> for TerminalState {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "ongoing" => TerminalState::Ongoing,
            "checkmate" => TerminalState::Checkmate,
            "stalemate" => TerminalState::Stalemate,
            "draw" => TerminalState::Draw,
            "repetition" => TerminalState::Repetition,
            "fifty_moves" => TerminalState::FiftyMoves,
            "error" => TerminalState::Error,
            _ => TerminalState::Other(tag),
        }
    }
}

impl From<TerminalState> for String {
    fn from(state: TerminalState) -> Self {
        state.tag().to_string()
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
