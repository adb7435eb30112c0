//! Type definitions and utilities for board coordinates and move candidates
//!
//! Squares are `shakmaty::Square` values everywhere in the crate. This module
//! adds the two things the rules engine does not know about:
//!
//! - **Visual coordinates**: a `(row, col)` pair on the rendered grid, whose
//!   mapping to a square depends on the board [`Orientation`].
//! - **Move candidates**: a `(from, to, promotion)` triple produced by user
//!   interaction or by the AI service before the rules engine has judged it.
//!
//! # Coordinate System
//!
//! - Row 0 is the top of the rendered board, column 0 the left edge.
//! - `Orientation::Normal` puts rank 8 on top and file a on the left (white at
//!   the bottom).
//! - `Orientation::Flipped` rotates the board by 180 degrees.

use crate::game::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use shakmaty::{File, Rank, Role, Square};
use std::fmt;
use std::str::FromStr;

/// Which side of the board is drawn at the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// White at the bottom
    #[default]
    Normal,
    /// Black at the bottom
    Flipped,
}

impl Orientation {
    pub fn from_flipped(flipped: bool) -> Self {
        if flipped {
            Orientation::Flipped
        } else {
            Orientation::Normal
        }
    }

    pub fn is_flipped(self) -> bool {
        self == Orientation::Flipped
    }

    /// The opposite orientation
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Normal => Orientation::Flipped,
            Orientation::Flipped => Orientation::Normal,
        }
    }
}

/// Position of a cell on the rendered 8x8 grid
///
/// Values range from 0 to 7 on both axes. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardCoord {
    pub row: u8,
    pub col: u8,
}

impl BoardCoord {
    /// Create a coordinate, returning `None` outside the grid
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < 8 && col < 8).then_some(BoardCoord { row, col })
    }

    /// Square shown at this cell under the given orientation
    ///
    /// ```rust,ignore
    /// let top_left = BoardCoord::new(0, 0).unwrap();
    /// assert_eq!(top_left.to_square(Orientation::Normal), Square::A8);
    /// assert_eq!(top_left.to_square(Orientation::Flipped), Square::H1);
    /// ```
    pub fn to_square(self, orientation: Orientation) -> Square {
        let (file, rank) = match orientation {
            Orientation::Normal => (self.col, 7 - self.row),
            Orientation::Flipped => (7 - self.col, self.row),
        };
        Square::from_coords(File::new(u32::from(file)), Rank::new(u32::from(rank)))
    }

    /// Cell at which a square is drawn under the given orientation
    pub fn from_square(square: Square, orientation: Orientation) -> Self {
        let file = square.file().to_u32() as u8;
        let rank = square.rank().to_u32() as u8;
        match orientation {
            Orientation::Normal => BoardCoord {
                row: 7 - rank,
                col: file,
            },
            Orientation::Flipped => BoardCoord {
                row: rank,
                col: 7 - file,
            },
        }
    }
}

/// Parse algebraic notation ("e4") into a square
pub fn parse_square(input: &str) -> GameResult<Square> {
    input
        .trim()
        .parse::<Square>()
        .map_err(|_| GameError::InvalidSquare {
            input: input.to_string(),
        })
}

/// A move attempt that has not yet been judged by the rules engine
///
/// Encoded on the wire as a 4 or 5 character UCI string: origin square,
/// destination square and an optional promotion letter (`e7e8q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveCandidate {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl MoveCandidate {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Candidate as produced by a click or drop: promotion always requests a queen
    ///
    /// The queen request only matters when the move turns out to be a pawn
    /// reaching the last rank; otherwise the engine ignores it.
    pub fn user(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: Some(Role::Queen),
        }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }

    /// UCI text of the candidate (`e2e4`, `e7e8q`)
    pub fn to_uci(&self) -> String {
        let mut uci = format!("{}{}", self.from, self.to);
        if let Some(role) = self.promotion {
            uci.push(role.char());
        }
        uci
    }
}

impl fmt::Display for MoveCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

impl FromStr for MoveCandidate {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || GameError::MalformedMove {
            input: s.to_string(),
        };

        if !(s.len() == 4 || s.len() == 5) || !s.is_ascii() {
            return Err(malformed());
        }

        let from = s[0..2].parse::<Square>().map_err(|_| malformed())?;
        let to = s[2..4].parse::<Square>().map_err(|_| malformed())?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match Role::from_char(c.to_ascii_lowercase()) {
                Some(role) if role != Role::Pawn && role != Role::King => Some(role),
                _ => return Err(malformed()),
            },
        };

        Ok(MoveCandidate {
            from,
            to,
            promotion,
        })
    }
}
