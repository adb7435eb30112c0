//! Chess engine wrapper - single source of truth for game state
//!
//! `ChessEngine` wraps a `shakmaty::Chess` position together with the stack of
//! earlier positions and the move history. It is authoritative for:
//!
//! - Move legality and application
//! - Legal destinations of a square
//! - Turn order and occupancy
//! - Check / checkmate / draw detection
//! - Single-ply undo
//!
//! The board controller and the renderer never hold their own piece list; they
//! re-read occupancy from here on every render.

use crate::game::error::{GameError, GameResult};
use crate::game::history::{MoveHistory, MoveRecord};
use crate::game::status::GameStatus;
use crate::game::types::MoveCandidate;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Piece, Position, Role, Square};

/// Half-moves without capture or pawn move after which the game is drawn
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Rules engine state: current position, earlier positions and history
#[derive(Debug, Clone)]
pub struct ChessEngine {
    position: Chess,
    /// Positions before each applied move; `undo` pops from here
    previous: Vec<Chess>,
    history: MoveHistory,
}

impl Default for ChessEngine {
    fn default() -> Self {
        let position = Chess::default();
        let history = MoveHistory::new(
            fen_of(&position),
            position.turn(),
            position.fullmoves().get(),
        );
        Self {
            position,
            previous: Vec::new(),
            history,
        }
    }
}

impl ChessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from a FEN string
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPosition`] when the string does not parse or
    /// describes an impossible position (missing king, side not to move in
    /// check, ...).
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let invalid = |reason: String| GameError::InvalidPosition {
            fen: fen.to_string(),
            reason,
        };

        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{}", e)))?;

        let history = MoveHistory::new(
            fen_of(&position),
            position.turn(),
            position.fullmoves().get(),
        );
        Ok(Self {
            position,
            previous: Vec::new(),
            history,
        })
    }

    /// Replace the whole game with the given position
    ///
    /// Either the new position is fully installed or the engine is left
    /// untouched.
    pub fn load_fen(&mut self, fen: &str) -> GameResult<()> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// FEN of the current position
    pub fn fen(&self) -> String {
        fen_of(&self.position)
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Whether `square` holds a piece of the side to move
    pub fn is_own_piece(&self, square: Square) -> bool {
        self.piece_at(square)
            .is_some_and(|piece| piece.color == self.turn())
    }

    /// Destination squares of every legal move starting on `square`
    ///
    /// Promotions collapse into a single destination. Castling is reported
    /// with the king's destination (`e1` → `g1`).
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        let mut destinations: Vec<Square> = self
            .position
            .legal_moves()
            .iter()
            .filter_map(|m| match m.to_uci(CastlingMode::Standard) {
                UciMove::Normal { from, to, .. } if from == square => Some(to),
                _ => None,
            })
            .collect();
        destinations.sort();
        destinations.dedup();
        destinations
    }

    /// Legal moves in UCI notation
    pub fn legal_uci_moves(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    /// Resolve a candidate to the legal move it denotes, if any
    ///
    /// A promotion request on a move that is not a promotion is ignored; a
    /// pawn reaching the last rank without a request promotes to a queen.
    pub fn find_legal(&self, candidate: &MoveCandidate) -> Option<Move> {
        self.position.legal_moves().into_iter().find(|m| {
            match m.to_uci(CastlingMode::Standard) {
                UciMove::Normal {
                    from,
                    to,
                    promotion,
                } if from == candidate.from && to == candidate.to => match promotion {
                    Some(role) => role == candidate.promotion.unwrap_or(Role::Queen),
                    None => true,
                },
                _ => false,
            }
        })
    }

    /// Apply a move if legal
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidMove`] when the rules reject the candidate. The
    /// position, turn and history are unchanged in that case.
    pub fn play(&mut self, candidate: &MoveCandidate) -> GameResult<MoveRecord> {
        let m = self
            .find_legal(candidate)
            .ok_or_else(|| GameError::InvalidMove {
                uci: candidate.to_uci(),
            })?;

        let mover = self.position.turn();
        let uci = m.to_uci(CastlingMode::Standard).to_string();

        self.previous.push(self.position.clone());
        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, m).to_string();

        let record = MoveRecord {
            uci,
            san,
            mover,
            fen_after: self.fen(),
        };
        self.history.add_move(record.clone());
        Ok(record)
    }

    /// Revert the last half-move
    pub fn undo(&mut self) -> Option<MoveRecord> {
        let position = self.previous.pop()?;
        self.position = position;
        self.history.pop()
    }

    /// How many times the current position has occurred in this game
    ///
    /// Positions compare by placement, turn, castling rights and en passant
    /// square, ignoring move counters.
    pub fn repetition_count(&self) -> usize {
        1 + self
            .previous
            .iter()
            .filter(|earlier| **earlier == self.position)
            .count()
    }

    /// Derive the game status from the current position
    pub fn status(&self) -> GameStatus {
        let pos = &self.position;
        let turn = pos.turn();

        if pos.is_checkmate() {
            GameStatus::Checkmate { winner: !turn }
        } else if pos.is_stalemate() {
            GameStatus::Stalemate
        } else if self.repetition_count() >= 3 {
            GameStatus::ThreefoldRepetition
        } else if pos.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if pos.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            GameStatus::FiftyMoveRule
        } else if pos.is_check() {
            GameStatus::Check { side: turn }
        } else {
            GameStatus::Normal { to_move: turn }
        }
    }
}

fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}
