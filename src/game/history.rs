//! Move history tracking
//!
//! Maintains a chronological record of all moves made during the game. This
//! backs:
//!
//! - **Undo**: the record is popped alongside the engine's position stack
//! - **PGN Export**: the `pgn` field of every move notification
//! - **Save game**: the UCI move list posted to the service
//!
//! # Reference
//!
//! PGN specification: https://en.wikipedia.org/wiki/Portable_Game_Notation

use shakmaty::Color;

/// Standard starting position, used to decide whether PGN needs a `FEN` header
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// One applied half-move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Move in UCI notation (`e2e4`, `e7e8q`)
    pub uci: String,
    /// Move in SAN with check/mate suffix (`e4`, `Qxf7#`)
    pub san: String,
    /// Side that made the move
    pub mover: Color,
    /// FEN of the position after the move
    pub fen_after: String,
}

/// Complete move history for the current game
///
/// Index 0 is the first half-move played from `start_fen`, which is not
/// necessarily white's move when the game was loaded from a custom position.
#[derive(Debug, Clone)]
pub struct MoveHistory {
    start_fen: String,
    start_turn: Color,
    start_fullmoves: u32,
    moves: Vec<MoveRecord>,
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::new(STARTING_FEN, Color::White, 1)
    }
}

impl MoveHistory {
    /// Empty history for a game starting at the given position
    pub fn new(start_fen: impl Into<String>, start_turn: Color, start_fullmoves: u32) -> Self {
        Self {
            start_fen: start_fen.into(),
            start_turn,
            start_fullmoves: start_fullmoves.max(1),
            moves: Vec::new(),
        }
    }

    /// Append a move. Called only after the rules engine accepted it.
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    /// Remove and return the most recent move
    pub fn pop(&mut self) -> Option<MoveRecord> {
        self.moves.pop()
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// Number of half-moves (ply) made
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    /// Side to move in the starting position
    pub fn start_turn(&self) -> Color {
        self.start_turn
    }

    /// UCI strings of every move, oldest first
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.uci.clone()).collect()
    }

    /// Movetext only, e.g. `1. e4 e5 2. Nf3`
    ///
    /// Games loaded with black to move start with `1...`-style numbering.
    /// A `SetUp`/`FEN` header pair is prepended when the game did not start
    /// from the standard position, so the movetext stays replayable.
    pub fn pgn(&self) -> String {
        let mut out = String::new();

        if self.start_fen != STARTING_FEN {
            out.push_str("[SetUp \"1\"]\n");
            out.push_str(&format!("[FEN \"{}\"]\n\n", self.start_fen));
        }

        out.push_str(&self.movetext());
        out
    }

    /// PGN with a full header block, as written to disk at the end of a game
    pub fn pgn_with_headers(&self, headers: &[(&str, &str)], result: &str) -> String {
        let mut out = String::new();
        for (key, value) in headers {
            out.push_str(&format!("[{} \"{}\"]\n", key, value.replace('"', "'")));
        }
        out.push_str(&format!("[Result \"{}\"]\n", result));
        if self.start_fen != STARTING_FEN {
            out.push_str("[SetUp \"1\"]\n");
            out.push_str(&format!("[FEN \"{}\"]\n", self.start_fen));
        }
        out.push('\n');

        let movetext = self.movetext();
        if movetext.is_empty() {
            out.push_str(result);
        } else {
            out.push_str(&movetext);
            out.push(' ');
            out.push_str(result);
        }
        out.push('\n');
        out
    }

    fn movetext(&self) -> String {
        let mut tokens: Vec<String> = Vec::with_capacity(self.moves.len() * 3 / 2 + 1);
        let mut number = self.start_fullmoves;

        for (i, record) in self.moves.iter().enumerate() {
            match record.mover {
                Color::White => tokens.push(format!("{}.", number)),
                Color::Black if i == 0 => tokens.push(format!("{}...", number)),
                Color::Black => {}
            }
            tokens.push(record.san.clone());
            if record.mover == Color::Black {
                number += 1;
            }
        }

        tokens.join(" ")
    }

    /// Clear all moves and reset the starting position
    pub fn reset(&mut self, start_fen: impl Into<String>, start_turn: Color, start_fullmoves: u32) {
        *self = Self::new(start_fen, start_turn, start_fullmoves);
    }
}
