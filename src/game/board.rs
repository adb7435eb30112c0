//! Board controller: interaction, move application and projection
//!
//! `BoardController` owns the rules engine and the transient visual state. It
//! turns clicks, drops and explicit move candidates into engine calls and
//! emits a [`MoveMadeEvent`] for every move that the engine accepts.
//!
//! # Responsibilities
//!
//! - **apply_move**: pure state transition against the engine, plus status
//!   refresh and notification. Never renders.
//! - **render**: pure projection of the current state to a [`BoardView`].
//! - **handle_selection**: the Idle / Selected state machine.
//!
//! Rejected moves and invalid positions are logged and leave every piece of
//! state untouched.

use crate::game::engine::ChessEngine;
use crate::game::error::{GameError, GameResult};
use crate::game::events::{MoveMadeEvent, MoveNotifier};
use crate::game::selection::Selection;
use crate::game::status::{color_name, GameStatus};
use crate::game::types::{BoardCoord, MoveCandidate, Orientation};
use crate::rendering::board::BoardView;
use crate::rendering::theme::BoardTheme;
use crossbeam_channel::Receiver;
use shakmaty::{Color, Square};
use tracing::{debug, info, warn};

/// What a click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// An own piece was selected; its legal destinations are highlighted
    Selected {
        square: Square,
        destinations: Vec<Square>,
    },
    /// The selected piece moved to the clicked square
    Moved(MoveMadeEvent),
    /// A move from the selected square to the clicked one was illegal
    Rejected,
    /// The selected square was clicked again
    Deselected,
    /// Click on an empty or opponent square with nothing selected
    Ignored,
}

/// Board state plus interaction logic
#[derive(Debug)]
pub struct BoardController {
    engine: ChessEngine,
    orientation: Orientation,
    size: u32,
    theme: BoardTheme,
    selection: Selection,
    notifier: MoveNotifier,
    status: GameStatus,
    last_move: Option<(Square, Square)>,
    player_color: Color,
}

impl Default for BoardController {
    fn default() -> Self {
        Self::new(480, Orientation::Normal)
    }
}

impl BoardController {
    pub fn new(size: u32, orientation: Orientation) -> Self {
        let engine = ChessEngine::new();
        let status = engine.status();
        Self {
            engine,
            orientation,
            size: size.max(8),
            theme: BoardTheme::default(),
            selection: Selection::Idle,
            notifier: MoveNotifier::new(),
            status,
            last_move: None,
            player_color: Color::White,
        }
    }

    pub fn with_theme(mut self, theme: BoardTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Side controlled by the local player; undo always returns to this side
    pub fn with_player_color(mut self, color: Color) -> Self {
        self.player_color = color;
        self
    }

    pub fn engine(&self) -> &ChessEngine {
        &self.engine
    }

    pub fn fen(&self) -> String {
        self.engine.fen()
    }

    pub fn turn(&self) -> Color {
        self.engine.turn()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.max(8);
    }

    pub fn set_theme(&mut self, theme: BoardTheme) {
        self.theme = theme;
    }

    pub fn player_color(&self) -> Color {
        self.player_color
    }

    pub fn set_player_color(&mut self, color: Color) {
        self.player_color = color;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected square followed by its legal destinations
    pub fn highlighted(&self) -> Vec<Square> {
        self.selection.highlighted()
    }

    /// Status derived after the last state change
    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn pgn(&self) -> String {
        self.engine.history().pgn()
    }

    /// Listen for move notifications
    pub fn subscribe(&mut self) -> Receiver<MoveMadeEvent> {
        self.notifier.subscribe()
    }

    /// Project the current state; no side effects
    pub fn render(&self) -> BoardView {
        BoardView::project(
            &self.engine,
            self.orientation,
            self.size,
            self.theme,
            &self.selection,
            self.last_move,
        )
    }

    /// Square under a pixel position, `None` outside the board
    pub fn square_at_point(&self, x: f32, y: f32) -> Option<Square> {
        let size = self.size as f32;
        if !(0.0..size).contains(&x) || !(0.0..size).contains(&y) {
            return None;
        }
        let cell = size / 8.0;
        let coord = BoardCoord::new((y / cell) as u8, (x / cell) as u8)?;
        Some(coord.to_square(self.orientation))
    }

    /// Click-to-move state machine
    pub fn handle_selection(&mut self, square: Square) -> SelectionOutcome {
        match self.selection.selected_square() {
            None => {
                if !self.engine.is_own_piece(square) {
                    debug!("[BOARD] Ignoring click on {}", square);
                    return SelectionOutcome::Ignored;
                }
                let destinations = self.engine.legal_destinations(square);
                debug!("[BOARD] Selected {} ({} destinations)", square, destinations.len());
                self.selection.select(square, destinations.clone());
                SelectionOutcome::Selected {
                    square,
                    destinations,
                }
            }
            Some(from) if from == square => {
                self.selection.clear();
                SelectionOutcome::Deselected
            }
            Some(from) => {
                let result = self.apply_move(MoveCandidate::user(from, square));
                self.selection.clear();
                match result {
                    Ok(event) => SelectionOutcome::Moved(event),
                    Err(_) => SelectionOutcome::Rejected,
                }
            }
        }
    }

    /// Alias for [`Self::handle_selection`]
    pub fn click(&mut self, square: Square) -> SelectionOutcome {
        self.handle_selection(square)
    }

    /// Drag-and-drop of a piece; always requests queen promotion
    pub fn drop(&mut self, from: Square, to: Square) -> GameResult<MoveMadeEvent> {
        self.selection.clear();
        self.apply_move(MoveCandidate::user(from, to))
    }

    /// Apply a candidate move through the rules engine
    ///
    /// On success the status is recomputed and listeners are notified with the
    /// post-move position. On rejection nothing changes and nobody is notified.
    pub fn apply_move(&mut self, candidate: MoveCandidate) -> GameResult<MoveMadeEvent> {
        let record = match self.engine.play(&candidate) {
            Ok(record) => record,
            Err(e) => {
                warn!("[BOARD] Move rejected: {}", e);
                return Err(e);
            }
        };

        self.last_move = Some((candidate.from, candidate.to));
        self.status = self.engine.status();

        let event = MoveMadeEvent {
            uci: record.uci,
            san: record.san,
            fen: record.fen_after,
            pgn: self.engine.history().pgn(),
            mover: record.mover,
        };
        info!(
            "[BOARD] {} played {} ({})",
            color_name(event.mover),
            event.san,
            self.status
        );
        self.notifier.notify(&event);
        Ok(event)
    }

    /// Apply a move given in UCI notation, as returned by the AI service
    pub fn apply_uci(&mut self, uci: &str) -> GameResult<MoveMadeEvent> {
        let candidate: MoveCandidate = uci.parse().inspect_err(|e| {
            warn!("[BOARD] {}", e);
        })?;
        self.apply_move(candidate)
    }

    pub fn set_orientation(&mut self, flipped: bool) {
        self.orientation = Orientation::from_flipped(flipped);
    }

    pub fn flip(&mut self) {
        self.orientation = self.orientation.toggled();
    }

    /// Undo back to the player's turn
    ///
    /// Reverts one ply, and a second one when that leaves the opponent to
    /// move, so undoing after the AI replied removes both the reply and the
    /// player's move. Returns the number of plies reverted.
    pub fn undo_last(&mut self) -> GameResult<usize> {
        if self.engine.undo().is_none() {
            warn!("[BOARD] Nothing to undo");
            return Err(GameError::NothingToUndo);
        }
        let mut undone = 1;
        if self.engine.turn() != self.player_color && self.engine.undo().is_some() {
            undone += 1;
        }

        self.selection.clear();
        self.last_move = self.engine.history().last_move().and_then(|m| {
            let candidate: MoveCandidate = m.uci.parse().ok()?;
            Some((candidate.from, candidate.to))
        });
        self.status = self.engine.status();
        info!("[BOARD] Undid {} ply", undone);
        Ok(undone)
    }

    /// Replace the game with a position; invalid input leaves everything unchanged
    pub fn load_position(&mut self, fen: &str) -> GameResult<()> {
        if let Err(e) = self.engine.load_fen(fen) {
            warn!("[BOARD] {}", e);
            return Err(e);
        }
        self.selection.clear();
        self.last_move = None;
        self.status = self.engine.status();
        info!("[BOARD] Loaded position {}", self.engine.fen());
        Ok(())
    }

    /// Reset to the standard starting position
    pub fn new_game(&mut self) {
        self.engine = ChessEngine::new();
        self.selection.clear();
        self.last_move = None;
        self.status = self.engine.status();
        info!("[BOARD] New game");
    }
}
