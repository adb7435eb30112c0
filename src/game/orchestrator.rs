//! Turn orchestration between the local player and the AI service
//!
//! The orchestrator listens to the board's move notifications. For every move
//! made by the local player it runs one turn:
//!
//! ```text
//! player move ─▶ check terminal ─▶ evaluate ─▶ delay ─▶ request AI move
//!                      │                                     │
//!                  game over                           apply on board
//!                                                            │
//!                                         check terminal ─▶ evaluate
//! ```
//!
//! Each step starts only after the previous one completed. Once a terminal
//! state is reached no further AI requests are issued until a new game, an
//! undo or a position load. Network failures never end the game; they leave
//! the player to move or wait.

use crate::game::board::{BoardController, SelectionOutcome};
use crate::game::error::GameResult;
use crate::game::events::MoveMadeEvent;
use crate::game::status::{color_name, GameStatus, TerminalState};
use crate::game::types::MoveCandidate;
use crate::networking::client::{AiClient, AiService, VisualizationUpdate};
use crate::networking::protocol::SaveGameRequest;
use crate::rendering::network::NetworkVisualization;
use async_trait::async_trait;
use crossbeam_channel::Receiver;
use shakmaty::{Color, Square};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Value of `game_type` in saved games
pub const GAME_TYPE: &str = "user-vs-ai";

/// Pause before each AI move request
#[async_trait]
pub trait MoveDelay: Send + Sync {
    async fn wait(&self);
}

/// Wall-clock delay on the tokio timer
#[derive(Debug, Clone, Copy)]
pub struct TokioDelay(pub Duration);

#[async_trait]
impl MoveDelay for TokioDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// No pause at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl MoveDelay for NoDelay {
    async fn wait(&self) {}
}

/// Per-session options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Side played by the human; the AI plays the other
    pub player_color: Color,
    /// Post finished games to the service
    pub save_games: bool,
    pub player_name: String,
    pub ai_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_color: Color::White,
            save_games: true,
            player_name: "Human".to_string(),
            ai_name: "Strategik DQN".to_string(),
        }
    }
}

/// Why the game ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub state: TerminalState,
    pub message: String,
    /// PGN result token
    pub result: String,
}

/// Binds board, AI client and network view together
pub struct Orchestrator<S: AiService> {
    board: BoardController,
    client: AiClient<S>,
    visualization: NetworkVisualization,
    moves: Receiver<MoveMadeEvent>,
    updates: Receiver<VisualizationUpdate>,
    delay: Box<dyn MoveDelay>,
    config: SessionConfig,
    in_progress: bool,
    outcome: Option<GameOutcome>,
    status_line: String,
}

impl<S: AiService> Orchestrator<S> {
    pub fn new(
        mut board: BoardController,
        mut client: AiClient<S>,
        visualization: NetworkVisualization,
        delay: Box<dyn MoveDelay>,
        config: SessionConfig,
    ) -> Self {
        board.set_player_color(config.player_color);
        let moves = board.subscribe();
        let updates = client.subscribe();
        Self {
            board,
            client,
            visualization,
            moves,
            updates,
            delay,
            config,
            in_progress: true,
            outcome: None,
            status_line: String::new(),
        }
    }

    pub fn board(&self) -> &BoardController {
        &self.board
    }

    pub fn client(&self) -> &AiClient<S> {
        &self.client
    }

    pub fn visualization(&self) -> &NetworkVisualization {
        &self.visualization
    }

    pub fn visualization_mut(&mut self) -> &mut NetworkVisualization {
        &mut self.visualization
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Begin the session; requests the AI's move when it has the first turn
    pub async fn start(&mut self) {
        self.visualization.render_empty();
        self.in_progress = true;
        self.outcome = None;

        if self.board.turn() == self.config.player_color {
            self.set_status(format!(
                "Your turn to move ({})",
                color_name(self.config.player_color)
            ));
        } else {
            self.play_ai_turn().await;
        }
    }

    pub async fn click(&mut self, square: Square) -> SelectionOutcome {
        let outcome = self.board.click(square);
        self.process_moves().await;
        outcome
    }

    pub async fn drop(&mut self, from: Square, to: Square) -> GameResult<MoveMadeEvent> {
        let result = self.board.drop(from, to);
        self.process_moves().await;
        result
    }

    /// Apply a candidate typed by the player (`e2e4`, `e7e8n`)
    pub async fn play(&mut self, candidate: MoveCandidate) -> GameResult<MoveMadeEvent> {
        let result = self.board.apply_move(candidate);
        self.process_moves().await;
        result
    }

    pub fn flip(&mut self) {
        self.board.flip();
    }

    pub async fn new_game(&mut self) {
        self.board.new_game();
        self.client.reset();
        self.drain_moves();
        self.start().await;
    }

    /// Undo back to the player's turn and resume the game
    ///
    /// Undoing the AI's opening move leaves the AI to move again, so a fresh
    /// turn is requested before returning.
    pub async fn undo(&mut self) -> GameResult<usize> {
        let undone = self.board.undo_last()?;
        self.client.reset();
        self.drain_moves();
        self.resume_after_edit();
        if self.in_progress && self.board.turn() != self.config.player_color {
            self.play_ai_turn().await;
        }
        Ok(undone)
    }

    /// Replace the game with a position and continue from it
    pub async fn load_position(&mut self, fen: &str) -> GameResult<()> {
        self.board.load_position(fen)?;
        self.drain_moves();
        self.resume_after_edit();
        if self.in_progress && self.board.turn() != self.config.player_color {
            self.play_ai_turn().await;
        }
        Ok(())
    }

    /// Evaluate the current position on demand
    pub async fn evaluate(&mut self) -> Option<f32> {
        let evaluation = self.client.evaluate(&self.board.fen()).await;
        self.sync_visualization();
        evaluation
    }

    fn resume_after_edit(&mut self) {
        let status = self.board.status();
        self.in_progress = !status.is_game_over();
        self.outcome = None;
        self.set_status(status.message());
    }

    fn drain_moves(&mut self) {
        while self.moves.try_recv().is_ok() {}
    }

    /// Run a turn for each pending player move
    async fn process_moves(&mut self) {
        while let Ok(event) = self.moves.try_recv() {
            if event.mover != self.config.player_color {
                continue;
            }
            self.handle_player_move(event).await;
        }
    }

    async fn handle_player_move(&mut self, event: MoveMadeEvent) {
        if !self.in_progress {
            debug!("[ORCH] Game over, ignoring {}", event.uci);
            return;
        }

        if self.check_game_over(&event.fen).await {
            return;
        }

        self.client.evaluate(&event.fen).await;
        self.sync_visualization();

        if self.board.turn() != self.config.player_color {
            self.play_ai_turn().await;
        }
    }

    async fn play_ai_turn(&mut self) {
        self.set_status("AI is thinking...".to_string());
        self.visualization.set_thinking(true);
        self.delay.wait().await;

        let fen = self.board.fen();
        let ai_move = self.client.request_move(&fen).await;
        self.sync_visualization();

        let Some(ai_move) = ai_move else {
            self.set_status("AI has no move available.".to_string());
            return;
        };

        if let Err(e) = self.board.apply_uci(&ai_move.uci) {
            warn!("[ORCH] AI move {} not applied: {}", ai_move.uci, e);
            self.set_status(format!("AI proposed an illegal move ({}).", ai_move.uci));
            return;
        }
        self.drain_moves();

        let fen = self.board.fen();
        if self.check_game_over(&fen).await {
            return;
        }

        self.client.evaluate(&fen).await;
        self.sync_visualization();
        self.set_status("Your turn to move".to_string());
    }

    /// Ask the service whether the game ended; falls back to the local status
    /// when the service fails or reports `error`
    async fn check_game_over(&mut self, fen: &str) -> bool {
        let reply = self.client.check_terminal(fen).await;

        let outcome = match reply {
            Some(reply) if reply.state.is_terminal() => {
                Some(self.outcome_from_service(reply.state, reply.message))
            }
            Some(reply) if reply.state == TerminalState::Ongoing => None,
            _ => self.local_outcome(),
        };

        match outcome {
            Some(outcome) => {
                self.finish(outcome).await;
                true
            }
            None => false,
        }
    }

    fn outcome_from_service(&self, state: TerminalState, message: String) -> GameOutcome {
        let loser = self.board.turn();
        let (message, result) = match state {
            TerminalState::Checkmate => (
                format!("Checkmate! {} wins.", color_name(!loser)),
                match loser {
                    Color::White => "0-1",
                    Color::Black => "1-0",
                },
            ),
            _ if message.is_empty() => (self.board.status().message(), "1/2-1/2"),
            _ => (message, "1/2-1/2"),
        };
        GameOutcome {
            state,
            message,
            result: result.to_string(),
        }
    }

    fn local_outcome(&self) -> Option<GameOutcome> {
        let status = self.board.status();
        let state = match status {
            GameStatus::Checkmate { .. } => TerminalState::Checkmate,
            GameStatus::Stalemate => TerminalState::Stalemate,
            GameStatus::ThreefoldRepetition => TerminalState::Repetition,
            GameStatus::InsufficientMaterial => TerminalState::Draw,
            GameStatus::FiftyMoveRule => TerminalState::FiftyMoves,
            GameStatus::Check { .. } | GameStatus::Normal { .. } => return None,
        };
        Some(GameOutcome {
            state,
            message: status.message(),
            result: status.result_token().to_string(),
        })
    }

    async fn finish(&mut self, outcome: GameOutcome) {
        info!("[ORCH] Game over: {} ({})", outcome.message, outcome.result);
        self.in_progress = false;
        self.set_status(outcome.message.clone());

        if self.config.save_games {
            self.save_game(&outcome).await;
        }
        self.outcome = Some(outcome);
    }

    async fn save_game(&mut self, outcome: &GameOutcome) {
        let fen = self.board.fen();
        let evaluation = self.client.evaluate(&fen).await.unwrap_or(0.0);
        self.sync_visualization();

        let (white_player, black_player) = match self.config.player_color {
            Color::White => (&self.config.player_name, &self.config.ai_name),
            Color::Black => (&self.config.ai_name, &self.config.player_name),
        };
        let request = SaveGameRequest {
            moves: self.board.engine().history().uci_moves(),
            result: outcome.result.clone(),
            white_player: white_player.clone(),
            black_player: black_player.clone(),
            final_position: fen,
            evaluation,
            game_type: GAME_TYPE.to_string(),
        };
        self.client.save_game(&request).await;
    }

    /// Apply every pending client update to the network view
    fn sync_visualization(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.visualization.set_thinking(update.thinking);
            if !update.network_states.is_null() {
                self.visualization.apply_value(&update.network_states);
            }
            self.visualization.set_evaluation(update.evaluation);
            self.visualization.set_confidence(update.confidence);
        }
    }

    fn set_status(&mut self, message: String) {
        debug!("[ORCH] Status: {}", message);
        self.status_line = message;
    }
}
