//! Orchestrator Tests
//!
//! Whole player/AI turns against a scripted in-memory `AiService`: AI
//! replies, terminal states reported by the service or derived locally,
//! saved games and the network view fed from service snapshots.

use async_trait::async_trait;
use serde_json::{json, Value};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Position, Square};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use strategik::game::history::STARTING_FEN;
use strategik::game::orchestrator::GAME_TYPE;
use strategik::game::{
    BoardController, NoDelay, Orchestrator, SelectionOutcome, SessionConfig, TerminalState,
};
use strategik::networking::client::{AiClient, AiService, ClientError, ClientResult};
use strategik::networking::protocol::{
    AiMoveResponse, EvaluationResponse, FenRequest, GameStateResponse, LegalMovesRequest,
    LegalMovesResponse, SaveGameRequest, SaveGameResponse, StartTrainingRequest,
    TrainingParameters, TrainingReply, TrainingStatsResponse,
};
use strategik::rendering::{NetworkTopology, NetworkVisualization};

/// How the fake answers `check-game-state`
#[derive(Clone, Default)]
enum Judge {
    /// Checkmate when the position is mate, otherwise ongoing
    #[default]
    Rules,
    /// Always this tag and message
    Fixed(&'static str, &'static str),
    /// Transport failure
    Fail,
}

#[derive(Default)]
struct FakeState {
    moves: VecDeque<String>,
    judge: Judge,
    move_requests: usize,
    evaluations: usize,
    state_checks: usize,
    saved: Vec<SaveGameRequest>,
}

#[derive(Clone, Default)]
struct FakeService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeService {
    fn with_moves(moves: &[&str]) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().moves = moves.iter().map(|m| m.to_string()).collect();
        fake
    }

    fn judge(self, judge: Judge) -> Self {
        self.state.lock().unwrap().judge = judge;
        self
    }

    fn move_requests(&self) -> usize {
        self.state.lock().unwrap().move_requests
    }

    fn evaluations(&self) -> usize {
        self.state.lock().unwrap().evaluations
    }

    fn state_checks(&self) -> usize {
        self.state.lock().unwrap().state_checks
    }

    fn saved(&self) -> Vec<SaveGameRequest> {
        self.state.lock().unwrap().saved.clone()
    }
}

fn two_layer_snapshot() -> Value {
    json!([
        {"layer": "input", "neurons": [{"id": 0, "activation": 1.0}, {"id": 1, "activation": -1.0}]},
        {"layer": "output", "neurons": [{"id": 0, "activation": 0.0, "weight": 0.5}]}
    ])
}

fn is_mate(fen: &str) -> bool {
    let Ok(parsed) = fen.parse::<Fen>() else {
        return false;
    };
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map(|pos| pos.is_checkmate())
        .unwrap_or(false)
}

#[async_trait]
impl AiService for FakeService {
    async fn get_ai_move(&self, _request: &FenRequest) -> ClientResult<AiMoveResponse> {
        let mut state = self.state.lock().unwrap();
        state.move_requests += 1;
        Ok(AiMoveResponse {
            uci: state.moves.pop_front(),
            confidence: 0.7,
            network_states: two_layer_snapshot(),
        })
    }

    async fn evaluate_position(&self, _request: &FenRequest) -> ClientResult<EvaluationResponse> {
        self.state.lock().unwrap().evaluations += 1;
        Ok(EvaluationResponse {
            evaluation: 0.3,
            network_states: two_layer_snapshot(),
        })
    }

    async fn check_game_state(&self, request: &FenRequest) -> ClientResult<GameStateResponse> {
        let mut state = self.state.lock().unwrap();
        state.state_checks += 1;
        match state.judge.clone() {
            Judge::Rules if is_mate(&request.fen) => Ok(GameStateResponse {
                state: TerminalState::Checkmate,
                message: "Checkmate".to_string(),
            }),
            Judge::Rules => Ok(GameStateResponse {
                state: TerminalState::Ongoing,
                message: "Game in progress".to_string(),
            }),
            Judge::Fixed(tag, message) => Ok(GameStateResponse {
                state: TerminalState::from(tag.to_string()),
                message: message.to_string(),
            }),
            Judge::Fail => Err(ClientError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }

    async fn get_legal_moves(
        &self,
        _request: &LegalMovesRequest,
    ) -> ClientResult<LegalMovesResponse> {
        Ok(LegalMovesResponse { moves: Vec::new() })
    }

    async fn start_training(&self, _request: &StartTrainingRequest) -> ClientResult<TrainingReply> {
        Ok(TrainingReply {
            status: "success".to_string(),
            message: None,
            details: Value::Null,
        })
    }

    async fn update_training_parameters(
        &self,
        parameters: &TrainingParameters,
    ) -> ClientResult<Value> {
        Ok(Value::Object(parameters.clone()))
    }

    async fn get_training_stats(&self) -> ClientResult<TrainingStatsResponse> {
        Ok(TrainingStatsResponse {
            status: "success".to_string(),
            message: None,
            stats: None,
        })
    }

    async fn save_game(&self, request: &SaveGameRequest) -> ClientResult<SaveGameResponse> {
        self.state.lock().unwrap().saved.push(request.clone());
        Ok(SaveGameResponse {
            status: "success".to_string(),
            game_id: json!(7),
        })
    }
}

fn session(fake: &FakeService, config: SessionConfig) -> Orchestrator<FakeService> {
    Orchestrator::new(
        BoardController::default(),
        AiClient::new(fake.clone()),
        NetworkVisualization::new(NetworkTopology::default(), 600.0, 400.0),
        Box::new(NoDelay),
        config,
    )
}

fn black_player() -> SessionConfig {
    SessionConfig {
        player_color: Color::Black,
        ..SessionConfig::default()
    }
}

/// 1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6, white to mate on f7
const SCHOLARS_MATE_IN_ONE: &str =
    "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

// ============================================================================
// Turn Loop
// ============================================================================

#[tokio::test]
async fn test_player_move_gets_ai_reply() {
    let fake = FakeService::with_moves(&["e7e5"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;
    assert_eq!(fake.move_requests(), 0);

    game.click(Square::E2).await;
    let outcome = game.click(Square::E4).await;
    assert!(matches!(outcome, SelectionOutcome::Moved(_)));

    assert_eq!(fake.move_requests(), 1);
    assert_eq!(
        game.board().engine().history().uci_moves(),
        vec!["e2e4", "e7e5"]
    );
    assert_eq!(game.board().turn(), Color::White);
    assert_eq!(game.status_line(), "Your turn to move");
    assert!(game.board().highlighted().is_empty());
}

#[tokio::test]
async fn test_terminal_check_precedes_ai_request() {
    let fake = FakeService::with_moves(&["e7e5"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();

    // One check after the player move, one after the reply
    assert_eq!(fake.state_checks(), 2);
    assert_eq!(fake.move_requests(), 1);
}

#[tokio::test]
async fn test_ai_opens_when_player_is_black() {
    let fake = FakeService::with_moves(&["d2d4"]);
    let mut game = session(&fake, black_player());
    game.start().await;

    assert_eq!(fake.move_requests(), 1);
    assert_eq!(game.board().engine().history().uci_moves(), vec!["d2d4"]);
    assert_eq!(game.board().turn(), Color::Black);
}

#[tokio::test]
async fn test_rejected_player_move_makes_no_request() {
    let fake = FakeService::with_moves(&["e7e5"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    assert!(game.drop(Square::E2, Square::E5).await.is_err());

    assert_eq!(fake.move_requests(), 0);
    assert_eq!(fake.state_checks(), 0);
    assert_eq!(game.board().fen(), STARTING_FEN);
}

#[tokio::test]
async fn test_missing_ai_move_leaves_board() {
    let fake = FakeService::default();
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();

    assert_eq!(fake.move_requests(), 1);
    assert_eq!(game.board().engine().history().len(), 1);
    assert_eq!(game.status_line(), "AI has no move available.");
    assert!(game.is_in_progress());
}

#[tokio::test]
async fn test_illegal_ai_move_is_not_applied() {
    let fake = FakeService::with_moves(&["e7e4"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();

    assert_eq!(game.board().engine().history().len(), 1);
    assert_eq!(game.board().turn(), Color::Black);
    assert_eq!(game.status_line(), "AI proposed an illegal move (e7e4).");
}

// ============================================================================
// Game End
// ============================================================================

#[tokio::test]
async fn test_checkmate_stops_ai_requests() {
    // Fool's mate with the AI as white
    let fake = FakeService::with_moves(&["f2f3", "g2g4", "a2a3"]);
    let mut game = session(&fake, black_player());
    game.start().await;

    game.drop(Square::E7, Square::E5).await.unwrap();
    assert_eq!(fake.move_requests(), 2);

    game.drop(Square::D8, Square::H4).await.unwrap();

    assert!(!game.is_in_progress());
    assert_eq!(fake.move_requests(), 2);
    assert_eq!(game.status_line(), "Checkmate! Black wins.");

    let outcome = game.outcome().expect("game over");
    assert_eq!(outcome.state, TerminalState::Checkmate);
    assert_eq!(outcome.result, "0-1");
}

#[tokio::test]
async fn test_checkmate_saves_game() {
    let fake = FakeService::with_moves(&["f2f3", "g2g4"]);
    let mut game = session(&fake, black_player());
    game.start().await;
    game.drop(Square::E7, Square::E5).await.unwrap();
    game.drop(Square::D8, Square::H4).await.unwrap();

    let saved = fake.saved();
    assert_eq!(saved.len(), 1);
    let request = &saved[0];
    assert_eq!(request.moves, vec!["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(request.result, "0-1");
    assert_eq!(request.white_player, "Strategik DQN");
    assert_eq!(request.black_player, "Human");
    assert_eq!(request.final_position, game.board().fen());
    assert_eq!(request.game_type, GAME_TYPE);
    assert!((request.evaluation - 0.3).abs() < 1e-6);
}

#[tokio::test]
async fn test_no_save_when_disabled() {
    let fake = FakeService::default();
    let config = SessionConfig {
        save_games: false,
        ..SessionConfig::default()
    };
    let mut game = session(&fake, config);
    game.load_position(SCHOLARS_MATE_IN_ONE).await.unwrap();

    game.drop(Square::H5, Square::F7).await.unwrap();

    assert!(!game.is_in_progress());
    assert!(fake.saved().is_empty());
}

#[tokio::test]
async fn test_no_ai_request_after_game_over() {
    let fake = FakeService::with_moves(&["e7e5"]).judge(Judge::Fixed("stalemate", ""));
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();
    assert!(!game.is_in_progress());

    // The board still takes moves, but the AI stays silent
    game.drop(Square::E7, Square::E5).await.unwrap();
    game.drop(Square::G1, Square::F3).await.unwrap();
    assert_eq!(fake.move_requests(), 0);
}

#[tokio::test]
async fn test_service_draw_tag_uses_its_message() {
    let fake = FakeService::default().judge(Judge::Fixed("repetition", "Draw by repetition"));
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::G1, Square::F3).await.unwrap();

    let outcome = game.outcome().expect("game over");
    assert_eq!(outcome.state, TerminalState::Repetition);
    assert_eq!(outcome.message, "Draw by repetition");
    assert_eq!(outcome.result, "1/2-1/2");
}

#[tokio::test]
async fn test_unknown_tag_is_terminal() {
    let fake = FakeService::default().judge(Judge::Fixed("resigned", "AI resigned"));
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();

    assert!(!game.is_in_progress());
    assert_eq!(game.status_line(), "AI resigned");
    assert_eq!(fake.move_requests(), 0);
}

#[tokio::test]
async fn test_error_tag_falls_back_to_local_status() {
    let fake = FakeService::default().judge(Judge::Fixed("error", "engine crashed"));
    let mut game = session(&fake, SessionConfig::default());
    game.load_position(SCHOLARS_MATE_IN_ONE).await.unwrap();

    game.drop(Square::H5, Square::F7).await.unwrap();

    let outcome = game.outcome().expect("game over");
    assert_eq!(outcome.state, TerminalState::Checkmate);
    assert_eq!(outcome.message, "Checkmate! White wins.");
    assert_eq!(outcome.result, "1-0");
    assert_eq!(fake.move_requests(), 0);
}

#[tokio::test]
async fn test_failed_state_check_does_not_end_game() {
    let fake = FakeService::with_moves(&["e7e5"]).judge(Judge::Fail);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();

    assert!(game.is_in_progress());
    assert_eq!(fake.move_requests(), 1);
    assert_eq!(game.board().engine().history().len(), 2);
}

// ============================================================================
// Undo, Load, New Game
// ============================================================================

#[tokio::test]
async fn test_undo_after_reply_returns_to_player() {
    let fake = FakeService::with_moves(&["c7c5"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();
    assert_eq!(game.board().engine().history().len(), 2);

    assert_eq!(game.undo().await.unwrap(), 2);
    assert_eq!(game.board().fen(), STARTING_FEN);
    assert_eq!(game.board().turn(), Color::White);
    assert_eq!(fake.move_requests(), 1);
}

#[tokio::test]
async fn test_undo_reopens_finished_game() {
    let fake = FakeService::default();
    let mut game = session(&fake, SessionConfig::default());
    game.load_position(SCHOLARS_MATE_IN_ONE).await.unwrap();
    game.drop(Square::H5, Square::F7).await.unwrap();
    assert!(!game.is_in_progress());

    game.undo().await.unwrap();

    assert!(game.is_in_progress());
    assert!(game.outcome().is_none());
    assert_eq!(game.board().fen(), SCHOLARS_MATE_IN_ONE);
}

#[tokio::test]
async fn test_undo_past_ai_opening_requests_new_ai_move() {
    //! Undoing the AI's first move hands the turn back to the AI, which must
    //! move again instead of leaving the session waiting

    let fake = FakeService::with_moves(&["e2e4", "g1f3", "d2d4"]);
    let mut game = session(&fake, black_player());
    game.start().await;

    game.drop(Square::E7, Square::E5).await.unwrap();
    assert_eq!(fake.move_requests(), 2);

    assert_eq!(game.undo().await.unwrap(), 2);
    assert_eq!(game.board().turn(), Color::Black);
    assert_eq!(fake.move_requests(), 2);

    assert_eq!(game.undo().await.unwrap(), 1);
    assert_eq!(fake.move_requests(), 3);
    assert_eq!(game.board().turn(), Color::Black);
    assert_eq!(game.board().engine().history().uci_moves(), vec!["d2d4"]);
    assert!(game.is_in_progress());
}

#[tokio::test]
async fn test_load_position_with_ai_to_move() {
    let fake = FakeService::with_moves(&["e7e5"]);
    let mut game = session(&fake, SessionConfig::default());

    game.load_position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
        .await
        .unwrap();

    assert_eq!(fake.move_requests(), 1);
    assert_eq!(game.board().turn(), Color::White);
}

#[tokio::test]
async fn test_invalid_position_is_rejected() {
    let fake = FakeService::default();
    let mut game = session(&fake, SessionConfig::default());

    assert!(game.load_position("8/8/8/8/8/8/8/8 w - - 0 1").await.is_err());
    assert_eq!(game.board().fen(), STARTING_FEN);
    assert_eq!(fake.move_requests(), 0);
}

#[tokio::test]
async fn test_new_game_after_ai_mate() {
    let fake = FakeService::with_moves(&["h5f7", "d2d4"]);
    let mut game = session(&fake, black_player());

    // White to move in the loaded position: the AI mates at once
    game.load_position(SCHOLARS_MATE_IN_ONE).await.unwrap();
    assert!(!game.is_in_progress());
    assert_eq!(game.status_line(), "Checkmate! White wins.");

    game.new_game().await;

    assert!(game.is_in_progress());
    assert!(game.outcome().is_none());
    assert_eq!(game.board().engine().history().uci_moves(), vec!["d2d4"]);
    assert_eq!(fake.move_requests(), 2);
}

// ============================================================================
// Network View
// ============================================================================

#[tokio::test]
async fn test_snapshots_reach_visualization() {
    let fake = FakeService::with_moves(&["e7e5"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;
    assert_eq!(game.visualization().topology().shape(), vec![10, 10, 10, 1]);

    game.drop(Square::E2, Square::E4).await.unwrap();

    let viz = game.visualization();
    assert_eq!(viz.topology().shape(), vec![2, 1]);
    assert!(viz.last_snapshot().is_some());
    assert!(fake.evaluations() >= 2);
    assert_eq!(game.client().last_evaluation(), Some(0.3));
    assert_eq!(game.client().last_confidence(), Some(0.7));
}

#[tokio::test]
async fn test_visualization_shows_confidence_after_ai_turn() {
    let fake = FakeService::with_moves(&["e7e5"]);
    let mut game = session(&fake, SessionConfig::default());
    game.start().await;

    game.drop(Square::E2, Square::E4).await.unwrap();

    let viz = game.visualization();
    assert!(!viz.is_thinking());
    assert_eq!(viz.evaluation(), Some(0.3));
    assert_eq!(viz.confidence(), Some(0.7));
    assert!(viz.to_svg().contains("Confidence: 0.70"));
}

#[tokio::test]
async fn test_ai_move_confidence_is_the_evaluation() {
    //! No evaluation follows a mating AI move, so the move's confidence is
    //! the last evaluation shown

    let fake = FakeService::with_moves(&["h5f7"]);
    let config = SessionConfig {
        save_games: false,
        ..black_player()
    };
    let mut game = session(&fake, config);

    game.load_position(SCHOLARS_MATE_IN_ONE).await.unwrap();

    assert!(!game.is_in_progress());
    assert_eq!(fake.evaluations(), 0);
    assert_eq!(game.client().last_evaluation(), Some(0.7));
    assert_eq!(game.visualization().evaluation(), Some(0.7));
    assert!(game.visualization().to_svg().contains("Evaluation: +0.70"));
}

#[tokio::test]
async fn test_no_ai_move_clears_thinking() {
    let fake = FakeService::default();
    let mut game = session(&fake, black_player());

    game.start().await;

    assert_eq!(fake.move_requests(), 1);
    assert!(!game.visualization().is_thinking());
    assert_eq!(game.status_line(), "AI has no move available.");
}
