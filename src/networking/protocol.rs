//! JSON contract of the AI service
//!
//! One request/response pair per endpoint. Response types are lenient where
//! the service is: missing optional fields default, and the network snapshot
//! is kept as raw JSON until the visualization asks for it, so a malformed
//! snapshot never fails the surrounding move or evaluation.
//!
//! | Endpoint | Request | Response |
//! |---|---|---|
//! | `POST /api/get-ai-move` | [`FenRequest`] | [`AiMoveResponse`] |
//! | `POST /api/evaluate-position` | [`FenRequest`] | [`EvaluationResponse`] |
//! | `POST /api/check-game-state` | [`FenRequest`] | [`GameStateResponse`] |
//! | `POST /api/get-legal-moves` | [`LegalMovesRequest`] | [`LegalMovesResponse`] |
//! | `POST /api/start-training` | [`StartTrainingRequest`] | [`TrainingReply`] |
//! | `POST /api/update-training-parameters` | [`TrainingParameters`] | raw JSON |
//! | `GET /api/get-training-stats` | none | [`TrainingStatsResponse`] |
//! | `POST /api/save-game` | [`SaveGameRequest`] | [`SaveGameResponse`] |

use crate::game::status::TerminalState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const GET_AI_MOVE: &str = "/api/get-ai-move";
pub const EVALUATE_POSITION: &str = "/api/evaluate-position";
pub const CHECK_GAME_STATE: &str = "/api/check-game-state";
pub const GET_LEGAL_MOVES: &str = "/api/get-legal-moves";
pub const START_TRAINING: &str = "/api/start-training";
pub const UPDATE_TRAINING_PARAMETERS: &str = "/api/update-training-parameters";
pub const GET_TRAINING_STATS: &str = "/api/get-training-stats";
pub const SAVE_GAME: &str = "/api/save-game";

/// Body of every position-only request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FenRequest {
    pub fen: String,
}

impl FenRequest {
    pub fn new(fen: impl Into<String>) -> Self {
        Self { fen: fen.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMoveResponse {
    /// UCI move; absent when the service has no move for the position
    #[serde(rename = "move", default)]
    pub uci: Option<String>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub network_states: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub evaluation: f32,
    #[serde(default)]
    pub network_states: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateResponse {
    pub state: TerminalState,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalMovesRequest {
    pub fen: String,
    pub square: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalMovesResponse {
    #[serde(default)]
    pub moves: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTrainingRequest {
    pub num_games: u32,
}

/// Arbitrary key/value parameter map (`learning_rate`, `epsilon`, ...)
pub type TrainingParameters = Map<String, Value>;

/// Reply of the training endpoint, also used for locally produced error payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReply {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl TrainingReply {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            details: Value::Null,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatsResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stats: Option<TrainingStats>,
}

/// Aggregate results of all recorded games
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    #[serde(default)]
    pub white_win_percentage: f64,
    #[serde(default)]
    pub black_win_percentage: f64,
    #[serde(default)]
    pub draw_percentage: f64,
    #[serde(default)]
    pub total_games: u64,
    #[serde(default)]
    pub avg_game_length: f64,
    #[serde(default)]
    pub avg_reward: f64,
    #[serde(default)]
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGameRequest {
    /// UCI moves, oldest first
    pub moves: Vec<String>,
    /// `1-0`, `0-1` or `1/2-1/2`
    pub result: String,
    pub white_player: String,
    pub black_player: String,
    pub final_position: String,
    pub evaluation: f32,
    pub game_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGameResponse {
    pub status: String,
    /// Numeric or string id, depending on the storage backend
    #[serde(default)]
    pub game_id: Value,
}

/// Per-layer neuron values for one evaluated position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub layers: Vec<LayerState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerState {
    #[serde(rename = "layer", default)]
    pub name: String,
    #[serde(default)]
    pub neurons: Vec<NeuronState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuronState {
    #[serde(default)]
    pub id: u32,
    pub activation: f32,
    /// Incoming weight; absent on input neurons
    #[serde(default)]
    pub weight: Option<f32>,
}

impl NetworkSnapshot {
    /// Decode the `network_states` field of a response
    ///
    /// Returns `None` for a missing, empty or malformed snapshot.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        let layers: Vec<LayerState> = serde_json::from_value(value.clone()).ok()?;
        if layers.is_empty() {
            return None;
        }
        Some(Self { layers })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Neuron count of every layer, in order
    pub fn shape(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.neurons.len()).collect()
    }
}
