//! AI service client
//!
//! Two layers:
//!
//! - [`AiService`]: one async method per endpoint returning a typed
//!   `Result`. [`HttpAiService`] implements it with `reqwest`; tests plug in
//!   fakes.
//! - [`AiClient`]: the call-site wrapper used by the orchestrator and CLI. It
//!   logs every failure and surfaces it as an absent result, keeps the last
//!   evaluation, confidence and thinking flag as observable state, and
//!   republishes each returned network snapshot to its subscribers.
//!
//! No call retries, times out or is deduplicated. A hung service leaves the
//! awaiting caller pending.

use crate::game::types::MoveCandidate;
use crate::networking::protocol::{
    AiMoveResponse, EvaluationResponse, FenRequest, GameStateResponse, LegalMovesRequest,
    LegalMovesResponse, SaveGameRequest, SaveGameResponse, StartTrainingRequest,
    TrainingParameters, TrainingReply, TrainingStats, TrainingStatsResponse, CHECK_GAME_STATE,
    EVALUATE_POSITION, GET_AI_MOVE, GET_LEGAL_MOVES, GET_TRAINING_STATS, SAVE_GAME,
    START_TRAINING, UPDATE_TRAINING_PARAMETERS,
};
use async_trait::async_trait;
use crossbeam_channel::{Receiver, Sender};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shakmaty::Square;
use tracing::{debug, error, info, warn};

/// Errors from a single service round trip
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, TLS or transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Request failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// The body did not match the expected JSON shape
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A move response without a move
    #[error("Service returned no move")]
    NoMove,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// The remote move / evaluation / training service
#[async_trait]
pub trait AiService: Send + Sync {
    async fn get_ai_move(&self, request: &FenRequest) -> ClientResult<AiMoveResponse>;

    async fn evaluate_position(&self, request: &FenRequest) -> ClientResult<EvaluationResponse>;

    async fn check_game_state(&self, request: &FenRequest) -> ClientResult<GameStateResponse>;

    async fn get_legal_moves(&self, request: &LegalMovesRequest)
        -> ClientResult<LegalMovesResponse>;

    async fn start_training(&self, request: &StartTrainingRequest) -> ClientResult<TrainingReply>;

    /// Echoes the updated parameter set
    async fn update_training_parameters(
        &self,
        parameters: &TrainingParameters,
    ) -> ClientResult<Value>;

    async fn get_training_stats(&self) -> ClientResult<TrainingStatsResponse>;

    async fn save_game(&self, request: &SaveGameRequest) -> ClientResult<SaveGameResponse>;
}

/// [`AiService`] over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpAiService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAiService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> ClientResult<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("[AI] POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        let url = self.url(path);
        debug!("[AI] GET {}", url);
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> ClientResult<R> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AiService for HttpAiService {
    async fn get_ai_move(&self, request: &FenRequest) -> ClientResult<AiMoveResponse> {
        self.post_json(GET_AI_MOVE, request).await
    }

    async fn evaluate_position(&self, request: &FenRequest) -> ClientResult<EvaluationResponse> {
        self.post_json(EVALUATE_POSITION, request).await
    }

    async fn check_game_state(&self, request: &FenRequest) -> ClientResult<GameStateResponse> {
        self.post_json(CHECK_GAME_STATE, request).await
    }

    async fn get_legal_moves(
        &self,
        request: &LegalMovesRequest,
    ) -> ClientResult<LegalMovesResponse> {
        self.post_json(GET_LEGAL_MOVES, request).await
    }

    async fn start_training(&self, request: &StartTrainingRequest) -> ClientResult<TrainingReply> {
        self.post_json(START_TRAINING, request).await
    }

    async fn update_training_parameters(
        &self,
        parameters: &TrainingParameters,
    ) -> ClientResult<Value> {
        self.post_json(UPDATE_TRAINING_PARAMETERS, parameters).await
    }

    async fn get_training_stats(&self) -> ClientResult<TrainingStatsResponse> {
        self.get_json(GET_TRAINING_STATS).await
    }

    async fn save_game(&self, request: &SaveGameRequest) -> ClientResult<SaveGameResponse> {
        self.post_json(SAVE_GAME, request).await
    }
}

/// A move chosen by the service
#[derive(Debug, Clone, PartialEq)]
pub struct AiMove {
    pub uci: String,
    pub confidence: f32,
}

/// Pushed to visualization subscribers after every successful move or evaluation
///
/// A move request also pushes one update with `thinking` set before it goes
/// out, and one without a snapshot when it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationUpdate {
    /// Raw `network_states`; `Null` on thinking-only updates
    pub network_states: Value,
    pub evaluation: Option<f32>,
    pub confidence: Option<f32>,
    pub thinking: bool,
}

/// Failure-absorbing wrapper around an [`AiService`]
pub struct AiClient<S> {
    service: S,
    last_evaluation: Option<f32>,
    last_confidence: Option<f32>,
    thinking: bool,
    subscribers: Vec<Sender<VisualizationUpdate>>,
}

impl AiClient<HttpAiService> {
    pub fn http(base_url: impl Into<String>) -> Self {
        Self::new(HttpAiService::new(base_url))
    }
}

impl<S: AiService> AiClient<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            last_evaluation: None,
            last_confidence: None,
            thinking: false,
            subscribers: Vec::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn last_evaluation(&self) -> Option<f32> {
        self.last_evaluation
    }

    pub fn last_confidence(&self) -> Option<f32> {
        self.last_confidence
    }

    /// Set for the duration of a move request; subscribers see it through
    /// [`VisualizationUpdate::thinking`]
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Forget evaluation and confidence, e.g. on a new game
    pub fn reset(&mut self) {
        self.last_evaluation = None;
        self.last_confidence = None;
        self.thinking = false;
    }

    pub fn subscribe(&mut self) -> Receiver<VisualizationUpdate> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, network_states: Value) {
        let update = VisualizationUpdate {
            network_states,
            evaluation: self.last_evaluation,
            confidence: self.last_confidence,
            thinking: self.thinking,
        };
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Ask the service for a move; `None` means no move is available
    pub async fn request_move(&mut self, fen: &str) -> Option<AiMove> {
        self.thinking = true;
        self.publish(Value::Null);
        let result = self.service.get_ai_move(&FenRequest::new(fen)).await;
        self.thinking = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("[AI] Error getting AI move: {}", e);
                self.publish(Value::Null);
                return None;
            }
        };

        // The move's confidence doubles as the evaluation of the position
        self.last_confidence = Some(response.confidence);
        self.last_evaluation = Some(response.confidence);
        self.publish(response.network_states);

        match response.uci {
            Some(uci) if !uci.is_empty() => {
                info!("[AI] Service chose {} (confidence {:.3})", uci, response.confidence);
                Some(AiMove {
                    uci,
                    confidence: response.confidence,
                })
            }
            _ => {
                warn!("[AI] {}", ClientError::NoMove);
                None
            }
        }
    }

    pub async fn evaluate(&mut self, fen: &str) -> Option<f32> {
        match self.service.evaluate_position(&FenRequest::new(fen)).await {
            Ok(response) => {
                debug!("[AI] Evaluation {:+.3}", response.evaluation);
                self.last_evaluation = Some(response.evaluation);
                self.publish(response.network_states);
                Some(response.evaluation)
            }
            Err(e) => {
                error!("[AI] Error evaluating position: {}", e);
                None
            }
        }
    }

    pub async fn check_terminal(&mut self, fen: &str) -> Option<GameStateResponse> {
        match self.service.check_game_state(&FenRequest::new(fen)).await {
            Ok(response) => {
                debug!("[AI] Game state '{}': {}", response.state, response.message);
                Some(response)
            }
            Err(e) => {
                error!("[AI] Error checking game state: {}", e);
                None
            }
        }
    }

    /// Destinations the service allows from `square`; empty on failure
    pub async fn legal_moves_for(&mut self, fen: &str, square: Square) -> Vec<Square> {
        let request = LegalMovesRequest {
            fen: fen.to_string(),
            square: square.to_string(),
        };
        let moves = match self.service.get_legal_moves(&request).await {
            Ok(response) => response.moves,
            Err(e) => {
                error!("[AI] Error getting legal moves: {}", e);
                return Vec::new();
            }
        };

        let mut destinations: Vec<Square> = moves
            .iter()
            .filter_map(|uci| match uci.parse::<MoveCandidate>() {
                Ok(candidate) if candidate.from == square => Some(candidate.to),
                Ok(_) => None,
                Err(e) => {
                    warn!("[AI] Skipping legal move entry: {}", e);
                    None
                }
            })
            .collect();
        destinations.sort();
        destinations.dedup();
        destinations
    }

    /// Push parameter updates (if any), then start a training run
    ///
    /// Never fails: errors come back as a `status: "error"` reply.
    pub async fn begin_training(
        &mut self,
        num_games: u32,
        parameters: &TrainingParameters,
    ) -> TrainingReply {
        if !parameters.is_empty() {
            if let Err(e) = self.service.update_training_parameters(parameters).await {
                error!("[AI] Failed to update parameters: {}", e);
                return TrainingReply::error(format!("Failed to update parameters: {}", e));
            }
            info!("[AI] Updated {} training parameter(s)", parameters.len());
        }

        match self
            .service
            .start_training(&StartTrainingRequest { num_games })
            .await
        {
            Ok(reply) => {
                info!("[AI] Training started: {}", reply.status);
                reply
            }
            Err(e) => {
                error!("[AI] Error starting training: {}", e);
                TrainingReply::error(e.to_string())
            }
        }
    }

    pub async fn fetch_training_stats(&mut self) -> Option<TrainingStats> {
        match self.service.get_training_stats().await {
            Ok(response) if response.status == "success" => {
                if response.stats.is_none() {
                    warn!("[AI] Training stats reply without stats");
                }
                response.stats
            }
            Ok(response) => {
                error!(
                    "[AI] Error getting training stats: {}",
                    response.message.as_deref().unwrap_or("Unknown error")
                );
                None
            }
            Err(e) => {
                error!("[AI] Error getting training stats: {}", e);
                None
            }
        }
    }

    pub async fn save_game(&mut self, request: &SaveGameRequest) -> Option<SaveGameResponse> {
        match self.service.save_game(request).await {
            Ok(response) => {
                info!("[AI] Game saved ({}), id {}", response.status, response.game_id);
                Some(response)
            }
            Err(e) => {
                error!("[AI] Error saving game: {}", e);
                None
            }
        }
    }
}
