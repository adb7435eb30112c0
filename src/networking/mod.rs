//! Networking module - HTTP client for the AI service
//!
//! - `protocol` - JSON request/response types for each endpoint
//! - `client` - `AiService` trait, reqwest implementation and the
//!   failure-absorbing `AiClient`

pub mod client;
pub mod protocol;

pub use client::{AiClient, AiMove, AiService, ClientError, HttpAiService, VisualizationUpdate};
pub use protocol::NetworkSnapshot;
