//! Move notifications from the board to its listeners
//!
//! Every successful move on the board produces one [`MoveMadeEvent`], sent to
//! each subscriber over its own channel. Subscribers whose receiver has been
//! dropped are pruned on the next send.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use shakmaty::Color;
use tracing::debug;

/// Payload of a successful move: the move, the resulting position and the game so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMadeEvent {
    /// Move in UCI notation
    #[serde(rename = "move")]
    pub uci: String,
    pub san: String,
    /// Position after the move
    pub fen: String,
    pub pgn: String,
    #[serde(with = "color_serde")]
    pub mover: Color,
}

/// Fan-out of move notifications
#[derive(Debug, Default)]
pub struct MoveNotifier {
    subscribers: Vec<Sender<MoveMadeEvent>>,
}

impl MoveNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; events are buffered until it receives them
    pub fn subscribe(&mut self) -> Receiver<MoveMadeEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn notify(&mut self, event: &MoveMadeEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        debug!(
            "[EVENTS] {} delivered to {} listener(s)",
            event.uci,
            self.subscribers.len()
        );
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

mod color_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use shakmaty::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match color {
            Color::White => "white",
            Color::Black => "black",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            other => Err(serde::de::Error::custom(format!("unknown color '{}'", other))),
        }
    }
}
