//! Rendering module - board and network views as SVG
//!
//! Views are pure projections: they read state, never mutate it, and can be
//! serialized any number of times with the same result.
//!
//! # Architecture
//!
//! - `board` - `BoardView` projection of the board controller
//! - `network` - `NetworkVisualization` of per-layer activations
//! - `color_scale` - activation and weight color mappings
//! - `theme` - board palettes and accent colors
//! - `svg` - minimal SVG writer shared by both views

pub mod board;
pub mod color_scale;
pub mod network;
pub mod svg;
pub mod theme;

// Re-export commonly used items
pub use board::{BoardView, SquareView};
pub use network::{LayerSpec, NetworkTopology, NetworkVisualization, SnapshotOutcome};
pub use theme::{BoardTheme, Rgb, UiColors};
