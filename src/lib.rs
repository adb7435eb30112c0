//! Strategik - human-vs-AI chess client
//!
//! A board controller backed by a full rules engine, an HTTP client for a
//! remote move / evaluation / training service, and an SVG view of the
//! service's neural network activations, bound together by a turn
//! orchestrator.
//!
//! # Modules
//!
//! - [`game`] - rules engine, board interaction, orchestration
//! - [`networking`] - AI service protocol and client
//! - [`rendering`] - board and network SVG views
//! - [`core`] - settings, errors, logging setup

pub mod core;
pub mod game;
pub mod networking;
pub mod rendering;
