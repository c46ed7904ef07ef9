//! RL environment for the Azul engine
//!
//! This crate provides:
//! - Action encoding/decoding (ActionId ↔ Action)
//! - Feature extraction (GameState → Observation)
//! - Environment trait and AzulEnv implementation
//! - Agent trait with random and greedy agents

mod action_encoder;
mod agent;
mod environment;
mod feature_extractor;
#[cfg(feature = "profiling")]
pub mod profiling;
mod types;

pub use action_encoder::*;
pub use agent::*;
pub use environment::*;
pub use feature_extractor::*;
pub use types::*;
