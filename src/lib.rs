//! Azul Game Engine and RL Environment
//!
//! A Markov game state engine for the board game Azul, with a multi-agent
//! environment on top.
//!
//! This crate re-exports the engine and rl-env crates for convenience.

pub mod agents;
pub mod display;
pub mod simulate;

pub use azul_engine::*;
pub use azul_rl_env as rl_env;
