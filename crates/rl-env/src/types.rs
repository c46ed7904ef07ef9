//! Core RL types for the Azul environment

use azul_engine::{ConfigError, GameState, PlayerIdx, RewardInfo, MAX_PLAYERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete action identifier (0..ACTION_SPACE_SIZE-1)
pub type ActionId = u16;

/// Reward value (float)
pub type Reward = f32;

/// Dense f32 array in row-major order with a fixed shape
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Observation {
    /// Create a zero-filled array with the given shape
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![0.0; shape.iter().product()],
            shape: shape.to_vec(),
        }
    }

    /// Get the shape of the array
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the data as a slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Get the number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        Some(offset)
    }

    /// Value at a multi-dimensional index, `None` when out of bounds
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        self.offset(index).map(|o| self.data[o])
    }

    /// Write `value` at `index`; out-of-bounds writes are ignored
    pub fn set(&mut self, index: &[usize], value: f32) {
        if let Some(o) = self.offset(index) {
            self.data[o] = value;
        }
    }
}

/// Reward schemes supported by the environment
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum RewardScheme {
    /// Dense incremental reward:
    /// the acting player receives the change in their projected score at
    /// every step. Over a finished game these add up to the final points.
    #[default]
    DenseScoreDelta,

    /// Terminal-only reward:
    /// rewards are 0 until the episode ends; at the end:
    /// reward[player] = points[player] - mean(points).
    TerminalOnly,
}

/// Environment configuration parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Number of players in the game (2..=4)
    pub num_players: u8,

    /// Player who moves first after every reset
    pub starting_player: PlayerIdx,

    /// The episode is cut short once more than this many turns have been played
    pub max_turns: u32,

    /// Reward computation strategy
    pub reward_scheme: RewardScheme,

    /// If true, EnvStep.state contains a full GameState clone for debugging
    pub include_full_state_in_step: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            starting_player: 0,
            max_turns: 500,
            reward_scheme: RewardScheme::default(),
            include_full_state_in_step: false,
        }
    }
}

/// Error types for Environment::reset() and Environment::step()
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// step() called after the episode has already terminated
    #[error("episode is done; call reset()")]
    EpisodeDone,

    /// ActionId outside the action space
    #[error("action id {0} is outside the action space")]
    InvalidActionId(ActionId),

    /// ActionId draws from a slot that holds no tile of its color
    #[error("action id {0} is not legal in the current state")]
    IllegalAction(ActionId),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Feature extractor built for a different table size
    #[error("feature extractor encodes {extractor} players but the game has {game}")]
    ExtractorMismatch { game: u8, extractor: u8 },
}

/// Turn bookkeeping for one transition
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepInfo {
    pub turn: u32,
    pub round: u32,
    pub player: PlayerIdx,
    #[serde(flatten)]
    pub reward: RewardInfo,
    pub next_turn: u32,
    pub next_round: u32,
    pub next_player: PlayerIdx,
    /// A settlement pass ran after this move (including the final one)
    pub round_settled: bool,
}

/// The result of either reset() or step() in an environment
pub struct EnvStep<O, R> {
    /// Observation per player, from that player's perspective.
    /// Only indices 0..num_players-1 are meaningful.
    pub observations: [O; MAX_PLAYERS],

    /// Reward per player for the most recent transition.
    /// For reset(), this is all zeros.
    pub rewards: [R; MAX_PLAYERS],

    /// True if the episode has terminated (game over, turn limit or no
    /// legal action left)
    pub done: bool,

    /// True if the episode ended on the turn limit rather than game over
    pub truncated: bool,

    /// Index of the player whose turn it is *after* this step
    pub current_player: PlayerIdx,

    /// Mask over the discrete action space:
    /// legal_action_mask[id] == true if that ActionId is legal
    /// for `current_player` in this state.
    pub legal_action_mask: Vec<bool>,

    /// The last action taken, if any.
    /// For reset(), this is None.
    pub last_action: Option<ActionId>,

    /// Turn bookkeeping; None for reset()
    pub info: Option<StepInfo>,

    /// Optional full GameState for debugging.
    /// Populated only if EnvConfig.include_full_state_in_step is true.
    pub state: Option<GameState>,
}
