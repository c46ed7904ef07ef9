//! Feature extraction: GameState → Observation
//!
//! Converts full game state into a fixed-shape channels-first tensor
//! from the perspective of a given player.

use azul_engine::{
    GameState, PlayerBoard, PlayerIdx, StartingMarker, Tile, BOARD_SIZE, TILE_COLORS,
    TOTAL_SLOTS,
};

#[cfg(feature = "profiling")]
use crate::profiling::{Timer, PROF};

use super::Observation;

/// Side length of every channel
pub const CHANNEL_SIZE: usize = 10;

/// Cell value for an empty wall, pattern-line or floor position
pub const EMPTY_CELL: f32 = TILE_COLORS as f32;

/// Cell value for the starting token on a floor line
pub const STARTING_TOKEN_CELL: f32 = TILE_COLORS as f32 + 1.0;

/// Converts a full GameState into a fixed-shape array observation
/// from the perspective of a given player.
pub trait FeatureExtractor: Clone {
    /// Shape of every observation this extractor produces.
    fn obs_shape(&self) -> Vec<usize>;

    /// Number of players this extractor encodes.
    fn num_players(&self) -> u8;

    /// Encode state from the perspective of `player`.
    ///
    /// Requirements:
    /// - Deterministic given (state, player).
    /// - Shape is obs_shape().
    /// - No side effects or internal randomness.
    fn encode(&self, state: &GameState, player: PlayerIdx) -> Observation;
}

/// Channel feature extractor
///
/// Produces `[N + 1, 10, 10]`: one channel per player, rotated so the
/// observing player comes first, then one shared supply channel.
///
/// Player channel:
/// - rows 0-4, cols 0-4: pattern lines (color index while filled, else empty)
/// - rows 5-9, cols 0-4: wall (color index or empty)
/// - rows 0-6, cols 5-9: floor position per row
/// - row 7, cols 5-9: points
/// - row 8, cols 5-9: 1 if the player holds the starting marker
/// - row 9, cols 5-9: 1 if it is the player's turn
///
/// Supply channel:
/// - rows 0-9, cols 0-4: per-color counts for the center and each factory
/// - rows 0-4, cols 5-9: bag count of color `row`
/// - rows 5-9, cols 5-9: lid count of color `row - 5`
#[derive(Clone, Debug)]
pub struct ChannelFeatureExtractor {
    num_players: u8,
}

impl ChannelFeatureExtractor {
    pub fn new(num_players: u8) -> Self {
        Self { num_players }
    }

    fn encode_player(
        obs: &mut Observation,
        channel: usize,
        board: &PlayerBoard,
        holds_marker: bool,
        to_move: bool,
    ) {
        for (l, pattern) in board.pattern_lines.iter().enumerate() {
            for k in 0..BOARD_SIZE {
                let cell = match pattern.color {
                    Some(color) if (k as u8) < pattern.count => color.index() as f32,
                    _ => EMPTY_CELL,
                };
                obs.set(&[channel, l, k], cell);
            }
        }

        for (row, cells) in board.wall.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let value = cell.map_or(EMPTY_CELL, |c| c.index() as f32);
                obs.set(&[channel, BOARD_SIZE + row, col], value);
            }
        }

        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut side_rows: Vec<f32> = board
            .floor
            .slots
            .iter()
            .map(|slot| match slot {
                None => EMPTY_CELL,
                Some(Tile::Colored(color)) => color.index() as f32,
                Some(Tile::StartingToken) => STARTING_TOKEN_CELL,
            })
            .collect();
        side_rows.push(board.points as f32);
        side_rows.push(flag(holds_marker));
        side_rows.push(flag(to_move));

        for (row, value) in side_rows.into_iter().enumerate() {
            for col in BOARD_SIZE..CHANNEL_SIZE {
                obs.set(&[channel, row, col], value);
            }
        }
    }

    fn encode_supply(obs: &mut Observation, channel: usize, state: &GameState) {
        let supply = &state.supply;

        for slot in 0..TOTAL_SLOTS {
            for color in 0..TILE_COLORS {
                obs.set(&[channel, slot, color], supply.slots[slot][color] as f32);
            }
        }

        for color in 0..TILE_COLORS {
            for col in BOARD_SIZE..CHANNEL_SIZE {
                obs.set(&[channel, color, col], supply.bag[color] as f32);
                obs.set(&[channel, BOARD_SIZE + color, col], supply.lid[color] as f32);
            }
        }
    }
}

impl FeatureExtractor for ChannelFeatureExtractor {
    fn obs_shape(&self) -> Vec<usize> {
        vec![self.num_players as usize + 1, CHANNEL_SIZE, CHANNEL_SIZE]
    }

    fn num_players(&self) -> u8 {
        self.num_players
    }

    fn encode(&self, state: &GameState, player: PlayerIdx) -> Observation {
        #[cfg(feature = "profiling")]
        let _t = Timer::new(&PROF.time_feature_encode_ns);

        let n = self.num_players as usize;
        let mut obs = Observation::zeros(&self.obs_shape());

        for offset in 0..n {
            let p = (player as usize + offset) % n;
            let holds_marker = state.starting_marker == StartingMarker::Player(p as PlayerIdx);
            let to_move = state.current_player as usize == p;
            Self::encode_player(&mut obs, offset, &state.players[p], holds_marker, to_move);
        }
        Self::encode_supply(&mut obs, n, state);

        obs
    }
}
