//! Azul Game Engine
//!
//! Rules and scoring engine for the board game Azul, designed for use as a
//! training/benchmarking environment. The core object is a single `GameState`
//! (plain data); pure functions in [`scoring`] and [`moves`] operate on it and
//! [`AzulGame`] drives the turn → round → game lifecycle with an owned RNG.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod game;
pub mod moves;
pub mod scoring;

pub use game::{deal_factories, settle_round, AzulGame, RoundEnd};
pub use moves::{
    commit_move, free_capacity, is_round_over, legal_actions, plan_move, MovePlan, NoEffect,
    RewardInfo, StepOutcome,
};
pub use scoring::{
    bonus_score, floor_penalty, placement_score, round_score, tile_score, Projection,
};

// =============================================================================
// Section 3.1: Basic types and constants
// =============================================================================

/// Index into players array: 0..num_players-1
pub type PlayerIdx = u8;

/// Per-color tile counts, indexed by `Color as usize`
pub type ColorCounts = [u8; TILE_COLORS];

pub const BOARD_SIZE: usize = 5;
pub const MAX_PLAYERS: usize = 4;
pub const MAX_FACTORIES: usize = 9;
/// Center pool plus one display per factory
pub const TOTAL_SLOTS: usize = MAX_FACTORIES + 1;
pub const FACTORY_CAPACITY: u8 = 4;
pub const FLOOR_CAPACITY: usize = 7;
pub const TILE_COLORS: usize = 5;
pub const TILES_PER_COLOR: u8 = 20;

/// Floor penalties per occupied position (fixed table)
pub const FLOOR_PENALTY: [u16; FLOOR_CAPACITY] = [1, 1, 2, 2, 2, 3, 3];

/// Tile colors (order fixed for serialization and action encoding)
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Color {
    Blue = 0,
    Yellow = 1,
    Red = 2,
    Black = 3,
    Cyan = 4,
}

impl Color {
    /// Convert from u8 index to Color
    pub fn from_index(idx: u8) -> Option<Color> {
        match idx {
            0 => Some(Color::Blue),
            1 => Some(Color::Yellow),
            2 => Some(Color::Red),
            3 => Some(Color::Black),
            4 => Some(Color::Cyan),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

pub const ALL_COLORS: [Color; TILE_COLORS] = [
    Color::Blue,
    Color::Yellow,
    Color::Red,
    Color::Black,
    Color::Cyan,
];

/// Anything that can occupy a floor-line position
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Tile {
    Colored(Color),
    /// Not a colored tile: carries a floor penalty but never enters the bag or lid
    StartingToken,
}

/// Pattern line index (0..=4). Capacity of line `i` is `i + 1`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct Line(u8);

impl Line {
    pub const ALL: [Line; BOARD_SIZE] = [Line(0), Line(1), Line(2), Line(3), Line(4)];

    pub const fn new(idx: u8) -> Option<Line> {
        if (idx as usize) < BOARD_SIZE {
            Some(Line(idx))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn capacity(self) -> u8 {
        self.0 + 1
    }
}

/// A drawable grouping of tiles
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Slot {
    Center,
    /// Factory display, index 0..num_factories-1
    Factory(u8),
}

impl Slot {
    /// Slot index in the supply: center = 0, factory `f` = `f + 1`
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Slot::Center => 0,
            Slot::Factory(f) => f as usize + 1,
        }
    }

    pub fn from_index(idx: usize) -> Option<Slot> {
        match idx {
            0 => Some(Slot::Center),
            i if i < TOTAL_SLOTS => Some(Slot::Factory((i - 1) as u8)),
            _ => None,
        }
    }
}

/// Game phase / status
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Phase {
    AwaitingMove, // Players drafting
    GameOver,     // Terminal; no more actions
}

/// Wall placement rules. Only the fixed diagonal layout is supported.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum WallVariant {
    #[default]
    Fixed,
    /// Free column choice ("advanced" rules)
    Free,
}

/// Construction-time configuration errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported player count {0}: must be 2, 3 or 4")]
    PlayerCount(u8),
    #[error("the free-column wall variant is not supported")]
    UnsupportedVariant,
    #[error("starting player {player} out of range for {num_players} players")]
    StartingPlayer { player: PlayerIdx, num_players: u8 },
}

/// Engine configuration
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub num_players: u8,
    pub variant: WallVariant,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            variant: WallVariant::Fixed,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_PLAYERS as u8).contains(&self.num_players) {
            return Err(ConfigError::PlayerCount(self.num_players));
        }
        if self.variant != WallVariant::Fixed {
            return Err(ConfigError::UnsupportedVariant);
        }
        Ok(())
    }
}

/// Get the number of factories for a given player count
pub fn num_factories_for_players(num_players: u8) -> Result<u8, ConfigError> {
    match num_players {
        2 => Ok(5),
        3 => Ok(7),
        4 => Ok(9),
        n => Err(ConfigError::PlayerCount(n)),
    }
}

// =============================================================================
// Section 3.2: Wall geometry (fixed rotation)
// =============================================================================

/// Column where `color` lands on `line`: colors rotate one step right per line
#[inline]
pub const fn wall_column(color: Color, line: Line) -> usize {
    (color as usize + line.index()) % BOARD_SIZE
}

/// Color that belongs at (`line`, `column`); inverse of [`wall_column`]
pub fn wall_color(column: usize, line: Line) -> Color {
    let idx = (column % BOARD_SIZE + BOARD_SIZE - line.index()) % BOARD_SIZE;
    ALL_COLORS[idx]
}

// =============================================================================
// Section 3.3: Player board state structures
// =============================================================================

/// A single pattern line (one of 5 rows, capacities 1-5)
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PatternLine {
    pub color: Option<Color>, // None => empty; Some(c) => all tiles are c
    pub count: u8,            // 0..=capacity
}

impl PatternLine {
    #[inline]
    pub fn is_full(&self, line: Line) -> bool {
        self.count == line.capacity()
    }
}

pub type PatternLines = [PatternLine; BOARD_SIZE];

/// Wall: 5x5 grid, each cell either empty (None) or occupied by a color
pub type Wall = [[Option<Color>; BOARD_SIZE]; BOARD_SIZE];

/// Floor line: 7 positions filled left to right
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FloorLine {
    pub slots: [Option<Tile>; FLOOR_CAPACITY],
}

impl FloorLine {
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Index of the first empty position, if any
    pub fn next_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn has_starting_token(&self) -> bool {
        self.slots.contains(&Some(Tile::StartingToken))
    }

    pub fn count_color(&self, color: Color) -> u8 {
        self.slots
            .iter()
            .filter(|s| **s == Some(Tile::Colored(color)))
            .count() as u8
    }
}

/// Complete state for one player
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PlayerBoard {
    pub points: u16, // never below 0
    pub wall: Wall,
    pub pattern_lines: PatternLines,
    pub floor: FloorLine,
}

impl PlayerBoard {
    /// Zeroed board
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any wall row has all 5 columns filled
    pub fn has_full_row(&self) -> bool {
        self.wall.iter().any(|row| row.iter().all(Option::is_some))
    }
}

// =============================================================================
// Section 3.4: Shared supply (slots, bag, lid)
// =============================================================================

/// Slots (center + factories), bag and lid, all as per-color counts
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Supply {
    pub num_factories: u8, // 5, 7, or 9
    /// slots[0] is the center pool, slots[1..=num_factories] the factories
    pub slots: [ColorCounts; TOTAL_SLOTS],
    pub bag: ColorCounts,
    pub lid: ColorCounts,
}

impl Supply {
    pub fn new(num_factories: u8) -> Self {
        Supply {
            num_factories,
            slots: [[0; TILE_COLORS]; TOTAL_SLOTS],
            bag: [TILES_PER_COLOR; TILE_COLORS], // 20 of each color
            lid: [0; TILE_COLORS],
        }
    }

    /// Tiles of `color` in `slot`; 0 for slots beyond the factory count
    pub fn count(&self, slot: Slot, color: Color) -> u8 {
        match slot {
            Slot::Factory(f) if f >= self.num_factories => 0,
            _ => self
                .slots
                .get(slot.index())
                .map_or(0, |counts| counts[color.index()]),
        }
    }

    /// True when every slot (center and factories) holds no tiles
    pub fn slots_empty(&self) -> bool {
        self.slots.iter().all(|counts| counts.iter().all(|&n| n == 0))
    }
}

/// Where the starting marker currently is
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub enum StartingMarker {
    #[default]
    Center,
    Player(PlayerIdx),
}

// =============================================================================
// Section 3.5: Top-level GameState
// =============================================================================

/// Complete game state - fully Markov (no history needed)
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GameState {
    pub num_players: u8,                     // 2..=4
    pub players: [PlayerBoard; MAX_PLAYERS], // only 0..num_players used
    pub supply: Supply,
    pub starting_marker: StartingMarker,
    pub current_player: PlayerIdx,
    /// Number of actions applied so far
    pub turn: u32,
    /// Round being played (1 after the first deal)
    pub round: u32,
    pub phase: Phase,
}

impl GameState {
    /// Fresh, undealt state: N zeroed boards, full bag, empty lid and slots,
    /// starting marker in the center.
    pub fn new(num_players: u8, starting_player: PlayerIdx) -> Result<Self, ConfigError> {
        let num_factories = num_factories_for_players(num_players)?;
        if starting_player >= num_players {
            return Err(ConfigError::StartingPlayer {
                player: starting_player,
                num_players,
            });
        }

        Ok(GameState {
            num_players,
            players: std::array::from_fn(|_| PlayerBoard::new()),
            supply: Supply::new(num_factories),
            starting_marker: StartingMarker::Center,
            current_player: starting_player,
            turn: 0,
            round: 0,
            phase: Phase::AwaitingMove,
        })
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Boards of the players actually in the game
    pub fn active_players(&self) -> &[PlayerBoard] {
        &self.players[..self.num_players as usize]
    }

    pub fn scores(&self) -> Vec<u16> {
        self.active_players().iter().map(|p| p.points).collect()
    }
}

/// A player action: draw every tile of `color` from `slot` onto pattern `line`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Action {
    pub slot: Slot,
    pub color: Color,
    pub line: Line,
}

// =============================================================================
// Section 3.6: Tile conservation
// =============================================================================

/// Count every colored tile wherever it is: bag, lid, slots, pattern lines,
/// walls and floor lines.
pub fn color_totals(state: &GameState) -> [u32; TILE_COLORS] {
    let mut totals = [0u32; TILE_COLORS];

    for (ci, total) in totals.iter_mut().enumerate() {
        *total += state.supply.bag[ci] as u32 + state.supply.lid[ci] as u32;
        *total += state
            .supply
            .slots
            .iter()
            .map(|counts| counts[ci] as u32)
            .sum::<u32>();
    }

    for player in state.active_players() {
        for line in &player.pattern_lines {
            if let Some(color) = line.color {
                totals[color.index()] += line.count as u32;
            }
        }
        for color in player.wall.iter().flatten().flatten() {
            totals[color.index()] += 1;
        }
        for tile in player.floor.slots.iter().flatten() {
            if let Tile::Colored(color) = tile {
                totals[color.index()] += 1;
            }
        }
    }

    totals
}

/// Panics if any color's total differs from `TILES_PER_COLOR`
pub fn assert_tile_invariants(state: &GameState) {
    for (color, total) in ALL_COLORS.iter().zip(color_totals(state)) {
        assert_eq!(
            total, TILES_PER_COLOR as u32,
            "Tile count invariant violated for {color:?}: expected {TILES_PER_COLOR}, got {total}"
        );
    }
}
