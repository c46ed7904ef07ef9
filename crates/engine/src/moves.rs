//! Move validation and application.
//!
//! A move is planned against an immutable state first ([`plan_move`]) and
//! committed afterwards ([`commit_move`]). Planning is the only step that can
//! refuse a move, so a committed move is never partially applied.

use serde::Serialize;

use crate::scoring::Projection;
use crate::{
    wall_column, Action, Color, ColorCounts, GameState, Line, PlayerBoard, PlayerIdx, Slot,
    StartingMarker, Supply, Tile, ALL_COLORS, TILE_COLORS, TOTAL_SLOTS,
};

/// Why an action had no effect on the game
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum NoEffect {
    /// The chosen slot holds no tile of the chosen color
    EmptyDraw,
    /// The game has already ended
    GameOver,
}

/// Per-component change of the acting player's projected score
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RewardInfo {
    /// Change in pending pattern-line placement points
    pub round_reward: i32,
    /// Change in projected end-of-game bonus
    pub bonus_reward: i32,
    /// Increase in this round's floor-line penalty (non-negative)
    pub round_penalty: i32,
}

impl RewardInfo {
    pub fn between(before: &Projection, after: &Projection) -> Self {
        RewardInfo {
            round_reward: after.round_score as i32 - before.round_score as i32,
            bonus_reward: after.bonus_score as i32 - before.bonus_score as i32,
            round_penalty: after.penalty as i32 - before.penalty as i32,
        }
    }
}

/// Result of submitting an action
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub enum StepOutcome {
    Applied { reward: f32, info: RewardInfo },
    NoEffect(NoEffect),
}

impl StepOutcome {
    /// Shaping reward for the acting player; zero when nothing happened
    pub fn reward(&self) -> f32 {
        match self {
            StepOutcome::Applied { reward, .. } => *reward,
            StepOutcome::NoEffect(_) => 0.0,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, StepOutcome::Applied { .. })
    }
}

/// Everything an action will change, computed without touching the state
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MovePlan {
    pub action: Action,
    pub player: PlayerIdx,
    /// Tiles of `action.color` taken from the slot
    pub drawn: u8,
    pub to_pattern_line: u8,
    /// Floor positions filled by this move, in fill order
    pub to_floor: Vec<(usize, Tile)>,
    /// Colored overflow that found no floor position
    pub to_lid: u8,
    /// Other colors pushed from a factory into the center
    pub to_center: ColorCounts,
    /// The acting player picks up the starting marker
    pub takes_marker: bool,
}

/// Room left on `line` for `color`.
///
/// Zero when the wall cell for (color, line) is filled or the line already
/// holds another color.
pub fn free_capacity(board: &PlayerBoard, color: Color, line: Line) -> u8 {
    if board.wall[line.index()][wall_column(color, line)].is_some() {
        return 0;
    }
    let pattern = &board.pattern_lines[line.index()];
    match pattern.color {
        Some(held) if held != color => 0,
        _ => line.capacity() - pattern.count,
    }
}

/// Work out where every tile of `action` goes for the current player.
///
/// Returns `None` when the slot holds no tile of the chosen color.
pub fn plan_move(state: &GameState, action: Action) -> Option<MovePlan> {
    let drawn = state.supply.count(action.slot, action.color);
    if drawn == 0 {
        return None;
    }

    let player = state.current_player;
    let board = &state.players[player as usize];

    let to_pattern_line = free_capacity(board, action.color, action.line).min(drawn);
    let mut overflow = drawn - to_pattern_line;

    let takes_marker =
        action.slot == Slot::Center && state.starting_marker == StartingMarker::Center;

    // Token goes down first, then the colored overflow
    let mut to_floor = Vec::new();
    let mut free = board.floor.slots.iter().enumerate().filter(|(_, s)| s.is_none());
    if takes_marker {
        if let Some((idx, _)) = free.next() {
            to_floor.push((idx, Tile::StartingToken));
        }
    }
    while overflow > 0 {
        match free.next() {
            Some((idx, _)) => {
                to_floor.push((idx, Tile::Colored(action.color)));
                overflow -= 1;
            }
            None => break,
        }
    }

    let mut to_center = [0; TILE_COLORS];
    if let Slot::Factory(_) = action.slot {
        let counts = &state.supply.slots[action.slot.index()];
        for color in ALL_COLORS.into_iter().filter(|&c| c != action.color) {
            to_center[color.index()] = counts[color.index()];
        }
    }

    Some(MovePlan {
        action,
        player,
        drawn,
        to_pattern_line,
        to_floor,
        to_lid: overflow,
        to_center,
        takes_marker,
    })
}

/// Apply a plan produced by [`plan_move`] on the same state
pub fn commit_move(state: &mut GameState, plan: &MovePlan) {
    let Action { slot, color, line } = plan.action;

    let supply = &mut state.supply;
    supply.slots[slot.index()][color.index()] -= plan.drawn;
    if let Slot::Factory(_) = slot {
        for (ci, &n) in plan.to_center.iter().enumerate() {
            supply.slots[slot.index()][ci] -= n;
            supply.slots[Slot::Center.index()][ci] += n;
        }
    }
    supply.lid[color.index()] += plan.to_lid;

    let board = &mut state.players[plan.player as usize];
    if plan.to_pattern_line > 0 {
        let pattern = &mut board.pattern_lines[line.index()];
        pattern.color = Some(color);
        pattern.count += plan.to_pattern_line;
    }
    for &(idx, tile) in &plan.to_floor {
        board.floor.slots[idx] = Some(tile);
    }

    if plan.takes_marker {
        state.starting_marker = StartingMarker::Player(plan.player);
    }
}

/// Every (slot, color, line) whose slot holds at least one tile of that
/// color, in action-id order.
pub fn legal_actions(supply: &Supply) -> Vec<Action> {
    let mut actions = Vec::new();

    for slot_idx in 0..=(supply.num_factories as usize).min(TOTAL_SLOTS - 1) {
        let Some(slot) = Slot::from_index(slot_idx) else {
            continue;
        };
        for color in ALL_COLORS {
            if supply.count(slot, color) == 0 {
                continue;
            }
            actions.extend(Line::ALL.into_iter().map(|line| Action { slot, color, line }));
        }
    }

    actions
}

/// The round ends once no slot holds any tile
#[inline]
pub fn is_round_over(supply: &Supply) -> bool {
    supply.slots_empty()
}
