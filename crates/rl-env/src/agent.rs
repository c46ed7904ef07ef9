//! Agent API for action selection

use azul_engine::{free_capacity, Action, Color, GameState, Line, PlayerIdx, Slot, ALL_COLORS};
use rand::seq::IndexedRandom;
use rand::Rng;

use super::{ActionEncoder, ActionId, Observation};

/// Inputs provided to an agent when selecting an action
pub struct AgentInput<'a> {
    /// Observation for the player whose turn it is
    pub observation: &'a Observation,

    /// Mask over action IDs:
    /// legal_action_mask[id] == true if the action is legal
    pub legal_action_mask: &'a [bool],

    /// Index of the player whose turn it is
    pub current_player: PlayerIdx,

    /// Full engine state, for rule-based agents
    pub state: &'a GameState,
}

/// Trait for anything that can choose actions in the environment:
/// random policy, rule-based policy, or human input.
pub trait Agent {
    /// Choose a legal action given an observation and legal-action mask.
    ///
    /// Requirement:
    /// - Must only return ActionIds for which legal_action_mask[id as usize] == true.
    /// - Returns None only when no action is legal.
    /// - May use rng for exploration.
    fn select_action(&mut self, input: &AgentInput, rng: &mut impl Rng) -> Option<ActionId>;
}

/// Random agent that uniformly samples from legal actions
#[derive(Clone, Debug, Default)]
pub struct RandomAgent;

impl RandomAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, input: &AgentInput, rng: &mut impl Rng) -> Option<ActionId> {
        let legal_ids: Vec<ActionId> = input
            .legal_action_mask
            .iter()
            .enumerate()
            .filter(|(_, &legal)| legal)
            .map(|(id, _)| id as ActionId)
            .collect();

        legal_ids.choose(rng).copied()
    }
}

/// Takes the largest pile that fits the longest pattern line it can.
///
/// Lines are tried from the bottom (capacity 5) up; for each line, piles
/// are tried largest first. If nothing fits anywhere, the smallest pile
/// goes to the top line.
#[derive(Clone, Debug, Default)]
pub struct GreedyAgent;

/// Every tile group currently available: (slot, color, amount)
fn piles(state: &GameState) -> Vec<(Slot, Color, u8)> {
    let mut piles = Vec::new();
    for slot_idx in 0..=state.supply.num_factories as usize {
        let Some(slot) = Slot::from_index(slot_idx) else {
            continue;
        };
        for color in ALL_COLORS {
            let amount = state.supply.count(slot, color);
            if amount > 0 {
                piles.push((slot, color, amount));
            }
        }
    }
    // Stable: equal piles keep slot order
    piles.sort_by(|a, b| b.2.cmp(&a.2));
    piles
}

impl GreedyAgent {
    pub fn new() -> Self {
        Self
    }

    pub fn choose(&self, state: &GameState) -> Option<Action> {
        let board = &state.players[state.current_player as usize];
        let piles = piles(state);

        for line in Line::ALL.into_iter().rev() {
            for &(slot, color, _) in &piles {
                if free_capacity(board, color, line) > 0 {
                    return Some(Action { slot, color, line });
                }
            }
        }

        piles.last().map(|&(slot, color, _)| Action {
            slot,
            color,
            line: Line::ALL[0],
        })
    }
}

impl Agent for GreedyAgent {
    fn select_action(&mut self, input: &AgentInput, _rng: &mut impl Rng) -> Option<ActionId> {
        let id = ActionEncoder::encode(&self.choose(input.state)?);
        input
            .legal_action_mask
            .get(id as usize)
            .copied()
            .unwrap_or(false)
            .then_some(id)
    }
}
