//! Agent selection shared by the command-line binaries

use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;

use azul_rl_env::{ActionId, Agent, AgentInput, GreedyAgent, RandomAgent};

/// Built-in policies selectable from the command line
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Random,
    Greedy,
}

/// One seat at the table.
///
/// `Agent::select_action` is generic over the rng, so seats dispatch
/// through an enum instead of a trait object.
#[derive(Clone, Debug)]
pub enum SeatAgent {
    Random(RandomAgent),
    Greedy(GreedyAgent),
}

impl SeatAgent {
    pub fn new(kind: AgentKind) -> Self {
        match kind {
            AgentKind::Random => SeatAgent::Random(RandomAgent::new()),
            AgentKind::Greedy => SeatAgent::Greedy(GreedyAgent::new()),
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            SeatAgent::Random(_) => AgentKind::Random,
            SeatAgent::Greedy(_) => AgentKind::Greedy,
        }
    }
}

impl Agent for SeatAgent {
    fn select_action(&mut self, input: &AgentInput, rng: &mut impl Rng) -> Option<ActionId> {
        match self {
            SeatAgent::Random(agent) => agent.select_action(input, rng),
            SeatAgent::Greedy(agent) => agent.select_action(input, rng),
        }
    }
}

/// Assign `kinds` to `num_players` seats, cycling when fewer are given
pub fn seat_agents(kinds: &[AgentKind], num_players: u8) -> Vec<SeatAgent> {
    (0..num_players as usize)
        .map(|seat| {
            let kind = if kinds.is_empty() {
                AgentKind::Random
            } else {
                kinds[seat % kinds.len()]
            };
            SeatAgent::new(kind)
        })
        .collect()
}
