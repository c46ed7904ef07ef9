//! Batch simulation of games between built-in agents
//!
//! Every game gets its own seed drawn from a master RNG, so a run is
//! reproducible regardless of how rayon schedules the games.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use azul_engine::PlayerIdx;
use azul_rl_env::{
    Agent, AgentInput, AzulEnv, ChannelFeatureExtractor, EnvConfig, Environment, StepError,
};

use crate::agents::{seat_agents, AgentKind};
use crate::display::{display_board, format_action_compact};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Env(#[from] StepError),
    #[error("player {0} found no legal move in a live game")]
    NoMove(PlayerIdx),
}

/// Settings for a batch of games
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub games: usize,
    pub num_players: u8,
    pub seed: u64,
    pub agents: Vec<AgentKind>,
    pub max_turns: u32,
    /// Print the board after every move; forces sequential play
    pub render: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            games: 10,
            num_players: 2,
            seed: 42,
            agents: vec![AgentKind::Greedy, AgentKind::Random],
            max_turns: EnvConfig::default().max_turns,
            render: false,
        }
    }
}

/// Outcome of one simulated game
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    pub game: usize,
    pub seed: u64,
    pub agents: Vec<AgentKind>,
    pub scores: Vec<u16>,
    /// Seats with the highest score (more than one on a tie)
    pub winners: Vec<PlayerIdx>,
    pub rounds: u32,
    pub turns: u32,
    pub truncated: bool,
}

/// Play one game to completion with per-seat agents
pub fn play_game(config: &SimConfig, game: usize, seed: u64) -> Result<GameSummary, SimError> {
    let env_config = EnvConfig {
        num_players: config.num_players,
        max_turns: config.max_turns,
        ..Default::default()
    };
    let features = ChannelFeatureExtractor::new(config.num_players);
    let mut env = AzulEnv::new(env_config, features, StdRng::seed_from_u64(seed))?;
    let mut agent_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut seats = seat_agents(&config.agents, config.num_players);

    let mut step = env.reset()?;
    if config.render {
        display_board(env.state(), Some(step.current_player));
    }

    while !step.done {
        let player = step.current_player;
        let input = AgentInput {
            observation: &step.observations[player as usize],
            legal_action_mask: &step.legal_action_mask,
            current_player: player,
            state: env.state(),
        };
        let id = seats[player as usize]
            .select_action(&input, &mut agent_rng)
            .ok_or(SimError::NoMove(player))?;

        step = env.step(id)?;

        if config.render {
            if let Some(action) = azul_rl_env::ActionEncoder::decode(id) {
                println!("Player {player} plays: {}", format_action_compact(&action));
            }
            display_board(env.state(), Some(step.current_player));
        }
    }

    let state = env.state();
    let scores = state.scores();
    let best = scores.iter().copied().max().unwrap_or(0);
    let winners = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == best)
        .map(|(p, _)| p as PlayerIdx)
        .collect();

    Ok(GameSummary {
        game,
        seed,
        agents: seats.iter().map(|s| s.kind()).collect(),
        scores,
        winners,
        rounds: state.round,
        turns: state.turn,
        truncated: step.truncated,
    })
}

/// Play `config.games` games, in parallel unless rendering
pub fn run_games(config: &SimConfig) -> Result<Vec<GameSummary>, SimError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let seeds: Vec<(usize, u64)> = (0..config.games).map(|g| (g, rng.random())).collect();

    if config.render {
        seeds
            .into_iter()
            .map(|(game, seed)| play_game(config, game, seed))
            .collect()
    } else {
        seeds
            .into_par_iter()
            .map(|(game, seed)| play_game(config, game, seed))
            .collect()
    }
}

/// Per-seat aggregate over a batch
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SeatStats {
    pub wins: usize,
    pub mean_score: f64,
}

pub fn seat_stats(summaries: &[GameSummary], num_players: u8) -> Vec<SeatStats> {
    let mut stats = vec![SeatStats::default(); num_players as usize];
    if summaries.is_empty() {
        return stats;
    }

    for summary in summaries {
        for &w in &summary.winners {
            stats[w as usize].wins += 1;
        }
        for (seat, &score) in summary.scores.iter().enumerate() {
            stats[seat].mean_score += score as f64;
        }
    }
    for seat in &mut stats {
        seat.mean_score /= summaries.len() as f64;
    }
    stats
}
