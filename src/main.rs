//! Simulation CLI for Azul
//!
//! Plays a batch of games between built-in agents and reports per-game
//! scores, rounds and turns.

use clap::Parser;

use azul::agents::AgentKind;
use azul::simulate::{run_games, seat_stats, SimConfig};

/// Batch Azul simulations
#[derive(Parser, Debug)]
#[command(name = "azul")]
#[command(about = "Play Azul games between built-in agents", long_about = None)]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Players per game (2-4)
    #[arg(long, default_value_t = 2)]
    players: u8,

    /// Master seed; every game derives its own seed from it
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Agent per seat, cycled when fewer than --players are given
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [AgentKind::Greedy, AgentKind::Random])]
    agents: Vec<AgentKind>,

    /// Turn limit per game before it is truncated
    #[arg(long, default_value_t = 500)]
    max_turns: u32,

    /// Print the board after every move (plays games sequentially)
    #[arg(long)]
    render: bool,

    /// Emit one JSON object per game on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = SimConfig {
        games: args.games,
        num_players: args.players,
        seed: args.seed,
        agents: args.agents,
        max_turns: args.max_turns,
        render: args.render,
    };

    eprintln!("Azul Simulation Configuration:");
    eprintln!("  Games: {}", config.games);
    eprintln!("  Players: {}", config.num_players);
    eprintln!("  Agents: {:?}", config.agents);
    eprintln!("  Seed: {}", config.seed);
    eprintln!("  Max turns: {}", config.max_turns);
    eprintln!();

    let summaries = run_games(&config)?;

    for summary in &summaries {
        if args.json {
            println!("{}", serde_json::to_string(summary)?);
        } else {
            let scores: Vec<String> = summary.scores.iter().map(u16::to_string).collect();
            println!(
                "game {:>4}  scores [{}]  rounds {:>2}  turns {:>3}{}",
                summary.game,
                scores.join(", "),
                summary.rounds,
                summary.turns,
                if summary.truncated { "  (truncated)" } else { "" }
            );
        }
    }

    eprintln!("\nResults over {} games:", summaries.len());
    for (seat, stats) in seat_stats(&summaries, config.num_players).iter().enumerate() {
        let kind = summaries
            .first()
            .and_then(|s| s.agents.get(seat))
            .map(|k| format!("{k:?}"))
            .unwrap_or_default();
        eprintln!(
            "  Player {seat} ({kind}): {} wins, mean score {:.2}",
            stats.wins, stats.mean_score
        );
    }

    #[cfg(feature = "profiling")]
    azul_rl_env::profiling::print_summary();

    Ok(())
}
