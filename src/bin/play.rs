//! Interactive CLI to play Azul against a built-in agent
//!
//! Usage: cargo run --bin play [--opponent greedy|random] [--ai-first]

use std::io::{self, Write};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use azul::agents::{AgentKind, SeatAgent};
use azul::display::{display_board, format_action, BOLD, DIM, RESET};
use azul_rl_env::{
    ActionEncoder, ActionId, Agent, AgentInput, AzulEnv, ChannelFeatureExtractor, EnvConfig,
    Environment,
};

/// Play Azul against a built-in agent
#[derive(Parser, Debug)]
#[command(name = "play")]
#[command(about = "Play Azul against the computer", long_about = None)]
struct Args {
    /// Opponent policy
    #[arg(long, value_enum, default_value_t = AgentKind::Greedy)]
    opponent: AgentKind,

    /// Play as player 1 (AI goes first) instead of player 0
    #[arg(long)]
    ai_first: bool,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Prompt until the human picks a legal move; None means quit
fn get_human_action(legal: &[ActionId]) -> io::Result<Option<ActionId>> {
    println!("{BOLD}Your legal moves:{RESET}");
    for (i, &id) in legal.iter().enumerate() {
        if let Some(action) = ActionEncoder::decode(id) {
            println!("  {}: {}", i, format_action(&action));
        }
    }

    loop {
        print!("\n{BOLD}Enter move number:{RESET} ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            return Ok(None);
        }

        let input = input.trim();
        if input == "q" || input == "quit" {
            return Ok(None);
        }

        match input.parse::<usize>() {
            Ok(idx) if idx < legal.len() => return Ok(Some(legal[idx])),
            Ok(_) => println!("Invalid move number. Enter 0-{}", legal.len().saturating_sub(1)),
            Err(_) => println!("Please enter a number (or 'q' to quit)"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let features = ChannelFeatureExtractor::new(2);
    let mut env = AzulEnv::new(
        EnvConfig::default(),
        features,
        StdRng::seed_from_u64(args.seed),
    )?;
    let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));
    let mut agent = SeatAgent::new(args.opponent);
    let human_player: u8 = if args.ai_first { 1 } else { 0 };

    println!("\n{BOLD}Welcome to Azul!{RESET}");
    println!(
        "You are Player {} ({}), playing against the {:?} agent",
        human_player,
        if human_player == 0 { "first" } else { "second" },
        args.opponent
    );
    println!("Type 'q' to quit at any time.\n");

    let mut step = env.reset()?;

    while !step.done {
        display_board(env.state(), Some(human_player));

        let id = if step.current_player == human_player {
            match get_human_action(&env.legal_action_ids())? {
                Some(id) => id,
                None => {
                    println!("Goodbye!");
                    return Ok(());
                }
            }
        } else {
            println!("{DIM}AI is thinking...{RESET}");
            let input = AgentInput {
                observation: &step.observations[step.current_player as usize],
                legal_action_mask: &step.legal_action_mask,
                current_player: step.current_player,
                state: env.state(),
            };
            let Some(id) = agent.select_action(&input, &mut rng) else {
                eprintln!("AI found no legal move");
                break;
            };
            if let Some(action) = ActionEncoder::decode(id) {
                println!("AI plays: {}", format_action(&action));
            }
            id
        };

        step = env.step(id)?;
    }

    let scores = env.state().scores();
    let (mine, theirs) = (
        scores[human_player as usize],
        scores[1 - human_player as usize],
    );

    display_board(env.state(), Some(human_player));
    println!("\n{BOLD}═══════════════════════════════════════{RESET}");
    println!("{BOLD}                GAME OVER{RESET}");
    println!("{BOLD}═══════════════════════════════════════{RESET}");
    if step.truncated {
        println!("{DIM}Turn limit reached.{RESET}");
    }
    println!("Your score: {mine}");
    println!("AI score:   {theirs}");

    if mine > theirs {
        println!("\n{BOLD}YOU WIN!{RESET}");
    } else if mine < theirs {
        println!("\n{DIM}AI wins. Better luck next time!{RESET}");
    } else {
        println!("\n{BOLD}It's a tie!{RESET}");
    }

    Ok(())
}
