//! Shared display utilities for rendering Azul game state in the terminal
//!
//! Provides colorized, human-readable output for game boards, the supply,
//! and actions. Empty wall cells show the color that belongs there, dimmed.

use std::fmt;

use azul_engine::{
    wall_color, Action, Color, GameState, Line, PlayerIdx, Slot, StartingMarker, Tile,
    ALL_COLORS, BOARD_SIZE,
};

// ANSI color codes for tile display
pub const BLUE: &str = "\x1b[94m";
pub const YELLOW: &str = "\x1b[93m";
pub const RED: &str = "\x1b[91m";
pub const BLACK: &str = "\x1b[90m";
pub const CYAN: &str = "\x1b[96m";
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub fn color_code(color: Color) -> &'static str {
    match color {
        Color::Blue => BLUE,
        Color::Yellow => YELLOW,
        Color::Red => RED,
        Color::Black => BLACK,
        Color::Cyan => CYAN,
    }
}

pub fn color_char(color: Color) -> char {
    match color {
        Color::Blue => 'B',
        Color::Yellow => 'Y',
        Color::Red => 'R',
        Color::Black => 'K',
        Color::Cyan => 'C',
    }
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::Blue => "Blue",
        Color::Yellow => "Yellow",
        Color::Red => "Red",
        Color::Black => "Black",
        Color::Cyan => "Cyan",
    }
}

pub fn display_tile(color: Color) -> String {
    format!("{}{}{}", color_code(color), color_char(color), RESET)
}

fn slot_name(slot: Slot) -> String {
    match slot {
        Slot::Center => "Center".to_string(),
        Slot::Factory(f) => format!("F{}", f + 1),
    }
}

/// Format an action for display
pub fn format_action(action: &Action) -> String {
    format!(
        "{} {} -> Line {}",
        slot_name(action.slot),
        display_tile(action.color),
        action.line.index() + 1
    )
}

/// Format an action in compact form without escape codes (for logs)
pub fn format_action_compact(action: &Action) -> String {
    format!(
        "{} {} L{}",
        slot_name(action.slot),
        color_name(action.color),
        action.line.index() + 1
    )
}

/// Full-table view of a game state.
///
/// With `ansi` off the same layout is produced without escape codes.
pub struct BoardView<'a> {
    pub state: &'a GameState,
    pub highlight: Option<PlayerIdx>,
    pub ansi: bool,
}

impl<'a> BoardView<'a> {
    pub fn new(state: &'a GameState, highlight: Option<PlayerIdx>) -> Self {
        Self {
            state,
            highlight,
            ansi: true,
        }
    }

    pub fn plain(state: &'a GameState) -> Self {
        Self {
            state,
            highlight: None,
            ansi: false,
        }
    }

    fn style(&self, code: &'static str) -> &'static str {
        if self.ansi {
            code
        } else {
            ""
        }
    }

    fn tile(&self, color: Color) -> String {
        format!(
            "{}{}{}",
            self.style(color_code(color)),
            color_char(color),
            self.style(RESET)
        )
    }

    fn hint(&self, text: impl fmt::Display) -> String {
        format!("{}{}{}", self.style(DIM), text, self.style(RESET))
    }

    fn write_supply(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (bold, reset) = (self.style(BOLD), self.style(RESET));
        let supply = &self.state.supply;

        writeln!(f, "{bold}FACTORIES:{reset}")?;
        for idx in 0..=supply.num_factories as usize {
            let Some(slot) = Slot::from_index(idx) else {
                continue;
            };
            if slot == Slot::Center {
                continue;
            }
            write!(f, "  {}: ", slot_name(slot))?;
            self.write_counts(f, slot)?;
            writeln!(f)?;
        }

        write!(f, "\n{bold}CENTER:{reset} ")?;
        if self.state.starting_marker == StartingMarker::Center {
            write!(f, "{bold}1{reset} ")?;
        }
        self.write_counts(f, Slot::Center)?;
        writeln!(f)?;

        let bag: u32 = supply.bag.iter().map(|&n| n as u32).sum();
        let lid: u32 = supply.lid.iter().map(|&n| n as u32).sum();
        writeln!(f, "{}", self.hint(format!("Bag: {bag}  Lid: {lid}")))
    }

    fn write_counts(&self, f: &mut fmt::Formatter<'_>, slot: Slot) -> fmt::Result {
        let supply = &self.state.supply;
        let mut any = false;
        for color in ALL_COLORS {
            for _ in 0..supply.count(slot, color) {
                write!(f, "{} ", self.tile(color))?;
                any = true;
            }
        }
        if !any {
            write!(f, "{}", self.hint("(empty)"))?;
        }
        Ok(())
    }

    fn write_player(&self, f: &mut fmt::Formatter<'_>, p: usize) -> fmt::Result {
        let player = &self.state.players[p];
        let emphasis = if self.highlight == Some(p as PlayerIdx) {
            self.style(BOLD)
        } else {
            self.style(DIM)
        };
        let reset = self.style(RESET);
        let marker = if self.state.starting_marker == StartingMarker::Player(p as PlayerIdx) {
            " [1]"
        } else {
            ""
        };

        writeln!(f, "{emphasis}PLAYER {} (Score: {}){marker}{reset}", p, player.points)?;
        writeln!(f, "  Pattern Lines          Wall")?;

        for line in Line::ALL {
            let row = line.index();
            let pattern = &player.pattern_lines[row];
            let cap = line.capacity() as usize;
            let empty = cap - pattern.count as usize;

            // Right-aligned pattern line
            write!(f, "  ")?;
            for _ in 0..(BOARD_SIZE - cap) {
                write!(f, "  ")?;
            }
            for _ in 0..empty {
                write!(f, "{} ", self.hint('.'))?;
            }
            if let Some(color) = pattern.color {
                for _ in 0..pattern.count {
                    write!(f, "{} ", self.tile(color))?;
                }
            }

            write!(f, " -> ")?;

            for col in 0..BOARD_SIZE {
                match player.wall[row][col] {
                    Some(color) => write!(f, "{} ", self.tile(color))?,
                    None => {
                        let expected = wall_color(col, line);
                        write!(f, "{} ", self.hint(color_char(expected).to_ascii_lowercase()))?
                    }
                }
            }
            writeln!(f)?;
        }

        write!(f, "  Floor: ")?;
        if player.floor.is_empty() {
            write!(f, "{}", self.hint("(empty)"))?;
        } else {
            for tile in player.floor.slots.iter().flatten() {
                match tile {
                    Tile::Colored(color) => write!(f, "{} ", self.tile(*color))?,
                    Tile::StartingToken => write!(f, "{}1{} ", self.style(BOLD), reset)?,
                }
            }
        }
        writeln!(f, "\n")
    }
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (bold, reset) = (self.style(BOLD), self.style(RESET));
        let rule = "══════════════════════════════════════════════════════════════";

        writeln!(f, "\n{bold}{rule}{reset}")?;
        let status = if self.state.is_game_over() {
            "Game Over".to_string()
        } else {
            format!("Current Player: {}", self.state.current_player)
        };
        writeln!(
            f,
            "{bold}  Round {}{reset}   |   Turn {}   |   {status}",
            self.state.round, self.state.turn
        )?;
        writeln!(f, "{bold}{rule}{reset}\n")?;

        self.write_supply(f)?;
        writeln!(f)?;

        for p in 0..self.state.num_players as usize {
            self.write_player(f, p)?;
        }
        Ok(())
    }
}

/// Display the full game board with all player information
///
/// If `highlight_player` is Some, that player's board will be shown with emphasis.
pub fn display_board(state: &GameState, highlight_player: Option<PlayerIdx>) {
    println!("{}", BoardView::new(state, highlight_player));
}
