//! Wall adjacency scoring, end-of-game bonuses and floor-line penalties.
//!
//! Completed pattern lines settle onto the wall top to bottom, so a line's
//! score sees every earlier completion of the same round but none of the
//! later ones.

use crate::{
    wall_column, Color, FloorLine, Line, PatternLines, PlayerBoard, Wall, ALL_COLORS, BOARD_SIZE,
    FLOOR_PENALTY,
};

pub const ROW_BONUS: u16 = 2;
pub const COLUMN_BONUS: u16 = 7;
pub const COLOR_BONUS: u16 = 10;

/// Score a tile placed at (`line`, `column`) against `wall`.
///
/// The target cell itself is not inspected, so the wall may or may not
/// already hold the tile.
pub fn tile_score(wall: &Wall, line: usize, column: usize) -> u16 {
    let left = (0..column)
        .rev()
        .take_while(|&c| wall[line][c].is_some())
        .count();
    let right = (column + 1..BOARD_SIZE)
        .take_while(|&c| wall[line][c].is_some())
        .count();
    let up = (0..line)
        .rev()
        .take_while(|&r| wall[r][column].is_some())
        .count();
    let down = (line + 1..BOARD_SIZE)
        .take_while(|&r| wall[r][column].is_some())
        .count();

    let horizontal = if left + right > 0 { left + right + 1 } else { 0 };
    let vertical = if up + down > 0 { up + down + 1 } else { 0 };

    if horizontal == 0 && vertical == 0 {
        // Isolated tile
        1
    } else {
        (horizontal + vertical) as u16
    }
}

/// Pattern lines that are exactly full, top to bottom
pub fn completed_lines(pattern_lines: &PatternLines) -> impl Iterator<Item = (Line, Color)> + '_ {
    Line::ALL.into_iter().filter_map(|line| {
        let pattern = &pattern_lines[line.index()];
        match pattern.color {
            Some(color) if pattern.is_full(line) => Some((line, color)),
            _ => None,
        }
    })
}

/// Score of settling `color` from `line` onto the wall this round.
///
/// Completions on earlier lines are placed first. With `deep_check`, the
/// change this placement causes to every later completion is added too, by
/// scoring each later line with and without this line marked full.
pub fn placement_score(
    wall: &Wall,
    pattern_lines: &PatternLines,
    color: Color,
    line: Line,
    deep_check: bool,
) -> u16 {
    let mut future = *wall;
    for (earlier, c) in completed_lines(pattern_lines).filter(|(l, _)| *l < line) {
        future[earlier.index()][wall_column(c, earlier)] = Some(c);
    }

    let mut score = tile_score(&future, line.index(), wall_column(color, line));

    if deep_check {
        let mut with_line = *pattern_lines;
        with_line[line.index()].color = Some(color);
        with_line[line.index()].count = line.capacity();

        for (later, c) in completed_lines(pattern_lines).filter(|(l, _)| *l > line) {
            let before = placement_score(wall, pattern_lines, c, later, false);
            let after = placement_score(wall, &with_line, c, later, false);
            // Extra neighbours never lower a tile's score
            score += after.saturating_sub(before);
        }
    }

    score
}

/// Wall after every completed pattern line has settled
pub fn settled_wall(wall: &Wall, pattern_lines: &PatternLines) -> Wall {
    let mut next = *wall;
    for (line, color) in completed_lines(pattern_lines) {
        next[line.index()][wall_column(color, line)] = Some(color);
    }
    next
}

/// Sum of placement scores for every completed pattern line
pub fn round_score(wall: &Wall, pattern_lines: &PatternLines) -> u16 {
    completed_lines(pattern_lines)
        .map(|(line, color)| placement_score(wall, pattern_lines, color, line, false))
        .sum()
}

/// End-of-game bonus: +2 per full row, +7 per full column, +10 per color
/// present in all five rows
pub fn bonus_score(wall: &Wall) -> u16 {
    let full_rows = (0..BOARD_SIZE)
        .filter(|&r| wall[r].iter().all(Option::is_some))
        .count() as u16;
    let full_columns = (0..BOARD_SIZE)
        .filter(|&c| (0..BOARD_SIZE).all(|r| wall[r][c].is_some()))
        .count() as u16;
    let full_colors = ALL_COLORS
        .iter()
        .filter(|&&color| {
            Line::ALL
                .iter()
                .all(|&line| wall[line.index()][wall_column(color, line)].is_some())
        })
        .count() as u16;

    full_rows * ROW_BONUS + full_columns * COLUMN_BONUS + full_colors * COLOR_BONUS
}

/// Sum of position weights over every occupied floor position
pub fn floor_penalty(floor: &FloorLine) -> u16 {
    floor
        .slots
        .iter()
        .zip(FLOOR_PENALTY)
        .filter(|(slot, _)| slot.is_some())
        .map(|(_, penalty)| penalty)
        .sum()
}

/// Apply a round's net score with a single zero-floor clamp
#[inline]
pub fn clamp_points(points: u16, gained: u16, penalty: u16) -> u16 {
    (points as i32 + gained as i32 - penalty as i32).max(0) as u16
}

/// What a board is worth if the round ended now and the game ended after it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Projection {
    pub round_score: u16,
    pub bonus_score: u16,
    pub penalty: u16,
}

impl Projection {
    pub fn of(board: &PlayerBoard) -> Self {
        Projection {
            round_score: round_score(&board.wall, &board.pattern_lines),
            bonus_score: bonus_score(&settled_wall(&board.wall, &board.pattern_lines)),
            penalty: floor_penalty(&board.floor),
        }
    }

    /// Projected point total for a player currently holding `points`
    pub fn value(&self, points: u16) -> i32 {
        clamp_points(points, self.round_score, self.penalty) as i32 + self.bonus_score as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PatternLine, Tile, BOARD_SIZE, FLOOR_CAPACITY};

    fn empty_wall() -> Wall {
        [[None; BOARD_SIZE]; BOARD_SIZE]
    }

    fn full_line(color: Color, line: Line) -> PatternLine {
        PatternLine {
            color: Some(color),
            count: line.capacity(),
        }
    }

    fn place(wall: &mut Wall, color: Color, line: usize) {
        let line = Line::ALL[line];
        wall[line.index()][wall_column(color, line)] = Some(color);
    }

    // =========================================================================
    // Placement scoring
    // =========================================================================

    #[test]
    fn test_tile_score_isolated() {
        let wall = empty_wall();
        assert_eq!(tile_score(&wall, 2, 2), 1, "Isolated tile should score 1");
    }

    #[test]
    fn test_tile_score_left_neighbor() {
        let mut wall = empty_wall();
        wall[2][1] = Some(Color::Blue);
        assert_eq!(tile_score(&wall, 2, 2), 2, "One left neighbour scores 1 + 1");
    }

    #[test]
    fn test_tile_score_horizontal_and_vertical() {
        let mut wall = empty_wall();
        wall[2][1] = Some(Color::Blue);
        wall[2][3] = Some(Color::Red);
        wall[1][2] = Some(Color::Black);
        wall[3][2] = Some(Color::Cyan);
        wall[4][2] = Some(Color::Yellow);

        // horizontal run of 3, vertical run of 4
        assert_eq!(tile_score(&wall, 2, 2), 7);
    }

    #[test]
    fn test_tile_score_stops_at_gap() {
        let mut wall = empty_wall();
        wall[0][0] = Some(Color::Blue);
        wall[0][3] = Some(Color::Black);
        wall[0][4] = Some(Color::Cyan);
        assert_eq!(tile_score(&wall, 0, 1), 3, "Run is 0..=1, gap at 2");
    }

    #[test]
    fn test_tile_score_corner_edge() {
        let mut wall = empty_wall();
        wall[0][1] = Some(Color::Yellow);
        assert_eq!(tile_score(&wall, 0, 0), 2);
    }

    #[test]
    fn test_placement_sees_earlier_completions_only() {
        let wall = empty_wall();
        let mut lines: PatternLines = Default::default();
        // Blue on line 0 lands at column 0; Cyan on line 1 lands at column 0 too
        lines[0] = full_line(Color::Blue, Line::ALL[0]);
        lines[1] = full_line(Color::Cyan, Line::ALL[1]);

        // Line 0 is scored before line 1 settles
        assert_eq!(
            placement_score(&wall, &lines, Color::Blue, Line::ALL[0], false),
            1
        );
        // Line 1 sees line 0 above it
        assert_eq!(
            placement_score(&wall, &lines, Color::Cyan, Line::ALL[1], false),
            2
        );
        assert_eq!(round_score(&wall, &lines), 3);
    }

    #[test]
    fn test_deep_check_adds_effect_on_later_lines() {
        let wall = empty_wall();
        let mut lines: PatternLines = Default::default();
        lines[1] = full_line(Color::Cyan, Line::ALL[1]); // column 0

        // Completing Blue on line 0 (column 0) turns line 1's 1 into a 2
        assert_eq!(
            placement_score(&wall, &lines, Color::Blue, Line::ALL[0], false),
            1
        );
        assert_eq!(
            placement_score(&wall, &lines, Color::Blue, Line::ALL[0], true),
            2
        );
    }

    #[test]
    fn test_deep_check_matches_round_score_delta() {
        let mut wall = empty_wall();
        place(&mut wall, Color::Red, 0);
        place(&mut wall, Color::Yellow, 3);

        let mut lines: PatternLines = Default::default();
        lines[2] = full_line(Color::Black, Line::ALL[2]);
        lines[4] = full_line(Color::Red, Line::ALL[4]);
        lines[3] = PatternLine {
            color: Some(Color::Blue),
            count: 2,
        };

        let before = round_score(&wall, &lines);
        let gain = placement_score(&wall, &lines, Color::Blue, Line::ALL[3], true);

        let mut completed = lines;
        completed[3] = full_line(Color::Blue, Line::ALL[3]);
        let after = round_score(&wall, &completed);

        assert_eq!(after - before, gain);
    }

    #[test]
    fn test_deep_check_is_neutral_when_line_already_full() {
        let wall = empty_wall();
        let mut lines: PatternLines = Default::default();
        lines[0] = full_line(Color::Blue, Line::ALL[0]);
        lines[1] = full_line(Color::Cyan, Line::ALL[1]);

        let deep: u16 = completed_lines(&lines)
            .map(|(l, c)| placement_score(&wall, &lines, c, l, true))
            .sum();
        assert_eq!(deep, round_score(&wall, &lines));
    }

    // =========================================================================
    // Endgame bonus
    // =========================================================================

    #[test]
    fn test_bonus_one_row() {
        let mut wall = empty_wall();
        for col in 0..BOARD_SIZE {
            wall[0][col] = Some(crate::wall_color(col, Line::ALL[0]));
        }
        assert_eq!(bonus_score(&wall), 2);
    }

    #[test]
    fn test_bonus_one_column() {
        let mut wall = empty_wall();
        for line in Line::ALL {
            wall[line.index()][0] = Some(crate::wall_color(0, line));
        }
        assert_eq!(bonus_score(&wall), 7);
    }

    #[test]
    fn test_bonus_one_color() {
        let mut wall = empty_wall();
        for line in 0..BOARD_SIZE {
            place(&mut wall, Color::Blue, line);
        }
        assert_eq!(bonus_score(&wall), 10);
    }

    #[test]
    fn test_bonus_combinations_sum_linearly() {
        let mut wall = empty_wall();
        // row 0 complete
        for color in ALL_COLORS {
            place(&mut wall, color, 0);
        }
        // Blue in every row: completes Blue and adds nothing else
        for line in 1..BOARD_SIZE {
            place(&mut wall, Color::Blue, line);
        }
        assert_eq!(bonus_score(&wall), 2 + 10);

        let full = [[Some(Color::Blue); BOARD_SIZE]; BOARD_SIZE];
        assert_eq!(bonus_score(&full), 5 * 2 + 5 * 7 + 5 * 10);
    }

    #[test]
    fn test_bonus_empty_wall() {
        assert_eq!(bonus_score(&empty_wall()), 0);
    }

    // =========================================================================
    // Floor penalty
    // =========================================================================

    #[test]
    fn test_floor_penalty_prefix_sums() {
        let expected = [0, 1, 2, 4, 6, 8, 11, 14];
        for (k, &penalty) in expected.iter().enumerate() {
            let mut floor = FloorLine::default();
            for slot in floor.slots.iter_mut().take(k) {
                *slot = Some(Tile::Colored(Color::Red));
            }
            assert_eq!(floor_penalty(&floor), penalty, "k = {k}");
        }
    }

    #[test]
    fn test_floor_penalty_counts_starting_token() {
        let mut floor = FloorLine::default();
        floor.slots[0] = Some(Tile::StartingToken);
        floor.slots[1] = Some(Tile::Colored(Color::Blue));
        floor.slots[2] = Some(Tile::Colored(Color::Blue));
        assert_eq!(floor_penalty(&floor), 4);
    }

    #[test]
    fn test_full_floor_penalty_is_14() {
        let floor = FloorLine {
            slots: [Some(Tile::StartingToken); FLOOR_CAPACITY],
        };
        assert_eq!(floor_penalty(&floor), 14);
    }

    #[test]
    fn test_clamp_points_never_negative() {
        assert_eq!(clamp_points(3, 0, 14), 0);
        assert_eq!(clamp_points(3, 2, 4), 1);
        assert_eq!(clamp_points(0, 5, 2), 3);
    }

    #[test]
    fn test_projection_value() {
        let mut board = PlayerBoard::new();
        board.points = 1;
        board.pattern_lines[0] = full_line(Color::Red, Line::ALL[0]);
        board.floor.slots[0] = Some(Tile::Colored(Color::Red));
        board.floor.slots[1] = Some(Tile::Colored(Color::Red));
        board.floor.slots[2] = Some(Tile::Colored(Color::Red));

        let projection = Projection::of(&board);
        assert_eq!(projection.round_score, 1);
        assert_eq!(projection.penalty, 4);
        assert_eq!(projection.bonus_score, 0);
        // 1 + 1 - 4 clamps to zero
        assert_eq!(projection.value(board.points), 0);
    }
}
