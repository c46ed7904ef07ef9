//! Action encoding: Action ↔ ActionId
//!
//! Fixed global action space of size 250, covering every (slot, color, line)
//! triple regardless of current legality.

use azul_engine::{Action, Color, Line, Slot, BOARD_SIZE, TILE_COLORS, TOTAL_SLOTS};

use super::ActionId;

/// Total size of the discrete action space
/// Calculation: (center + 9 factories) * 5 colors * 5 pattern lines = 250
pub const ACTION_SPACE_SIZE: usize = TOTAL_SLOTS * TILE_COLORS * BOARD_SIZE;

/// Encodes/decodes between engine Actions and discrete ActionIds
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActionEncoder;

impl ActionEncoder {
    /// Returns the size of the discrete action space
    pub const fn action_space_size() -> usize {
        ACTION_SPACE_SIZE
    }

    /// Encode a concrete Action into a discrete ActionId.
    ///
    /// id = slot * (lines * colors) + color * lines + line, with the center
    /// at slot 0 and factory `f` at slot `f + 1`.
    pub fn encode(action: &Action) -> ActionId {
        let slot = action.slot.index() as u16;
        let color = action.color.index() as u16;
        let line = action.line.index() as u16;

        slot * (BOARD_SIZE * TILE_COLORS) as u16 + color * BOARD_SIZE as u16 + line
    }

    /// Decode an ActionId back into an Action.
    ///
    /// This may result in syntactically valid but *illegal* Actions for
    /// the current state. The environment must mask illegal IDs.
    /// Returns None if id >= ACTION_SPACE_SIZE.
    pub fn decode(id: ActionId) -> Option<Action> {
        if id as usize >= ACTION_SPACE_SIZE {
            return None;
        }

        let mut x = id as usize;

        let line = x % BOARD_SIZE;
        x /= BOARD_SIZE;

        let color = x % TILE_COLORS;
        x /= TILE_COLORS;

        Some(Action {
            slot: Slot::from_index(x)?,
            color: Color::from_index(color as u8)?,
            line: Line::new(line as u8)?,
        })
    }
}
