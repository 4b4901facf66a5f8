//! Fixed arena topology shared by the world and the pure systems.
//!
//! Tile space runs left to right across columns and top to bottom across
//! rows. Row zero is the [`Team::Away`] baseline and the last row is the
//! [`Team::Home`] baseline.

use crate::{CellCoord, Team};

/// Number of tile columns across the arena.
pub const COLUMNS: u32 = 18;

/// Number of tile rows along the arena.
pub const ROWS: u32 = 32;

/// First row of the river band.
pub const RIVER_FIRST_ROW: u32 = 15;

/// Last row of the river band.
pub const RIVER_LAST_ROW: u32 = 16;

/// Inclusive column span of the left bridge.
pub const LEFT_BRIDGE_COLUMNS: (u32, u32) = (3, 5);

/// Inclusive column span of the right bridge.
pub const RIGHT_BRIDGE_COLUMNS: (u32, u32) = (12, 14);

/// Rows a destroyed flank tower's pocket extends toward the enemy baseline.
pub const POCKET_DEPTH_ROWS: u32 = 3;

/// Reports whether the row lies inside the river band.
#[must_use]
pub const fn is_river_row(row: u32) -> bool {
    row >= RIVER_FIRST_ROW && row <= RIVER_LAST_ROW
}

/// Reports whether the column lies inside either bridge corridor.
#[must_use]
pub const fn is_bridge_column(column: u32) -> bool {
    (column >= LEFT_BRIDGE_COLUMNS.0 && column <= LEFT_BRIDGE_COLUMNS.1)
        || (column >= RIGHT_BRIDGE_COLUMNS.0 && column <= RIGHT_BRIDGE_COLUMNS.1)
}

/// Reports whether the row belongs to the provided team's half.
#[must_use]
pub fn is_own_half(team: Team, row: f32) -> bool {
    match team {
        Team::Home => row > RIVER_LAST_ROW as f32 && row < ROWS as f32,
        Team::Away => row >= 0.0 && row < RIVER_FIRST_ROW as f32,
    }
}

/// Converts a tile row into the logical "player at bottom" orientation.
///
/// Logical rows grow upward from the home baseline. The transform is its own
/// inverse, so the same function maps logical rows back to tile rows.
#[must_use]
pub const fn logical_row(row: u32) -> u32 {
    ROWS - 1 - row
}

/// Converts a tile coordinate into the logical orientation.
#[must_use]
pub const fn to_logical(cell: CellCoord) -> CellCoord {
    CellCoord::new(cell.column(), logical_row(cell.row()))
}

/// Converts a logical coordinate back into tile space.
#[must_use]
pub const fn from_logical(cell: CellCoord) -> CellCoord {
    to_logical(cell)
}

/// Mirrors a fractional row so that home-side layouts map onto the away side.
///
/// Policies author placements once from the away perspective and mirror them
/// for the home team.
#[must_use]
pub fn mirror_row_for(team: Team, row: f32) -> f32 {
    match team {
        Team::Away => row,
        Team::Home => (ROWS - 1) as f32 - row,
    }
}
