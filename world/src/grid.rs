//! Arena tile classification and deploy legality.

use arena_clash_core::{
    arena::{self, COLUMNS, POCKET_DEPTH_ROWS, ROWS},
    CellCoord, CellPoint, CellRect, CellRectSize, PlayError, Team,
};

/// Classification of a single arena tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Open ground.
    Ground,
    /// River water, impassable.
    Water,
    /// River crossing, walkable but not placeable.
    Bridge,
    /// Tile covered by a standing tower.
    StructureFootprint,
    /// Former footprint of a destroyed tower.
    Ruins,
}

impl TileKind {
    /// Reports whether units may walk across the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Ground | Self::Bridge | Self::Ruins)
    }

    /// Reports whether cards may be deployed onto the tile.
    #[must_use]
    pub const fn is_placeable(self) -> bool {
        matches!(self, Self::Ground | Self::Ruins)
    }
}

/// Dense tile matrix plus the deploy pockets unlocked by each side.
#[derive(Clone, Debug)]
pub struct Grid {
    tiles: Vec<TileKind>,
    pockets: [Vec<CellRect>; 2],
}

impl Grid {
    /// Creates the fixed arena layout with the river and both bridges.
    #[must_use]
    pub fn new() -> Self {
        let mut tiles = Vec::with_capacity((COLUMNS * ROWS) as usize);
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let kind = if !arena::is_river_row(row) {
                    TileKind::Ground
                } else if arena::is_bridge_column(column) {
                    TileKind::Bridge
                } else {
                    TileKind::Water
                };
                tiles.push(kind);
            }
        }

        Self {
            tiles,
            pockets: [Vec::new(), Vec::new()],
        }
    }

    /// Classification of the tile, or `None` when it lies outside the arena.
    #[must_use]
    pub fn classify(&self, cell: CellCoord) -> Option<TileKind> {
        index(cell).and_then(|offset| self.tiles.get(offset).copied())
    }

    /// Reports whether the tile exists and may be walked across.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.classify(cell).is_some_and(TileKind::is_walkable)
    }

    /// Reports whether the tile exists and accepts deployments.
    #[must_use]
    pub fn is_placeable(&self, cell: CellCoord) -> bool {
        self.classify(cell).is_some_and(TileKind::is_placeable)
    }

    /// Turns every ground tile of the footprint into structure.
    ///
    /// Water, bridge and ruin tiles keep their classification.
    pub fn mark_footprint(&mut self, footprint: CellRect) {
        for cell in footprint.cells() {
            if let Some(tile) = index(cell).and_then(|offset| self.tiles.get_mut(offset)) {
                if *tile == TileKind::Ground {
                    *tile = TileKind::StructureFootprint;
                }
            }
        }
    }

    /// Turns the structure tiles of a destroyed tower's footprint into ruins.
    pub fn release_footprint(&mut self, footprint: CellRect) {
        for cell in footprint.cells() {
            if let Some(tile) = index(cell).and_then(|offset| self.tiles.get_mut(offset)) {
                if *tile == TileKind::StructureFootprint {
                    *tile = TileKind::Ruins;
                }
            }
        }
    }

    /// Grants `team` the pocket behind a destroyed enemy flank tower.
    pub fn unlock_pocket(&mut self, team: Team, enemy_footprint: CellRect) {
        let pocket = pocket_behind(team.opponent(), enemy_footprint);
        self.pockets[team.index()].push(pocket);
    }

    /// Pockets currently unlocked for `team`.
    #[must_use]
    pub fn pockets(&self, team: Team) -> &[CellRect] {
        &self.pockets[team.index()]
    }

    /// Reports whether the tile belongs to the team's deploy territory.
    #[must_use]
    pub fn in_territory(&self, team: Team, cell: CellCoord) -> bool {
        if cell.column() >= COLUMNS || cell.row() >= ROWS {
            return false;
        }
        arena::is_own_half(team, cell.row() as f32)
            || self.pockets(team).iter().any(|pocket| pocket.contains(cell))
    }

    /// Checks that a troop may be deployed at the point.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError::OutsideTerritory`] when the tile is off the arena or
    /// outside the team's territory, and [`PlayError::NotPlaceable`] when the
    /// tile is water, bridge or structure.
    pub fn check_troop_deploy(&self, team: Team, point: CellPoint) -> Result<(), PlayError> {
        let cell = point.nearest_cell().ok_or(PlayError::OutsideTerritory)?;
        if !self.in_territory(team, cell) {
            return Err(PlayError::OutsideTerritory);
        }
        if !self.is_placeable(cell) {
            return Err(PlayError::NotPlaceable);
        }
        Ok(())
    }

    /// Reports whether a troop may be deployed at the point.
    #[must_use]
    pub fn can_deploy_troop(&self, team: Team, point: CellPoint) -> bool {
        self.check_troop_deploy(team, point).is_ok()
    }

    /// Reports whether a building footprint may be deployed.
    ///
    /// Every tile must lie in the team's territory and be placeable, which
    /// also rules out overlap with any standing structure.
    #[must_use]
    pub fn can_deploy_building(&self, team: Team, footprint: CellRect) -> bool {
        let size = footprint.size();
        if size.width() == 0 || size.height() == 0 {
            return false;
        }
        footprint
            .cells()
            .all(|cell| self.in_territory(team, cell) && self.is_placeable(cell))
    }

    /// Walkable tile closest to `target`.
    ///
    /// Returns the target's own tile when it is walkable. Otherwise ties in
    /// distance to the target are broken by distance to `from`, then by row,
    /// then by column.
    #[must_use]
    pub fn nearest_walkable(&self, target: CellPoint, from: CellPoint) -> Option<CellCoord> {
        if let Some(cell) = target.nearest_cell() {
            if self.is_walkable(cell) {
                return Some(cell);
            }
        }

        let mut best: Option<(f32, f32, CellCoord)> = None;
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let cell = CellCoord::new(column, row);
                if !self.is_walkable(cell) {
                    continue;
                }
                let to_target = cell.center().distance(target);
                let to_source = cell.center().distance(from);
                let better = match best {
                    None => true,
                    Some((best_target, best_source, _)) => {
                        to_target < best_target
                            || (to_target == best_target && to_source < best_source)
                    }
                };
                if better {
                    best = Some((to_target, to_source, cell));
                }
            }
        }
        best.map(|(_, _, cell)| cell)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Footprint covered by a structure centred at `center`.
///
/// Covers every tile whose centre lies within `ceil(radius)` of the centre on
/// both axes, clipped to the arena.
#[must_use]
pub fn footprint_around(center: CellPoint, radius: f32) -> CellRect {
    let reach = radius.ceil();
    let first_column = (center.x() - reach).ceil().max(0.0);
    let last_column = (center.x() + reach).floor().min((COLUMNS - 1) as f32);
    let first_row = (center.y() - reach).ceil().max(0.0);
    let last_row = (center.y() + reach).floor().min((ROWS - 1) as f32);

    if last_column < first_column || last_row < first_row {
        return CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(0, 0));
    }

    CellRect::from_origin_and_size(
        CellCoord::new(first_column as u32, first_row as u32),
        CellRectSize::new(
            (last_column - first_column) as u32 + 1,
            (last_row - first_row) as u32 + 1,
        ),
    )
}

/// Pocket opened behind a destroyed flank tower owned by `owner`.
///
/// Spans the footprint columns and the footprint rows extended toward the
/// owner's baseline.
fn pocket_behind(owner: Team, footprint: CellRect) -> CellRect {
    let origin = footprint.origin();
    let size = footprint.size();
    match owner {
        Team::Away => {
            let extension = origin.row().min(POCKET_DEPTH_ROWS);
            CellRect::from_origin_and_size(
                CellCoord::new(origin.column(), origin.row() - extension),
                CellRectSize::new(size.width(), size.height() + extension),
            )
        }
        Team::Home => {
            let bottom = origin.row() + size.height();
            let extension = ROWS.saturating_sub(bottom).min(POCKET_DEPTH_ROWS);
            CellRect::from_origin_and_size(
                origin,
                CellRectSize::new(size.width(), size.height() + extension),
            )
        }
    }
}

fn index(cell: CellCoord) -> Option<usize> {
    if cell.column() >= COLUMNS || cell.row() >= ROWS {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(COLUMNS).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
