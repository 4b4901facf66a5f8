#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use std::cmp::Ordering;

use arena_clash_core::{CellPoint, Team, TowerId, TowerKind, TowerTarget, TowerView, UnitId, UnitView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    unit_workspace: Vec<UnitCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Only standing, awake towers acquire targets, and only enemy units
    /// strictly inside the tower's range qualify. The output buffer is
    /// cleared before populating it with the latest assignments.
    pub fn handle(&mut self, towers: &TowerView, units: &UnitView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || units.iter().next().is_none() {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_unit_workspace(units);
        if self.unit_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let range = tower.kind.range_in_tiles();
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.unit_workspace {
                if candidate.team == tower.team {
                    continue;
                }

                let distance = tower.position.distance(candidate.position);
                if distance >= range {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    unit: candidate.id,
                    position: candidate.position,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    unit: best_candidate.unit,
                    tower_position: tower.position,
                    unit_position: best_candidate.position,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            if snapshot.destroyed || !snapshot.awake {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                team: snapshot.team,
                kind: snapshot.kind,
                position: snapshot.position,
            });
        }
    }

    fn prepare_unit_workspace(&mut self, units: &UnitView) {
        self.unit_workspace.clear();
        let (lower, _) = units.iter().size_hint();
        self.unit_workspace.reserve(lower);

        for snapshot in units.iter() {
            if snapshot.health.is_depleted() {
                continue;
            }

            self.unit_workspace.push(UnitCandidate {
                id: snapshot.id,
                team: snapshot.team,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    team: Team,
    kind: TowerKind,
    position: CellPoint,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct UnitCandidate {
    id: UnitId,
    team: Team,
    position: CellPoint,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    unit: UnitId,
    position: CellPoint,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        match self.distance.total_cmp(&other.distance) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }

        if self.unit != other.unit {
            return self.unit < other.unit;
        }

        if self.position.x() != other.position.x() {
            return self.position.x() < other.position.x();
        }

        self.position.y() < other.position.y()
    }
}
