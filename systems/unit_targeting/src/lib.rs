#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that re-acquires targets for units whose current target lapsed.
//!
//! Structure hunters go straight for the nearest eligible enemy tower. Every
//! other unit engages the nearest enemy unit inside its awareness radius and
//! falls back to the nearest eligible tower when nothing is close.

use std::cmp::Ordering;

use arena_clash_core::{
    CellPoint, Command, TargetPreference, TargetRef, Team, TowerId, TowerKind, TowerView, UnitId,
    UnitView,
};

/// Units only notice enemy units closer than this many tiles.
pub const AWARENESS_RADIUS: f32 = 8.0;

/// Unit targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct UnitTargeting {
    towers: Vec<TowerCandidate>,
}

impl UnitTargeting {
    /// Creates a new unit targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AssignTarget` for every unit due for re-acquisition.
    ///
    /// Frozen units are skipped. A unit that finds nothing to pursue only
    /// receives a command when it still holds a stale target.
    pub fn handle(&mut self, units: &UnitView, towers: &TowerView, out: &mut Vec<Command>) {
        self.prepare_towers(towers);

        for unit in units.iter() {
            if !unit.retarget_due || unit.frozen {
                continue;
            }

            let target = match unit.card.stats().targeting {
                TargetPreference::Structures => self.nearest_tower(unit.team, unit.position),
                TargetPreference::Any => nearest_enemy_unit(units, unit.team, unit.position)
                    .or_else(|| self.nearest_tower(unit.team, unit.position)),
            };

            if target.is_none() && unit.target.is_none() {
                continue;
            }

            out.push(Command::AssignTarget {
                unit: unit.id,
                target,
            });
        }
    }

    fn prepare_towers(&mut self, towers: &TowerView) {
        self.towers.clear();
        for team in Team::BOTH {
            let flanks_standing = towers
                .iter()
                .filter(|tower| tower.team == team && tower.kind == TowerKind::Flank)
                .any(|tower| !tower.destroyed);

            for tower in towers.iter().filter(|tower| tower.team == team) {
                if tower.destroyed {
                    continue;
                }
                let eligible = match tower.kind {
                    TowerKind::Flank => true,
                    TowerKind::Command => tower.awake || !flanks_standing,
                };
                if eligible {
                    self.towers.push(TowerCandidate {
                        id: tower.id,
                        team,
                        position: tower.position,
                    });
                }
            }
        }
    }

    fn nearest_tower(&self, attacker: Team, from: CellPoint) -> Option<TargetRef> {
        let mut best: Option<(f32, TowerId)> = None;
        for tower in self.towers.iter().filter(|tower| tower.team != attacker) {
            let distance = from.distance(tower.position);
            if precedes((distance, tower.id), best) {
                best = Some((distance, tower.id));
            }
        }
        best.map(|(_, id)| TargetRef::Tower(id))
    }
}

fn nearest_enemy_unit(units: &UnitView, attacker: Team, from: CellPoint) -> Option<TargetRef> {
    let mut best: Option<(f32, UnitId)> = None;
    for enemy in units.iter().filter(|unit| unit.team != attacker) {
        let distance = from.distance(enemy.position);
        if distance >= AWARENESS_RADIUS {
            continue;
        }
        if precedes((distance, enemy.id), best) {
            best = Some((distance, enemy.id));
        }
    }
    best.map(|(_, id)| TargetRef::Unit(id))
}

fn precedes<Id: Ord>(candidate: (f32, Id), best: Option<(f32, Id)>) -> bool {
    let Some((best_distance, best_id)) = best else {
        return true;
    };
    match candidate.0.total_cmp(&best_distance) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => candidate.1 < best_id,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerCandidate {
    id: TowerId,
    team: Team,
    position: CellPoint,
}
