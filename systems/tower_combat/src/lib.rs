#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use arena_clash_core::{Command, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            if let Some(snapshot) = towers.get(target.tower) {
                if snapshot.awake && !snapshot.destroyed && snapshot.ready_in.is_zero() {
                    self.scratch.push(Command::FireProjectile {
                        tower: target.tower,
                        target: target.unit,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_clash_core::{
        CellCoord, CellPoint, CellRect, CellRectSize, Health, Team, TowerId, TowerKind,
        TowerSnapshot, UnitId,
    };
    use std::time::Duration;

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            snapshot(5, Duration::ZERO),
            snapshot(2, Duration::ZERO),
        ]);
        let targets = vec![target(2, 4), target(5, 1)];
        let mut out = Vec::new();

        system.handle(&towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireProjectile {
                    tower: TowerId::new(2),
                    target: UnitId::new(4),
                },
                Command::FireProjectile {
                    tower: TowerId::new(5),
                    target: UnitId::new(1),
                },
            ],
        );
    }

    #[test]
    fn non_ready_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            snapshot(3, Duration::from_millis(250)),
            snapshot(4, Duration::ZERO),
        ]);
        let targets = vec![target(3, 9), target(4, 2), target(42, 3)];
        let mut out = Vec::new();

        system.handle(&towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(4),
                target: UnitId::new(2),
            }],
        );
    }

    #[test]
    fn fallen_towers_never_fire() {
        let mut system = TowerCombat::new();
        let mut fallen = snapshot(1, Duration::ZERO);
        fallen.destroyed = true;
        let towers = TowerView::from_snapshots(vec![fallen]);
        let mut out = Vec::new();

        system.handle(&towers, &[target(1, 0)], &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn output_is_appended_not_replaced() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(0, Duration::ZERO)]);
        let mut out = vec![Command::EvaluateOutcome];

        system.handle(&towers, &[target(0, 6)], &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Command::EvaluateOutcome);
    }

    fn snapshot(tower: u32, ready_in: Duration) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(tower),
            team: Team::Away,
            kind: TowerKind::Flank,
            position: CellPoint::new(4.0, 7.0),
            footprint: CellRect::from_origin_and_size(CellCoord::new(2, 5), CellRectSize::new(5, 5)),
            health: Health::new(TowerKind::Flank.hit_points()),
            awake: true,
            destroyed: false,
            ready_in,
        }
    }

    fn target(tower: u32, unit: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            unit: UnitId::new(unit),
            tower_position: CellPoint::new(0.0, 0.0),
            unit_position: CellPoint::new(0.0, 0.0),
        }
    }
}
