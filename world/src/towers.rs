//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use arena_clash_core::{CellPoint, CellRect, Health, Team, TowerId, TowerKind, TowerSnapshot};

use crate::grid::footprint_around;

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Side defended by the tower.
    pub(crate) team: Team,
    /// Kind of tower.
    pub(crate) kind: TowerKind,
    /// Centre of the footprint.
    pub(crate) position: CellPoint,
    /// Tiles covered while the tower stands.
    pub(crate) footprint: CellRect,
    pub(crate) health: Health,
    pub(crate) awake: bool,
    pub(crate) destroyed: bool,
    /// Match time of the last shot.
    pub(crate) last_attack: Option<Duration>,
}

impl TowerState {
    fn new(id: TowerId, team: Team, kind: TowerKind, position: CellPoint) -> Self {
        Self {
            id,
            team,
            kind,
            position,
            footprint: footprint_around(position, kind.footprint_radius()),
            health: Health::new(kind.hit_points()),
            awake: kind.starts_awake(),
            destroyed: false,
            last_attack: None,
        }
    }

    /// Time left before the tower may fire again.
    pub(crate) fn ready_in(&self, now: Duration) -> Duration {
        self.last_attack.map_or(Duration::ZERO, |last| {
            (last + self.kind.attack_interval()).saturating_sub(now)
        })
    }

    /// Reports whether the tower can currently defend.
    pub(crate) fn can_fire(&self, now: Duration) -> bool {
        !self.destroyed && self.awake && self.ready_in(now).is_zero()
    }

    pub(crate) fn snapshot(&self, now: Duration) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            team: self.team,
            kind: self.kind,
            position: self.position,
            footprint: self.footprint,
            health: self.health,
            awake: self.awake,
            destroyed: self.destroyed,
            ready_in: if self.destroyed {
                Duration::ZERO
            } else {
                self.ready_in(now)
            },
        }
    }
}

/// Registry that stores towers keyed by identifier.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
}

impl TowerRegistry {
    /// Creates the symmetric starting layout for both sides.
    pub(crate) fn standard() -> Self {
        let mut entries = BTreeMap::new();
        let mut next = 0_u32;
        for team in Team::BOTH {
            for (kind, position) in layout(team) {
                let id = TowerId::new(next);
                next += 1;
                let _ = entries.insert(id, TowerState::new(id, team, kind, position));
            }
        }
        Self { entries }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Command tower defending `team`.
    pub(crate) fn command_tower(&self, team: Team) -> Option<&TowerState> {
        self.entries
            .values()
            .find(|tower| tower.team == team && tower.kind == TowerKind::Command)
    }
}

/// Tower kinds and centres for one side: left flank, right flank, command.
fn layout(team: Team) -> [(TowerKind, CellPoint); 3] {
    let (flank_row, command_row) = match team {
        Team::Home => (24.0, 28.0),
        Team::Away => (7.0, 3.0),
    };
    [
        (TowerKind::Flank, CellPoint::new(4.0, flank_row)),
        (TowerKind::Flank, CellPoint::new(13.0, flank_row)),
        (TowerKind::Command, CellPoint::new(8.5, command_row)),
    ]
}
