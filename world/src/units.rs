//! Unit state and per-unit movement helpers.

use std::time::Duration;

use arena_clash_core::{
    AiLevel, CardKind, CardStats, CellPoint, Health, TargetRef, Team, UnitId, UnitSnapshot,
};

/// Distance at which a waypoint counts as reached.
pub(crate) const WAYPOINT_SNAP: f32 = 0.3;

/// Distance at which direct approach toward a target stops.
pub(crate) const DIRECT_APPROACH_STOP: f32 = 0.1;

/// Offset between bodies spawned by the same card.
const SPAWN_SPACING: f32 = 0.8;

#[derive(Clone, Debug)]
pub(crate) struct UnitState {
    pub(crate) id: UnitId,
    pub(crate) team: Team,
    pub(crate) card: CardKind,
    pub(crate) stats: CardStats,
    pub(crate) ai_level: AiLevel,
    pub(crate) position: CellPoint,
    pub(crate) health: Health,
    pub(crate) target: Option<TargetRef>,
    /// Match time at which the current target was acquired.
    pub(crate) target_acquired_at: Option<Duration>,
    pub(crate) path: Vec<CellPoint>,
    pub(crate) path_cursor: usize,
    pub(crate) last_attack: Option<Duration>,
    pub(crate) frozen_until: Option<Duration>,
    pub(crate) alive: bool,
}

impl UnitState {
    pub(crate) fn new(
        id: UnitId,
        team: Team,
        card: CardKind,
        ai_level: AiLevel,
        position: CellPoint,
    ) -> Self {
        let stats = card.stats();
        Self {
            id,
            team,
            card,
            stats,
            ai_level,
            position,
            health: Health::new(stats.hit_points),
            target: None,
            target_acquired_at: None,
            path: Vec::new(),
            path_cursor: 0,
            last_attack: None,
            frozen_until: None,
            alive: true,
        }
    }

    pub(crate) fn is_frozen(&self, now: Duration) -> bool {
        self.frozen_until.is_some_and(|until| until > now)
    }

    pub(crate) fn attack_ready(&self, now: Duration) -> bool {
        self.last_attack.map_or(true, |last| {
            now.saturating_sub(last) >= self.stats.attack_interval()
        })
    }

    /// Reports whether the target recheck interval has elapsed.
    pub(crate) fn recheck_elapsed(&self, now: Duration) -> bool {
        self.target_acquired_at.map_or(true, |acquired| {
            now.saturating_sub(acquired) >= self.ai_level.target_recheck_interval()
        })
    }

    /// Installs a freshly computed path, skipping the tile the unit stands on.
    pub(crate) fn set_path(&mut self, path: Vec<CellPoint>) {
        self.path_cursor = usize::from(path.len() > 1);
        self.path = path;
    }

    /// Moves the unit for one step toward `target_position`.
    ///
    /// Follows the cached path while waypoints remain and then approaches the
    /// target directly, stopping just short of it.
    pub(crate) fn advance(&mut self, target_position: CellPoint, dt: Duration) {
        let budget = self.stats.move_speed * dt.as_secs_f32();
        if budget <= 0.0 {
            return;
        }

        if let Some(waypoint) = self.path.get(self.path_cursor).copied() {
            self.position = self.position.step_toward(waypoint, budget);
            if self.position.distance(waypoint) <= WAYPOINT_SNAP {
                self.path_cursor += 1;
            }
            return;
        }

        let distance = self.position.distance(target_position);
        if distance <= DIRECT_APPROACH_STOP {
            return;
        }
        let step = budget.min(distance - DIRECT_APPROACH_STOP);
        self.position = self.position.step_toward(target_position, step);
    }

    pub(crate) fn snapshot(&self, now: Duration, retarget_due: bool) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            team: self.team,
            card: self.card,
            ai_level: self.ai_level,
            position: self.position,
            health: self.health,
            target: self.target,
            retarget_due,
            frozen: self.is_frozen(now),
        }
    }
}

/// Deploy point of body `index` out of `count` bodies spawned at `origin`.
///
/// Bodies are laid out two per row, centred horizontally when more than one
/// body spawns, with rows stacking toward the deploying side's own baseline.
pub(crate) fn spawn_point(origin: CellPoint, team: Team, index: u32, count: u32) -> CellPoint {
    let centring = if count > 1 { SPAWN_SPACING / 2.0 } else { 0.0 };
    let dx = (index % 2) as f32 * SPAWN_SPACING - centring;
    let dy = (index / 2) as f32 * SPAWN_SPACING;
    match team {
        Team::Home => origin.offset(dx, dy),
        Team::Away => origin.offset(dx, -dy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(card: CardKind) -> UnitState {
        UnitState::new(
            UnitId::new(1),
            Team::Home,
            card,
            AiLevel::new(1),
            CellPoint::new(9.0, 20.0),
        )
    }

    #[test]
    fn swarm_bodies_fan_out_around_the_deploy_point() {
        let origin = CellPoint::new(9.0, 20.0);
        let points: Vec<CellPoint> = (0..4)
            .map(|index| spawn_point(origin, Team::Home, index, 4))
            .collect();
        let expected = [(8.6, 20.0), (9.4, 20.0), (8.6, 20.8), (9.4, 20.8)];
        for (point, (x, y)) in points.iter().zip(expected) {
            assert!((point.x() - x).abs() < 1e-5, "{point:?}");
            assert!((point.y() - y).abs() < 1e-5, "{point:?}");
        }

        let away = spawn_point(origin, Team::Away, 2, 4);
        assert!((away.y() - 19.2).abs() < 1e-5);
        assert_eq!(spawn_point(origin, Team::Away, 0, 1), origin);
    }

    #[test]
    fn path_following_snaps_to_waypoints() {
        let mut unit = unit(CardKind::Lanceguard);
        unit.set_path(vec![
            CellPoint::new(9.0, 20.0),
            CellPoint::new(9.0, 19.0),
            CellPoint::new(9.0, 18.0),
        ]);
        assert_eq!(unit.path_cursor, 1);

        unit.advance(CellPoint::new(9.0, 10.0), Duration::from_millis(400));
        assert_eq!(unit.path_cursor, 2);
        assert!((unit.position.y() - 19.2).abs() < 1e-5);
    }

    #[test]
    fn direct_approach_stops_short_of_the_target() {
        let target = CellPoint::new(9.0, 19.5);
        let mut unit = unit(CardKind::ShadowScout);
        unit.advance(target, Duration::from_secs(1));
        assert!((unit.position.y() - 19.6).abs() < 1e-5);

        unit.advance(target, Duration::from_secs(1));
        assert!((unit.position.distance(target) - DIRECT_APPROACH_STOP).abs() < 1e-4);
    }

    #[test]
    fn cooldowns_and_freezes_compare_timestamps() {
        let mut unit = unit(CardKind::Bladedancer);
        assert!(unit.attack_ready(Duration::ZERO));
        unit.last_attack = Some(Duration::from_secs(2));
        assert!(!unit.attack_ready(Duration::from_millis(2_999)));
        assert!(unit.attack_ready(Duration::from_secs(3)));

        unit.frozen_until = Some(Duration::from_millis(600));
        assert!(unit.is_frozen(Duration::from_millis(599)));
        assert!(!unit.is_frozen(Duration::from_millis(600)));
    }

    #[test]
    fn higher_levels_recheck_sooner() {
        let mut slow = unit(CardKind::Lanceguard);
        let mut fast = unit(CardKind::Lanceguard);
        fast.ai_level = AiLevel::new(10);
        slow.target_acquired_at = Some(Duration::ZERO);
        fast.target_acquired_at = Some(Duration::ZERO);

        let now = Duration::from_millis(500);
        assert!(fast.recheck_elapsed(now));
        assert!(!slow.recheck_elapsed(now));
    }
}
