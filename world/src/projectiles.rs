//! Projectile flight.

use arena_clash_core::{
    CellPoint, HitEffect, ProjectileId, ProjectileSnapshot, ProjectileSource, Team, TowerId,
};

/// Flight speed of projectiles fired by units, in tiles per second.
pub(crate) const UNIT_PROJECTILE_SPEED: f32 = 8.0;

/// Flight speed of projectiles fired by towers, in tiles per second.
pub(crate) const TOWER_PROJECTILE_SPEED: f32 = 10.0;

/// Remaining distance below which a projectile lands.
pub(crate) const IMPACT_EPSILON: f32 = 0.5;

/// Radius around the impact point searched by single-target projectiles.
pub(crate) const SINGLE_TARGET_HIT_RADIUS: f32 = 2.0;

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    /// Side that fired; the opposing side takes the damage.
    pub(crate) team: Team,
    pub(crate) source: ProjectileSource,
    pub(crate) position: CellPoint,
    pub(crate) target_point: CellPoint,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) splash_radius: f32,
    pub(crate) on_hit: Option<HitEffect>,
    /// Tower aimed at, damaged on impact if it still stands.
    pub(crate) target_tower: Option<TowerId>,
    pub(crate) alive: bool,
}

impl ProjectileState {
    /// Moves the projectile for one step and reports whether it landed.
    pub(crate) fn advance(&mut self, dt_seconds: f32) -> bool {
        let remaining = self.position.distance(self.target_point);
        let travel = self.speed * dt_seconds;
        if remaining <= IMPACT_EPSILON || travel >= remaining {
            self.position = self.target_point;
            return true;
        }
        self.position = self.position.step_toward(self.target_point, travel);
        false
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            team: self.team,
            source: self.source,
            position: self.position,
            target_point: self.target_point,
            splash_radius: self.splash_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt(from: CellPoint, to: CellPoint) -> ProjectileState {
        ProjectileState {
            id: ProjectileId::new(0),
            team: Team::Home,
            source: ProjectileSource::Tower(TowerId::new(0)),
            position: from,
            target_point: to,
            speed: TOWER_PROJECTILE_SPEED,
            damage: 50,
            splash_radius: 0.0,
            on_hit: None,
            target_tower: None,
            alive: true,
        }
    }

    #[test]
    fn flight_takes_distance_over_speed() {
        let mut projectile = bolt(CellPoint::new(4.0, 24.0), CellPoint::new(4.0, 20.0));
        assert!(!projectile.advance(0.1));
        assert!((projectile.position.y() - 23.0).abs() < 1e-5);
        assert!(!projectile.advance(0.2));
        assert!(projectile.advance(0.15));
        assert_eq!(projectile.position, CellPoint::new(4.0, 20.0));
    }

    #[test]
    fn point_blank_shots_land_immediately() {
        let mut projectile = bolt(CellPoint::new(4.0, 24.0), CellPoint::new(4.0, 23.6));
        assert!(projectile.advance(0.0));
    }
}
