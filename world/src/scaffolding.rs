//! Direct state setup for scripted scenarios.
//!
//! These helpers bypass the card economy and deploy rules so that tests can
//! stage exact combat situations.

use arena_clash_core::{AiLevel, CardKind, CellPoint, Team, TowerId, UnitId};

use crate::{units::UnitState, World};

/// Places a single unit of `card` at `position` without spending elixir.
pub fn spawn_unit(world: &mut World, team: Team, card: CardKind, position: CellPoint) -> UnitId {
    spawn_unit_with_level(world, team, card, AiLevel::MIN, position)
}

/// Places a single unit with an explicit AI level.
pub fn spawn_unit_with_level(
    world: &mut World,
    team: Team,
    card: CardKind,
    ai_level: AiLevel,
    position: CellPoint,
) -> UnitId {
    let id = UnitId::new(world.next_unit_id);
    world.next_unit_id = world.next_unit_id.wrapping_add(1);
    world
        .units
        .push(UnitState::new(id, team, card, ai_level, position));
    id
}

/// Lowers a standing tower's hit points to `hit_points`.
///
/// Values above the current hit points are ignored.
pub fn set_tower_health(world: &mut World, tower: TowerId, hit_points: u32) {
    if let Some(tower) = world.towers.get_mut(tower) {
        let excess = tower.health.current().saturating_sub(hit_points);
        let _ = tower.health.apply_damage(excess);
    }
}

/// Overrides one side's elixir pool.
pub fn set_elixir(world: &mut World, team: Team, elixir: u32) {
    world.sides[team.index()].elixir = elixir;
}

/// Overrides one side's crown count.
pub fn set_crowns(world: &mut World, team: Team, crowns: u32) {
    world.sides[team.index()].crowns = crowns;
}
