//! Attack, projectile and damage resolution.

use std::time::Duration;

use arena_clash_core::{
    AttackStyle, CellPoint, Event, HitEffect, ProjectileId, ProjectileSource, TargetRef, Team,
    TowerId, TowerKind, UnitId, Winner,
};
use tracing::{debug, info};

use crate::{
    projectiles::{
        ProjectileState, SINGLE_TARGET_HIT_RADIUS, TOWER_PROJECTILE_SPEED, UNIT_PROJECTILE_SPEED,
    },
    World,
};

/// Slack added to a unit's attack range.
pub(crate) const ATTACK_TOLERANCE: f32 = 0.5;

/// Crowns that end the match outright.
const WINNING_CROWNS: u32 = 3;

/// Live position of a target together with the extra reach it grants.
///
/// Towers are struck at the edge of their footprint, so their footprint
/// radius extends the attacker's reach.
pub(crate) fn resolve_target(
    world: &World,
    attacker_team: Team,
    target: TargetRef,
) -> Option<(CellPoint, f32)> {
    match target {
        TargetRef::Unit(id) => world
            .units
            .iter()
            .find(|unit| unit.id == id && unit.alive && unit.team != attacker_team)
            .map(|unit| (unit.position, 0.0)),
        TargetRef::Tower(id) => world
            .towers
            .get(id)
            .filter(|tower| !tower.destroyed && tower.team != attacker_team)
            .map(|tower| (tower.position, tower.kind.footprint_radius())),
    }
}

/// Resolves the attack-or-approach decision for every living unit.
///
/// Units are processed in spawn order against up-to-date state, so a unit
/// killed earlier in the pass never acts.
pub(crate) fn step_units(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    let now = world.clock;
    for index in 0..world.units.len() {
        let unit = &world.units[index];
        if !unit.alive || unit.is_frozen(now) {
            continue;
        }
        let Some(target) = unit.target else {
            continue;
        };
        let Some((target_position, extra_reach)) = resolve_target(world, unit.team, target)
        else {
            continue;
        };

        let reach = unit.stats.attack_range + ATTACK_TOLERANCE + extra_reach;
        if unit.position.distance(target_position) <= reach {
            if unit.attack_ready(now) {
                attack(world, index, target, target_position, out_events);
            }
            continue;
        }

        world.units[index].advance(target_position, dt);
    }
}

fn attack(
    world: &mut World,
    index: usize,
    target: TargetRef,
    target_position: CellPoint,
    out_events: &mut Vec<Event>,
) {
    let now = world.clock;
    let attacker = &mut world.units[index];
    attacker.last_attack = Some(now);
    let id = attacker.id;
    let team = attacker.team;
    let origin = attacker.position;
    let stats = attacker.stats;

    match stats.attack {
        AttackStyle::Projectile => {
            let target_tower = match target {
                TargetRef::Tower(tower) => Some(tower),
                TargetRef::Unit(_) => None,
            };
            spawn_projectile(
                world,
                ProjectileState {
                    id: ProjectileId::new(0),
                    team,
                    source: ProjectileSource::Unit(id),
                    position: origin,
                    target_point: target_position,
                    speed: UNIT_PROJECTILE_SPEED,
                    damage: stats.damage,
                    splash_radius: stats.splash_radius,
                    on_hit: stats.on_hit,
                    target_tower,
                    alive: true,
                },
                out_events,
            );
        }
        AttackStyle::Melee => {
            out_events.push(Event::UnitStruck {
                attacker: id,
                target,
            });
            let primary = match target {
                TargetRef::Unit(victim) => {
                    damage_unit(world, victim, stats.damage, stats.on_hit, out_events);
                    Some(victim)
                }
                TargetRef::Tower(tower) => {
                    damage_tower(world, tower, stats.damage, out_events);
                    None
                }
            };
            if stats.splash_radius > 0.0 {
                let splashed: Vec<UnitId> =
                    units_within(world, team.opponent(), target_position, stats.splash_radius)
                        .into_iter()
                        .filter(|victim| Some(*victim) != primary)
                        .collect();
                for victim in splashed {
                    damage_unit(world, victim, stats.damage, stats.on_hit, out_events);
                }
            }
        }
    }
}

/// Launches a projectile from a tower at an enemy unit strictly inside range.
pub(crate) fn fire_tower(
    world: &mut World,
    tower_id: TowerId,
    target: UnitId,
    out_events: &mut Vec<Event>,
) {
    let now = world.clock;
    let Some(tower) = world.towers.get(tower_id) else {
        return;
    };
    if !tower.can_fire(now) {
        return;
    }
    let Some(unit) = world
        .units
        .iter()
        .find(|unit| unit.id == target && unit.alive && unit.team != tower.team)
    else {
        return;
    };
    if tower.position.distance(unit.position) >= tower.kind.range_in_tiles() {
        return;
    }

    let projectile = ProjectileState {
        id: ProjectileId::new(0),
        team: tower.team,
        source: ProjectileSource::Tower(tower_id),
        position: tower.position,
        target_point: unit.position,
        speed: TOWER_PROJECTILE_SPEED,
        damage: tower.kind.damage(),
        splash_radius: 0.0,
        on_hit: None,
        target_tower: None,
        alive: true,
    };
    if let Some(tower) = world.towers.get_mut(tower_id) {
        tower.last_attack = Some(now);
    }
    spawn_projectile(world, projectile, out_events);
}

fn spawn_projectile(world: &mut World, mut projectile: ProjectileState, out_events: &mut Vec<Event>) {
    let id = ProjectileId::new(world.next_projectile_id);
    world.next_projectile_id = world.next_projectile_id.wrapping_add(1);
    projectile.id = id;
    out_events.push(Event::ProjectileFired {
        projectile: id,
        source: projectile.source,
        from: projectile.position,
        to: projectile.target_point,
    });
    world.projectiles.push(projectile);
}

/// Advances every projectile, resolves impacts and purges the dead.
pub(crate) fn step_projectiles(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    let dt_seconds = dt.as_secs_f32();
    for index in 0..world.projectiles.len() {
        let projectile = &mut world.projectiles[index];
        if !projectile.alive || !projectile.advance(dt_seconds) {
            continue;
        }
        projectile.alive = false;
        let landed = projectile.clone();
        impact(world, &landed, out_events);
    }

    world.units.retain(|unit| unit.alive);
    world.projectiles.retain(|projectile| projectile.alive);
}

fn impact(world: &mut World, projectile: &ProjectileState, out_events: &mut Vec<Event>) {
    out_events.push(Event::ProjectileImpacted {
        projectile: projectile.id,
        at: projectile.position,
    });
    let victims = projectile.team.opponent();

    if projectile.splash_radius > 0.0 {
        let hit = units_within(world, victims, projectile.position, projectile.splash_radius);
        for victim in hit {
            damage_unit(world, victim, projectile.damage, projectile.on_hit, out_events);
        }
    } else if projectile.target_tower.is_none() {
        if let Some(victim) = nearest_unit(
            world,
            victims,
            projectile.position,
            SINGLE_TARGET_HIT_RADIUS,
        ) {
            damage_unit(world, victim, projectile.damage, projectile.on_hit, out_events);
        }
    }

    if let Some(tower) = projectile.target_tower {
        damage_tower(world, tower, projectile.damage, out_events);
    }
}

fn units_within(world: &World, team: Team, center: CellPoint, radius: f32) -> Vec<UnitId> {
    world
        .units
        .iter()
        .filter(|unit| unit.alive && unit.team == team)
        .filter(|unit| unit.position.distance(center) <= radius)
        .map(|unit| unit.id)
        .collect()
}

fn nearest_unit(world: &World, team: Team, center: CellPoint, radius: f32) -> Option<UnitId> {
    let mut best: Option<(f32, UnitId)> = None;
    for unit in world.units.iter().filter(|unit| unit.alive && unit.team == team) {
        let distance = unit.position.distance(center);
        if distance > radius {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_distance, best_id)) => {
                distance < best_distance || (distance == best_distance && unit.id < best_id)
            }
        };
        if closer {
            best = Some((distance, unit.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Applies damage and any on-hit effect to a living unit.
pub(crate) fn damage_unit(
    world: &mut World,
    id: UnitId,
    amount: u32,
    effect: Option<HitEffect>,
    out_events: &mut Vec<Event>,
) {
    let now = world.clock;
    let Some(unit) = world.units.iter_mut().find(|unit| unit.id == id && unit.alive) else {
        return;
    };

    let remaining = unit.health.apply_damage(amount);
    out_events.push(Event::UnitDamaged {
        unit: id,
        amount,
        remaining,
    });

    if unit.health.is_depleted() {
        unit.alive = false;
        out_events.push(Event::UnitDied {
            unit: id,
            team: unit.team,
        });
        return;
    }

    if let Some(HitEffect::Freeze { duration }) = effect {
        let until = now + duration;
        let extended = unit.frozen_until.map_or(until, |current| current.max(until));
        unit.frozen_until = Some(extended);
        out_events.push(Event::UnitFrozen {
            unit: id,
            until: extended,
        });
    }
}

/// Applies damage to a standing tower, waking and destroying it as needed.
pub(crate) fn damage_tower(
    world: &mut World,
    id: TowerId,
    amount: u32,
    out_events: &mut Vec<Event>,
) {
    let Some(tower) = world.towers.get_mut(id) else {
        return;
    };
    if tower.destroyed {
        return;
    }

    if !tower.awake {
        tower.awake = true;
        out_events.push(Event::TowerAwakened { tower: id });
    }

    let remaining = tower.health.apply_damage(amount);
    out_events.push(Event::TowerDamaged {
        tower: id,
        amount,
        remaining,
    });

    if tower.health.is_depleted() {
        destroy_tower(world, id, out_events);
    }
}

fn destroy_tower(world: &mut World, id: TowerId, out_events: &mut Vec<Event>) {
    let Some(tower) = world.towers.get_mut(id) else {
        return;
    };
    if tower.destroyed {
        return;
    }
    tower.destroyed = true;
    let team = tower.team;
    let kind = tower.kind;
    let footprint = tower.footprint;

    world.grid.release_footprint(footprint);
    world.paths.clear();
    out_events.push(Event::TowerDestroyed {
        tower: id,
        team,
        kind,
    });
    info!(tower = id.get(), team = team.label(), ?kind, "tower destroyed");

    let scorer = team.opponent();
    let side = &mut world.sides[scorer.index()];
    side.crowns += 1;
    out_events.push(Event::CrownAwarded {
        team: scorer,
        crowns: side.crowns,
    });
    info!(team = scorer.label(), crowns = side.crowns, "crown awarded");

    if kind == TowerKind::Flank {
        world.grid.unlock_pocket(scorer, footprint);
        let command = world
            .towers
            .command_tower(team)
            .filter(|command| !command.awake && !command.destroyed)
            .map(|command| command.id);
        if let Some(command) = command.and_then(|command| world.towers.get_mut(command)) {
            command.awake = true;
            out_events.push(Event::TowerAwakened { tower: command.id });
            debug!(tower = command.id.get(), "command tower woken by flank loss");
        }
    }
}

/// Decides the match once a win condition holds.
///
/// A fallen command tower outranks crowns, and crowns outrank the timer.
pub(crate) fn evaluate_outcome(world: &World) -> Option<Winner> {
    let fallen: Vec<Team> = Team::BOTH
        .into_iter()
        .filter(|team| {
            world
                .towers
                .command_tower(*team)
                .is_some_and(|tower| tower.destroyed)
        })
        .collect();

    match fallen.as_slice() {
        [team] => return Some(Winner::team(team.opponent())),
        [_, _] => return Some(Winner::Tie),
        _ => {}
    }

    let home = world.sides[Team::Home.index()].crowns;
    let away = world.sides[Team::Away.index()].crowns;
    if home >= WINNING_CROWNS || away >= WINNING_CROWNS || world.clock >= world.match_length {
        return Some(by_crowns(home, away));
    }
    None
}

fn by_crowns(home: u32, away: u32) -> Winner {
    match home.cmp(&away) {
        std::cmp::Ordering::Greater => Winner::Home,
        std::cmp::Ordering::Less => Winner::Away,
        std::cmp::Ordering::Equal => Winner::Tie,
    }
}

#[cfg(test)]
mod tests {
    use arena_clash_core::{CardKind, CellCoord, Command, PlayError};

    use super::*;
    use crate::{grid::TileKind, scaffolding, WorldConfig};

    const HOME_FLANK: TowerId = TowerId::new(0);
    const AWAY_FLANK: TowerId = TowerId::new(3);

    fn damage_events(events: &[Event]) -> Vec<(UnitId, u32, u32)> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::UnitDamaged {
                    unit,
                    amount,
                    remaining,
                } => Some((*unit, *amount, *remaining)),
                _ => None,
            })
            .collect()
    }

    /// Home flank fires at a rat that is then killed before the bolt lands.
    fn bolt_at_doomed_rat(bystander: Option<CellPoint>) -> (World, Option<UnitId>) {
        let mut world = World::new(WorldConfig::default());
        let doomed = scaffolding::spawn_unit(
            &mut world,
            Team::Away,
            CardKind::SwarmRats,
            CellPoint::new(4.0, 20.0),
        );
        let bystander = bystander.map(|position| {
            scaffolding::spawn_unit(&mut world, Team::Away, CardKind::SwarmRats, position)
        });

        let mut events = Vec::new();
        fire_tower(&mut world, HOME_FLANK, doomed, &mut events);
        assert_eq!(world.projectiles.len(), 1);

        damage_unit(&mut world, doomed, 1_000, None, &mut events);
        assert!(events.contains(&Event::UnitDied {
            unit: doomed,
            team: Team::Away
        }));
        (world, bystander)
    }

    #[test]
    fn tower_bolt_hits_the_nearest_enemy_when_its_target_died() {
        let (mut world, bystander) = bolt_at_doomed_rat(Some(CellPoint::new(5.5, 20.0)));
        let bystander = bystander.expect("bystander spawned");

        let mut events = Vec::new();
        step_projectiles(&mut world, Duration::from_millis(500), &mut events);

        assert_eq!(damage_events(&events), vec![(bystander, 50, 100)]);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.units.len(), 1, "the dead rat is purged");
    }

    #[test]
    fn tower_bolt_fizzles_without_an_enemy_within_two_tiles() {
        let (mut world, bystander) = bolt_at_doomed_rat(Some(CellPoint::new(6.5, 20.0)));
        let bystander = bystander.expect("bystander spawned");

        let mut events = Vec::new();
        step_projectiles(&mut world, Duration::from_millis(500), &mut events);

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileImpacted { .. })));
        assert!(damage_events(&events).is_empty());
        let survivor = world
            .units
            .iter()
            .find(|unit| unit.id == bystander)
            .expect("bystander alive");
        assert_eq!(survivor.health.current(), 150);
    }

    #[test]
    fn tower_bolt_follows_the_impact_point_not_a_moved_target() {
        let mut world = World::new(WorldConfig::default());
        let runner = scaffolding::spawn_unit(
            &mut world,
            Team::Away,
            CardKind::SwarmRats,
            CellPoint::new(4.0, 20.0),
        );
        let mut events = Vec::new();
        fire_tower(&mut world, HOME_FLANK, runner, &mut events);
        world.units[0].position = CellPoint::new(8.0, 20.0);

        step_projectiles(&mut world, Duration::from_millis(500), &mut events);
        assert!(damage_events(&events).is_empty(), "the runner left the blast point");
    }

    /// Home bowmaster in reach of the away left flank, aimed at it.
    fn bowmaster_on_away_flank(world: &mut World) -> Vec<Event> {
        let archer = scaffolding::spawn_unit(
            world,
            Team::Home,
            CardKind::Bowmaster,
            CellPoint::new(4.0, 13.0),
        );
        let mut events = Vec::new();
        crate::apply(
            world,
            Command::AssignTarget {
                unit: archer,
                target: Some(TargetRef::Tower(AWAY_FLANK)),
            },
            &mut events,
        );
        step_units(world, Duration::from_millis(50), &mut events);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileFired { .. })));

        events.clear();
        step_projectiles(world, Duration::from_secs(1), &mut events);
        events
    }

    #[test]
    fn unit_projectile_damages_the_tower_it_was_aimed_at() {
        let mut world = World::new(WorldConfig::default());
        let events = bowmaster_on_away_flank(&mut world);

        assert!(events.contains(&Event::TowerDamaged {
            tower: AWAY_FLANK,
            amount: 65,
            remaining: TowerKind::Flank.hit_points() - 65,
        }));
        assert!(damage_events(&events).is_empty());
    }

    #[test]
    fn destroyed_flank_leaves_ruins_and_opens_a_pocket() {
        let mut world = World::new(WorldConfig::default());
        let deep_in_enemy_half = CellPoint::new(4.0, 3.0);
        assert_eq!(
            world.grid.check_troop_deploy(Team::Home, deep_in_enemy_half),
            Err(PlayError::OutsideTerritory)
        );
        scaffolding::set_tower_health(&mut world, AWAY_FLANK, 1);

        let events = bowmaster_on_away_flank(&mut world);
        assert!(events.contains(&Event::TowerDestroyed {
            tower: AWAY_FLANK,
            team: Team::Away,
            kind: TowerKind::Flank,
        }));
        assert_eq!(world.grid.classify(CellCoord::new(4, 7)), Some(TileKind::Ruins));
        assert!(world.paths.paths.is_empty(), "stale paths are dropped");

        let mut events = Vec::new();
        crate::apply(
            &mut world,
            Command::PlayCard {
                team: Team::Home,
                hand_index: 0,
                position: deep_in_enemy_half,
            },
            &mut events,
        );
        assert!(
            events
                .iter()
                .any(|event| matches!(event, Event::CardPlayed { team: Team::Home, .. })),
            "unexpected events {events:?}"
        );
    }

    #[test]
    fn assigned_routes_are_cached_until_a_tower_falls() {
        let mut world = World::new(WorldConfig::default());
        let knight = scaffolding::spawn_unit(
            &mut world,
            Team::Home,
            CardKind::Lanceguard,
            CellPoint::new(4.0, 12.0),
        );
        let mut events = Vec::new();
        crate::apply(
            &mut world,
            Command::AssignTarget {
                unit: knight,
                target: Some(TargetRef::Tower(AWAY_FLANK)),
            },
            &mut events,
        );
        assert_eq!(world.paths.paths.len(), 1);

        scaffolding::set_tower_health(&mut world, TowerId::new(4), 1);
        damage_tower(&mut world, TowerId::new(4), 10, &mut events);
        assert!(world.paths.paths.is_empty());
    }
}
