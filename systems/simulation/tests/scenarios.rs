use std::time::Duration;

use arena_clash_core::{
    CardKind, CellPoint, Command, Event, MatchConfig, TargetRef, Team, TowerId, UnitId, Winner,
};
use arena_clash_simulation::{Battle, BattleConfig};
use arena_clash_world::{self as world, scaffolding};

const STEP: Duration = Duration::from_millis(50);

fn quiet_battle() -> Battle {
    Battle::new(BattleConfig {
        away_bot: None,
        ..BattleConfig::default()
    })
    .expect("default config is valid")
}

fn run_until<F>(battle: &mut Battle, max_steps: usize, mut done: F) -> Vec<Event>
where
    F: FnMut(&Battle, &[Event]) -> bool,
{
    let mut log = Vec::new();
    for _ in 0..max_steps {
        battle.advance(STEP);
        log.extend_from_slice(battle.last_events());
        if done(battle, battle.last_events()) {
            return log;
        }
    }
    panic!("condition not reached within {max_steps} steps");
}

#[test]
fn melee_duel_resolves_near_the_river() {
    let mut battle = quiet_battle();
    let home = scaffolding::spawn_unit(
        battle.world_mut(),
        Team::Home,
        CardKind::Lanceguard,
        CellPoint::new(4.0, 19.0),
    );
    let away = scaffolding::spawn_unit(
        battle.world_mut(),
        Team::Away,
        CardKind::Lanceguard,
        CellPoint::new(4.0, 12.0),
    );

    let log = run_until(&mut battle, 300, |_, events| {
        events
            .iter()
            .any(|event| matches!(event, Event::UnitDied { .. }))
    });

    let first_strike = log
        .iter()
        .find_map(|event| match event {
            Event::UnitStruck { attacker, .. } => Some(*attacker),
            _ => None,
        })
        .expect("the duel produced a strike");
    assert!(first_strike == home || first_strike == away);

    let units = battle.units();
    assert_eq!(units.iter().count(), 1, "exactly one duelist survives");
    let survivor = units.iter().next().expect("one survivor");
    assert!(survivor.health.current() < survivor.health.max());
    assert!(
        (survivor.position.y() - 15.5).abs() < 2.5,
        "met at row {}",
        survivor.position.y()
    );
}

#[test]
fn splash_projectile_hits_every_clustered_enemy() {
    let mut battle = quiet_battle();
    let _crew = scaffolding::spawn_unit(
        battle.world_mut(),
        Team::Home,
        CardKind::CannonCrew,
        CellPoint::new(9.0, 20.0),
    );
    let rats: Vec<UnitId> = [(9.0, 19.0), (9.3, 19.0), (8.7, 19.0)]
        .into_iter()
        .map(|(x, y)| {
            scaffolding::spawn_unit(
                battle.world_mut(),
                Team::Away,
                CardKind::SwarmRats,
                CellPoint::new(x, y),
            )
        })
        .collect();

    let mut impact_events = Vec::new();
    let _ = run_until(&mut battle, 40, |_, events| {
        let landed = events
            .iter()
            .any(|event| matches!(event, Event::ProjectileImpacted { .. }));
        if landed {
            impact_events = events.to_vec();
        }
        landed
    });

    let damage = CardKind::CannonCrew.stats().damage;
    for rat in rats {
        assert!(
            impact_events.contains(&Event::UnitDamaged {
                unit: rat,
                amount: damage,
                remaining: CardKind::SwarmRats.stats().hit_points - damage,
            }),
            "rat {rat:?} escaped the splash"
        );
    }
}

#[test]
fn frozen_units_hold_still_until_the_freeze_expires() {
    let mut battle = quiet_battle();
    let _mage = scaffolding::spawn_unit(
        battle.world_mut(),
        Team::Home,
        CardKind::FrostMage,
        CellPoint::new(9.0, 24.0),
    );
    let golem = scaffolding::spawn_unit(
        battle.world_mut(),
        Team::Away,
        CardKind::StoneGolem,
        CellPoint::new(9.0, 19.0),
    );

    let mut until = Duration::ZERO;
    let _ = run_until(&mut battle, 60, |_, events| {
        events.iter().any(|event| match event {
            Event::UnitFrozen { unit, until: expiry } if *unit == golem => {
                until = *expiry;
                true
            }
            _ => false,
        })
    });
    let frozen_at = battle.units().get(golem).expect("golem alive").position;

    while battle.elapsed() + STEP < until {
        battle.advance(STEP);
        let snapshot = *battle.units().get(golem).expect("golem alive");
        assert!(snapshot.frozen);
        assert_eq!(snapshot.position, frozen_at, "moved while frozen");
        assert!(!battle.last_events().iter().any(|event| matches!(
            event,
            Event::UnitStruck { attacker, .. } if *attacker == golem
        )));
    }

    let mut moved = false;
    for _ in 0..8 {
        battle.advance(STEP);
        if battle.elapsed() >= until {
            let snapshot = *battle.units().get(golem).expect("golem alive");
            if snapshot.position != frozen_at {
                moved = true;
                break;
            }
        }
    }
    assert!(moved, "golem never resumed after the freeze");
}

#[test]
fn timeout_with_equal_crowns_is_a_tie() {
    let mut battle = Battle::new(BattleConfig {
        match_config: MatchConfig {
            match_seconds: 2.0,
            ..MatchConfig::default()
        },
        away_bot: None,
        ..BattleConfig::default()
    })
    .expect("config is valid");

    let _ = run_until(&mut battle, 100, |battle, _| battle.is_over());
    assert_eq!(battle.winner(), Some(Winner::Tie));
    assert!(battle.elapsed() >= Duration::from_secs(2));
    assert_eq!(battle.time_remaining(), Duration::ZERO);

    let elapsed = battle.elapsed();
    battle.advance(STEP);
    assert_eq!(battle.elapsed(), elapsed);
    assert!(!battle.play_card(Team::Home, 0, CellPoint::new(9.0, 22.0)));
}

#[test]
fn command_tower_loss_outranks_a_third_crown() {
    let mut battle = quiet_battle();
    let setup = battle.world_mut();
    scaffolding::set_crowns(setup, Team::Away, 2);
    scaffolding::set_tower_health(setup, TowerId::new(0), 1);
    scaffolding::set_tower_health(setup, TowerId::new(5), 1);

    let raider = scaffolding::spawn_unit(
        setup,
        Team::Home,
        CardKind::Lanceguard,
        CellPoint::new(8.5, 6.0),
    );
    let sapper = scaffolding::spawn_unit(
        setup,
        Team::Away,
        CardKind::Lanceguard,
        CellPoint::new(4.0, 21.5),
    );
    let mut events = Vec::new();
    for (unit, tower) in [(raider, TowerId::new(5)), (sapper, TowerId::new(0))] {
        world::apply(
            setup,
            Command::AssignTarget {
                unit,
                target: Some(TargetRef::Tower(tower)),
            },
            &mut events,
        );
    }

    battle.advance(STEP);

    let destroyed: Vec<TowerId> = battle
        .last_events()
        .iter()
        .filter_map(|event| match event {
            Event::TowerDestroyed { tower, .. } => Some(*tower),
            _ => None,
        })
        .collect();
    assert_eq!(destroyed, vec![TowerId::new(5), TowerId::new(0)]);
    assert_eq!(battle.crowns(Team::Away), 3);
    assert_eq!(battle.crowns(Team::Home), 1);
    assert_eq!(battle.winner(), Some(Winner::Home));
}

#[test]
fn towers_only_lose_health_and_award_one_crown() {
    let mut battle = quiet_battle();
    scaffolding::set_tower_health(battle.world_mut(), TowerId::new(3), 200);
    let _golem = scaffolding::spawn_unit(
        battle.world_mut(),
        Team::Home,
        CardKind::StoneGolem,
        CellPoint::new(4.0, 9.8),
    );

    let mut last_health = 200;
    let mut was_destroyed = false;
    let mut crowns_awarded = 0;
    for _ in 0..200 {
        battle.advance(STEP);
        let towers = battle.towers();
        let tower = towers.get(TowerId::new(3)).expect("tower exists");
        assert!(tower.health.current() <= last_health);
        assert!(!was_destroyed || tower.destroyed, "tower came back");
        last_health = tower.health.current();
        was_destroyed = tower.destroyed;
        crowns_awarded += battle
            .last_events()
            .iter()
            .filter(|event| matches!(event, Event::CrownAwarded { team: Team::Home, .. }))
            .count();
    }

    assert!(was_destroyed);
    assert_eq!(crowns_awarded, 1);
    assert_eq!(battle.crowns(Team::Home), 1);
    let command = *battle.towers().get(TowerId::new(5)).expect("command tower");
    assert!(command.awake, "losing a flank wakes the command tower");
}
