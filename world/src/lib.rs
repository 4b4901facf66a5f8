#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for Arena Clash.
//!
//! [`World`] is the single aggregate owning the grid, towers, units,
//! projectiles and both sides' economies. It is only ever mutated through
//! [`apply`], which reports every change as an [`Event`]; read access goes
//! through the [`query`] module.

pub mod grid;
pub mod navigation;
#[cfg(any(test, feature = "scenario_scaffolding"))]
pub mod scaffolding;

mod combat;
mod economy;
mod projectiles;
mod towers;
mod units;

use std::time::Duration;

use arena_clash_core::{
    default_deck, AiLevel, CellPoint, Command, DeckEntry, Event, MatchConfig, PlayError,
    TargetRef, Team, UnitId, Winner,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    economy::SideState,
    grid::Grid,
    navigation::PathCache,
    projectiles::ProjectileState,
    towers::TowerRegistry,
    units::{spawn_point, UnitState},
};

/// Inputs required to set up a match.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Tunable match parameters.
    pub match_config: MatchConfig,
    /// Deck of the home side.
    pub home_deck: Vec<DeckEntry>,
    /// Deck of the away side.
    pub away_deck: Vec<DeckEntry>,
    /// Seed for the opening deck shuffle; `None` keeps the decks in order.
    pub shuffle_seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            home_deck: default_deck(AiLevel::MIN),
            away_deck: default_deck(AiLevel::MIN),
            shuffle_seed: None,
        }
    }
}

/// Authoritative battle state.
#[derive(Clone, Debug)]
pub struct World {
    config: MatchConfig,
    match_length: Duration,
    regen_interval: Duration,
    clock: Duration,
    grid: Grid,
    paths: PathCache,
    towers: TowerRegistry,
    units: Vec<UnitState>,
    projectiles: Vec<ProjectileState>,
    sides: [SideState; 2],
    selected_hand_index: Option<usize>,
    winner: Option<Winner>,
    next_unit_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a fresh match: standard tower layout, dealt hands, full clock.
    ///
    /// A starting elixir above the pool's maximum is clamped to the maximum.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let WorldConfig {
            match_config,
            mut home_deck,
            mut away_deck,
            shuffle_seed,
        } = config;

        if let Some(seed) = shuffle_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            home_deck.shuffle(&mut rng);
            away_deck.shuffle(&mut rng);
        }

        let towers = TowerRegistry::standard();
        let mut grid = Grid::new();
        for tower in towers.iter() {
            grid.mark_footprint(tower.footprint);
        }

        let starting_elixir = match_config.starting_elixir.min(match_config.max_elixir);
        Self {
            config: match_config,
            match_length: match_config.match_duration(),
            regen_interval: match_config.regen_interval(),
            clock: Duration::ZERO,
            grid,
            paths: PathCache::new(),
            towers,
            units: Vec::new(),
            projectiles: Vec::new(),
            sides: [
                SideState::new(Team::Home, home_deck, starting_elixir),
                SideState::new(Team::Away, away_deck, starting_elixir),
            ],
            selected_hand_index: None,
            winner: None,
            next_unit_id: 0,
            next_projectile_id: 0,
        }
    }

    fn side(&self, team: Team) -> &SideState {
        &self.sides[team.index()]
    }

    fn side_mut(&mut self, team: Team) -> &mut SideState {
        &mut self.sides[team.index()]
    }

    fn retarget_due(&self, unit: &UnitState) -> bool {
        match unit.target {
            None => true,
            Some(target) => {
                combat::resolve_target(self, unit.team, target).is_none()
                    || unit.recheck_elapsed(self.clock)
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the match is decided every command is a no-op, except that card plays
/// are still answered with a [`PlayError::MatchOver`] rejection.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.winner.is_some() {
        if let Command::PlayCard {
            team, hand_index, ..
        } = command
        {
            out_events.push(Event::CardRejected {
                team,
                hand_index,
                reason: PlayError::MatchOver,
            });
        }
        return;
    }

    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced {
                dt,
                remaining: world.match_length.saturating_sub(world.clock),
            });

            let now = world.clock;
            let interval = world.regen_interval;
            let max = world.config.max_elixir;
            for side in world.sides.iter_mut() {
                if side.regenerate(now, interval, max) {
                    out_events.push(Event::ElixirChanged {
                        team: side.team,
                        elixir: side.elixir,
                    });
                }
            }
        }
        Command::AssignTarget { unit, target } => assign_target(world, unit, target, out_events),
        Command::StepUnits { dt } => combat::step_units(world, dt, out_events),
        Command::FireProjectile { tower, target } => {
            combat::fire_tower(world, tower, target, out_events);
        }
        Command::StepProjectiles { dt } => combat::step_projectiles(world, dt, out_events),
        Command::PlayCard {
            team,
            hand_index,
            position,
        } => play_card(world, team, hand_index, position, out_events),
        Command::SelectHandCard { index } => {
            let valid = index.map_or(true, |slot| slot < world.side(Team::Home).hand().len());
            if valid && world.selected_hand_index != index {
                world.selected_hand_index = index;
                out_events.push(Event::HandSelectionChanged { index });
            }
        }
        Command::EvaluateOutcome => {
            if let Some(winner) = combat::evaluate_outcome(world) {
                world.winner = Some(winner);
                out_events.push(Event::MatchEnded { winner });
                info!(
                    ?winner,
                    home_crowns = world.side(Team::Home).crowns,
                    away_crowns = world.side(Team::Away).crowns,
                    elapsed_ms = world.clock.as_millis() as u64,
                    "match ended"
                );
            }
        }
    }
}

fn assign_target(
    world: &mut World,
    unit_id: UnitId,
    target: Option<TargetRef>,
    out_events: &mut Vec<Event>,
) {
    let Some(index) = world
        .units
        .iter()
        .position(|unit| unit.id == unit_id && unit.alive)
    else {
        return;
    };
    let team = world.units[index].team;
    let origin = world.units[index].position;

    let resolved = target.and_then(|target| {
        combat::resolve_target(world, team, target).map(|(position, _)| (target, position))
    });

    let path = match resolved {
        Some((_, position)) => {
            let goal = world
                .grid
                .nearest_walkable(position, origin)
                .map_or(position, |cell| cell.center());
            world.paths.find_path(&world.grid, origin, goal)
        }
        None => Vec::new(),
    };

    let now = world.clock;
    let unit = &mut world.units[index];
    unit.target = resolved.map(|(target, _)| target);
    unit.target_acquired_at = Some(now);
    unit.set_path(path);

    debug!(
        unit = unit_id.get(),
        target = ?unit.target,
        waypoints = unit.path.len(),
        "target assigned"
    );
    out_events.push(Event::TargetAssigned {
        unit: unit_id,
        target: unit.target,
    });
}

fn validate_play(
    world: &World,
    team: Team,
    hand_index: usize,
    position: CellPoint,
) -> Result<DeckEntry, PlayError> {
    let side = world.side(team);
    let entry = side.hand_entry(hand_index)?;
    side.check_affordable(entry.card.cost())?;
    world.grid.check_troop_deploy(team, position)?;
    Ok(entry)
}

fn play_card(
    world: &mut World,
    team: Team,
    hand_index: usize,
    position: CellPoint,
    out_events: &mut Vec<Event>,
) {
    let entry = match validate_play(world, team, hand_index, position) {
        Ok(entry) => entry,
        Err(reason) => {
            debug!(team = team.label(), hand_index, %reason, "card rejected");
            out_events.push(Event::CardRejected {
                team,
                hand_index,
                reason,
            });
            return;
        }
    };

    let now = world.clock;
    let stats = entry.card.stats();
    let side = world.side_mut(team);
    side.spend(stats.cost);
    side.cycle(hand_index);
    side.last_play = Some(now);
    let elixir = side.elixir;

    out_events.push(Event::ElixirChanged { team, elixir });
    out_events.push(Event::CardPlayed {
        team,
        card: entry.card,
        hand_index,
        position,
    });
    debug!(
        team = team.label(),
        card = entry.card.id(),
        x = position.x(),
        y = position.y(),
        elixir,
        "card played"
    );

    for body in 0..stats.count {
        let id = UnitId::new(world.next_unit_id);
        world.next_unit_id = world.next_unit_id.wrapping_add(1);
        // Bodies whose offset lands on blocked ground spawn on the deploy point.
        let offset = spawn_point(position, team, body, stats.count);
        let spawn = match offset.nearest_cell() {
            Some(cell) if world.grid.is_walkable(cell) => offset,
            _ => position,
        };
        world
            .units
            .push(UnitState::new(id, team, entry.card, entry.ai_level, spawn));
        out_events.push(Event::UnitSpawned {
            unit: id,
            team,
            card: entry.card,
            position: spawn,
        });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use arena_clash_core::{
        CellPoint, DeckEntry, MatchConfig, ProjectileView, SideSnapshot, Team, TowerView, UnitId,
        UnitSnapshot, UnitView, Winner,
    };

    use super::World;
    use crate::grid::Grid;

    /// Tunable parameters the match was created with.
    #[must_use]
    pub fn config(world: &World) -> MatchConfig {
        world.config
    }

    /// Simulated time elapsed since the match started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Time left before the match times out.
    #[must_use]
    pub fn time_remaining(world: &World) -> Duration {
        world.match_length.saturating_sub(world.clock)
    }

    /// Result of the match once decided.
    #[must_use]
    pub fn winner(world: &World) -> Option<Winner> {
        world.winner
    }

    /// Reports whether the match has been decided.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.winner.is_some()
    }

    /// Economy and score projection of one side.
    #[must_use]
    pub fn side(world: &World, team: Team) -> SideSnapshot {
        world.side(team).snapshot()
    }

    /// Elixir held by one side.
    #[must_use]
    pub fn elixir(world: &World, team: Team) -> u32 {
        world.side(team).elixir
    }

    /// Crowns earned by one side.
    #[must_use]
    pub fn crowns(world: &World, team: Team) -> u32 {
        world.side(team).crowns
    }

    /// Cards in one side's hand, in slot order.
    #[must_use]
    pub fn hand(world: &World, team: Team) -> &[DeckEntry] {
        world.side(team).hand()
    }

    /// Home hand slot currently highlighted by the host.
    #[must_use]
    pub fn selected_hand_index(world: &World) -> Option<usize> {
        world.selected_hand_index
    }

    /// Snapshot of every living unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        let now = world.clock;
        UnitView::from_snapshots(
            world
                .units
                .iter()
                .filter(|unit| unit.alive)
                .map(|unit| unit.snapshot(now, world.retarget_due(unit)))
                .collect(),
        )
    }

    /// Snapshot of a single living unit.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world
            .units
            .iter()
            .find(|unit| unit.id == id && unit.alive)
            .map(|unit| unit.snapshot(world.clock, world.retarget_due(unit)))
    }

    /// Remaining waypoints of a living unit's cached path.
    #[must_use]
    pub fn unit_path(world: &World, id: UnitId) -> Option<&[CellPoint]> {
        world
            .units
            .iter()
            .find(|unit| unit.id == id && unit.alive)
            .map(|unit| unit.path.get(unit.path_cursor..).unwrap_or_default())
    }

    /// Snapshot of every tower, standing or destroyed.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let now = world.clock;
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot(now)).collect())
    }

    /// Snapshot of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .filter(|projectile| projectile.alive)
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Current tile classification of the arena.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }
}
