#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match controller that wires the world and the pure systems into one battle.
//!
//! [`Battle`] owns the authoritative [`World`] together with every system and
//! runs them in a fixed order on each [`Battle::advance`]. Hosts only see the
//! facade: advance, play a card, select a hand slot, and read projections.

pub mod fixed_step;

use std::time::Duration;

use arena_clash_core::{
    CellPoint, Command, DeckEntry, Event, MatchConfig, ProjectileView, SideSnapshot, Team,
    TowerTarget, TowerView, UnitView, Winner, HAND_SIZE,
};
use arena_clash_system_opponent::{Config as OpponentConfig, Opponent};
use arena_clash_system_tower_combat::TowerCombat;
use arena_clash_system_tower_targeting::TowerTargeting;
use arena_clash_system_unit_targeting::UnitTargeting;
use arena_clash_world::{self as world, query, World, WorldConfig};
use thiserror::Error;
use tracing::{info, warn};

pub use fixed_step::FixedStep;

/// Skill and seed of a bot driving one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Autopilot {
    /// Trophy count that sets the bot's reaction delay and tactics.
    pub trophies: u32,
    /// Seed of the bot's decision stream.
    pub seed: u64,
}

/// Everything required to start a battle.
#[derive(Clone, Debug)]
pub struct BattleConfig {
    /// Tunable match parameters.
    pub match_config: MatchConfig,
    /// Deck of the home side.
    pub home_deck: Vec<DeckEntry>,
    /// Deck of the away side.
    pub away_deck: Vec<DeckEntry>,
    /// Seed for the opening deck shuffle; `None` keeps decks in order.
    pub shuffle_seed: Option<u64>,
    /// Bot playing the away side, if any.
    pub away_bot: Option<Autopilot>,
    /// Bot playing the home side, if any.
    pub home_bot: Option<Autopilot>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            match_config: world.match_config,
            home_deck: world.home_deck,
            away_deck: world.away_deck,
            shuffle_seed: world.shuffle_seed,
            away_bot: Some(Autopilot {
                trophies: 0,
                seed: 0,
            }),
            home_bot: None,
        }
    }
}

/// Reasons a battle cannot be started.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SetupError {
    /// A deck cannot fill the opening hand.
    #[error("{} deck holds {len} cards but a hand needs {required}", .team.label())]
    DeckTooSmall {
        /// Side owning the deck.
        team: Team,
        /// Cards in the deck.
        len: usize,
        /// Cards required for a full hand.
        required: usize,
    },
    /// Each side would start with more elixir than its pool can hold.
    #[error("starting elixir {starting} exceeds the maximum of {max}")]
    StartingElixirAboveMax {
        /// Configured starting elixir.
        starting: u32,
        /// Configured pool maximum.
        max: u32,
    },
    /// A duration in the match configuration is zero, negative or not finite.
    #[error("{field} must be a positive number of seconds, got {value}")]
    InvalidDuration {
        /// Name of the offending setting.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
}

/// A running match between two sides.
#[derive(Debug)]
pub struct Battle {
    world: World,
    max_step: Duration,
    step_clamp_reported: bool,
    unit_targeting: UnitTargeting,
    tower_targeting: TowerTargeting,
    tower_combat: TowerCombat,
    opponents: Vec<Opponent>,
    tower_targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Battle {
    /// Validates the configuration and sets up a fresh match.
    pub fn new(config: BattleConfig) -> Result<Self, SetupError> {
        validate(&config)?;

        let opponents: Vec<Opponent> = [(Team::Home, config.home_bot), (Team::Away, config.away_bot)]
            .into_iter()
            .filter_map(|(team, bot)| {
                bot.map(|bot| Opponent::new(OpponentConfig::new(team, bot.trophies, bot.seed)))
            })
            .collect();

        info!(
            shuffle_seed = ?config.shuffle_seed,
            away_bot = ?config.away_bot,
            home_bot = ?config.home_bot,
            match_seconds = config.match_config.match_seconds,
            "battle created"
        );

        Ok(Self {
            max_step: config.match_config.max_step(),
            step_clamp_reported: false,
            world: World::new(WorldConfig {
                match_config: config.match_config,
                home_deck: config.home_deck,
                away_deck: config.away_deck,
                shuffle_seed: config.shuffle_seed,
            }),
            unit_targeting: UnitTargeting::new(),
            tower_targeting: TowerTargeting::new(),
            tower_combat: TowerCombat::new(),
            opponents,
            tower_targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Runs one simulation step of `dt`, clamped to the configured maximum.
    ///
    /// Events of the step replace those of the previous call and are
    /// available through [`Battle::last_events`]. Once the match is decided
    /// the call does nothing.
    pub fn advance(&mut self, dt: Duration) {
        self.events.clear();
        self.step(dt);
    }

    /// Feeds host frame time through `timer` and runs the steps it releases.
    ///
    /// Returns the number of steps simulated; [`Battle::last_events`] then
    /// holds the events of all of them. A timer step above the configured
    /// maximum is clamped like any other step and reported once.
    pub fn advance_frame(&mut self, timer: &mut FixedStep, frame: Duration) -> u32 {
        self.events.clear();
        if timer.step() > self.max_step && !self.step_clamp_reported {
            self.step_clamp_reported = true;
            warn!(
                step_ms = timer.step().as_millis() as u64,
                max_step_ms = self.max_step.as_millis() as u64,
                "fixed step exceeds the maximum step and will be clamped"
            );
        }
        let steps = timer.accumulate(frame);
        for _ in 0..steps {
            self.step(timer.step());
        }
        steps
    }

    fn step(&mut self, dt: Duration) {
        if query::is_over(&self.world) {
            return;
        }
        let dt = dt.min(self.max_step);
        if dt.is_zero() {
            return;
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        self.unit_targeting.handle(
            &query::unit_view(&self.world),
            &query::tower_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        world::apply(&mut self.world, Command::StepUnits { dt }, &mut self.events);

        let towers = query::tower_view(&self.world);
        self.tower_targeting.handle(
            &towers,
            &query::unit_view(&self.world),
            &mut self.tower_targets,
        );
        self.tower_combat
            .handle(&towers, &self.tower_targets, &mut self.commands);
        self.flush_commands();

        world::apply(
            &mut self.world,
            Command::StepProjectiles { dt },
            &mut self.events,
        );

        let now = query::elapsed(&self.world);
        let units = query::unit_view(&self.world);
        for opponent in &mut self.opponents {
            let side = query::side(&self.world, opponent.team());
            opponent.handle(now, &side, &units, &mut self.commands);
        }
        self.flush_commands();

        world::apply(&mut self.world, Command::EvaluateOutcome, &mut self.events);
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    /// Attempts to play the card in `hand_index` for `team` at `position`.
    ///
    /// Returns whether the play was accepted. A rejected play leaves the
    /// match untouched apart from a `CardRejected` event.
    pub fn play_card(&mut self, team: Team, hand_index: usize, position: CellPoint) -> bool {
        let first = self.events.len();
        world::apply(
            &mut self.world,
            Command::PlayCard {
                team,
                hand_index,
                position,
            },
            &mut self.events,
        );
        self.events[first..]
            .iter()
            .any(|event| matches!(event, Event::CardPlayed { .. }))
    }

    /// Highlights a home hand slot, or clears the highlight with `None`.
    pub fn select_hand_card(&mut self, index: Option<usize>) {
        world::apply(
            &mut self.world,
            Command::SelectHandCard { index },
            &mut self.events,
        );
    }

    /// Events produced since the start of the last advance.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Simulated time since kick-off.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Time left on the match clock.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        query::time_remaining(&self.world)
    }

    /// Elixir held by `team`.
    #[must_use]
    pub fn elixir(&self, team: Team) -> u32 {
        query::elixir(&self.world, team)
    }

    /// Crowns earned by `team`.
    #[must_use]
    pub fn crowns(&self, team: Team) -> u32 {
        query::crowns(&self.world, team)
    }

    /// Hand of `team` in slot order.
    #[must_use]
    pub fn hand(&self, team: Team) -> &[DeckEntry] {
        query::hand(&self.world, team)
    }

    /// Home hand slot currently highlighted.
    #[must_use]
    pub fn selected_hand_index(&self) -> Option<usize> {
        query::selected_hand_index(&self.world)
    }

    /// Economy and score projection of `team`.
    #[must_use]
    pub fn side(&self, team: Team) -> SideSnapshot {
        query::side(&self.world, team)
    }

    /// Reports whether the match has been decided.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::is_over(&self.world)
    }

    /// Result of the match once decided.
    #[must_use]
    pub fn winner(&self) -> Option<Winner> {
        query::winner(&self.world)
    }

    /// Every living unit.
    #[must_use]
    pub fn units(&self) -> UnitView {
        query::unit_view(&self.world)
    }

    /// Every tower, standing or destroyed.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Every projectile in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Read access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the underlying world for scripted setups.
    ///
    /// The world still only changes through `world::apply` and the scenario
    /// scaffolding helpers.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

fn validate(config: &BattleConfig) -> Result<(), SetupError> {
    for (team, deck) in [(Team::Home, &config.home_deck), (Team::Away, &config.away_deck)] {
        if deck.len() < HAND_SIZE {
            return Err(SetupError::DeckTooSmall {
                team,
                len: deck.len(),
                required: HAND_SIZE,
            });
        }
    }

    let match_config = &config.match_config;
    if match_config.starting_elixir > match_config.max_elixir {
        return Err(SetupError::StartingElixirAboveMax {
            starting: match_config.starting_elixir,
            max: match_config.max_elixir,
        });
    }
    for (field, value) in [
        ("match_seconds", match_config.match_seconds),
        ("elixir_regen_seconds", match_config.elixir_regen_seconds),
        ("max_step_seconds", match_config.max_step_seconds),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(SetupError::InvalidDuration { field, value });
        }
    }
    Ok(())
}
