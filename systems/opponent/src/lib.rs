#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded opponent policy that decides when, what and where to deploy.
//!
//! The policy only reads projections of the match and answers with
//! `Command::PlayCard`. Whether the play is accepted is up to the world; a
//! rejected play leaves the side's last-play timestamp untouched so the policy
//! simply tries again on a later tick.

use std::time::Duration;

use arena_clash_core::{arena, CellPoint, Command, SideSnapshot, Team, UnitView};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Elixir the policy hoards before it considers any play.
pub const MIN_ELIXIR_TO_PLAY: u32 = 3;

/// Trophy count above which the policy answers pushes with defensive cards.
pub const DEFENSIVE_TROPHY_THRESHOLD: u32 = 300;

const NOVICE_MISTAKE_RATE: f64 = 0.2;
const INTERMEDIATE_MISTAKE_RATE: f64 = 0.1;
const EXPERT_MISTAKE_RATE: f64 = 0.03;

const SLOWEST_REACTION_MS: u64 = 6_000;
const FASTEST_REACTION_MS: u64 = 2_000;
const REACTION_MS_PER_TROPHY: u64 = 8;

const LEFT_LANE: (f32, f32) = (3.0, 7.0);
const RIGHT_LANE: (f32, f32) = (11.0, 15.0);
/// Deploy depth band authored from the away side's perspective.
const DEPLOY_ROWS: (f32, f32) = (8.0, 12.0);

/// Reaction delay between plays for the given opponent skill.
#[must_use]
pub fn reaction_delay(trophies: u32) -> Duration {
    let reduction = u64::from(trophies).saturating_mul(REACTION_MS_PER_TROPHY);
    let millis = SLOWEST_REACTION_MS
        .saturating_sub(reduction)
        .max(FASTEST_REACTION_MS);
    Duration::from_millis(millis)
}

/// Chance that a decision picks a random hand slot instead of an affordable card.
#[must_use]
pub const fn mistake_rate(trophies: u32) -> f64 {
    match trophies {
        0..=299 => NOVICE_MISTAKE_RATE,
        300..=599 => INTERMEDIATE_MISTAKE_RATE,
        _ => EXPERT_MISTAKE_RATE,
    }
}

/// Configuration parameters required to construct the opponent policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    team: Team,
    trophies: u32,
    seed: u64,
    mistake_rate: f64,
}

impl Config {
    /// Creates a configuration for the side `team` at the given skill and seed.
    #[must_use]
    pub const fn new(team: Team, trophies: u32, seed: u64) -> Self {
        Self {
            team,
            trophies,
            seed,
            mistake_rate: mistake_rate(trophies),
        }
    }

    #[cfg(test)]
    fn with_mistake_rate(mut self, rate: f64) -> Self {
        self.mistake_rate = rate;
        self
    }
}

/// Seeded bot that plays cards for one side.
#[derive(Debug)]
pub struct Opponent {
    team: Team,
    trophies: u32,
    reaction_delay: Duration,
    mistake_rate: f64,
    rng: ChaCha8Rng,
    candidates: Vec<usize>,
}

impl Opponent {
    /// Creates a new opponent policy using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            team: config.team,
            trophies: config.trophies,
            reaction_delay: reaction_delay(config.trophies),
            mistake_rate: config.mistake_rate,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            candidates: Vec::new(),
        }
    }

    /// Side the policy plays for.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Emits at most one `Command::PlayCard` for the policy's side.
    ///
    /// `now` is the elapsed match time and `side` the projection of the side
    /// the policy plays for. Enemy units in `units` that crossed into the
    /// policy's half trigger defensive selection at higher skill.
    pub fn handle(
        &mut self,
        now: Duration,
        side: &SideSnapshot,
        units: &UnitView,
        out: &mut Vec<Command>,
    ) {
        let since_last = now.saturating_sub(side.last_play.unwrap_or(Duration::ZERO));
        if since_last < self.reaction_delay {
            return;
        }
        if side.elixir < MIN_ELIXIR_TO_PLAY {
            return;
        }

        self.candidates.clear();
        self.candidates.extend(
            side.hand
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.card.cost() <= side.elixir)
                .map(|(index, _)| index),
        );
        if self.candidates.is_empty() {
            return;
        }

        if self.rng.gen_bool(self.mistake_rate) {
            let hand_index = self.rng.gen_range(0..side.hand.len());
            let card = side.hand[hand_index].card;
            if card.cost() > side.elixir {
                debug!(
                    team = self.team.label(),
                    card = card.id(),
                    elixir = side.elixir,
                    "opponent fumbled an unaffordable card"
                );
                return;
            }
            self.deploy(hand_index, side, out);
            return;
        }

        if self.trophies > DEFENSIVE_TROPHY_THRESHOLD && self.under_pressure(units) {
            let defensive: Vec<usize> = self
                .candidates
                .iter()
                .copied()
                .filter(|index| side.hand[*index].card.stats().class.is_defensive())
                .collect();
            if !defensive.is_empty() {
                self.candidates = defensive;
            }
        }

        let Some(hand_index) = self.candidates.choose(&mut self.rng).copied() else {
            return;
        };
        self.deploy(hand_index, side, out);
    }

    fn deploy(&mut self, hand_index: usize, side: &SideSnapshot, out: &mut Vec<Command>) {
        let position = self.pick_position();

        debug!(
            team = self.team.label(),
            card = side.hand[hand_index].card.id(),
            x = position.x(),
            y = position.y(),
            "opponent deploying"
        );
        out.push(Command::PlayCard {
            team: self.team,
            hand_index,
            position,
        });
    }

    fn under_pressure(&self, units: &UnitView) -> bool {
        units
            .iter()
            .filter(|unit| unit.team != self.team)
            .any(|unit| arena::is_own_half(self.team, unit.position.y()))
    }

    fn pick_position(&mut self) -> CellPoint {
        let (low, high) = if self.rng.gen_bool(0.5) {
            LEFT_LANE
        } else {
            RIGHT_LANE
        };
        let x = self.rng.gen_range(low..high);
        let y = self.rng.gen_range(DEPLOY_ROWS.0..DEPLOY_ROWS.1);
        CellPoint::new(x, arena::mirror_row_for(self.team, y))
    }
}
