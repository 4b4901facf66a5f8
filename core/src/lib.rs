#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena Clash battle engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts and systems submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what happened. Systems query immutable snapshots and respond exclusively
//! with new command batches.

pub mod arena;
pub mod cards;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cards::{
    default_deck, AiLevel, AttackStyle, CardKind, CardStats, DeckEntry, HitEffect,
    TargetPreference, UnitClass,
};

/// Number of cards held in a hand at any time.
pub const HAND_SIZE: usize = 4;

/// Commands that express all permissible world mutations.
///
/// The match controller issues them in a fixed order every tick; see the
/// simulation crate for the canonical sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the match clock and regenerates elixir for both sides.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces a unit's target and recomputes its path toward it.
    AssignTarget {
        /// Unit receiving the new target.
        unit: UnitId,
        /// Entity the unit should pursue, or `None` to stand idle.
        target: Option<TargetRef>,
    },
    /// Resolves the attack-or-approach decision for every living unit.
    StepUnits {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Requests that a tower launch a projectile at an enemy unit.
    FireProjectile {
        /// Tower attempting to fire.
        tower: TowerId,
        /// Unit whose current position becomes the projectile's target point.
        target: UnitId,
    },
    /// Advances every projectile and resolves impacts, then purges the dead.
    StepProjectiles {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Requests that a side play a card from its hand.
    PlayCard {
        /// Side playing the card.
        team: Team,
        /// Slot of the hand holding the card.
        hand_index: usize,
        /// Requested deploy point in tile space.
        position: CellPoint,
    },
    /// Updates the home side's highlighted hand slot.
    SelectHandCard {
        /// Slot to highlight, or `None` to clear the selection.
        index: Option<usize>,
    },
    /// Evaluates win conditions after all damage of the tick has landed.
    EvaluateOutcome,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the match clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Time left before the match times out.
        remaining: Duration,
    },
    /// Reports a change to a side's elixir pool.
    ElixirChanged {
        /// Side whose pool changed.
        team: Team,
        /// Elixir held after the change.
        elixir: u32,
    },
    /// Confirms that a card was played and its units deployed.
    CardPlayed {
        /// Side that played the card.
        team: Team,
        /// Card that left the hand.
        card: CardKind,
        /// Hand slot the card was played from.
        hand_index: usize,
        /// Deploy point of the play.
        position: CellPoint,
    },
    /// Reports that a card play was refused without side effects.
    CardRejected {
        /// Side that attempted the play.
        team: Team,
        /// Hand slot named by the request.
        hand_index: usize,
        /// Specific reason the play failed.
        reason: PlayError,
    },
    /// Announces a change to the highlighted hand slot.
    HandSelectionChanged {
        /// Newly highlighted slot.
        index: Option<usize>,
    },
    /// Confirms that a unit acquired a new target.
    TargetAssigned {
        /// Unit that re-targeted.
        unit: UnitId,
        /// Target now pursued by the unit.
        target: Option<TargetRef>,
    },
    /// Confirms that a unit entered the arena.
    UnitSpawned {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Side owning the unit.
        team: Team,
        /// Card the unit was spawned from.
        card: CardKind,
        /// Spawn point after the per-body offset.
        position: CellPoint,
    },
    /// Reports that a unit landed a direct melee strike.
    UnitStruck {
        /// Attacking unit.
        attacker: UnitId,
        /// Entity that received the strike.
        target: TargetRef,
    },
    /// Reports damage applied to a unit.
    UnitDamaged {
        /// Unit that took damage.
        unit: UnitId,
        /// Damage applied.
        amount: u32,
        /// Hit points left after the damage.
        remaining: u32,
    },
    /// Reports that a unit became frozen.
    UnitFrozen {
        /// Unit that was frozen.
        unit: UnitId,
        /// Match time at which the freeze ends.
        until: Duration,
    },
    /// Reports that a unit's hit points reached zero.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
        /// Side that lost the unit.
        team: Team,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Entity that launched the projectile.
        source: ProjectileSource,
        /// Launch point.
        from: CellPoint,
        /// Fixed target point.
        to: CellPoint,
    },
    /// Reports that a projectile reached its target point.
    ProjectileImpacted {
        /// Projectile that landed.
        projectile: ProjectileId,
        /// Impact point.
        at: CellPoint,
    },
    /// Reports damage applied to a tower.
    TowerDamaged {
        /// Tower that took damage.
        tower: TowerId,
        /// Damage applied.
        amount: u32,
        /// Hit points left after the damage.
        remaining: u32,
    },
    /// Reports that a dormant command tower started defending.
    TowerAwakened {
        /// Tower that woke up.
        tower: TowerId,
    },
    /// Reports that a tower fell and turned into ruins.
    TowerDestroyed {
        /// Tower that was destroyed.
        tower: TowerId,
        /// Side that owned the tower.
        team: Team,
        /// Kind of the destroyed tower.
        kind: TowerKind,
    },
    /// Reports that a side earned a crown.
    CrownAwarded {
        /// Side that earned the crown.
        team: Team,
        /// Crown total after the award.
        crowns: u32,
    },
    /// Announces the end of the match.
    MatchEnded {
        /// Result of the match.
        winner: Winner,
    },
}

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Player side, deploying from the bottom of the arena.
    Home,
    /// Opponent side, deploying from the top of the arena.
    Away,
}

impl Team {
    /// Both sides in canonical processing order.
    pub const BOTH: [Team; 2] = [Team::Home, Team::Away];

    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Dense index usable for per-side arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => 1,
        }
    }

    /// Presentation label used by hosts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "player",
            Self::Away => "bot",
        }
    }
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// The home side won.
    Home,
    /// The away side won.
    Away,
    /// Neither side won.
    Tie,
}

impl Winner {
    /// Result in which the provided side wins.
    #[must_use]
    pub const fn team(team: Team) -> Self {
        match team {
            Team::Home => Self::Home,
            Team::Away => Self::Away,
        }
    }

    /// Winning side, if the match was not tied.
    #[must_use]
    pub const fn side(self) -> Option<Team> {
        match self {
            Self::Home => Some(Team::Home),
            Self::Away => Some(Team::Away),
            Self::Tie => None,
        }
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Entity a unit can pursue and attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetRef {
    /// An enemy unit.
    Unit(UnitId),
    /// An enemy tower.
    Tower(TowerId),
}

/// Entity that launched a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileSource {
    /// A ranged unit.
    Unit(UnitId),
    /// A defending tower.
    Tower(TowerId),
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Centre of the tile expressed as a fractional point.
    #[must_use]
    pub fn center(self) -> CellPoint {
        CellPoint::new(self.column as f32, self.row as f32)
    }
}

/// Fractional position in tile space.
///
/// The point `(c, r)` is the centre of tile `(c, r)`.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct CellPoint {
    x: f32,
    y: f32,
}

impl CellPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate measured in columns.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate measured in rows.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: CellPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Tile containing the point, or `None` when the point lies above or left
    /// of the grid origin or is not finite.
    #[must_use]
    pub fn nearest_cell(self) -> Option<CellCoord> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return None;
        }
        let column = self.x.round();
        let row = self.y.round();
        if column < 0.0 || row < 0.0 {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Moves toward `target` by at most `max_distance`, never overshooting.
    #[must_use]
    pub fn step_toward(self, target: CellPoint, max_distance: f32) -> CellPoint {
        let distance = self.distance(target);
        if distance <= max_distance || distance <= f32::EPSILON {
            return target;
        }
        let scale = max_distance / distance;
        CellPoint::new(
            self.x + (target.x - self.x) * scale,
            self.y + (target.y - self.y) * scale,
        )
    }

    /// Point shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> CellPoint {
        CellPoint::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= self.origin.column()
            && cell.column() < self.origin.column() + self.size.width()
            && cell.row() >= self.origin.row()
            && cell.row() < self.origin.row() + self.size.height()
    }

    /// Iterates every cell of the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width())
                .map(move |dx| CellCoord::new(origin.column() + dx, origin.row() + dy))
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Hit point pool shared by units and towers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Creates a full pool with the provided maximum.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether the pool is exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Remaining hit points as a fraction of the maximum, for health bars.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    /// Subtracts damage, saturating at zero, and returns the remaining hit points.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }
}

/// Types of towers defending each side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Lane tower guarding one bridge; two per side.
    Flank,
    /// Central tower whose loss ends the match; starts dormant.
    Command,
}

impl TowerKind {
    /// Starting and maximum hit points.
    #[must_use]
    pub const fn hit_points(self) -> u32 {
        match self {
            Self::Flank => 2_000,
            Self::Command => 3_500,
        }
    }

    /// Damage carried by each projectile.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Flank => 50,
            Self::Command => 80,
        }
    }

    /// Targeting range measured in tiles.
    #[must_use]
    pub const fn range_in_tiles(self) -> f32 {
        match self {
            Self::Flank => 5.0,
            Self::Command => 6.0,
        }
    }

    /// Shots fired per second.
    #[must_use]
    pub const fn attack_speed(self) -> f32 {
        0.8
    }

    /// Time that must elapse between two shots.
    #[must_use]
    pub fn attack_interval(self) -> Duration {
        Duration::from_secs_f32(1.0 / self.attack_speed())
    }

    /// Radius of the occupied footprint around the tower centre.
    #[must_use]
    pub const fn footprint_radius(self) -> f32 {
        match self {
            Self::Flank => 1.5,
            Self::Command => 2.0,
        }
    }

    /// Reports whether the tower defends from the first tick.
    #[must_use]
    pub const fn starts_awake(self) -> bool {
        matches!(self, Self::Flank)
    }
}

/// Reasons a card play may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PlayError {
    /// The match has already been decided.
    #[error("the match is over")]
    MatchOver,
    /// The hand slot does not hold a card.
    #[error("hand slot is empty or out of range")]
    InvalidHandIndex,
    /// The side cannot afford the card.
    #[error("card costs {cost} elixir but only {available} is available")]
    InsufficientElixir {
        /// Elixir cost of the card.
        cost: u32,
        /// Elixir held by the side.
        available: u32,
    },
    /// The deploy point lies outside the side's territory.
    #[error("deploy point is outside the team's territory")]
    OutsideTerritory,
    /// The deploy point is water, a bridge or a standing structure.
    #[error("deploy point is not placeable")]
    NotPlaceable,
}

/// Tunable match parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Length of the match before it times out.
    pub match_seconds: f32,
    /// Elixir each side starts with.
    pub starting_elixir: u32,
    /// Upper bound of each elixir pool.
    pub max_elixir: u32,
    /// Interval between two elixir regeneration steps.
    pub elixir_regen_seconds: f32,
    /// Upper bound applied to every simulation step.
    pub max_step_seconds: f32,
}

impl MatchConfig {
    /// Match length as a duration, zero when the configured value is invalid.
    #[must_use]
    pub fn match_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.match_seconds).unwrap_or(Duration::ZERO)
    }

    /// Elixir regeneration interval, zero when the configured value is invalid.
    #[must_use]
    pub fn regen_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.elixir_regen_seconds).unwrap_or(Duration::ZERO)
    }

    /// Largest step the simulation accepts, zero when the configured value is invalid.
    #[must_use]
    pub fn max_step(&self) -> Duration {
        Duration::try_from_secs_f32(self.max_step_seconds).unwrap_or(Duration::ZERO)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_seconds: 180.0,
            starting_elixir: 5,
            max_elixir: 10,
            elixir_regen_seconds: 2.8,
            max_step_seconds: 0.05,
        }
    }
}

/// Immutable representation of a single living unit used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Side owning the unit.
    pub team: Team,
    /// Card the unit was spawned from.
    pub card: CardKind,
    /// Decision-timing level of the unit.
    pub ai_level: AiLevel,
    /// Current position.
    pub position: CellPoint,
    /// Current hit points.
    pub health: Health,
    /// Target currently pursued.
    pub target: Option<TargetRef>,
    /// Indicates whether the unit must re-acquire a target this tick.
    pub retarget_due: bool,
    /// Indicates whether a freeze currently prevents the unit from acting.
    pub frozen: bool,
}

/// Read-only snapshot describing all living units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Side defended by the tower.
    pub team: Team,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Centre of the footprint.
    pub position: CellPoint,
    /// Tiles covered by the footprint.
    pub footprint: CellRect,
    /// Current hit points.
    pub health: Health,
    /// Indicates whether the tower defends.
    pub awake: bool,
    /// Indicates whether the tower has fallen.
    pub destroyed: bool,
    /// Time left before the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot describing every tower, standing or destroyed.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Side that fired the projectile.
    pub team: Team,
    /// Entity that fired the projectile.
    pub source: ProjectileSource,
    /// Current interpolated position.
    pub position: CellPoint,
    /// Fixed point the projectile travels toward.
    pub target_point: CellPoint,
    /// Radius of area damage on impact.
    pub splash_radius: f32,
}

/// Read-only snapshot describing every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }
}

/// Per-side economy and score projection.
#[derive(Clone, Debug, PartialEq)]
pub struct SideSnapshot {
    /// Side described by the snapshot.
    pub team: Team,
    /// Elixir currently held.
    pub elixir: u32,
    /// Cards currently in hand, in slot order.
    pub hand: Vec<DeckEntry>,
    /// Cards waiting in the deck queue, head first.
    pub queue: Vec<DeckEntry>,
    /// Crowns earned so far.
    pub crowns: u32,
    /// Match time of the side's last successful play.
    pub last_play: Option<Duration>,
}

impl SideSnapshot {
    /// Card that will fill the next vacated hand slot.
    #[must_use]
    pub fn next(&self) -> Option<DeckEntry> {
        self.queue.first().copied()
    }
}

/// Target assignment computed for a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Unit selected as the tower's target.
    pub unit: UnitId,
    /// Centre of the tower.
    pub tower_position: CellPoint,
    /// Position of the targeted unit.
    pub unit_position: CellPoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_round_to_the_nearest_tile() {
        assert_eq!(
            CellPoint::new(4.4, 23.6).nearest_cell(),
            Some(CellCoord::new(4, 24))
        );
        assert_eq!(CellPoint::new(-0.6, 3.0).nearest_cell(), None);
        assert_eq!(CellPoint::new(f32::NAN, 3.0).nearest_cell(), None);
    }

    #[test]
    fn step_toward_never_overshoots() {
        let start = CellPoint::new(0.0, 0.0);
        let goal = CellPoint::new(3.0, 4.0);
        let halfway = start.step_toward(goal, 2.5);
        assert!((halfway.x() - 1.5).abs() < 1e-5);
        assert!((halfway.y() - 2.0).abs() < 1e-5);
        assert_eq!(start.step_toward(goal, 10.0), goal);
    }

    #[test]
    fn rect_iterates_every_contained_cell() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(2, 5), CellRectSize::new(3, 2));
        let cells: Vec<CellCoord> = rect.cells().collect();
        assert_eq!(cells.len(), 6);
        assert!(cells.iter().all(|cell| rect.contains(*cell)));
        assert!(!rect.contains(CellCoord::new(5, 5)));
        assert!(!rect.contains(CellCoord::new(2, 7)));
    }

    #[test]
    fn health_saturates_at_zero() {
        let mut health = Health::new(100);
        assert_eq!(health.apply_damage(40), 60);
        assert!((health.ratio() - 0.6).abs() < f32::EPSILON);
        assert_eq!(health.apply_damage(500), 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn only_flank_towers_start_awake() {
        assert!(TowerKind::Flank.starts_awake());
        assert!(!TowerKind::Command.starts_awake());
        assert_eq!(TowerKind::Command.attack_interval(), Duration::from_millis(1_250));
    }

    #[test]
    fn match_config_fills_missing_fields_with_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"match_seconds": 60.0}"#).expect("deserialize");
        assert!((config.match_seconds - 60.0).abs() < f32::EPSILON);
        assert_eq!(config.max_elixir, 10);
        let regen = config.regen_interval().as_secs_f32();
        assert!((regen - 2.8).abs() < 1e-3);
    }

    #[test]
    fn invalid_durations_collapse_to_zero() {
        let config = MatchConfig {
            match_seconds: -1.0,
            ..MatchConfig::default()
        };
        assert_eq!(config.match_duration(), Duration::ZERO);
    }

    #[test]
    fn play_error_messages_mention_costs() {
        let error = PlayError::InsufficientElixir {
            cost: 5,
            available: 2,
        };
        assert_eq!(
            error.to_string(),
            "card costs 5 elixir but only 2 is available"
        );
    }

    #[test]
    fn teams_oppose_each_other() {
        for team in Team::BOTH {
            assert_eq!(team.opponent().opponent(), team);
            assert_ne!(team.opponent(), team);
        }
        assert_eq!(Winner::team(Team::Away).side(), Some(Team::Away));
        assert_eq!(Winner::Tie.side(), None);
    }
}
