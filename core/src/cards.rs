//! Card catalog: stat blocks and behaviour capabilities for every playable card.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every card that can appear in a deck.
///
/// Serialized as its snake case identifier, which is also the opaque string
/// that profile storage exchanges with the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Sturdy single melee knight.
    Lanceguard,
    /// Hard-hitting single melee duelist.
    Bladedancer,
    /// Four fast, fragile melee bodies.
    SwarmRats,
    /// Three agile melee strikers.
    WaspPack,
    /// Single-target ranged archer.
    Bowmaster,
    /// Ranged splash caster whose bolts freeze what they hit.
    FrostMage,
    /// Slow heavyweight that only walks toward structures.
    StoneGolem,
    /// Ranged artillery with area damage.
    CannonCrew,
    /// Very fast, low-health melee assassin.
    ShadowScout,
    /// Long-range siege engine that prefers structures.
    SiegeHurler,
}

impl CardKind {
    /// Every card in catalog order.
    pub const ALL: [CardKind; 10] = [
        CardKind::Lanceguard,
        CardKind::Bladedancer,
        CardKind::SwarmRats,
        CardKind::WaspPack,
        CardKind::Bowmaster,
        CardKind::FrostMage,
        CardKind::StoneGolem,
        CardKind::CannonCrew,
        CardKind::ShadowScout,
        CardKind::SiegeHurler,
    ];

    /// Stable identifier used by persistence and configuration files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Lanceguard => "lanceguard",
            Self::Bladedancer => "bladedancer",
            Self::SwarmRats => "swarm_rats",
            Self::WaspPack => "wasp_pack",
            Self::Bowmaster => "bowmaster",
            Self::FrostMage => "frost_mage",
            Self::StoneGolem => "stone_golem",
            Self::CannonCrew => "cannon_crew",
            Self::ShadowScout => "shadow_scout",
            Self::SiegeHurler => "siege_hurler",
        }
    }

    /// Resolves a card from its identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|card| card.id() == id)
    }

    /// Returns the card's stat block and capability set.
    #[must_use]
    pub const fn stats(self) -> CardStats {
        match self {
            Self::Lanceguard => CardStats::melee(3, 600, 75, 1.2, 2.0, 1, UnitClass::Melee),
            Self::Bladedancer => CardStats::melee(4, 800, 110, 1.0, 1.8, 1, UnitClass::Melee),
            Self::SwarmRats => CardStats::melee(2, 150, 40, 1.5, 2.8, 4, UnitClass::Swarm),
            Self::WaspPack => CardStats::melee(3, 200, 55, 1.3, 2.5, 3, UnitClass::Swarm),
            Self::ShadowScout => CardStats::melee(2, 250, 90, 1.4, 3.0, 1, UnitClass::Melee),
            Self::StoneGolem => CardStats {
                targeting: TargetPreference::Structures,
                ..CardStats::melee(6, 2200, 140, 0.6, 1.0, 1, UnitClass::Tank)
            },
            Self::Bowmaster => CardStats {
                cost: 3,
                hit_points: 350,
                damage: 65,
                attack_range: 5.0,
                attack_speed: 0.65,
                move_speed: 1.6,
                count: 1,
                class: UnitClass::Ranged,
                attack: AttackStyle::Projectile,
                splash_radius: 0.0,
                targeting: TargetPreference::Any,
                on_hit: None,
            },
            Self::FrostMage => CardStats {
                cost: 4,
                hit_points: 400,
                damage: 85,
                attack_range: 6.0,
                attack_speed: 0.8,
                move_speed: 1.4,
                count: 1,
                class: UnitClass::Ranged,
                attack: AttackStyle::Projectile,
                splash_radius: 1.8,
                targeting: TargetPreference::Any,
                on_hit: Some(HitEffect::Freeze {
                    duration: FROST_FREEZE_DURATION,
                }),
            },
            Self::CannonCrew => CardStats {
                cost: 5,
                hit_points: 500,
                damage: 120,
                attack_range: 5.0,
                attack_speed: 0.7,
                move_speed: 1.2,
                count: 1,
                class: UnitClass::Splash,
                attack: AttackStyle::Projectile,
                splash_radius: 1.5,
                targeting: TargetPreference::Any,
                on_hit: None,
            },
            Self::SiegeHurler => CardStats {
                cost: 5,
                hit_points: 600,
                damage: 150,
                attack_range: 7.0,
                attack_speed: 0.5,
                move_speed: 0.8,
                count: 1,
                class: UnitClass::Ranged,
                attack: AttackStyle::Projectile,
                splash_radius: 1.0,
                targeting: TargetPreference::Structures,
                on_hit: None,
            },
        }
    }

    /// Elixir cost of the card.
    #[must_use]
    pub const fn cost(self) -> u32 {
        self.stats().cost
    }
}

/// Duration a frost bolt keeps its victims frozen.
pub const FROST_FREEZE_DURATION: Duration = Duration::from_millis(600);

/// Stat block and behaviour capabilities shared by every unit a card spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardStats {
    /// Elixir required to play the card.
    pub cost: u32,
    /// Starting and maximum hit points per unit.
    pub hit_points: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Attack range measured in tiles.
    pub attack_range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Movement speed in tiles per second.
    pub move_speed: f32,
    /// Number of units spawned by one play.
    pub count: u32,
    /// Broad role used by the opponent policy.
    pub class: UnitClass,
    /// Whether attacks land instantly or travel as projectiles.
    pub attack: AttackStyle,
    /// Radius of area damage around the primary impact, zero for single target.
    pub splash_radius: f32,
    /// Which enemies the unit is willing to walk toward.
    pub targeting: TargetPreference,
    /// Status effect applied to every unit damaged by this card's attacks.
    pub on_hit: Option<HitEffect>,
}

impl CardStats {
    const fn melee(
        cost: u32,
        hit_points: u32,
        damage: u32,
        attack_speed: f32,
        move_speed: f32,
        count: u32,
        class: UnitClass,
    ) -> Self {
        Self {
            cost,
            hit_points,
            damage,
            attack_range: 1.0,
            attack_speed,
            move_speed,
            count,
            class,
            attack: AttackStyle::Melee,
            splash_radius: 0.0,
            targeting: TargetPreference::Any,
            on_hit: None,
        }
    }

    /// Time that must pass between two attacks.
    #[must_use]
    pub fn attack_interval(&self) -> Duration {
        if self.attack_speed <= 0.0 {
            return Duration::MAX;
        }
        Duration::from_secs_f32(1.0 / self.attack_speed)
    }
}

/// Broad unit role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitClass {
    /// Single-target close combat.
    Melee,
    /// Single-target or light splash at range.
    Ranged,
    /// Many small bodies.
    Swarm,
    /// Heavy structure hunter.
    Tank,
    /// Area damage at range.
    Splash,
}

impl UnitClass {
    /// Reports whether the opponent policy treats the class as a defensive answer.
    #[must_use]
    pub const fn is_defensive(self) -> bool {
        matches!(self, Self::Ranged | Self::Splash | Self::Swarm)
    }
}

/// How an attack reaches its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackStyle {
    /// Damage is applied the moment the attack triggers.
    Melee,
    /// A projectile carries the damage to the target's position.
    Projectile,
}

/// Which enemies a unit will pick as its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetPreference {
    /// Nearby enemy units first, structures otherwise.
    Any,
    /// Enemy structures only.
    Structures,
}

/// Status effect applied on hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitEffect {
    /// The victim can neither move nor attack until the duration elapses.
    Freeze {
        /// Length of the freeze.
        duration: Duration,
    },
}

/// Per-card decision-timing upgrade between 1 and 10.
///
/// The level only tunes how often a unit reconsiders its target; it never
/// rescales health, damage or speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct AiLevel(u8);

impl AiLevel {
    /// Lowest supported level.
    pub const MIN: AiLevel = AiLevel(1);
    /// Highest supported level.
    pub const MAX: AiLevel = AiLevel(10);

    /// Creates a level, clamping the value into the supported range.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Interval after which a unit re-acquires its target even if it still lives.
    #[must_use]
    pub const fn target_recheck_interval(self) -> Duration {
        let reduction = (self.0 as u64 - 1) * 180;
        let millis = 2_000 - reduction;
        if millis < 200 {
            Duration::from_millis(200)
        } else {
            Duration::from_millis(millis)
        }
    }
}

impl Default for AiLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl From<u8> for AiLevel {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<AiLevel> for u8 {
    fn from(level: AiLevel) -> Self {
        level.0
    }
}

/// A card together with its AI level, as held in hands and deck queues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckEntry {
    /// Card definition.
    pub card: CardKind,
    /// Decision-timing level applied to the spawned units.
    #[serde(default)]
    pub ai_level: AiLevel,
}

impl DeckEntry {
    /// Creates a deck entry.
    #[must_use]
    pub const fn new(card: CardKind, ai_level: AiLevel) -> Self {
        Self { card, ai_level }
    }
}

/// Starter deck handed to new profiles.
#[must_use]
pub fn default_deck(ai_level: AiLevel) -> Vec<DeckEntry> {
    [
        CardKind::Lanceguard,
        CardKind::Bladedancer,
        CardKind::SwarmRats,
        CardKind::Bowmaster,
        CardKind::StoneGolem,
        CardKind::CannonCrew,
    ]
    .into_iter()
    .map(|card| DeckEntry::new(card, ai_level))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_lookup() {
        for card in CardKind::ALL {
            assert_eq!(CardKind::from_id(card.id()), Some(card));
        }
        assert_eq!(CardKind::from_id("dragon"), None);
    }

    #[test]
    fn serde_identifier_matches_catalog_identifier() {
        for card in CardKind::ALL {
            let json = serde_json::to_string(&card).expect("serialize");
            assert_eq!(json, format!("\"{}\"", card.id()));
        }
    }

    #[test]
    fn ai_level_clamps_and_scales_recheck_interval() {
        assert_eq!(AiLevel::new(0), AiLevel::MIN);
        assert_eq!(AiLevel::new(42), AiLevel::MAX);
        assert_eq!(AiLevel::new(1).target_recheck_interval(), Duration::from_millis(2_000));
        assert_eq!(AiLevel::new(5).target_recheck_interval(), Duration::from_millis(1_280));
        assert_eq!(AiLevel::new(10).target_recheck_interval(), Duration::from_millis(380));
    }

    #[test]
    fn ai_level_deserializes_with_clamping() {
        let entry: DeckEntry =
            serde_json::from_str(r#"{"card":"frost_mage","ai_level":99}"#).expect("deserialize");
        assert_eq!(entry.card, CardKind::FrostMage);
        assert_eq!(entry.ai_level, AiLevel::MAX);
    }

    #[test]
    fn only_the_frost_mage_freezes() {
        let freezing: Vec<CardKind> = CardKind::ALL
            .into_iter()
            .filter(|card| card.stats().on_hit.is_some())
            .collect();
        assert_eq!(freezing, vec![CardKind::FrostMage]);
    }

    #[test]
    fn structure_hunters_are_golem_and_hurler() {
        let hunters: Vec<CardKind> = CardKind::ALL
            .into_iter()
            .filter(|card| card.stats().targeting == TargetPreference::Structures)
            .collect();
        assert_eq!(hunters, vec![CardKind::StoneGolem, CardKind::SiegeHurler]);
    }

    #[test]
    fn attack_interval_is_reciprocal_of_speed() {
        let interval = CardKind::Bladedancer.stats().attack_interval();
        assert_eq!(interval, Duration::from_secs(1));
    }
}
