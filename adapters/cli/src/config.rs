//! TOML description of a headless match.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use arena_clash_core::{default_deck, AiLevel, CardKind, DeckEntry, MatchConfig};
use arena_clash_simulation::{Autopilot, BattleConfig};
use serde::Deserialize;

const DEFAULT_STEP_MS: u64 = 50;

/// Settings of one headless run. Every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunConfig {
    /// Seed shared by the deck shuffle and both bots.
    pub(crate) seed: u64,
    /// Length of one simulation step in milliseconds.
    pub(crate) step_ms: u64,
    #[serde(rename = "match")]
    pub(crate) match_config: MatchConfig,
    pub(crate) home: SideConfig,
    pub(crate) away: SideConfig,
}

/// Bot skill and loadout of one side.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SideConfig {
    pub(crate) trophies: u32,
    /// Deck override; the starter deck is used when absent.
    pub(crate) deck: Option<Vec<CardEntry>>,
}

/// One card of a configured deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CardEntry {
    pub(crate) card: CardKind,
    /// Explicit AI level; derived from the side's trophies when absent.
    #[serde(default)]
    pub(crate) ai_level: Option<u8>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            step_ms: DEFAULT_STEP_MS,
            match_config: MatchConfig::default(),
            home: SideConfig::default(),
            away: SideConfig::default(),
        }
    }
}

impl RunConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read run config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid run config at {}", path.display()))
    }

    /// Parses configuration contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse run config toml contents")?;
        if config.step_ms == 0 {
            bail!("step_ms must be at least 1");
        }
        Ok(config)
    }

    /// Simulation step requested by the run.
    pub(crate) fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    /// Builds the battle setup with both sides on autopilot.
    pub(crate) fn battle_config(&self) -> BattleConfig {
        BattleConfig {
            match_config: self.match_config,
            home_deck: self.home.deck_entries(),
            away_deck: self.away.deck_entries(),
            shuffle_seed: Some(self.seed),
            home_bot: Some(Autopilot {
                trophies: self.home.trophies,
                seed: self.seed.wrapping_add(1),
            }),
            away_bot: Some(Autopilot {
                trophies: self.away.trophies,
                seed: self.seed.wrapping_add(2),
            }),
        }
    }
}

impl SideConfig {
    fn deck_entries(&self) -> Vec<DeckEntry> {
        let level = level_for_trophies(self.trophies);
        match &self.deck {
            Some(cards) => cards
                .iter()
                .map(|entry| {
                    DeckEntry::new(entry.card, entry.ai_level.map_or(level, AiLevel::new))
                })
                .collect(),
            None => default_deck(level),
        }
    }
}

/// AI level given to the cards of a bot with the provided trophy count.
pub(crate) fn level_for_trophies(trophies: u32) -> AiLevel {
    AiLevel::new(u8::try_from(trophies / 100 + 1).unwrap_or(u8::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = RunConfig::parse("").expect("empty config parses");
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.step(), Duration::from_millis(50));

        let battle = config.battle_config();
        assert_eq!(battle.home_deck, default_deck(AiLevel::MIN));
        assert_eq!(battle.shuffle_seed, Some(0));
        assert!(battle.home_bot.is_some());
        assert!(battle.away_bot.is_some());
    }

    #[test]
    fn full_file_is_honoured() {
        let config = RunConfig::parse(
            r#"
            seed = 42
            step_ms = 20

            [match]
            match_seconds = 60.0
            elixir_regen_seconds = 2.0

            [away]
            trophies = 450
            deck = [
                { card = "stone_golem" },
                { card = "frost_mage", ai_level = 9 },
                { card = "swarm_rats" },
                { card = "siege_hurler" },
            ]
            "#,
        )
        .expect("config parses");

        assert_eq!(config.seed, 42);
        assert_eq!(config.step(), Duration::from_millis(20));
        assert_eq!(config.match_config.match_seconds, 60.0);
        assert_eq!(config.match_config.max_elixir, 10);

        let battle = config.battle_config();
        assert_eq!(
            battle.away_deck,
            vec![
                DeckEntry::new(CardKind::StoneGolem, AiLevel::new(5)),
                DeckEntry::new(CardKind::FrostMage, AiLevel::new(9)),
                DeckEntry::new(CardKind::SwarmRats, AiLevel::new(5)),
                DeckEntry::new(CardKind::SiegeHurler, AiLevel::new(5)),
            ]
        );
        assert_eq!(battle.away_bot.map(|bot| bot.trophies), Some(450));
        assert_eq!(battle.away_bot.map(|bot| bot.seed), Some(44));
    }

    #[test]
    fn unknown_cards_are_rejected() {
        let error = RunConfig::parse("[home]\ndeck = [{ card = \"dragon\" }]")
            .expect_err("unknown card must fail");
        assert!(format!("{error:#}").contains("dragon"));
    }

    #[test]
    fn unknown_keys_and_zero_steps_are_rejected() {
        assert!(RunConfig::parse("speed = 3").is_err());
        assert!(RunConfig::parse("step_ms = 0").is_err());
    }

    #[test]
    fn trophies_scale_the_ai_level() {
        assert_eq!(level_for_trophies(0), AiLevel::new(1));
        assert_eq!(level_for_trophies(99), AiLevel::new(1));
        assert_eq!(level_for_trophies(250), AiLevel::new(3));
        assert_eq!(level_for_trophies(900), AiLevel::new(10));
        assert_eq!(level_for_trophies(u32::MAX), AiLevel::MAX);
    }
}
