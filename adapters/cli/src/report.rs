//! End-of-match summary printed by the headless runner.

use std::{fmt, time::Duration};

use arena_clash_core::{Event, Team, TowerKind, Winner};
use arena_clash_simulation::Battle;

/// Tallies gathered while a match runs, finished off with the final state.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MatchReport {
    winner: Option<Winner>,
    elapsed: Duration,
    crowns: [u32; 2],
    cards_played: [u32; 2],
    cards_rejected: [u32; 2],
    towers: Vec<TowerLine>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerLine {
    team: Team,
    kind: TowerKind,
    health: u32,
    max_health: u32,
    destroyed: bool,
}

impl MatchReport {
    /// Counts the plays contained in a batch of events.
    pub(crate) fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CardPlayed { team, .. } => self.cards_played[team.index()] += 1,
                Event::CardRejected { team, .. } => self.cards_rejected[team.index()] += 1,
                _ => {}
            }
        }
    }

    /// Captures the outcome, clock, crowns and tower health of the battle.
    pub(crate) fn finish(&mut self, battle: &Battle) {
        self.winner = battle.winner();
        self.elapsed = battle.elapsed();
        for team in Team::BOTH {
            self.crowns[team.index()] = battle.crowns(team);
        }
        self.towers = battle
            .towers()
            .iter()
            .map(|tower| TowerLine {
                team: tower.team,
                kind: tower.kind,
                health: tower.health.current(),
                max_health: tower.health.max(),
                destroyed: tower.destroyed,
            })
            .collect();
    }

    /// Cards successfully played by a side.
    pub(crate) fn cards_played(&self, team: Team) -> u32 {
        self.cards_played[team.index()]
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self.winner {
            None => "unfinished".to_owned(),
            Some(winner) => winner
                .side()
                .map_or_else(|| "tie".to_owned(), |team| format!("{} wins", team.label())),
        };
        writeln!(f, "result: {result}")?;
        writeln!(f, "elapsed: {:.1}s", self.elapsed.as_secs_f32())?;
        for team in Team::BOTH {
            let index = team.index();
            writeln!(
                f,
                "{:>6}: {} crowns, {} cards played, {} rejected",
                team.label(),
                self.crowns[index],
                self.cards_played[index],
                self.cards_rejected[index],
            )?;
        }
        for tower in &self.towers {
            let state = if tower.destroyed { " (ruins)" } else { "" };
            writeln!(
                f,
                "  {} {:?} tower: {}/{}{state}",
                tower.team.label(),
                tower.kind,
                tower.health,
                tower.max_health,
            )?;
        }
        Ok(())
    }
}
