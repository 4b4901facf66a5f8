//! Elixir pools and card cycling for one side.

use std::{collections::VecDeque, time::Duration};

use arena_clash_core::{DeckEntry, PlayError, SideSnapshot, Team, HAND_SIZE};

#[derive(Clone, Debug)]
pub(crate) struct SideState {
    pub(crate) team: Team,
    pub(crate) elixir: u32,
    last_regen: Duration,
    hand: Vec<DeckEntry>,
    queue: VecDeque<DeckEntry>,
    pub(crate) crowns: u32,
    pub(crate) last_play: Option<Duration>,
}

impl SideState {
    /// Deals the opening hand from the head of the deck.
    pub(crate) fn new(team: Team, deck: Vec<DeckEntry>, starting_elixir: u32) -> Self {
        let mut queue: VecDeque<DeckEntry> = deck.into();
        let hand_size = HAND_SIZE.min(queue.len());
        let hand = queue.drain(..hand_size).collect();
        Self {
            team,
            elixir: starting_elixir,
            last_regen: Duration::ZERO,
            hand,
            queue,
            crowns: 0,
            last_play: None,
        }
    }

    /// Regenerates one elixir per elapsed interval, clamped to `max`.
    ///
    /// Returns `true` when the pool changed. A zero interval disables regen.
    pub(crate) fn regenerate(&mut self, now: Duration, interval: Duration, max: u32) -> bool {
        if interval.is_zero() {
            return false;
        }
        let before = self.elixir;
        while now.saturating_sub(self.last_regen) >= interval {
            self.last_regen += interval;
            self.elixir = (self.elixir + 1).min(max);
        }
        self.elixir != before
    }

    pub(crate) fn hand_entry(&self, index: usize) -> Result<DeckEntry, PlayError> {
        self.hand
            .get(index)
            .copied()
            .ok_or(PlayError::InvalidHandIndex)
    }

    pub(crate) fn check_affordable(&self, cost: u32) -> Result<(), PlayError> {
        if self.elixir < cost {
            return Err(PlayError::InsufficientElixir {
                cost,
                available: self.elixir,
            });
        }
        Ok(())
    }

    /// Deducts the cost of a validated play.
    pub(crate) fn spend(&mut self, cost: u32) {
        self.elixir = self.elixir.saturating_sub(cost);
    }

    /// Sends the card in `index` to the back of the queue and refills the slot
    /// from the queue head.
    pub(crate) fn cycle(&mut self, index: usize) {
        if index >= self.hand.len() {
            return;
        }
        self.queue.push_back(self.hand[index]);
        if let Some(next) = self.queue.pop_front() {
            self.hand[index] = next;
        }
    }

    pub(crate) fn hand(&self) -> &[DeckEntry] {
        &self.hand
    }

    pub(crate) fn snapshot(&self) -> SideSnapshot {
        SideSnapshot {
            team: self.team,
            elixir: self.elixir,
            hand: self.hand.clone(),
            queue: self.queue.iter().copied().collect(),
            crowns: self.crowns,
            last_play: self.last_play,
        }
    }
}
