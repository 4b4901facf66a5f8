//! Converts variable host frame times into fixed simulation steps.

use std::time::Duration;

/// Accumulates frame time and releases it in fixed-size steps.
///
/// The backlog never grows beyond `step * max_steps`, so a stalled host
/// drops time instead of spiralling into ever longer catch-up frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedStep {
    step: Duration,
    max_steps: u32,
    backlog: Duration,
}

impl FixedStep {
    /// Creates an accumulator releasing `step`-sized slices, at most `max_steps` per frame.
    #[must_use]
    pub const fn new(step: Duration, max_steps: u32) -> Self {
        Self {
            step,
            max_steps,
            backlog: Duration::ZERO,
        }
    }

    /// Size of one simulation step.
    #[must_use]
    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Time accumulated but not yet simulated.
    #[must_use]
    pub const fn backlog(&self) -> Duration {
        self.backlog
    }

    /// Adds host frame time and returns the number of steps to simulate now.
    pub fn accumulate(&mut self, frame: Duration) -> u32 {
        if self.step.is_zero() || self.max_steps == 0 {
            return 0;
        }

        let cap = self.step.saturating_mul(self.max_steps);
        self.backlog = self.backlog.saturating_add(frame).min(cap);

        let mut steps = 0;
        while steps < self.max_steps && self.backlog >= self.step {
            self.backlog -= self.step;
            steps += 1;
        }
        steps
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(Duration::from_nanos(16_666_667), 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_accumulate_until_a_step_is_due() {
        let mut timer = FixedStep::new(Duration::from_millis(10), 5);
        assert_eq!(timer.accumulate(Duration::from_millis(4)), 0);
        assert_eq!(timer.accumulate(Duration::from_millis(4)), 0);
        assert_eq!(timer.accumulate(Duration::from_millis(4)), 1);
        assert_eq!(timer.backlog(), Duration::from_millis(2));
    }

    #[test]
    fn long_frames_are_capped() {
        let mut timer = FixedStep::new(Duration::from_millis(10), 5);
        assert_eq!(timer.accumulate(Duration::from_secs(3)), 5);
        assert_eq!(timer.backlog(), Duration::ZERO);
        assert_eq!(timer.accumulate(Duration::from_millis(25)), 2);
        assert_eq!(timer.backlog(), Duration::from_millis(5));
    }

    #[test]
    fn degenerate_configurations_never_step() {
        let mut zero_step = FixedStep::new(Duration::ZERO, 5);
        assert_eq!(zero_step.accumulate(Duration::from_secs(1)), 0);
        let mut no_steps = FixedStep::new(Duration::from_millis(10), 0);
        assert_eq!(no_steps.accumulate(Duration::from_secs(1)), 0);
    }

    #[test]
    fn default_runs_at_sixty_hertz() {
        let mut timer = FixedStep::default();
        assert_eq!(timer.step(), Duration::from_nanos(16_666_667));
        assert_eq!(timer.accumulate(Duration::from_millis(34)), 2);
    }
}
