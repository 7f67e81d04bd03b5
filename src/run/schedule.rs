//! Poll delay schedule: linear ramp with a ceiling and an iteration budget.

use std::time::Duration;

/// How often, and for how long, a run's status is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Delay before the first status check.
    pub initial_delay: Duration,
    /// Added to the delay after every iteration.
    pub step: Duration,
    /// Delay ceiling.
    pub max_delay: Duration,
    /// Status checks before giving up on a terminal status.
    pub max_iterations: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            step: Duration::from_millis(250),
            max_delay: Duration::from_millis(2000),
            max_iterations: 150,
        }
    }
}

impl PollSchedule {
    /// Delay slept before status check `iteration` (zero-based).
    pub fn delay_for(&self, iteration: u32) -> Duration {
        self.initial_delay
            .saturating_add(self.step.saturating_mul(iteration))
            .min(self.max_delay)
    }

    /// Every delay the loop would sleep if the run never settles.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_iterations).map(|i| self.delay_for(i))
    }

    /// Upper bound on time spent sleeping, ignoring request latency.
    pub fn worst_case_wait(&self) -> Duration {
        self.delays().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_ramp_is_linear_then_flat() {
        let schedule = PollSchedule::default();
        let first: Vec<u64> = schedule
            .delays()
            .take(10)
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(
            first,
            vec![250, 500, 750, 1000, 1250, 1500, 1750, 2000, 2000, 2000]
        );
    }

    #[test]
    fn default_budget_is_150_iterations() {
        let schedule = PollSchedule::default();
        assert_eq!(schedule.delays().count(), 150);
        assert_eq!(schedule.delay_for(149), Duration::from_millis(2000));
    }

    #[test]
    fn worst_case_wait_sums_ramp_and_plateau() {
        // 250..=1750 ramp (7 steps, 7000ms) then 143 x 2000ms.
        assert_eq!(
            PollSchedule::default().worst_case_wait(),
            Duration::from_millis(7000 + 143 * 2000)
        );
    }

    #[test]
    fn huge_iteration_saturates_at_ceiling() {
        assert_eq!(
            PollSchedule::default().delay_for(u32::MAX),
            Duration::from_millis(2000)
        );
    }
}
