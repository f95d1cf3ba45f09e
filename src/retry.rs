//! Retry and give-up policy for turn checks.
//!
//! Pure decision function: maps one poll outcome plus the running
//! consecutive-failure count to the next scheduling action. All retry
//! timing lives here; the poller never retries on its own.

/// Result of one game-state check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The tracked user is now the current player.
    TurnReady,
    /// Fetch succeeded; the tracked user is not the current player.
    NotYet,
    /// Fetch failed (network or store hiccup) with a cause message.
    TransientFailure(String),
}

/// Next scheduling action derived from a [`PollOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// Emit the turn-ready notification and end the cycle.
    NotifyAndStop,
    /// Arm the next check after the given number of minutes.
    RescheduleAfter(u32),
    /// Surface an error notification and end the cycle.
    GiveUpAndStop,
}

/// Bounded retry policy for transient fetch failures.
///
/// Failures retry quickly regardless of the configured check interval; a
/// transient hiccup usually clears within a minute. The threshold keeps a
/// permanently unreachable store (or a deleted game) from draining the
/// device forever.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Consecutive transient failures after which polling stops.
    pub give_up_threshold: u32,
    /// Minutes to wait before retrying a failed check.
    pub failure_retry_minutes: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            give_up_threshold: 4,
            failure_retry_minutes: 1,
        }
    }
}

impl RetryPolicy {
    /// Decide the next action for `outcome` given the consecutive-failure
    /// count so far. Returns the decision and the new failure count.
    ///
    /// Any completed fetch resets the count, whoever's turn it is. A
    /// transient failure counts toward the threshold: the check that
    /// completes a run of `give_up_threshold` failures resolves to
    /// [`ScheduleDecision::GiveUpAndStop`] (count reset so a restarted
    /// cycle begins clean), earlier ones retry after
    /// `failure_retry_minutes`.
    pub fn decide(
        &self,
        outcome: &PollOutcome,
        failure_count: u32,
        configured_delay: u32,
    ) -> (ScheduleDecision, u32) {
        match outcome {
            PollOutcome::TurnReady => (ScheduleDecision::NotifyAndStop, 0),
            PollOutcome::NotYet => (ScheduleDecision::RescheduleAfter(configured_delay), 0),
            PollOutcome::TransientFailure(_) => {
                let run = failure_count.saturating_add(1);
                if run >= self.give_up_threshold {
                    (ScheduleDecision::GiveUpAndStop, 0)
                } else {
                    (
                        ScheduleDecision::RescheduleAfter(self.failure_retry_minutes),
                        run,
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn failure() -> PollOutcome {
        PollOutcome::TransientFailure("store unreachable".to_owned())
    }

    #[test]
    fn failures_below_threshold_reschedule_after_one_minute() {
        let policy = RetryPolicy::default();
        for count in 0..3 {
            let (decision, next) = policy.decide(&failure(), count, 5);
            assert_eq!(decision, ScheduleDecision::RescheduleAfter(1));
            assert_eq!(next, count + 1);
        }
    }

    #[test]
    fn fourth_consecutive_failure_gives_up_and_resets() {
        let policy = RetryPolicy::default();
        let (decision, next) = policy.decide(&failure(), 3, 5);
        assert_eq!(decision, ScheduleDecision::GiveUpAndStop);
        assert_eq!(next, 0);
    }

    #[test]
    fn counts_past_threshold_still_give_up() {
        let policy = RetryPolicy::default();
        for count in [4, 7, u32::MAX] {
            let (decision, next) = policy.decide(&failure(), count, 5);
            assert_eq!(decision, ScheduleDecision::GiveUpAndStop);
            assert_eq!(next, 0);
        }
    }

    #[test]
    fn turn_ready_notifies_and_resets_any_count() {
        let policy = RetryPolicy::default();
        for count in [0, 2, 3] {
            let (decision, next) = policy.decide(&PollOutcome::TurnReady, count, 5);
            assert_eq!(decision, ScheduleDecision::NotifyAndStop);
            assert_eq!(next, 0);
        }
    }

    #[test]
    fn not_yet_uses_configured_interval_not_retry_delay() {
        let policy = RetryPolicy::default();
        let (decision, next) = policy.decide(&PollOutcome::NotYet, 2, 7);
        assert_eq!(decision, ScheduleDecision::RescheduleAfter(7));
        assert_eq!(next, 0);
    }

    #[test]
    fn custom_threshold_and_retry_delay_apply() {
        let policy = RetryPolicy {
            give_up_threshold: 2,
            failure_retry_minutes: 3,
        };
        let (decision, next) = policy.decide(&failure(), 0, 10);
        assert_eq!(decision, ScheduleDecision::RescheduleAfter(3));
        assert_eq!(next, 1);

        let (decision, next) = policy.decide(&failure(), 1, 10);
        assert_eq!(decision, ScheduleDecision::GiveUpAndStop);
        assert_eq!(next, 0);
    }
}
