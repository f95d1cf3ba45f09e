//! Turn-check orchestration.
//!
//! [`TurnChecker`] is the only stateful piece: it owns the cycle store,
//! polls through [`GameStatePoller`], interprets outcomes through
//! [`RetryPolicy`], and arms the next activation or ends the cycle.

use crate::notify::{CHANNEL_CHECK_STATUS, CHANNEL_TURN_ALERTS, LEGACY_CHANNEL_IDS, NotificationSink};
use crate::poll::{GameStatePoller, GameStateSource};
use crate::retry::{PollOutcome, RetryPolicy, ScheduleDecision};
use crate::session::{CycleStore, TrackedSession};
use crate::wake::{WakeScheduler, WakeTarget};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Minutes before the very first check of a cycle. Deliberately short so
/// the first answer arrives quickly; later checks follow the configured
/// interval.
pub const FIRST_CHECK_MINUTES: u32 = 1;

/// Orchestrates one turn-check cycle at a time.
///
/// Each activation is a single idempotent step: poll, decide, act. All
/// cross-activation state flows through the [`CycleStore`], so the
/// surrounding platform may restart the process between wakes.
pub struct TurnChecker {
    poller: GameStatePoller,
    sink: Arc<dyn NotificationSink>,
    wakes: Arc<dyn WakeScheduler>,
    policy: RetryPolicy,
    store: Arc<CycleStore>,
}

impl TurnChecker {
    /// Create a checker over the given collaborators with the default
    /// retry policy.
    pub fn new(
        source: Arc<dyn GameStateSource>,
        sink: Arc<dyn NotificationSink>,
        wakes: Arc<dyn WakeScheduler>,
        store: Arc<CycleStore>,
    ) -> Self {
        Self {
            poller: GameStatePoller::new(source),
            sink,
            wakes,
            policy: RetryPolicy::default(),
            store,
        }
    }

    /// Override the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start watching `game_id` for `user_id`'s turn, superseding any
    /// cycle already running.
    ///
    /// When the user is already the current player this notifies at once
    /// and starts nothing. Otherwise a fresh cycle is stored and the
    /// first check is armed after [`FIRST_CHECK_MINUTES`]; a transient
    /// failure on the initial poll does not abort startup, since that
    /// first check doubles as the retry.
    pub async fn start_cycle(
        &self,
        game_id: impl Into<String>,
        user_id: impl Into<String>,
        interval_minutes: u32,
        persistent_enabled: bool,
    ) {
        let game_id = game_id.into();
        let user_id = user_id.into();

        self.sink
            .ensure_channels(&[CHANNEL_TURN_ALERTS, CHANNEL_CHECK_STATUS], LEGACY_CHANNEL_IDS);

        let outcome = self.poller.poll(&game_id, &user_id).await;
        if outcome == PollOutcome::TurnReady {
            info!("game {game_id}: already {user_id}'s turn, notifying without a cycle");
            self.sink.show_turn_ready();
            return;
        }

        let interval = if interval_minutes == 0 {
            warn!("check interval of 0 minutes clamped to 1");
            1
        } else {
            interval_minutes
        };

        let state = self.store.begin(TrackedSession {
            game_id,
            user_id,
            check_interval_minutes: interval,
            persistent_status_enabled: persistent_enabled,
        });
        info!(
            "cycle {} started for game {}, first check in {FIRST_CHECK_MINUTES} min",
            state.epoch, state.session.game_id
        );

        if state.session.persistent_status_enabled {
            self.sink
                .show_persistent_status(Utc::now(), FIRST_CHECK_MINUTES);
        }
        self.wakes.schedule_wake(FIRST_CHECK_MINUTES, true);
    }

    /// One scheduled activation: poll, decide, then notify-and-stop,
    /// reschedule, or give up.
    ///
    /// A wake that finds no active cycle is a no-op; the platform is not
    /// trusted to cancel a superseded arming exactly once.
    pub async fn on_wake(&self) {
        let Some(state) = self.store.active() else {
            debug!("wake with no active cycle, ignoring");
            return;
        };

        let outcome = self
            .poller
            .poll(&state.session.game_id, &state.session.user_id)
            .await;
        let (decision, failures) = self.policy.decide(
            &outcome,
            state.failure_count,
            state.session.check_interval_minutes,
        );
        debug!(
            "cycle {}: outcome {outcome:?} resolved to {decision:?} (failures {failures})",
            state.epoch
        );

        match decision {
            ScheduleDecision::NotifyAndStop => {
                info!("game {}: turn ready, ending cycle", state.session.game_id);
                self.sink.show_turn_ready();
                self.sink.clear_persistent_status();
                self.store.clear_if(state.epoch);
            }
            ScheduleDecision::RescheduleAfter(minutes) => {
                let checked_at = Utc::now();
                if !self.store.record_check(state.epoch, failures, checked_at) {
                    debug!("cycle {} superseded mid-check, dropping reschedule", state.epoch);
                    return;
                }
                if state.session.persistent_status_enabled {
                    self.sink.show_persistent_status(checked_at, minutes);
                }
                self.wakes.schedule_wake(minutes, true);
            }
            ScheduleDecision::GiveUpAndStop => {
                warn!(
                    "game {}: giving up after {} consecutive failures",
                    state.session.game_id, self.policy.give_up_threshold
                );
                self.sink.show_error();
                self.sink.clear_persistent_status();
                self.store.clear_if(state.epoch);
            }
        }
    }

    /// Host-driven cancellation: discard the cycle and clear the status
    /// notification. A wake already armed for the old cycle fires into a
    /// no-op.
    pub fn cancel_cycle(&self) {
        if self.store.clear() {
            info!("cycle cancelled");
            self.sink.clear_persistent_status();
        }
    }
}

#[async_trait]
impl WakeTarget for TurnChecker {
    async fn on_wake(&self) {
        TurnChecker::on_wake(self).await;
    }
}
