//! One-shot wake arming.
//!
//! The checker never keeps a thread alive between checks: each activation
//! arms exactly one future activation through this seam, and a new arming
//! supersedes any prior unfired one.

use async_trait::async_trait;
use std::sync::{Mutex, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::debug;

/// Receives the armed activation.
#[async_trait]
pub trait WakeTarget: Send + Sync {
    /// One scheduled activation.
    async fn on_wake(&self);
}

/// Arms exactly one future [`WakeTarget::on_wake`] call.
pub trait WakeScheduler: Send + Sync {
    /// Arm one wake after `after_minutes`. `require_connectivity` asks
    /// the platform to hold the wake until the network is reachable. A
    /// new call supersedes any prior unfired arming.
    fn schedule_wake(&self, after_minutes: u32, require_connectivity: bool);
}

/// Tokio-backed wake scheduler.
///
/// Sleeps on a spawned task, then invokes the bound target. The target is
/// held weakly so a dropped checker silently cancels future wakes.
/// Connectivity gating is left to the host platform; tokio has no network
/// constraint to attach, so the flag is accepted and ignored here.
#[derive(Default)]
pub struct TokioWakeScheduler {
    target: Mutex<Option<Weak<dyn WakeTarget>>>,
    pending: Mutex<Option<AbortHandle>>,
}

impl TokioWakeScheduler {
    /// Create an unbound scheduler. Armings before [`Self::bind`] fire
    /// into nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the wake target.
    pub fn bind(&self, target: Weak<dyn WakeTarget>) {
        *self.lock_target() = Some(target);
    }

    fn lock_target(&self) -> std::sync::MutexGuard<'_, Option<Weak<dyn WakeTarget>>> {
        match self.target.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WakeScheduler for TokioWakeScheduler {
    fn schedule_wake(&self, after_minutes: u32, _require_connectivity: bool) {
        let target = self.lock_target().clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(u64::from(after_minutes) * 60)).await;
            let Some(target) = target.and_then(|weak| weak.upgrade()) else {
                debug!("wake fired with no live target, dropping");
                return;
            };
            target.on_wake().await;
        });

        if let Some(previous) = self.lock_pending().replace(handle.abort_handle()) {
            debug!("superseding pending wake");
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        wakes: AtomicUsize,
    }

    #[async_trait]
    impl WakeTarget for CountingTarget {
        async fn on_wake(&self) {
            self.wakes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn armed_wake_fires_after_the_delay() {
        let scheduler = TokioWakeScheduler::new();
        let target = Arc::new(CountingTarget::default());
        let weak: Weak<CountingTarget> = Arc::downgrade(&target);
        scheduler.bind(weak);

        scheduler.schedule_wake(1, true);
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(target.wakes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_arming_supersedes_the_pending_one() {
        let scheduler = TokioWakeScheduler::new();
        let target = Arc::new(CountingTarget::default());
        let weak: Weak<CountingTarget> = Arc::downgrade(&target);
        scheduler.bind(weak);

        scheduler.schedule_wake(1, true);
        scheduler.schedule_wake(2, true);
        tokio::time::sleep(Duration::from_secs(300)).await;

        assert_eq!(target.wakes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unbound_scheduler_drops_the_wake() {
        let scheduler = TokioWakeScheduler::new();
        scheduler.schedule_wake(1, true);
        tokio::time::sleep(Duration::from_secs(120)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_target_cancels_future_wakes() {
        let scheduler = TokioWakeScheduler::new();
        let target = Arc::new(CountingTarget::default());
        let weak: Weak<CountingTarget> = Arc::downgrade(&target);
        scheduler.bind(weak);

        scheduler.schedule_wake(1, true);
        drop(target);
        tokio::time::sleep(Duration::from_secs(120)).await;
    }
}
