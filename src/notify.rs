//! Notification sink contract and channel provisioning.
//!
//! The checker only talks to this seam; rendering and delivery belong to
//! the host platform. All operations are fire-and-forget.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Relative importance of a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelImportance {
    /// Quiet, always-visible status.
    Low,
    /// Interrupting one-shot alert.
    High,
}

/// A platform notification channel the sink must provision.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSpec {
    /// Stable channel identifier.
    pub id: &'static str,
    /// User-visible channel name.
    pub name: &'static str,
    /// Requested importance for notifications on this channel.
    pub importance: ChannelImportance,
}

/// Channel for the one-shot "it's your turn" alert.
pub const CHANNEL_TURN_ALERTS: ChannelSpec = ChannelSpec {
    id: "turn_alerts_v2",
    name: "Turn alerts",
    importance: ChannelImportance::High,
};

/// Channel for the low-priority persistent status notification.
pub const CHANNEL_CHECK_STATUS: ChannelSpec = ChannelSpec {
    id: "check_status_v2",
    name: "Turn check status",
    importance: ChannelImportance::Low,
};

/// Superseded channel ids, deleted on each provisioning pass.
pub const LEGACY_CHANNEL_IDS: &[&str] = &["turn_alerts", "check_status"];

/// Notification sink contract. The checker never blocks on delivery and
/// never learns whether a notification was actually shown.
pub trait NotificationSink: Send + Sync {
    /// Provision `current` channels and delete the superseded
    /// `legacy_ids`. Called once per cycle start; must be idempotent.
    fn ensure_channels(&self, current: &[ChannelSpec], legacy_ids: &[&str]);

    /// One-shot alert: it is the tracked user's turn.
    fn show_turn_ready(&self);

    /// Refresh the always-visible status with the last check time and the
    /// delay until the next one.
    fn show_persistent_status(&self, last_checked_at: DateTime<Utc>, interval_minutes: u32);

    /// Surface that checking stopped after repeated failures.
    fn show_error(&self);

    /// Remove the persistent status notification, if present.
    fn clear_persistent_status(&self);
}

/// Sink that routes every operation through `tracing`.
///
/// Useful as a host default on platforms without a notification surface
/// and as a template for real adapters.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn ensure_channels(&self, current: &[ChannelSpec], legacy_ids: &[&str]) {
        for channel in current {
            info!("ensuring notification channel '{}'", channel.id);
        }
        for id in legacy_ids {
            info!("removing legacy notification channel '{id}'");
        }
    }

    fn show_turn_ready(&self) {
        info!("it's your turn");
    }

    fn show_persistent_status(&self, last_checked_at: DateTime<Utc>, interval_minutes: u32) {
        info!(
            "last checked {}, next check in {interval_minutes} min",
            last_checked_at.to_rfc3339()
        );
    }

    fn show_error(&self) {
        warn!("turn checking stopped after repeated failures");
    }

    fn clear_persistent_status(&self) {
        info!("clearing status notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_channel_ids_do_not_collide_with_legacy() {
        for channel in [CHANNEL_TURN_ALERTS, CHANNEL_CHECK_STATUS] {
            assert!(!LEGACY_CHANNEL_IDS.contains(&channel.id));
        }
    }

    #[test]
    fn log_sink_covers_every_operation() {
        let sink = LogSink;
        sink.ensure_channels(&[CHANNEL_TURN_ALERTS, CHANNEL_CHECK_STATUS], LEGACY_CHANNEL_IDS);
        sink.show_persistent_status(Utc::now(), 5);
        sink.show_turn_ready();
        sink.show_error();
        sink.clear_persistent_status();
    }
}
