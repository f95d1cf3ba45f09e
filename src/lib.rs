//! Turnwatch: background turn-notification polling for turn-based
//! multiplayer games.
//!
//! Watches one remote game at a time and raises a one-shot notification
//! when it becomes the tracked user's turn:
//! wake → fetch + compare → decide → notify / re-arm / give up
//!
//! # Architecture
//!
//! The checker is built from a pure decision core wired to three
//! host-supplied collaborators:
//! - **Fetch**: [`GameStateSource`] supplies the remote game state
//! - **Decide**: [`RetryPolicy`] maps one [`PollOutcome`] to the next
//!   [`ScheduleDecision`], with bounded retry on transient failures
//! - **Notify**: [`NotificationSink`] renders turn-ready, status, and
//!   error notifications
//! - **Re-arm**: [`WakeScheduler`] arms exactly one future activation;
//!   no thread stays alive between checks
//!
//! There is no persistent loop: each activation is a single idempotent
//! step reading its state from [`CycleStore`], so the hosting platform
//! may restart the process between wakes.

pub mod error;
pub mod notify;
pub mod poll;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod wake;

pub use error::{Result, TurnError};
pub use notify::{ChannelImportance, ChannelSpec, LogSink, NotificationSink};
pub use poll::{GameState, GameStatePoller, GameStateSource};
pub use retry::{PollOutcome, RetryPolicy, ScheduleDecision};
pub use scheduler::{FIRST_CHECK_MINUTES, TurnChecker};
pub use session::{CycleState, CycleStore, TrackedSession};
pub use wake::{TokioWakeScheduler, WakeScheduler, WakeTarget};
