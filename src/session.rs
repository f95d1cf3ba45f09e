//! Tracked-session state and persistence.
//!
//! One cycle is live at a time. Its state sits in a single shared cell
//! and is optionally mirrored to a versioned JSON snapshot so a wake
//! after a process restart still sees the tracked session.

use crate::error::{Result, TurnError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

/// The one game/user pair currently being watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSession {
    /// Opaque identifier of the watched game.
    pub game_id: String,
    /// Opaque identifier of the tracked user.
    pub user_id: String,
    /// Minutes between routine checks. Always positive.
    pub check_interval_minutes: u32,
    /// Whether the always-visible status notification is shown.
    pub persistent_status_enabled: bool,
}

/// Full state of one checking cycle, shared across activations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState {
    /// The session this cycle is checking.
    pub session: TrackedSession,
    /// Consecutive transient failures so far.
    #[serde(default)]
    pub failure_count: u32,
    /// Monotonic cycle identifier; a new cycle supersedes lower epochs.
    #[serde(default)]
    pub epoch: u64,
    /// When the last check completed, if any.
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// Persisted snapshot wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredState {
    /// Schema version.
    #[serde(default = "default_state_version")]
    version: u8,
    /// The active cycle, if any.
    #[serde(default)]
    cycle: Option<CycleState>,
}

fn default_state_version() -> u8 {
    1
}

/// Single-writer cell holding the active cycle.
///
/// Activations are serialized by the platform, so the mutex only
/// guarantees memory visibility between one wake and the next.
pub struct CycleStore {
    cell: Mutex<Option<CycleState>>,
    epochs: AtomicU64,
    state_path: Option<PathBuf>,
}

impl CycleStore {
    /// Store without a disk mirror. State lives only for the process.
    pub fn in_memory() -> Self {
        Self {
            cell: Mutex::new(None),
            epochs: AtomicU64::new(0),
            state_path: None,
        }
    }

    /// Mirror the cycle state to `path`, restoring any snapshot already
    /// on disk. A missing file is a clean start; a broken one is logged
    /// and ignored.
    pub fn with_path(path: PathBuf) -> Self {
        let restored = match load_snapshot(&path) {
            Ok(cycle) => cycle,
            Err(e) => {
                warn!("cannot load cycle state: {e}");
                None
            }
        };
        let epoch_seed = restored.as_ref().map_or(0, |cycle| cycle.epoch);
        Self {
            cell: Mutex::new(restored),
            epochs: AtomicU64::new(epoch_seed),
            state_path: Some(path),
        }
    }

    /// Default path for the persisted cycle snapshot.
    pub fn default_state_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("LOCALAPPDATA")
                .map(|d| PathBuf::from(d).join("turnwatch").join("cycle.json"))
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var_os("HOME").map(|h| {
                PathBuf::from(h)
                    .join(".config")
                    .join("turnwatch")
                    .join("cycle.json")
            })
        }
    }

    /// Snapshot of the active cycle, if any.
    pub fn active(&self) -> Option<CycleState> {
        self.lock().clone()
    }

    /// Replace any active cycle with a fresh one for `session`.
    pub fn begin(&self, session: TrackedSession) -> CycleState {
        let state = CycleState {
            session,
            failure_count: 0,
            epoch: self.epochs.fetch_add(1, Ordering::SeqCst) + 1,
            last_checked_at: None,
        };
        let mut cell = self.lock();
        *cell = Some(state.clone());
        self.persist(&cell);
        state
    }

    /// Record a completed check for the cycle with `epoch`. Returns
    /// `false` when that cycle has been superseded or cleared.
    pub fn record_check(
        &self,
        epoch: u64,
        failure_count: u32,
        checked_at: DateTime<Utc>,
    ) -> bool {
        let mut cell = self.lock();
        let applied = match cell.as_mut() {
            Some(cycle) if cycle.epoch == epoch => {
                cycle.failure_count = failure_count;
                cycle.last_checked_at = Some(checked_at);
                true
            }
            _ => false,
        };
        if applied {
            self.persist(&cell);
        }
        applied
    }

    /// End the cycle with `epoch`. Returns `false` when already gone.
    pub fn clear_if(&self, epoch: u64) -> bool {
        let mut cell = self.lock();
        let matched = cell.as_ref().is_some_and(|cycle| cycle.epoch == epoch);
        if matched {
            *cell = None;
            self.persist(&cell);
        }
        matched
    }

    /// End whatever cycle is active. Returns whether one was.
    pub fn clear(&self) -> bool {
        let mut cell = self.lock();
        let was_active = cell.take().is_some();
        if was_active {
            self.persist(&cell);
        }
        was_active
    }

    fn lock(&self) -> MutexGuard<'_, Option<CycleState>> {
        match self.cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, cycle: &Option<CycleState>) {
        if let Err(e) = save_snapshot(self.state_path.as_deref(), cycle) {
            error!("cannot persist cycle state: {e}");
        }
    }
}

fn load_snapshot(path: &Path) -> Result<Option<CycleState>> {
    let bytes = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TurnError::State(format!("cannot read state: {e}"))),
    };

    let stored: StoredState = serde_json::from_slice(&bytes)
        .map_err(|e| TurnError::State(format!("cannot parse state: {e}")))?;

    Ok(stored.cycle)
}

fn save_snapshot(path: Option<&Path>, cycle: &Option<CycleState>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| TurnError::State(format!("cannot create state dir: {e}")))?;
    }

    let stored = StoredState {
        version: default_state_version(),
        cycle: cycle.clone(),
    };

    let json = serde_json::to_string_pretty(&stored)
        .map_err(|e| TurnError::State(format!("cannot serialize state: {e}")))?;

    std::fs::write(path, json).map_err(|e| TurnError::State(format!("cannot write state: {e}")))
}
