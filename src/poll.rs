//! Game-state polling.
//!
//! One fetch, one comparison, one [`PollOutcome`]. Retry timing lives in
//! [`crate::retry::RetryPolicy`], which keeps the comparison testable in
//! isolation from the clock.

use crate::error::Result;
use crate::retry::PollOutcome;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Snapshot of the remote game state relevant to turn checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Identifier of the player whose turn it currently is.
    pub current_player_id: String,
}

/// Remote fetch capability supplied by the host.
///
/// The host wires its transport behind this seam and invokes the checker
/// only when the platform's connectivity constraints are satisfied; the
/// poller itself never gates on the network.
#[async_trait]
pub trait GameStateSource: Send + Sync {
    /// Fetch the authoritative state for `game_id`.
    async fn fetch_game(&self, game_id: &str) -> Result<GameState>;
}

/// Derives a [`PollOutcome`] from one fetch of the tracked game.
pub struct GameStatePoller {
    source: Arc<dyn GameStateSource>,
}

impl GameStatePoller {
    /// Create a poller over the given fetch capability.
    pub fn new(source: Arc<dyn GameStateSource>) -> Self {
        Self { source }
    }

    /// Fetch `game_id` and compare the current player to `user_id`.
    ///
    /// Exact string equality decides the turn; any fetch error collapses
    /// into [`PollOutcome::TransientFailure`] and never escapes raw.
    pub async fn poll(&self, game_id: &str, user_id: &str) -> PollOutcome {
        match self.source.fetch_game(game_id).await {
            Ok(state) => {
                debug!(
                    "game {game_id}: current player is {}",
                    state.current_player_id
                );
                if state.current_player_id == user_id {
                    PollOutcome::TurnReady
                } else {
                    PollOutcome::NotYet
                }
            }
            Err(e) => PollOutcome::TransientFailure(e.to_string()),
        }
    }
}
