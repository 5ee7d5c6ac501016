pub mod actor;
pub mod commands;
pub mod handle;

use std::collections::HashMap;

use geoguess::{Game, GameId, RoundId};
use tokio::sync::{mpsc, RwLock};

use actor::run_game_actor;
pub use commands::SessionError;
pub use handle::GameHandle;

/// Owns every live game. Spawns an actor task per game; the actor is the
/// only writer of that game's state.
pub struct SessionStore {
    inner: RwLock<Registry>,
}

#[derive(Default)]
struct Registry {
    games: HashMap<GameId, GameHandle>,
    round_owners: HashMap<RoundId, GameId>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
        }
    }

    /// Hand a game over to the store. Its rounds become findable in the same
    /// write as the game itself. A game or round id that is already stored is
    /// rejected and no actor is started.
    pub async fn put(&self, game: Game) -> Result<GameHandle, SessionError> {
        let game_id = game.id().clone();
        let round_ids: Vec<RoundId> = game.rounds().iter().map(|r| r.id().clone()).collect();

        let mut registry = self.inner.write().await;
        if registry.games.contains_key(&game_id) {
            return Err(SessionError::DuplicateGame(game_id));
        }
        if let Some(taken) = round_ids
            .iter()
            .find(|id| registry.round_owners.contains_key(*id))
        {
            return Err(SessionError::DuplicateRound(taken.clone()));
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(run_game_actor(game, cmd_rx));
        let handle = GameHandle::new(game_id.clone(), cmd_tx);

        for round_id in round_ids {
            registry.round_owners.insert(round_id, game_id.clone());
        }
        registry.games.insert(game_id, handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, game_id: &GameId) -> Option<GameHandle> {
        self.inner.read().await.games.get(game_id).cloned()
    }

    /// Handle of the game that owns `round_id`.
    pub async fn find_round_owner(&self, round_id: &RoundId) -> Option<GameHandle> {
        let registry = self.inner.read().await;
        registry
            .round_owners
            .get(round_id)
            .and_then(|game_id| registry.games.get(game_id))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.games.len()
    }

    /// Stop every game actor and forget all games.
    pub async fn shutdown(&self) {
        let handles: Vec<GameHandle> = {
            let mut registry = self.inner.write().await;
            registry.round_owners.clear();
            registry.games.drain().map(|(_, h)| h).collect()
        };
        tracing::debug!(games = handles.len(), "Shutting down session store");
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
