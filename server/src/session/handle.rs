use geoguess::{Game, GameId, GuessOutcome, Location, RoundId};
use tokio::sync::{mpsc, oneshot};

use super::commands::*;

/// Cheap, cloneable handle to a game actor.
#[derive(Clone)]
pub struct GameHandle {
    id: GameId,
    cmd_tx: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub(crate) fn new(id: GameId, cmd_tx: mpsc::Sender<GameCommand>) -> Self {
        Self { id, cmd_tx }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub async fn submit_guess(
        &self,
        round_id: RoundId,
        guess: Location,
    ) -> Result<GuessOutcome, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::SubmitGuess {
            round_id,
            guess,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))?
    }

    /// A consistent copy of the game, taken between commands.
    pub async fn get_snapshot(&self) -> Result<Game, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::GetSnapshot { reply: tx }).await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(GameCommand::Shutdown).await;
    }

    async fn send(&self, cmd: GameCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Internal("Game actor closed".into()))
    }
}
