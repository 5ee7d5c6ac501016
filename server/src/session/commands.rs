use geoguess::{Game, GameError, GameId, GuessOutcome, Location, RoundId};
use tokio::sync::oneshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Game already stored: {0}")]
    DuplicateGame(GameId),
    #[error("Round already belongs to another game: {0}")]
    DuplicateRound(RoundId),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to a game actor. Each embeds a oneshot for the reply.
pub enum GameCommand {
    SubmitGuess {
        round_id: RoundId,
        guess: Location,
        reply: oneshot::Sender<Result<GuessOutcome, SessionError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<Game>,
    },
    Shutdown,
}
