use geoguess::Game;
use tokio::sync::mpsc;
use tracing::Instrument;

use super::commands::*;

/// The game actor loop.
/// Owns the game exclusively and applies commands one at a time, so every
/// guess runs its read-check-score-write-advance sequence without interleaving.
pub(crate) async fn run_game_actor(game: Game, cmd_rx: mpsc::Receiver<GameCommand>) {
    let game_id = game.id().clone();
    run_game_actor_inner(game, cmd_rx)
        .instrument(tracing::info_span!("game", id = %game_id))
        .await;
}

async fn run_game_actor_inner(mut game: Game, mut cmd_rx: mpsc::Receiver<GameCommand>) {
    tracing::debug!(rounds = game.round_count(), "Game actor started");

    loop {
        match cmd_rx.recv().await {
            Some(GameCommand::Shutdown) | None => {
                tracing::debug!("Game actor shutting down");
                break;
            }
            Some(cmd) => handle_command(&mut game, cmd),
        }
    }
}

fn handle_command(game: &mut Game, cmd: GameCommand) {
    match cmd {
        GameCommand::SubmitGuess {
            round_id,
            guess,
            reply,
        } => {
            let result = game.submit_guess(&round_id, guess);
            match &result {
                Ok(outcome) => tracing::info!(
                    round_id = %round_id,
                    guess = %guess,
                    score = outcome.score_from_last_round,
                    total = outcome.total_current_score,
                    completed = outcome.is_last_round,
                    "Guess scored"
                ),
                Err(e) => tracing::warn!(round_id = %round_id, "Guess rejected: {}", e),
            }
            let _ = reply.send(result.map_err(SessionError::from));
        }
        GameCommand::GetSnapshot { reply } => {
            let _ = reply.send(game.clone());
        }
        GameCommand::Shutdown => unreachable!(),
    }
}
