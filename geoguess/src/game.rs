use serde::Serialize;

use crate::ids::{GameId, IdGenerator, RoundId};
use crate::location::Location;
use crate::round::{PoolEntry, Round};
use crate::scoring;

/// A fixed, ordered sequence of rounds with a progression cursor and total.
///
/// Only [`Game::create`] builds one, so every game starts with all rounds
/// unscored, the cursor at 0 and a zero total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    id: GameId,
    rounds: Vec<Round>,
    current_round_index: usize,
    total_score: u32,
}

/// Where a game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for a guess on the round at `round_index`.
    InProgress { round_index: usize },
    /// Every round has been scored. Terminal.
    Completed,
}

/// Result of a successful guess submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessOutcome {
    pub completed_round: Round,
    pub is_last_round: bool,
    pub score_from_last_round: u32,
    pub total_current_score: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("A game needs at least one round")]
    NoRounds,
    #[error("Round not found: {0}")]
    RoundNotFound(RoundId),
    #[error("Round already scored: {0}")]
    AlreadyScored(RoundId),
    #[error("Round {round} is not the current round (expected {current})")]
    RoundNotCurrent { round: RoundId, current: RoundId },
}

impl Game {
    fn new(id: GameId, rounds: Vec<Round>) -> Result<Self, GameError> {
        if rounds.is_empty() {
            return Err(GameError::NoRounds);
        }
        Ok(Self {
            id,
            rounds,
            current_round_index: 0,
            total_score: 0,
        })
    }

    /// Create a game with one round per entry, assigning fresh ids to the
    /// game and every round.
    pub fn create(
        ids: &dyn IdGenerator,
        entries: impl IntoIterator<Item = PoolEntry>,
    ) -> Result<Self, GameError> {
        let rounds = entries
            .into_iter()
            .map(|entry| Round::new(RoundId::new(ids.generate()), entry.image_url, entry.location))
            .collect();
        Self::new(GameId::new(ids.generate()), rounds)
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Index of the first unscored round, or `round_count()` once completed.
    pub fn current_round_index(&self) -> usize {
        self.current_round_index
    }

    pub fn current_round_id(&self) -> Option<&RoundId> {
        self.rounds.get(self.current_round_index).map(Round::id)
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_completed() {
            GamePhase::Completed
        } else {
            GamePhase::InProgress {
                round_index: self.current_round_index,
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        self.current_round_index >= self.rounds.len()
    }

    /// Score a guess for the current round, record it, and advance.
    ///
    /// A round that is already scored fails with `AlreadyScored`, also once
    /// the game is completed. Rounds ahead of the cursor are rejected.
    pub fn submit_guess(
        &mut self,
        round_id: &RoundId,
        guess: Location,
    ) -> Result<GuessOutcome, GameError> {
        let index = self
            .rounds
            .iter()
            .position(|r| r.id() == round_id)
            .ok_or_else(|| GameError::RoundNotFound(round_id.clone()))?;

        let round = &self.rounds[index];
        if round.is_scored() {
            return Err(GameError::AlreadyScored(round_id.clone()));
        }
        if index != self.current_round_index {
            // Unscored rounds always sit at or after the cursor, so a
            // current round exists here.
            let current = self
                .current_round_id()
                .cloned()
                .ok_or_else(|| GameError::AlreadyScored(round_id.clone()))?;
            return Err(GameError::RoundNotCurrent {
                round: round_id.clone(),
                current,
            });
        }
        let actual = *round.actual_location();

        let points = scoring::score(&actual, &guess);
        let round = &mut self.rounds[index];
        round.record_guess(guess, points);
        let completed_round = round.clone();
        self.total_score += points;
        self.advance(index);

        Ok(GuessOutcome {
            completed_round,
            is_last_round: self.is_completed(),
            score_from_last_round: points,
            total_current_score: self.total_score,
        })
    }

    /// Move the cursor past the round that was just scored.
    fn advance(&mut self, scored_round_index: usize) {
        debug_assert_eq!(scored_round_index, self.current_round_index);
        self.current_round_index = scored_round_index + 1;
    }
}
