use serde::{Deserialize, Serialize};

use crate::ids::RoundId;
use crate::location::Location;
use crate::scoring::MAX_SCORE;

/// A candidate panorama supplied by a content pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub image_url: String,
    pub location: Location,
}

impl PoolEntry {
    pub fn new(image_url: impl Into<String>, location: Location) -> Self {
        Self {
            image_url: image_url.into(),
            location,
        }
    }
}

/// One image-guess unit of a game.
///
/// The true location is fixed at creation. The guess and score are written
/// together, exactly once, when the owning game accepts a guess. Rounds are
/// only ever built by [`Game::create`](crate::Game::create), so there is no
/// way to hand a game a round that is already scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round {
    id: RoundId,
    image_url: String,
    actual_location: Location,
    guess_location: Option<Location>,
    score: Option<u32>,
}

impl Round {
    pub(crate) fn new(
        id: RoundId,
        image_url: impl Into<String>,
        actual_location: Location,
    ) -> Self {
        Self {
            id,
            image_url: image_url.into(),
            actual_location,
            guess_location: None,
            score: None,
        }
    }

    pub fn id(&self) -> &RoundId {
        &self.id
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn actual_location(&self) -> &Location {
        &self.actual_location
    }

    pub fn guess_location(&self) -> Option<&Location> {
        self.guess_location.as_ref()
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Player-facing copy with the true location hidden until it is scored.
    pub fn player_view(&self) -> RoundView {
        RoundView {
            id: self.id.clone(),
            image_url: self.image_url.clone(),
            actual_location: self.is_scored().then_some(self.actual_location),
            guess_location: self.guess_location,
            score: self.score,
        }
    }

    /// Write the guess and score. Callers check [`Round::is_scored`] first.
    pub(crate) fn record_guess(&mut self, guess: Location, score: u32) {
        debug_assert!(!self.is_scored(), "round {} scored twice", self.id);
        self.guess_location = Some(guess);
        self.score = Some(score);
    }
}

/// What a player may see of a [`Round`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRoundView")]
pub struct RoundView {
    id: RoundId,
    image_url: String,
    actual_location: Option<Location>,
    guess_location: Option<Location>,
    score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoundViewError {
    #[error("Round {0} has a guess without a score, or a score without a guess")]
    PartialGuess(RoundId),
    #[error("Round {round} has score {score}, above the maximum")]
    ScoreOutOfRange { round: RoundId, score: u32 },
    #[error("Round {0} reveals its location before it is scored")]
    RevealedTooEarly(RoundId),
}

/// Unchecked wire shape, validated into a [`RoundView`].
#[derive(Deserialize)]
struct RawRoundView {
    id: RoundId,
    image_url: String,
    actual_location: Option<Location>,
    guess_location: Option<Location>,
    score: Option<u32>,
}

impl TryFrom<RawRoundView> for RoundView {
    type Error = RoundViewError;

    fn try_from(raw: RawRoundView) -> Result<Self, Self::Error> {
        if raw.guess_location.is_some() != raw.score.is_some() {
            return Err(RoundViewError::PartialGuess(raw.id));
        }
        if let Some(score) = raw.score.filter(|&s| s > MAX_SCORE) {
            return Err(RoundViewError::ScoreOutOfRange { round: raw.id, score });
        }
        if raw.score.is_none() && raw.actual_location.is_some() {
            return Err(RoundViewError::RevealedTooEarly(raw.id));
        }
        Ok(Self {
            id: raw.id,
            image_url: raw.image_url,
            actual_location: raw.actual_location,
            guess_location: raw.guess_location,
            score: raw.score,
        })
    }
}

impl RoundView {
    pub fn id(&self) -> &RoundId {
        &self.id
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// `None` until the round is scored.
    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn guess_location(&self) -> Option<&Location> {
        self.guess_location.as_ref()
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }
}
