pub mod game;
pub mod ids;
pub mod location;
pub mod round;
pub mod scoring;

pub use game::{Game, GameError, GamePhase, GuessOutcome};
pub use ids::{GameId, IdGenerator, RoundId, SequentialIds, UuidGenerator};
pub use location::{Location, LocationError};
pub use round::{PoolEntry, Round, RoundView, RoundViewError};
pub use scoring::{haversine_km, score, score_distance, MAX_SCORE, ZERO_SCORE_DISTANCE_KM};
