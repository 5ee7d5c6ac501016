//! The public game operations: create, get, submit guess.
//!
//! Wraps the session store and a content pool. Request and response shapes
//! serialize to the JSON payloads a transport adapter carries.

use std::sync::Arc;

use geoguess::{
    Game, GameError, GameId, GuessOutcome, IdGenerator, Location, LocationError, Round, RoundId,
    RoundView, UuidGenerator,
};
use serde::{Deserialize, Serialize};

use crate::content::{ContentError, LocationPool, SelectionPolicy};
use crate::session::{SessionError, SessionStore};

/// Default number of rounds per game.
pub const DEFAULT_ROUND_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    Game,
    Round,
}

impl std::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Game => f.write_str("Game"),
            Self::Round => f.write_str("Round"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: NotFoundKind, id: String },
    #[error("Round already scored: {0}")]
    AlreadyScored(RoundId),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Could not provision rounds: {0}")]
    ProvisioningFailure(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    fn game_not_found(id: &GameId) -> Self {
        Self::NotFound {
            kind: NotFoundKind::Game,
            id: id.to_string(),
        }
    }

    fn round_not_found(id: &RoundId) -> Self {
        Self::NotFound {
            kind: NotFoundKind::Round,
            id: id.to_string(),
        }
    }
}

impl From<SessionError> for ServiceError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Game(GameError::RoundNotFound(id)) => Self::round_not_found(&id),
            SessionError::Game(GameError::AlreadyScored(id)) => Self::AlreadyScored(id),
            SessionError::Game(e @ GameError::RoundNotCurrent { .. }) => {
                Self::InvalidInput(e.to_string())
            }
            SessionError::Game(e) => Self::Internal(e.to_string()),
            e @ (SessionError::DuplicateGame(_) | SessionError::DuplicateRound(_)) => {
                Self::Internal(e.to_string())
            }
            SessionError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<LocationError> for ServiceError {
    fn from(e: LocationError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<ContentError> for ServiceError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::ZeroRounds => Self::InvalidInput(e.to_string()),
            other => Self::ProvisioningFailure(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub id: GameId,
}

/// Player-facing view of a game. Unscored rounds carry no `actual_location`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub current_round_id: Option<RoundId>,
    pub current_round_index: usize,
    pub rounds: Vec<RoundView>,
    pub current_score: u32,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            current_round_id: game.current_round_id().cloned(),
            current_round_index: game.current_round_index(),
            rounds: game.rounds().iter().map(Round::player_view).collect(),
            current_score: game.total_score(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessRequest {
    pub guess_location: Location,
}

pub type GuessResult = GuessOutcome;

/// Tunables for game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub round_count: usize,
    pub selection: SelectionPolicy,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round_count: DEFAULT_ROUND_COUNT,
            selection: SelectionPolicy::default(),
        }
    }
}

pub struct GameService {
    store: Arc<SessionStore>,
    pool: Arc<dyn LocationPool>,
    ids: Arc<dyn IdGenerator>,
    settings: GameSettings,
}

impl GameService {
    pub fn new(
        store: Arc<SessionStore>,
        pool: Arc<dyn LocationPool>,
        settings: GameSettings,
    ) -> Self {
        Self::with_id_generator(store, pool, Arc::new(UuidGenerator), settings)
    }

    pub fn with_id_generator(
        store: Arc<SessionStore>,
        pool: Arc<dyn LocationPool>,
        ids: Arc<dyn IdGenerator>,
        settings: GameSettings,
    ) -> Self {
        Self {
            store,
            pool,
            ids,
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub async fn create_game(&self) -> Result<CreateGameResponse, ServiceError> {
        let entries = self
            .pool
            .select(self.settings.round_count, self.settings.selection)?;
        let game = Game::create(self.ids.as_ref(), entries)
            .map_err(|e| ServiceError::ProvisioningFailure(e.to_string()))?;
        let id = game.id().clone();

        self.store.put(game).await?;
        tracing::info!(
            game_id = %id,
            rounds = self.settings.round_count,
            selection = %self.settings.selection,
            "Game created"
        );
        Ok(CreateGameResponse { id })
    }

    pub async fn get_game(&self, game_id: &GameId) -> Result<GameView, ServiceError> {
        tracing::debug!(game_id = %game_id, "get_game");
        let handle = self
            .store
            .get(game_id)
            .await
            .ok_or_else(|| ServiceError::game_not_found(game_id))?;
        let game = handle.get_snapshot().await?;
        Ok(GameView::from(&game))
    }

    pub async fn submit_guess(
        &self,
        round_id: &RoundId,
        request: GuessRequest,
    ) -> Result<GuessResult, ServiceError> {
        let handle = self
            .store
            .find_round_owner(round_id)
            .await
            .ok_or_else(|| ServiceError::round_not_found(round_id))?;
        tracing::debug!(game_id = %handle.id(), round_id = %round_id, "submit_guess");

        let outcome = handle
            .submit_guess(round_id.clone(), request.guess_location)
            .await?;
        if outcome.is_last_round {
            tracing::info!(
                game_id = %handle.id(),
                total = outcome.total_current_score,
                "Game completed"
            );
        }
        Ok(outcome)
    }

    /// Convenience for callers holding raw coordinates.
    pub async fn submit_coordinates(
        &self,
        round_id: &RoundId,
        latitude: f64,
        longitude: f64,
    ) -> Result<GuessResult, ServiceError> {
        let guess_location = Location::new(latitude, longitude)?;
        self.submit_guess(round_id, GuessRequest { guess_location })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BuiltinPool;
    use geoguess::{PoolEntry, SequentialIds};

    struct FixedPool(Vec<PoolEntry>);

    impl LocationPool for FixedPool {
        fn entries(&self) -> &[PoolEntry] {
            &self.0
        }
    }

    fn loc(lat: f64, lon: f64) -> Location {
        Location::new(lat, lon).unwrap()
    }

    fn guess(lat: f64, lon: f64) -> GuessRequest {
        GuessRequest {
            guess_location: loc(lat, lon),
        }
    }

    fn test_service(round_count: usize) -> GameService {
        let pool = BuiltinPool::new().unwrap();
        GameService::with_id_generator(
            Arc::new(SessionStore::new()),
            Arc::new(pool),
            Arc::new(SequentialIds::new("id")),
            GameSettings {
                round_count,
                selection: SelectionPolicy::Sequential,
            },
        )
    }

    /// Three rounds at the equator, New York, and the equator again.
    fn three_round_service() -> GameService {
        let pool = FixedPool(vec![
            PoolEntry::new("https://img/0.jpg", loc(0.0, 0.0)),
            PoolEntry::new("https://img/1.jpg", loc(40.7128, -74.006)),
            PoolEntry::new("https://img/2.jpg", loc(0.0, 0.0)),
        ]);
        GameService::with_id_generator(
            Arc::new(SessionStore::new()),
            Arc::new(pool),
            Arc::new(SequentialIds::new("id")),
            GameSettings {
                round_count: 3,
                selection: SelectionPolicy::Sequential,
            },
        )
    }

    async fn current_round(service: &GameService, game_id: &GameId) -> RoundId {
        service
            .get_game(game_id)
            .await
            .unwrap()
            .current_round_id
            .expect("game should be in progress")
    }

    #[tokio::test]
    async fn test_create_game_initial_view() {
        let service = test_service(5);
        let created = service.create_game().await.unwrap();
        let view = service.get_game(&created.id).await.unwrap();

        assert_eq!(view.rounds.len(), 5);
        assert_eq!(view.current_round_index, 0);
        assert_eq!(view.current_score, 0);
        assert_eq!(view.current_round_id.as_ref(), Some(view.rounds[0].id()));
        for round in &view.rounds {
            assert!(round.guess_location().is_none());
            assert!(round.score().is_none());
            assert!(round.actual_location().is_none(), "answer must be withheld");
        }
    }

    #[tokio::test]
    async fn test_get_unknown_game() {
        let service = test_service(5);
        let err = service.get_game(&GameId::new("missing")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: NotFoundKind::Game,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_three_round_scenario() {
        let service = three_round_service();
        let game_id = service.create_game().await.unwrap().id;
        let half = (500.0_f64 / 6371.0).to_degrees();

        let r0 = current_round(&service, &game_id).await;
        let first = service.submit_guess(&r0, guess(0.0, 0.0)).await.unwrap();
        assert_eq!(first.score_from_last_round, 5000);
        assert!(!first.is_last_round);

        let r1 = current_round(&service, &game_id).await;
        let second = service
            .submit_guess(&r1, guess(35.6762, 139.6503))
            .await
            .unwrap();
        assert_eq!(second.score_from_last_round, 0);

        let r2 = current_round(&service, &game_id).await;
        let third = service.submit_guess(&r2, guess(half, 0.0)).await.unwrap();
        assert_eq!(third.score_from_last_round, 2500);
        assert_eq!(third.total_current_score, 7500);
        assert!(third.is_last_round);

        let view = service.get_game(&game_id).await.unwrap();
        assert_eq!(view.current_round_id, None);
        assert_eq!(view.current_round_index, 3);
        assert_eq!(view.current_score, 7500);
        assert!(view.rounds.iter().all(|r| r.actual_location().is_some()));
    }

    #[tokio::test]
    async fn test_guess_reveals_actual_location() {
        let service = test_service(2);
        let game_id = service.create_game().await.unwrap().id;
        let r0 = current_round(&service, &game_id).await;

        let result = service.submit_guess(&r0, guess(10.0, 10.0)).await.unwrap();
        assert_eq!(
            result.completed_round.actual_location(),
            &loc(40.7128, -74.006)
        );
        assert_eq!(result.completed_round.guess_location(), Some(&loc(10.0, 10.0)));

        let view = service.get_game(&game_id).await.unwrap();
        assert!(view.rounds[0].actual_location().is_some());
        assert!(view.rounds[1].actual_location().is_none());
    }

    #[tokio::test]
    async fn test_total_increases_by_round_score() {
        let service = test_service(3);
        let game_id = service.create_game().await.unwrap().id;

        for k in 0..3 {
            let before = service.get_game(&game_id).await.unwrap();
            assert_eq!(before.current_round_index, k);
            let round_id = before.current_round_id.clone().unwrap();

            let result = service
                .submit_guess(&round_id, guess(48.0, 2.0))
                .await
                .unwrap();

            let after = service.get_game(&game_id).await.unwrap();
            assert_eq!(
                after.current_score,
                before.current_score + result.score_from_last_round
            );
            assert_eq!(after.current_score, result.total_current_score);
            assert_eq!(after.current_round_index, k + 1);
            assert_eq!(result.is_last_round, k == 2);
        }
    }

    #[tokio::test]
    async fn test_duplicate_guess_is_already_scored() {
        let service = test_service(3);
        let game_id = service.create_game().await.unwrap().id;
        let r0 = current_round(&service, &game_id).await;

        let first = service.submit_guess(&r0, guess(40.0, -74.0)).await.unwrap();
        let err = service
            .submit_guess(&r0, guess(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyScored(ref id) if *id == r0));

        let view = service.get_game(&game_id).await.unwrap();
        assert_eq!(view.current_score, first.total_current_score);
        assert_eq!(view.current_round_index, 1);
    }

    #[tokio::test]
    async fn test_unknown_round_is_not_found() {
        let service = test_service(2);
        service.create_game().await.unwrap();
        let err = service
            .submit_guess(&RoundId::new("no-such-round"), guess(0.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: NotFoundKind::Round,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_guess_ahead_of_current_round_is_invalid() {
        let service = test_service(3);
        let game_id = service.create_game().await.unwrap().id;
        let view = service.get_game(&game_id).await.unwrap();
        let last = view.rounds[2].id().clone();

        let err = service.submit_guess(&last, guess(0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        let view = service.get_game(&game_id).await.unwrap();
        assert_eq!(view.current_round_index, 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_guesses() {
        let service = Arc::new(test_service(3));
        let game_id = service.create_game().await.unwrap().id;
        let r0 = current_round(&service, &game_id).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let r0 = r0.clone();
                tokio::spawn(async move { service.submit_guess(&r0, guess(40.7, -74.0)).await })
            })
            .collect();

        let mut successes = 0;
        let mut already_scored = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(ServiceError::AlreadyScored(_)) => already_scored += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(already_scored, 7);

        let view = service.get_game(&game_id).await.unwrap();
        assert_eq!(view.current_round_index, 1);
    }

    #[tokio::test]
    async fn test_games_are_independent() {
        let service = test_service(2);
        let a = service.create_game().await.unwrap().id;
        let b = service.create_game().await.unwrap().id;
        assert_ne!(a, b);

        let ra = current_round(&service, &a).await;
        service.submit_guess(&ra, guess(0.0, 0.0)).await.unwrap();

        let view_b = service.get_game(&b).await.unwrap();
        assert_eq!(view_b.current_round_index, 0);
        assert_eq!(view_b.current_score, 0);
    }

    #[tokio::test]
    async fn test_invalid_round_count() {
        let mut service = test_service(0);
        assert!(matches!(
            service.create_game().await,
            Err(ServiceError::InvalidInput(_))
        ));

        service.settings.round_count = 6;
        assert!(matches!(
            service.create_game().await,
            Err(ServiceError::ProvisioningFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_coordinates_validates() {
        let service = test_service(1);
        let game_id = service.create_game().await.unwrap().id;
        let r0 = current_round(&service, &game_id).await;

        let err = service.submit_coordinates(&r0, 91.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let ok = service.submit_coordinates(&r0, 40.7128, -74.006).await.unwrap();
        assert_eq!(ok.score_from_last_round, 5000);
        assert!(ok.is_last_round);
    }

    #[test]
    fn test_guess_request_rejects_bad_coordinates() {
        let bad = r#"{"guess_location": {"latitude": 0.0, "longitude": 200.0}}"#;
        assert!(serde_json::from_str::<GuessRequest>(bad).is_err());
    }

    #[tokio::test]
    async fn test_wire_payloads() {
        let service = test_service(2);
        let created = service.create_game().await.unwrap();
        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["id"], created.id.as_str());

        let view = service.get_game(&created.id).await.unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["current_round_index"], 0);
        assert_eq!(json["current_score"], 0);
        assert_eq!(json["rounds"].as_array().unwrap().len(), 2);
        assert!(json["rounds"][0]["actual_location"].is_null());

        let r0 = view.current_round_id.unwrap();
        let request: GuessRequest = serde_json::from_str(
            r#"{"guess_location": {"latitude": 40.7128, "longitude": -74.006}}"#,
        )
        .unwrap();
        let result = service.submit_guess(&r0, request).await.unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score_from_last_round"], 5000);
        assert_eq!(json["total_current_score"], 5000);
        assert_eq!(json["is_last_round"], false);
        assert_eq!(json["completed_round"]["score"], 5000);
        assert_eq!(json["completed_round"]["actual_location"]["latitude"], 40.7128);
    }
}
