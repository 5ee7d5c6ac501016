//! Line-oriented game loop used by `geoguess play`.

use std::io::Write;

use anyhow::Context;
use geoguess::{haversine_km, MAX_SCORE};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::service::{GameService, ServiceError};

/// Play one full game, reading `lat,lon` guesses from `input`.
/// Returns the final total, or the partial total if input ends early.
pub async fn run_play<R, W>(service: &GameService, input: R, out: &mut W) -> anyhow::Result<u32>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let game_id = service.create_game().await?.id;
    let mut lines = BufReader::new(input).lines();

    let total = loop {
        let view = service.get_game(&game_id).await?;
        let total = view.current_score;
        let Some(round_id) = view.current_round_id else {
            break total;
        };
        let round_count = view.rounds.len();
        let round = &view.rounds[view.current_round_index];

        writeln!(out, "Round {}/{}", view.current_round_index + 1, round_count)?;
        writeln!(out, "  {}", round.image_url())?;

        let result = loop {
            write!(out, "Your guess (lat,lon): ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await.context("reading guess")? else {
                writeln!(out)?;
                writeln!(out, "Game abandoned with {} points.", total)?;
                return Ok(total);
            };
            let Some((lat, lon)) = parse_guess(&line) else {
                writeln!(out, "Enter two numbers separated by a comma, e.g. 40.71,-74.00")?;
                continue;
            };
            match service.submit_coordinates(&round_id, lat, lon).await {
                Ok(result) => break result,
                Err(ServiceError::InvalidInput(msg)) => writeln!(out, "{}", msg)?,
                Err(e) => return Err(e.into()),
            }
        };

        let round = &result.completed_round;
        if let Some(guess) = round.guess_location() {
            let actual = round.actual_location();
            writeln!(
                out,
                "  Answer {} | you were {:.1} km away",
                actual,
                haversine_km(actual, guess)
            )?;
        }
        writeln!(
            out,
            "  +{} points (total {})",
            result.score_from_last_round, result.total_current_score
        )?;
    };

    let max = MAX_SCORE as usize * service.settings().round_count;
    writeln!(out, "Final score: {} / {}", total, max)?;
    Ok(total)
}

fn parse_guess(line: &str) -> Option<(f64, f64)> {
    let (lat, lon) = line.trim().split_once(',')?;
    Some((lat.trim().parse().ok()?, lon.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BuiltinPool, SelectionPolicy};
    use crate::service::GameSettings;
    use crate::session::SessionStore;
    use std::sync::Arc;

    fn test_service(round_count: usize) -> GameService {
        GameService::new(
            Arc::new(SessionStore::new()),
            Arc::new(BuiltinPool::new().unwrap()),
            GameSettings {
                round_count,
                selection: SelectionPolicy::Sequential,
            },
        )
    }

    #[test]
    fn test_parse_guess() {
        assert_eq!(parse_guess("40.7, -74.0"), Some((40.7, -74.0)));
        assert_eq!(parse_guess(" 1,2 \n"), Some((1.0, 2.0)));
        assert_eq!(parse_guess("40.7"), None);
        assert_eq!(parse_guess("north,south"), None);
    }

    #[tokio::test]
    async fn test_perfect_game() {
        let service = test_service(2);
        // New York, then Tokyo.
        let input = "40.7128,-74.0060\n35.6762,139.6503\n".as_bytes();
        let mut out = Vec::new();

        let total = run_play(&service, input, &mut out).await.unwrap();
        assert_eq!(total, 10_000);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Round 1/2"));
        assert!(text.contains("Round 2/2"));
        assert!(text.contains("Final score: 10000 / 10000"));
    }

    #[tokio::test]
    async fn test_bad_input_is_reprompted() {
        let service = test_service(1);
        let input = "nonsense\n95,0\n40.7128,-74.0060\n".as_bytes();
        let mut out = Vec::new();

        let total = run_play(&service, input, &mut out).await.unwrap();
        assert_eq!(total, 5000);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Enter two numbers"));
        assert!(text.contains("outside [-90, 90]"));
    }

    #[tokio::test]
    async fn test_input_ends_early() {
        let service = test_service(3);
        let input = "40.7128,-74.0060\n".as_bytes();
        let mut out = Vec::new();

        let total = run_play(&service, input, &mut out).await.unwrap();
        assert_eq!(total, 5000);
        assert!(String::from_utf8(out).unwrap().contains("Game abandoned"));
    }
}
