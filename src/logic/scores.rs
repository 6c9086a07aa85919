//! Score entry for generated matches.

use crate::models::{GameMatch, LeagueError, MatchId};
use crate::store::RecordStore;

/// Set a match's final score and mark it played. Scores may be corrected any
/// number of times until the gameday is finished.
///
/// # Errors
/// `MatchNotFound`, `GamedayNotFound`, `GamedayAlreadyFinished`.
pub fn record_score<S: RecordStore>(
    store: &mut S,
    match_id: MatchId,
    score_a: u32,
    score_b: u32,
) -> Result<GameMatch, LeagueError> {
    let mut game_match = store.require_match(match_id)?;
    let gameday = store.require_gameday(game_match.gameday)?;
    if gameday.is_finished() {
        return Err(LeagueError::GamedayAlreadyFinished(gameday.id));
    }
    if score_a == score_b {
        log::warn!("{} recorded as a tie ({score_a}-{score_b})", game_match.title);
    }
    game_match.score_a = score_a;
    game_match.score_b = score_b;
    game_match.is_played = true;
    store.save_match(&game_match)?;
    Ok(game_match)
}
