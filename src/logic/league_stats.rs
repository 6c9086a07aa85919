//! Per-player league statistics, rebuilt from the full match history.

use crate::logic::rating::round2;
use crate::models::{GamedayId, LeagueError, LeagueId, PlayerId, PlayerLeagueStat};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Default)]
struct Tally {
    gamedays: HashSet<GamedayId>,
    matches: u32,
    wins: u32,
    losses: u32,
}

/// Win share in percent over decided matches, 2 decimals; 0 without any.
pub fn win_percentage(wins: u32, losses: u32) -> f64 {
    let decided = wins + losses;
    if decided == 0 {
        return 0.0;
    }
    round2(f64::from(wins) / f64::from(decided) * 100.0)
}

/// Aggregate a player's finished gamedays and played matches per league.
///
/// Only finished gamedays count. A tied match adds to `match_count` but to
/// neither wins nor losses. Rows come out ordered by league id; `rank` is left
/// empty for the ranking pass.
pub fn compute_league_stats<S: RecordStore>(store: &S, player_id: PlayerId) -> Vec<PlayerLeagueStat> {
    let mut by_league: BTreeMap<LeagueId, Tally> = BTreeMap::new();

    for gameday in store.finished_gamedays_with_player(player_id) {
        by_league.entry(gameday.league).or_default().gamedays.insert(gameday.id);
    }

    for m in store.played_matches_with_player(player_id) {
        let Some(gameday) = store.gameday(m.gameday) else {
            continue;
        };
        if !gameday.is_finished() {
            continue;
        }
        // A match only counts where the player has an attended gameday in that league.
        let Some(tally) = by_league.get_mut(&gameday.league) else {
            continue;
        };
        tally.matches += 1;
        let side = m.team_of(player_id);
        match (m.winner(), side) {
            (Some(w), Some(s)) if w == s => tally.wins += 1,
            (Some(_), Some(_)) => tally.losses += 1,
            _ => {}
        }
    }

    by_league
        .into_iter()
        .filter(|(league_id, _)| store.league(*league_id).is_some())
        .map(|(league_id, t)| PlayerLeagueStat {
            league_id,
            played_gamedays: t.gamedays.len() as u32,
            match_count: t.matches,
            league_wins: t.wins,
            league_losses: t.losses,
            win_percentage: win_percentage(t.wins, t.losses),
            rank: None,
        })
        .collect()
}

/// Recompute and store a player's league stats from scratch.
///
/// # Errors
/// `PlayerNotFound`, or a store failure.
pub fn update_player_league_stats<S: RecordStore>(
    store: &mut S,
    player_id: PlayerId,
) -> Result<(), LeagueError> {
    let mut player = store.require_player(player_id)?;
    player.league_stats = compute_league_stats(store, player_id);
    store.save_player(&player)
}

/// Headline numbers for one player in one league.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LeagueStatSummary {
    pub played_gamedays: u32,
    pub match_count: u32,
    pub win_percentage: f64,
}

/// Stored stats of a player in a league; zeros when the player has no row.
///
/// # Errors
/// `PlayerNotFound`.
pub fn player_league_stats<S: RecordStore>(
    store: &S,
    player_id: PlayerId,
    league_id: LeagueId,
) -> Result<LeagueStatSummary, LeagueError> {
    let player = store.require_player(player_id)?;
    Ok(player
        .league_stat(league_id)
        .map(|s| LeagueStatSummary {
            played_gamedays: s.played_gamedays,
            match_count: s.match_count,
            win_percentage: s.win_percentage,
        })
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_percentage_rounds_and_handles_zero() {
        assert_eq!(win_percentage(0, 0), 0.0);
        assert_eq!(win_percentage(2, 1), 66.67);
        assert_eq!(win_percentage(3, 0), 100.0);
    }
}
