//! Gameday finalization: settle Elo, snapshot the day's rankings, refresh league stats and ranks.

use crate::logic::league_stats::{update_player_league_stats, win_percentage};
use crate::logic::rating::{round2, settle_match, HistoryContext};
use crate::logic::ranking::recalculate_league_ranks;
use crate::models::{GameMatch, GamedayId, GamedayRanking, LeagueError, LeagueId, Player, PlayerId};
use crate::store::RecordStore;
use chrono::NaiveTime;
use serde::Serialize;
use std::collections::HashSet;

/// What a finalization did, for callers to report.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FinalizeSummary {
    pub gameday_id: GamedayId,
    /// Played matches whose Elo was applied.
    pub settled_matches: usize,
    /// Played matches skipped as unsettleable (no points, incomplete team).
    pub skipped_matches: usize,
    pub ranked_players: usize,
    pub leagues_recalculated: Vec<LeagueId>,
}

/// Close a gameday. One-way: requires a generated plan and an unfinished day.
///
/// Played matches are settled in creation order, each reading the ratings the
/// previous one left behind. Matches that cannot be settled are logged and
/// skipped; matches already carrying a delta are not settled twice.
/// The day's rankings are computed before the day is marked finished; league
/// stats of every present player and the ranks of every league they hold stats
/// in are recomputed afterwards.
///
/// # Errors
/// `GamedayNotFound`, `LeagueNotFound`, `PlanNotGenerated`, `GamedayAlreadyFinished`,
/// or a store failure. The day is left unfinished on any error before the flag flips.
pub fn finalize_gameday<S: RecordStore>(
    store: &mut S,
    gameday_id: GamedayId,
) -> Result<FinalizeSummary, LeagueError> {
    let mut gameday = store.require_gameday(gameday_id)?;
    gameday.ensure_finalizable()?;
    let league = store.require_league(gameday.league)?;
    let k_factor = f64::from(league.k_factor);
    let ctx = HistoryContext {
        date: gameday.date.and_time(NaiveTime::MIN).and_utc(),
        league_id: league.id,
    };

    let mut played: Vec<GameMatch> = store
        .matches_for_gameday(gameday_id)
        .into_iter()
        .filter(|m| m.is_played)
        .collect();

    let mut summary = FinalizeSummary {
        gameday_id,
        ..FinalizeSummary::default()
    };
    for m in &mut played {
        if m.elo_delta.is_some() {
            log::debug!("Match {} already settled, skipping", m.id);
            continue;
        }
        match settle_match(store, m, k_factor, ctx) {
            Ok(_) => summary.settled_matches += 1,
            Err(LeagueError::InvalidMatchState(reason)) => {
                log::warn!("Skipping Elo for {}: {}", m.title, reason);
                summary.skipped_matches += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let mut seen = HashSet::new();
    let present: Vec<PlayerId> = gameday
        .present_players
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let rankings = gameday_rankings(store, &present, &played);
    summary.ranked_players = rankings.len();
    gameday.record_finish(rankings)?;
    store.save_gameday(&gameday)?;

    for &player_id in &present {
        match update_player_league_stats(store, player_id) {
            Ok(()) => {}
            Err(LeagueError::PlayerNotFound(id)) => {
                log::warn!("Present player {id} no longer exists, skipping stats");
            }
            Err(e) => return Err(e),
        }
    }

    for league_id in leagues_of(store, &present) {
        recalculate_league_ranks(store, league_id)?;
        summary.leagues_recalculated.push(league_id);
    }

    log::info!(
        "Finished {}: {} matches settled, {} skipped, {} players ranked",
        gameday.title,
        summary.settled_matches,
        summary.skipped_matches,
        summary.ranked_players
    );
    Ok(summary)
}

/// Every league any of the players holds a stats row in, first-seen order.
fn leagues_of<S: RecordStore>(store: &S, players: &[PlayerId]) -> Vec<LeagueId> {
    let mut leagues = Vec::new();
    for p in players.iter().filter_map(|&id| store.player(id)) {
        for stat in &p.league_stats {
            if !leagues.contains(&stat.league_id) {
                leagues.push(stat.league_id);
            }
        }
    }
    leagues
}

/// Day result of one player, before ranks are assigned.
fn day_result(player: &Player, matches: &[&GameMatch]) -> GamedayRanking {
    let elo_start = matches
        .iter()
        .find_map(|m| m.elo_before(player.id))
        .unwrap_or(player.global_elo);
    let elo_end = player.global_elo;

    let (mut wins, mut losses) = (0, 0);
    for m in matches {
        match (m.winner(), m.team_of(player.id)) {
            (Some(w), Some(side)) if w == side => wins += 1,
            (Some(_), Some(_)) => losses += 1,
            _ => {}
        }
    }

    GamedayRanking {
        rank: 0,
        player_id: player.id,
        matches_played: matches.len() as u32,
        wins,
        losses,
        win_percentage: win_percentage(wins, losses),
        elo_start: round2(elo_start),
        elo_end: round2(elo_end),
        elo_gain: round2(elo_end - elo_start),
    }
}

/// Rank present players who played today: win percentage, Elo gain, wins,
/// then current rating, all descending.
fn gameday_rankings<S: RecordStore>(
    store: &S,
    present: &[PlayerId],
    played: &[GameMatch],
) -> Vec<GamedayRanking> {
    let mut rows: Vec<GamedayRanking> = present
        .iter()
        .filter_map(|&id| store.player(id))
        .filter_map(|player| {
            let own: Vec<&GameMatch> = played.iter().filter(|m| m.involves(player.id)).collect();
            if own.is_empty() {
                return None;
            }
            Some(day_result(&player, &own))
        })
        .collect();

    assign_day_ranks(&mut rows);
    rows
}

/// Sort by win percentage, Elo gain, wins, then current rating, all descending,
/// and number the rows from 1.
fn assign_day_ranks(rows: &mut [GamedayRanking]) {
    rows.sort_by(|a, b| {
        b.win_percentage
            .total_cmp(&a.win_percentage)
            .then_with(|| b.elo_gain.total_cmp(&a.elo_gain))
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| b.elo_end.total_cmp(&a.elo_end))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
}
