//! League ranking: order qualified players by results and assign ranks.

use crate::models::{League, LeagueError, LeagueId, Player, PlayerId};
use crate::store::RecordStore;
use serde::Serialize;
use std::cmp::Ordering;

/// One row of a league table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub name: String,
    pub played_gamedays: u32,
    pub match_count: u32,
    pub league_wins: u32,
    pub league_losses: u32,
    pub win_percentage: f64,
    pub global_elo: f64,
    pub qualified: bool,
    pub rank: Option<u32>,
}

/// Qualified first, then win percentage, league wins and rating, all descending.
fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.qualified
        .cmp(&a.qualified)
        .then_with(|| b.win_percentage.total_cmp(&a.win_percentage))
        .then_with(|| b.league_wins.cmp(&a.league_wins))
        .then_with(|| b.global_elo.total_cmp(&a.global_elo))
}

/// Sorted table of every player with a stats row in the league, ranks assigned.
/// Ties beyond the last criterion keep store order, so the result is stable.
fn build_standings(league: &League, players: &[Player]) -> Vec<Standing> {
    let mut rows: Vec<Standing> = players
        .iter()
        .filter_map(|p| {
            let stat = p.league_stat(league.id)?;
            Some(Standing {
                player_id: p.id,
                name: p.name.clone(),
                played_gamedays: stat.played_gamedays,
                match_count: stat.match_count,
                league_wins: stat.league_wins,
                league_losses: stat.league_losses,
                win_percentage: stat.win_percentage,
                global_elo: p.global_elo,
                qualified: stat.played_gamedays >= league.min_game_days,
                rank: None,
            })
        })
        .collect();
    rows.sort_by(compare);

    let mut next = 1;
    for row in rows.iter_mut().filter(|r| r.qualified) {
        row.rank = Some(next);
        next += 1;
    }
    rows
}

/// Recompute ranks for a league and write them into each player's stats row.
/// Unqualified players get no rank. Idempotent. Returns the number of ranked players.
///
/// # Errors
/// `LeagueNotFound`, or a store failure.
pub fn recalculate_league_ranks<S: RecordStore>(
    store: &mut S,
    league_id: LeagueId,
) -> Result<usize, LeagueError> {
    let league = store.require_league(league_id)?;
    let players = store.players();
    let standings = build_standings(&league, &players);

    for row in &standings {
        let Some(mut player) = players.iter().find(|p| p.id == row.player_id).cloned() else {
            continue;
        };
        if let Some(stat) = player.league_stat_mut(league_id) {
            if stat.rank == row.rank {
                continue;
            }
            stat.rank = row.rank;
        }
        store.save_player(&player)?;
    }

    let ranked = standings.iter().filter(|r| r.rank.is_some()).count();
    log::debug!(
        "Recalculated ranks for {}: {} ranked of {} with stats",
        league.title,
        ranked,
        standings.len()
    );
    Ok(ranked)
}

/// Recompute ranks for every league. Returns the number of leagues processed.
///
/// # Errors
/// A store failure.
pub fn recalculate_all_league_ranks<S: RecordStore>(store: &mut S) -> Result<usize, LeagueError> {
    let leagues = store.leagues();
    for league in &leagues {
        recalculate_league_ranks(store, league.id)?;
    }
    Ok(leagues.len())
}

/// Current league table, in ranking order.
///
/// # Errors
/// `LeagueNotFound`.
pub fn league_standings<S: RecordStore>(
    store: &S,
    league_id: LeagueId,
) -> Result<Vec<Standing>, LeagueError> {
    let league = store.require_league(league_id)?;
    Ok(build_standings(&league, &store.players()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerLeagueStat;
    use crate::store::MemoryStore;

    fn player_with(league: LeagueId, name: &str, gamedays: u32, wins: u32, losses: u32, elo: f64) -> Player {
        let mut p = Player::with_elo(name, elo);
        p.league_stats.push(PlayerLeagueStat {
            league_id: league,
            played_gamedays: gamedays,
            match_count: wins + losses,
            league_wins: wins,
            league_losses: losses,
            win_percentage: crate::logic::league_stats::win_percentage(wins, losses),
            rank: None,
        });
        p
    }

    fn rank_of(store: &MemoryStore, id: PlayerId, league: LeagueId) -> Option<u32> {
        store.player(id).and_then(|p| p.league_stat(league).and_then(|s| s.rank))
    }

    #[test]
    fn ties_fall_back_to_wins_then_rating() {
        let mut store = MemoryStore::new();
        let league = League::new("L", 0);
        store.save_league(&league).unwrap();
        let a = player_with(league.id, "A", 1, 2, 2, 1500.0);
        let b = player_with(league.id, "B", 1, 4, 4, 1400.0);
        let c = player_with(league.id, "C", 1, 4, 4, 1600.0);
        for p in [&a, &b, &c] {
            store.save_player(p).unwrap();
        }
        assert_eq!(recalculate_league_ranks(&mut store, league.id).unwrap(), 3);
        assert_eq!(rank_of(&store, c.id, league.id), Some(1));
        assert_eq!(rank_of(&store, b.id, league.id), Some(2));
        assert_eq!(rank_of(&store, a.id, league.id), Some(3));
    }

    #[test]
    fn players_without_a_row_are_ignored() {
        let mut store = MemoryStore::new();
        let league = League::new("L", 0);
        store.save_league(&league).unwrap();
        let outsider = Player::new("Outsider");
        store.save_player(&outsider).unwrap();
        assert_eq!(recalculate_league_ranks(&mut store, league.id).unwrap(), 0);
        assert!(league_standings(&store, league.id).unwrap().is_empty());
    }

    #[test]
    fn unknown_league_is_not_found() {
        let mut store = MemoryStore::new();
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            recalculate_league_ranks(&mut store, id),
            Err(LeagueError::LeagueNotFound(id))
        );
    }
}
