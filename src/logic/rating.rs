//! Elo rating: expected score, match delta and settlement of a played match.

use crate::models::{
    EloHistoryEntry, GameMatch, LeagueError, LeagueId, MatchId, Player, PlayerId, Team,
    DEFAULT_ELO,
};
use crate::store::RecordStore;
use chrono::{DateTime, Utc};

/// Players per team in a regular doubles match.
pub const TEAM_SIZE: usize = 2;

/// Round to 2 decimals, the precision ratings are persisted with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Expected score of side A against side B (logistic Elo curve, 400-point scale).
pub fn expected_score(elo_a: f64, elo_b: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((elo_b - elo_a) / 400.0))
}

/// Mean rating of a team; the default rating for an empty team.
pub fn average_elo(elos: &[f64]) -> f64 {
    if elos.is_empty() {
        return DEFAULT_ELO;
    }
    elos.iter().sum::<f64>() / elos.len() as f64
}

/// Rating change for team A given both teams' average ratings and the final score.
///
/// The actual score is the share of points won by A, so a close loss still
/// earns something. Returns `None` when no points were scored at all; such a
/// match carries no information and must be skipped, not treated as a draw.
pub fn compute_match_delta(
    team_a_elo: f64,
    team_b_elo: f64,
    score_a: u32,
    score_b: u32,
    k_factor: f64,
) -> Option<f64> {
    let total = u64::from(score_a) + u64::from(score_b);
    if total == 0 {
        return None;
    }
    let actual = f64::from(score_a) / total as f64;
    let expected = expected_score(team_a_elo, team_b_elo);
    Some(k_factor * (actual - expected))
}

/// Where a settled match is filed in each player's Elo history.
#[derive(Clone, Copy, Debug)]
pub struct HistoryContext {
    pub date: DateTime<Utc>,
    pub league_id: LeagueId,
}

/// Apply one match outcome to a player: rating, game count, win/loss, history.
fn apply_to_player(
    player: &mut Player,
    delta: f64,
    outcome: Option<bool>,
    match_id: MatchId,
    ctx: HistoryContext,
) {
    let new_elo = round2(player.global_elo + delta);
    player.global_elo = new_elo;
    player.total_games += 1;
    match outcome {
        Some(true) => player.wins += 1,
        Some(false) => player.losses += 1,
        None => {}
    }
    player.elo_history.push(EloHistoryEntry {
        date: ctx.date,
        elo: new_elo,
        match_id,
        league_id: ctx.league_id,
    });
}

fn load_team<S: RecordStore>(store: &S, ids: &[PlayerId]) -> Vec<Player> {
    ids.iter().filter_map(|&id| store.player(id)).collect()
}

/// Settle a played match: update all four players and write the delta and
/// before/after snapshots onto the match.
///
/// Players are read from the store at call time, so an earlier match of the
/// same day is already reflected. Returns the delta applied to team A.
///
/// # Errors
/// `InvalidMatchState` when a team is incomplete or no points were scored;
/// the caller is expected to log and skip those. Store failures propagate.
pub fn settle_match<S: RecordStore>(
    store: &mut S,
    game_match: &mut GameMatch,
    k_factor: f64,
    ctx: HistoryContext,
) -> Result<f64, LeagueError> {
    let mut team_a = load_team(store, &game_match.team_a);
    let mut team_b = load_team(store, &game_match.team_b);
    if team_a.len() < TEAM_SIZE || team_b.len() < TEAM_SIZE {
        return Err(LeagueError::InvalidMatchState(format!(
            "match {} has incomplete teams ({} vs {})",
            game_match.id,
            team_a.len(),
            team_b.len()
        )));
    }

    let elos_a: Vec<f64> = team_a.iter().map(|p| p.global_elo).collect();
    let elos_b: Vec<f64> = team_b.iter().map(|p| p.global_elo).collect();
    let delta = compute_match_delta(
        average_elo(&elos_a),
        average_elo(&elos_b),
        game_match.score_a,
        game_match.score_b,
        k_factor,
    )
    .ok_or_else(|| {
        LeagueError::InvalidMatchState(format!("match {} has no points scored", game_match.id))
    })?;

    let winner = game_match.winner();
    for p in &mut team_a {
        apply_to_player(p, delta, winner.map(|w| w == Team::A), game_match.id, ctx);
    }
    for p in &mut team_b {
        apply_to_player(p, -delta, winner.map(|w| w == Team::B), game_match.id, ctx);
    }
    for p in team_a.iter().chain(team_b.iter()) {
        store.save_player(p)?;
    }

    game_match.elo_delta = Some(delta);
    game_match.team_a_elo_before = elos_a.into_iter().map(round2).collect();
    game_match.team_b_elo_before = elos_b.into_iter().map(round2).collect();
    game_match.team_a_elo_after = team_a.iter().map(|p| p.global_elo).collect();
    game_match.team_b_elo_after = team_b.iter().map(|p| p.global_elo).collect();
    store.save_match(game_match)?;

    log::debug!(
        "Settled match {} ({}-{}): delta {:+.2}",
        game_match.id,
        game_match.score_a,
        game_match.score_b,
        delta
    );
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use uuid::Uuid;

    const K: f64 = 32.0;

    #[test]
    fn equal_ratings_expect_half() {
        assert!((expected_score(1500.0, 1500.0) - 0.5).abs() < 1e-12);
        assert!(expected_score(1700.0, 1500.0) > 0.5);
    }

    #[test]
    fn delta_for_eleven_five_at_equal_rating() {
        let delta = compute_match_delta(1500.0, 1500.0, 11, 5, K).unwrap();
        assert!((delta - 6.0).abs() < 1e-9);
    }

    #[test]
    fn delta_is_antisymmetric() {
        let cases = [(1500.0, 1620.0, 11, 7), (1432.5, 1388.0, 4, 11), (1800.0, 1200.0, 15, 13)];
        for (a, b, sa, sb) in cases {
            let forward = compute_match_delta(a, b, sa, sb, K).unwrap();
            let backward = compute_match_delta(b, a, sb, sa, K).unwrap();
            assert!((forward + backward).abs() < 1e-9);
        }
    }

    #[test]
    fn extreme_scores_use_the_point_share() {
        let delta = compute_match_delta(1500.0, 1500.0, u32::MAX, 2, K).unwrap();
        assert!(delta > 15.99 && delta < 16.0);
        let delta = compute_match_delta(1500.0, 1500.0, u32::MAX, u32::MAX, K).unwrap();
        assert!(delta.abs() < 1e-9);
    }

    #[test]
    fn zero_points_has_no_delta() {
        assert_eq!(compute_match_delta(1500.0, 1500.0, 0, 0, K), None);
    }

    fn store_with(elos: [f64; 4]) -> (MemoryStore, Vec<PlayerId>) {
        let mut store = MemoryStore::new();
        let ids = elos
            .iter()
            .enumerate()
            .map(|(i, &elo)| {
                let p = Player::with_elo(format!("P{i}"), elo);
                store.save_player(&p).unwrap();
                p.id
            })
            .collect();
        (store, ids)
    }

    fn ctx() -> HistoryContext {
        HistoryContext {
            date: Utc::now(),
            league_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn settlement_is_zero_sum_and_records_history() {
        let (mut store, ids) = store_with([1610.0, 1540.0, 1495.5, 1402.25]);
        let mut m = GameMatch::new("M1", Uuid::new_v4(), vec![ids[0], ids[3]], vec![ids[1], ids[2]]);
        m.score_a = 11;
        m.score_b = 8;
        m.is_played = true;

        let before: f64 = ids.iter().map(|&id| store.player(id).unwrap().global_elo).sum();
        settle_match(&mut store, &mut m, K, ctx()).unwrap();
        let after: f64 = ids.iter().map(|&id| store.player(id).unwrap().global_elo).sum();
        assert!((before - after).abs() < 0.02);

        let winner = store.player(ids[0]).unwrap();
        assert_eq!((winner.total_games, winner.wins, winner.losses), (1, 1, 0));
        assert_eq!(winner.elo_history.len(), 1);
        assert_eq!(winner.elo_history[0].match_id, m.id);
        let loser = store.player(ids[1]).unwrap();
        assert_eq!((loser.wins, loser.losses), (0, 1));

        assert_eq!(m.team_a_elo_before, vec![1610.0, 1402.25]);
        assert_eq!(m.team_a_elo_after[0], winner.global_elo);
        assert_eq!(store.game_match(m.id).unwrap().elo_delta, m.elo_delta);
    }

    #[test]
    fn incomplete_team_is_rejected_without_changes() {
        let (mut store, ids) = store_with([1500.0; 4]);
        let mut m = GameMatch::new("M1", Uuid::new_v4(), vec![ids[0], Uuid::new_v4()], vec![ids[1], ids[2]]);
        m.score_a = 11;
        m.is_played = true;
        assert!(matches!(
            settle_match(&mut store, &mut m, K, ctx()),
            Err(LeagueError::InvalidMatchState(_))
        ));
        assert_eq!(store.player(ids[0]).unwrap().total_games, 0);
    }
}
