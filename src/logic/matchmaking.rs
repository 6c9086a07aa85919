//! Gameday plan generation: balanced, diverse doubles matches across rounds.
//!
//! Each round picks a seed (the player who has played least today, then least
//! in the league overall), finds three partners close to the seed's rating
//! while avoiding repeat partners and opponents, and splits the four by power
//! pairing: strongest + weakest against the middle two.
//!
//! Fairness state (games today, partners, opponents) lives only for the
//! duration of one plan generation and is never persisted.

use crate::models::{GameMatch, GamedayId, LeagueError, MatchId, PlayerId};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Players needed for one doubles match.
pub const PLAYERS_PER_MATCH: usize = 4;

/// Tuning knobs for partner selection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchmakingConfig {
    /// Maximum rating distance from the seed for preferred candidates.
    pub elo_spread: f64,
    /// Added to a candidate's score if they already partnered the seed today.
    pub partner_penalty: f64,
    /// Added to a candidate's score if they already opposed the seed today.
    pub opponent_penalty: f64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            elo_spread: 150.0,
            partner_penalty: 1000.0,
            opponent_penalty: 500.0,
        }
    }
}

/// A present player as seen by the planner.
#[derive(Clone, Debug, PartialEq)]
pub struct Entrant {
    pub id: PlayerId,
    pub elo: f64,
    /// Matches already played in this league; lower gets priority.
    pub league_matches: u32,
}

/// Two teams of two produced for one round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pairing {
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
}

impl Pairing {
    pub fn players(&self) -> [PlayerId; 4] {
        [self.team_a[0], self.team_a[1], self.team_b[0], self.team_b[1]]
    }
}

/// Per-player state carried across rounds.
#[derive(Clone, Debug)]
struct Slot {
    entrant: Entrant,
    games_today: u32,
    partners_today: Vec<PlayerId>,
    opponents_today: Vec<PlayerId>,
}

/// Round-by-round match builder over a fixed set of entrants.
#[derive(Clone, Debug)]
pub struct Planner {
    slots: Vec<Slot>,
    config: MatchmakingConfig,
}

impl Planner {
    /// Repeated ids are dropped, keeping the first occurrence.
    ///
    /// # Errors
    /// `InsufficientPlayers` with fewer than four distinct entrants.
    pub fn new(entrants: Vec<Entrant>, config: MatchmakingConfig) -> Result<Self, LeagueError> {
        let mut seen = HashSet::new();
        let entrants: Vec<Entrant> = entrants
            .into_iter()
            .filter(|e| {
                let first = seen.insert(e.id);
                if !first {
                    log::warn!("Entrant {} listed twice, ignoring the repeat", e.id);
                }
                first
            })
            .collect();
        if entrants.len() < PLAYERS_PER_MATCH {
            return Err(LeagueError::InsufficientPlayers {
                required: PLAYERS_PER_MATCH,
                found: entrants.len(),
            });
        }
        let slots = entrants
            .into_iter()
            .map(|entrant| Slot {
                entrant,
                games_today: 0,
                partners_today: Vec::new(),
                opponents_today: Vec::new(),
            })
            .collect();
        Ok(Self { slots, config })
    }

    /// Games assigned so far to a player in this plan.
    pub fn games_today(&self, id: PlayerId) -> Option<u32> {
        self.slots
            .iter()
            .find(|s| s.entrant.id == id)
            .map(|s| s.games_today)
    }

    /// Build the next round's match and record it in the fairness state.
    /// Returns `None` if no four players could be found.
    pub fn next_match(&mut self) -> Option<Pairing> {
        let quartet = self.select_quartet()?;
        let pairing = self.power_pair(quartet);
        self.record(quartet, &pairing);
        Some(pairing)
    }

    /// Slot indices ordered by games today, then league matches. Stable, so
    /// remaining ties keep attendance order.
    fn by_priority(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        order.sort_by_key(|&i| (self.slots[i].games_today, self.slots[i].entrant.league_matches));
        order
    }

    fn select_quartet(&self) -> Option<[usize; 4]> {
        let ordered = self.by_priority();
        let min_games = ordered.first().map(|&i| self.slots[i].games_today)?;
        let eligible: Vec<usize> = ordered
            .iter()
            .copied()
            .filter(|&i| self.slots[i].games_today <= min_games + 1)
            .collect();

        if eligible.len() < PLAYERS_PER_MATCH {
            // Extreme imbalance: just take whoever has played least.
            return to_quartet(&ordered);
        }

        let seed_idx = eligible[0];
        let seed = &self.slots[seed_idx];
        let others: Vec<usize> = eligible.iter().copied().filter(|&i| i != seed_idx).collect();

        let within_band: Vec<usize> = others
            .iter()
            .copied()
            .filter(|&i| (self.slots[i].entrant.elo - seed.entrant.elo).abs() <= self.config.elo_spread)
            .collect();
        let candidates = if within_band.len() < PLAYERS_PER_MATCH - 1 {
            others.clone()
        } else {
            within_band
        };

        let mut scored: Vec<(usize, f64)> = candidates
            .iter()
            .map(|&i| (i, self.selection_score(seed, &self.slots[i])))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut picked: Vec<usize> = std::iter::once(seed_idx)
            .chain(scored.iter().take(PLAYERS_PER_MATCH - 1).map(|&(i, _)| i))
            .collect();

        if picked.len() < PLAYERS_PER_MATCH {
            let mut rest: Vec<usize> = others.into_iter().filter(|i| !picked.contains(i)).collect();
            rest.sort_by_key(|&i| self.slots[i].games_today);
            let missing = PLAYERS_PER_MATCH - picked.len();
            picked.extend(rest.into_iter().take(missing));
        }
        to_quartet(&picked)
    }

    /// Lower is better: rating distance plus repeat penalties.
    fn selection_score(&self, seed: &Slot, candidate: &Slot) -> f64 {
        let id = candidate.entrant.id;
        let mut score = (candidate.entrant.elo - seed.entrant.elo).abs();
        if seed.partners_today.contains(&id) {
            score += self.config.partner_penalty;
        }
        if seed.opponents_today.contains(&id) {
            score += self.config.opponent_penalty;
        }
        score
    }

    fn power_pair(&self, quartet: [usize; 4]) -> Pairing {
        let players = quartet.map(|i| (self.slots[i].entrant.id, self.slots[i].entrant.elo));
        power_pair(players)
    }

    fn record(&mut self, quartet: [usize; 4], pairing: &Pairing) {
        for i in quartet {
            let slot = &mut self.slots[i];
            let id = slot.entrant.id;
            let (own, other) = if pairing.team_a.contains(&id) {
                (pairing.team_a, pairing.team_b)
            } else {
                (pairing.team_b, pairing.team_a)
            };
            slot.games_today += 1;
            slot.partners_today.extend(own.iter().copied().filter(|&p| p != id));
            slot.opponents_today.extend(other);
        }
    }
}

fn to_quartet(indices: &[usize]) -> Option<[usize; 4]> {
    match indices {
        [a, b, c, d, ..] => Some([*a, *b, *c, *d]),
        _ => None,
    }
}

/// Split four players into two teams: strongest + weakest against the middle two.
pub fn power_pair(players: [(PlayerId, f64); 4]) -> Pairing {
    let mut sorted = players;
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    let [p0, p1, p2, p3] = sorted;
    Pairing {
        team_a: [p0.0, p3.0],
        team_b: [p1.0, p2.0],
    }
}

/// Plan `total_matches` rounds.
///
/// With four or more distinct entrants every round fields a match. A round
/// that still comes up empty is logged and left out instead of failing the plan.
///
/// # Errors
/// `InsufficientPlayers` with fewer than four distinct entrants.
pub fn plan_matches(
    entrants: Vec<Entrant>,
    total_matches: usize,
    config: MatchmakingConfig,
) -> Result<Vec<Pairing>, LeagueError> {
    let mut planner = Planner::new(entrants, config)?;
    let mut pairings = Vec::with_capacity(total_matches);
    for round in 1..=total_matches {
        match planner.next_match() {
            Some(p) => pairings.push(p),
            None => log::warn!("Not enough players for match {round}, skipping"),
        }
    }
    Ok(pairings)
}

/// Generate the match plan for a gameday and store it. One-way: fails if a plan exists.
///
/// Present players are prioritised by their match count in the gameday's league,
/// not their global game count.
///
/// # Errors
/// `GamedayNotFound`/`LeagueNotFound`, `PlanAlreadyGenerated` (or `GamedayAlreadyFinished`),
/// `InsufficientPlayers` with fewer than four present players. Nothing is written on error.
pub fn generate_gameday_plan<S: RecordStore>(
    store: &mut S,
    gameday_id: GamedayId,
    config: MatchmakingConfig,
) -> Result<Vec<MatchId>, LeagueError> {
    let mut gameday = store.require_gameday(gameday_id)?;
    gameday.ensure_plan_pending()?;
    let league = store.require_league(gameday.league)?;

    let entrants: Vec<Entrant> = gameday
        .present_players
        .iter()
        .filter_map(|&id| {
            let player = store.player(id);
            if player.is_none() {
                log::warn!("Present player {id} on gameday {gameday_id} not found, ignoring");
            }
            player
        })
        .map(|p| Entrant {
            id: p.id,
            elo: p.global_elo,
            league_matches: p.league_match_count(league.id),
        })
        .collect();

    let pairings = plan_matches(entrants, gameday.total_matches(), config)?;
    let matches: Vec<GameMatch> = pairings
        .iter()
        .enumerate()
        .map(|(i, p)| {
            GameMatch::new(
                format!("{} - Match {}", gameday.title, i + 1),
                gameday.id,
                p.team_a.to_vec(),
                p.team_b.to_vec(),
            )
        })
        .collect();

    let ids: Vec<MatchId> = matches.iter().map(|m| m.id).collect();
    gameday.record_plan(ids.clone())?;
    for m in &matches {
        store.save_match(m)?;
    }
    store.save_gameday(&gameday)?;

    log::info!(
        "Generated plan for {}: {} of {} matches",
        gameday.title,
        ids.len(),
        gameday.total_matches()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn entrants(elos: &[f64]) -> Vec<Entrant> {
        elos.iter()
            .map(|&elo| Entrant {
                id: Uuid::new_v4(),
                elo,
                league_matches: 0,
            })
            .collect()
    }

    fn avg_gap(a: [f64; 2], b: [f64; 2]) -> f64 {
        ((a[0] + a[1]) / 2.0 - (b[0] + b[1]) / 2.0).abs()
    }

    #[test]
    fn power_pairing_puts_extremes_together() {
        let ids: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let p = power_pair([(ids[0], 1480.0), (ids[1], 1650.0), (ids[2], 1520.0), (ids[3], 1580.0)]);
        assert_eq!(p.team_a, [ids[1], ids[0]]);
        assert_eq!(p.team_b, [ids[3], ids[2]]);
    }

    #[test]
    fn power_pairing_never_worse_than_adjacent_split() {
        let quartets = [
            [1800.0, 1700.0, 1600.0, 1500.0],
            [1900.0, 1890.0, 1200.0, 1100.0],
            [1500.0, 1500.0, 1500.0, 1500.0],
            [2000.0, 1510.0, 1500.0, 1490.0],
            [1650.0, 1580.0, 1520.0, 1480.0],
        ];
        for q in quartets {
            let power = avg_gap([q[0], q[3]], [q[1], q[2]]);
            let adjacent = avg_gap([q[0], q[1]], [q[2], q[3]]);
            assert!(power <= adjacent + 1e-9, "{q:?}");
        }
    }

    #[test]
    fn fewer_than_four_entrants_is_rejected() {
        assert!(matches!(
            plan_matches(entrants(&[1500.0; 3]), 1, MatchmakingConfig::default()),
            Err(LeagueError::InsufficientPlayers { required: 4, found: 3 })
        ));
    }

    #[test]
    fn repeated_entrant_does_not_count_twice() {
        let mut pool = entrants(&[1500.0; 3]);
        pool.push(pool[0].clone());
        assert!(matches!(
            plan_matches(pool, 1, MatchmakingConfig::default()),
            Err(LeagueError::InsufficientPlayers { required: 4, found: 3 })
        ));
    }

    #[test]
    fn every_match_has_four_distinct_players() {
        let pool = entrants(&[1200.0, 1250.0, 1400.0, 1480.0, 1500.0, 1520.0, 1600.0, 1750.0, 1800.0]);
        let pairings = plan_matches(pool, 12, MatchmakingConfig::default()).unwrap();
        assert_eq!(pairings.len(), 12);
        for p in &pairings {
            let mut ids = p.players().to_vec();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 4);
        }
    }

    #[test]
    fn games_stay_within_one_of_each_other() {
        let pool = entrants(&[1300.0, 1350.0, 1420.0, 1500.0, 1510.0, 1590.0, 1660.0, 1700.0, 1720.0, 1800.0]);
        let ids: Vec<PlayerId> = pool.iter().map(|e| e.id).collect();
        let mut planner = Planner::new(pool, MatchmakingConfig::default()).unwrap();
        for _ in 0..15 {
            planner.next_match().unwrap();
            let games: Vec<u32> = ids.iter().filter_map(|&id| planner.games_today(id)).collect();
            let min = games.iter().min().copied().unwrap_or(0);
            let max = games.iter().max().copied().unwrap_or(0);
            assert!(max - min <= 2);
        }
        let total: u32 = ids.iter().filter_map(|&id| planner.games_today(id)).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn seed_prefers_fewer_league_matches() {
        let mut pool = entrants(&[1500.0; 5]);
        pool[0].league_matches = 9;
        pool[1].league_matches = 3;
        pool[2].league_matches = 0;
        pool[3].league_matches = 5;
        pool[4].league_matches = 7;
        let veteran = pool[0].id;
        let pairings = plan_matches(pool, 1, MatchmakingConfig::default()).unwrap();
        assert!(!pairings[0].players().contains(&veteran));
    }

    #[test]
    fn repeat_partners_are_avoided_when_possible() {
        // Eight equal players, four rounds: penalties keep repeat partnerships rare.
        let pool = entrants(&[1500.0; 8]);
        let pairings = plan_matches(pool, 4, MatchmakingConfig::default()).unwrap();
        let mut partner_counts: HashMap<(PlayerId, PlayerId), u32> = HashMap::new();
        for p in &pairings {
            for team in [p.team_a, p.team_b] {
                let key = if team[0] < team[1] { (team[0], team[1]) } else { (team[1], team[0]) };
                *partner_counts.entry(key).or_default() += 1;
            }
        }
        let repeats = partner_counts.values().filter(|&&n| n > 1).count();
        assert!(repeats <= 1, "{partner_counts:?}");
    }

    #[test]
    fn rating_band_groups_similar_players() {
        let mut pool = entrants(&[1200.0, 1210.0, 1220.0, 1230.0]);
        pool.extend(entrants(&[1800.0, 1810.0, 1820.0, 1830.0]));
        let low: Vec<PlayerId> = pool[..4].iter().map(|e| e.id).collect();
        let pairings = plan_matches(pool, 2, MatchmakingConfig::default()).unwrap();
        for p in &pairings {
            let lows = p.players().iter().filter(|id| low.contains(id)).count();
            assert!(lows == 0 || lows == 4);
        }
    }
}
