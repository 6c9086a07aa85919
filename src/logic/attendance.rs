//! Attendance selection: which players show up for a gameday.

use crate::models::{Player, PlayerId};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Minimum attendance a generated gameday is topped up to.
pub const DEFAULT_MIN_ATTENDANCE: usize = 15;

/// Strategy picking the present players of a gameday from a candidate pool.
///
/// Implementations return distinct ids drawn from `candidates`, never more
/// than the pool holds.
pub trait AttendancePolicy {
    fn select(&self, candidates: &[Player], min_count: usize, rng: &mut dyn RngCore)
        -> Vec<PlayerId>;
}

/// Draw a head count from a range and sample that many players uniformly.
#[derive(Clone, Debug)]
pub struct UniformAttendance {
    pub count: RangeInclusive<usize>,
}

impl Default for UniformAttendance {
    fn default() -> Self {
        Self { count: 15..=25 }
    }
}

impl AttendancePolicy for UniformAttendance {
    fn select(
        &self,
        candidates: &[Player],
        min_count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<PlayerId> {
        let (lo, hi) = (*self.count.start(), *self.count.end());
        let drawn = if lo <= hi { rng.gen_range(lo..=hi) } else { lo };
        let n = drawn.max(min_count).min(candidates.len());
        candidates.choose_multiple(rng, n).map(|p| p.id).collect()
    }
}

/// Stronger players attend more often: each player shows up with a probability
/// rising linearly with rating, clamped to [0.60, 0.95]. Topped up at random
/// to `min_count` afterwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkillWeightedAttendance;

impl SkillWeightedAttendance {
    /// Attendance probability for a rating: 1200 -> 0.60 (clamped up from 0.5), 1500 -> 0.80.
    pub fn probability(elo: f64) -> f64 {
        (0.5 + (elo - 1200.0) / 1000.0).clamp(0.60, 0.95)
    }
}

impl AttendancePolicy for SkillWeightedAttendance {
    fn select(
        &self,
        candidates: &[Player],
        min_count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<PlayerId> {
        let mut selected: Vec<PlayerId> = candidates
            .iter()
            .filter(|p| rng.gen::<f64>() <= Self::probability(p.global_elo))
            .map(|p| p.id)
            .collect();

        if selected.len() < min_count {
            let taken: HashSet<PlayerId> = selected.iter().copied().collect();
            let rest: Vec<&Player> = candidates.iter().filter(|p| !taken.contains(&p.id)).collect();
            let missing = (min_count - selected.len()).min(rest.len());
            selected.extend(rest.choose_multiple(rng, missing).map(|p| p.id));
        }
        selected
    }
}

/// A fixed, caller-chosen attendance list. Ids not in the pool are dropped.
#[derive(Clone, Debug, Default)]
pub struct FixedAttendance(pub Vec<PlayerId>);

impl AttendancePolicy for FixedAttendance {
    fn select(&self, candidates: &[Player], _min_count: usize, _rng: &mut dyn RngCore) -> Vec<PlayerId> {
        let pool: HashSet<PlayerId> = candidates.iter().map(|p| p.id).collect();
        let mut seen = HashSet::new();
        self.0
            .iter()
            .copied()
            .filter(|id| pool.contains(id) && seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(n: usize, elo: f64) -> Vec<Player> {
        (0..n).map(|i| Player::with_elo(format!("P{i}"), elo)).collect()
    }

    fn distinct(ids: &[PlayerId]) -> bool {
        ids.iter().collect::<HashSet<_>>().len() == ids.len()
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(SkillWeightedAttendance::probability(1000.0), 0.60);
        assert!((SkillWeightedAttendance::probability(1500.0) - 0.80).abs() < 1e-12);
        assert_eq!(SkillWeightedAttendance::probability(2000.0), 0.95);
    }

    #[test]
    fn uniform_draws_within_range() {
        let players = pool(40, 1500.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let ids = UniformAttendance::default().select(&players, 0, &mut rng);
            assert!((15..=25).contains(&ids.len()));
            assert!(distinct(&ids));
        }
    }

    #[test]
    fn uniform_never_exceeds_pool() {
        let players = pool(6, 1500.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(UniformAttendance::default().select(&players, 15, &mut rng).len(), 6);
    }

    #[test]
    fn weighted_tops_up_to_minimum() {
        // 0.60 attendance each; 20 players rarely yield 15 on their own.
        let players = pool(20, 1100.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let ids = SkillWeightedAttendance.select(&players, 15, &mut rng);
            assert!(ids.len() >= 15 && ids.len() <= 20);
            assert!(distinct(&ids));
        }
    }

    #[test]
    fn weighted_minimum_is_capped_by_pool() {
        let players = pool(5, 1100.0);
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(SkillWeightedAttendance.select(&players, 15, &mut rng).len(), 5);
    }

    #[test]
    fn fixed_keeps_known_ids_once() {
        let players = pool(4, 1500.0);
        let stranger = uuid::Uuid::new_v4();
        let policy = FixedAttendance(vec![players[2].id, stranger, players[0].id, players[2].id]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(policy.select(&players, 15, &mut rng), vec![players[2].id, players[0].id]);
    }
}
