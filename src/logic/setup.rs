//! Setup phase: schedule gamedays and manage attendance before a plan exists.

use crate::logic::attendance::{AttendancePolicy, DEFAULT_MIN_ATTENDANCE};
use crate::models::{Gameday, GamedayId, LeagueError, LeagueId, Player, PlayerId};
use crate::store::RecordStore;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use rand::RngCore;
use serde::Deserialize;
use std::collections::HashSet;

/// How to lay out a batch of new gamedays.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GamedaySchedule {
    pub count: u32,
    /// First gameday date; the next Monday when unset.
    pub start_date: Option<NaiveDate>,
    pub courts_count: u32,
    pub games_per_court: u32,
    /// Smallest pool attendance may be drawn from; each day is topped up to it.
    pub min_attendance: usize,
}

impl Default for GamedaySchedule {
    fn default() -> Self {
        Self {
            count: 16,
            start_date: None,
            courts_count: 4,
            games_per_court: 4,
            min_attendance: DEFAULT_MIN_ATTENDANCE,
        }
    }
}

/// The first Monday strictly after `today`.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(days)
}

/// Players attendance is drawn from: the league roster's active players, or
/// every active player when the roster is empty.
fn attendance_pool<S: RecordStore>(store: &S, roster: &[PlayerId]) -> Vec<Player> {
    let active = store.players().into_iter().filter(Player::is_active);
    if roster.is_empty() {
        active.collect()
    } else {
        active.filter(|p| roster.contains(&p.id)).collect()
    }
}

/// Create `schedule.count` weekly gamedays for a league, picking each day's
/// present players with `policy`. Numbering continues after the league's
/// existing gamedays.
///
/// # Errors
/// `LeagueNotFound`; `InsufficientPlayers` if the pool is smaller than
/// `schedule.min_attendance`; a store failure.
pub fn create_gamedays<S: RecordStore>(
    store: &mut S,
    league_id: LeagueId,
    schedule: &GamedaySchedule,
    policy: &dyn AttendancePolicy,
    rng: &mut dyn RngCore,
) -> Result<Vec<GamedayId>, LeagueError> {
    let league = store.require_league(league_id)?;
    let pool = attendance_pool(store, &league.players);
    if pool.len() < schedule.min_attendance {
        return Err(LeagueError::InsufficientPlayers {
            required: schedule.min_attendance,
            found: pool.len(),
        });
    }

    let existing = store.gamedays_for_league(league_id).len();
    let start = schedule
        .start_date
        .unwrap_or_else(|| next_monday(Utc::now().date_naive()));

    let mut created = Vec::with_capacity(schedule.count as usize);
    for i in 0..schedule.count {
        let date = start + Duration::weeks(i64::from(i));
        let title = format!("Gameday {}", existing + i as usize + 1);
        let mut gameday = Gameday::new(
            title,
            date,
            league_id,
            schedule.courts_count,
            schedule.games_per_court,
        );
        gameday.present_players = policy.select(&pool, schedule.min_attendance, rng);
        store.save_gameday(&gameday)?;
        log::debug!(
            "Created {} on {} with {} players",
            gameday.title,
            gameday.date,
            gameday.present_players.len()
        );
        created.push(gameday.id);
    }

    log::info!("Created {} gamedays for {}", created.len(), league.title);
    Ok(created)
}

/// Replace a gameday's present players. Only allowed before the plan is generated.
///
/// # Errors
/// `GamedayNotFound`, `PlayerNotFound`, `PlanAlreadyGenerated`/`GamedayAlreadyFinished`.
pub fn set_present_players<S: RecordStore>(
    store: &mut S,
    gameday_id: GamedayId,
    player_ids: &[PlayerId],
) -> Result<(), LeagueError> {
    let mut gameday = store.require_gameday(gameday_id)?;
    gameday.ensure_plan_pending()?;

    let mut seen = HashSet::new();
    let mut present = Vec::with_capacity(player_ids.len());
    for &id in player_ids {
        store.require_player(id)?;
        if seen.insert(id) {
            present.push(id);
        }
    }
    gameday.present_players = present;
    store.save_gameday(&gameday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_monday_is_strictly_after() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(next_monday(monday), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(next_monday(thursday), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(next_monday(sunday), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }
}
