//! League business logic: setup, matchmaking, rating, finalization, stats and ranking.

pub mod attendance;
mod finalize;
mod league_stats;
pub mod matchmaking;
mod ranking;
pub mod rating;
mod roster;
mod scores;
mod setup;

pub use attendance::{
    AttendancePolicy, FixedAttendance, SkillWeightedAttendance, UniformAttendance,
    DEFAULT_MIN_ATTENDANCE,
};
pub use finalize::{finalize_gameday, FinalizeSummary};
pub use league_stats::{
    compute_league_stats, player_league_stats, update_player_league_stats, win_percentage,
    LeagueStatSummary,
};
pub use matchmaking::{generate_gameday_plan, MatchmakingConfig};
pub use ranking::{
    league_standings, recalculate_all_league_ranks, recalculate_league_ranks, Standing,
};
pub use rating::{compute_match_delta, settle_match, HistoryContext};
pub use roster::{
    add_to_roster, import_players_csv, parse_players_csv, purge_collection, register_player,
};
pub use scores::record_score;
pub use setup::{create_gamedays, next_monday, set_present_players, GamedaySchedule};
