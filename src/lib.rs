//! Doubles league organizer: library with models, a record store and the league logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::AppConfig;
pub use logic::{
    add_to_roster, create_gamedays, finalize_gameday, generate_gameday_plan, import_players_csv,
    league_standings, player_league_stats, purge_collection, recalculate_all_league_ranks,
    recalculate_league_ranks, record_score, register_player, set_present_players,
    AttendancePolicy, FinalizeSummary, FixedAttendance, GamedaySchedule, MatchmakingConfig,
    SkillWeightedAttendance, Standing, UniformAttendance,
};
pub use models::{
    ErrorKind, GameMatch, Gameday, GamedayId, GamedayRanking, GamedayState, League, LeagueError,
    LeagueId, MatchId, Player, PlayerId, PlayerLeagueStat, Team,
};
pub use store::{Collection, MemoryStore, RecordStore};
