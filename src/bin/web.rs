//! Single binary web server: league, gameday and match operations via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Configuration comes from the environment
//! (or `.env`): HOST, PORT, LOG_LEVEL, ELO_SPREAD, PARTNER_PENALTY,
//! OPPONENT_PENALTY, MIN_ATTENDANCE, PLAYERS_CSV.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use gameday_league::{
    add_to_roster, create_gamedays, finalize_gameday, generate_gameday_plan, import_players_csv,
    league_standings, player_league_stats, purge_collection, recalculate_league_ranks,
    record_score, register_player, set_present_players, AppConfig, AttendancePolicy, Collection,
    ErrorKind, FixedAttendance, GamedayId, GamedaySchedule, League, LeagueError, LeagueId,
    MatchId, MemoryStore, PlayerId, RecordStore, SkillWeightedAttendance, UniformAttendance,
};
use serde::Deserialize;
use std::fs::File;
use std::sync::Mutex;

/// Records plus runtime settings. One lock serializes every mutation, so plan
/// generation and finalization of a gameday can never run concurrently.
struct AppState {
    store: MemoryStore,
    config: AppConfig,
}

type SharedState = Data<Mutex<AppState>>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateLeagueBody {
    title: String,
    #[serde(default)]
    min_game_days: u32,
    k_factor: Option<u32>,
}

#[derive(Deserialize)]
struct CreatePlayerBody {
    name: String,
    elo: Option<f64>,
}

#[derive(Deserialize)]
struct PlayerIdsBody {
    player_ids: Vec<PlayerId>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PolicyName {
    #[default]
    Uniform,
    Weighted,
}

/// Gameday batch. `player_ids` pins attendance for every created day and wins over `policy`.
#[derive(Deserialize)]
struct CreateGamedaysBody {
    count: Option<u32>,
    start_date: Option<chrono::NaiveDate>,
    courts_count: Option<u32>,
    games_per_court: Option<u32>,
    min_attendance: Option<usize>,
    #[serde(default)]
    policy: PolicyName,
    player_ids: Option<Vec<PlayerId>>,
}

#[derive(Deserialize)]
struct ScoreBody {
    score_a: u32,
    score_b: u32,
}

/// Path segment: a record id (e.g. /api/gamedays/{id})
#[derive(Deserialize)]
struct IdPath<T> {
    id: T,
}

/// Path segments: player id and league id (e.g. /api/players/{id}/leagues/{league_id})
#[derive(Deserialize)]
struct PlayerLeaguePath {
    id: PlayerId,
    league_id: LeagueId,
}

#[derive(Deserialize)]
struct CollectionPath {
    collection: String,
}

/// Map a domain error to a status code with a `{ "error": ... }` body.
fn error_response(context: &str, e: &LeagueError) -> HttpResponse {
    log::error!("{context}: {e}");
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::PreconditionViolated => HttpResponse::Conflict().json(body),
        ErrorKind::InsufficientPlayers | ErrorKind::InvalidMatchState => {
            HttpResponse::UnprocessableEntity().json(body)
        }
        ErrorKind::InvalidInput => HttpResponse::BadRequest().json(body),
        ErrorKind::Store => HttpResponse::InternalServerError().json(body),
    }
}

fn lock_error() -> HttpResponse {
    log::error!("State lock poisoned");
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "lock error" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "gameday-league",
    })
}

/// Create a league.
#[post("/api/leagues")]
async fn api_create_league(state: SharedState, body: Json<CreateLeagueBody>) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let title = body.title.trim();
    if title.is_empty() {
        return error_response("Create league", &LeagueError::InvalidInput("league title is empty".into()));
    }
    let mut league = League::new(title, body.min_game_days);
    if let Some(k) = body.k_factor {
        league = league.with_k_factor(k);
    }
    match g.store.save_league(&league) {
        Ok(()) => HttpResponse::Ok().json(&league),
        Err(e) => error_response("Create league", &e),
    }
}

/// League table in ranking order.
#[get("/api/leagues/{id}/standings")]
async fn api_league_standings(state: SharedState, path: Path<IdPath<LeagueId>>) -> HttpResponse {
    let g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match league_standings(&g.store, path.id) {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => error_response("Standings", &e),
    }
}

/// Recompute and store ranks for one league.
#[post("/api/leagues/{id}/recalculate")]
async fn api_recalculate(state: SharedState, path: Path<IdPath<LeagueId>>) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match recalculate_league_ranks(&mut g.store, path.id) {
        Ok(ranked) => HttpResponse::Ok().json(serde_json::json!({ "ranked": ranked })),
        Err(e) => error_response("Recalculate ranks", &e),
    }
}

/// Add players to a league's roster.
#[post("/api/leagues/{id}/players")]
async fn api_add_to_roster(
    state: SharedState,
    path: Path<IdPath<LeagueId>>,
    body: Json<PlayerIdsBody>,
) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match add_to_roster(&mut g.store, path.id, &body.player_ids) {
        Ok(league) => HttpResponse::Ok().json(league),
        Err(e) => error_response("Add to roster", &e),
    }
}

/// Schedule a batch of gamedays for a league.
#[post("/api/leagues/{id}/gamedays")]
async fn api_create_gamedays(
    state: SharedState,
    path: Path<IdPath<LeagueId>>,
    body: Json<CreateGamedaysBody>,
) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let defaults = GamedaySchedule::default();
    let schedule = GamedaySchedule {
        count: body.count.unwrap_or(defaults.count),
        start_date: body.start_date,
        courts_count: body.courts_count.unwrap_or(defaults.courts_count),
        games_per_court: body.games_per_court.unwrap_or(defaults.games_per_court),
        min_attendance: body.min_attendance.unwrap_or(g.config.min_attendance),
    };
    let policy: Box<dyn AttendancePolicy> = match (&body.player_ids, body.policy) {
        (Some(ids), _) => Box::new(FixedAttendance(ids.clone())),
        (None, PolicyName::Weighted) => Box::new(SkillWeightedAttendance),
        (None, PolicyName::Uniform) => Box::new(UniformAttendance::default()),
    };
    let mut rng = rand::thread_rng();
    let result = create_gamedays(&mut g.store, path.id, &schedule, policy.as_ref(), &mut rng);
    match result {
        Ok(ids) => {
            let created: Vec<_> = ids.iter().filter_map(|&id| g.store.gameday(id)).collect();
            HttpResponse::Ok().json(created)
        }
        Err(e) => error_response("Create gamedays", &e),
    }
}

/// Register a player.
#[post("/api/players")]
async fn api_create_player(state: SharedState, body: Json<CreatePlayerBody>) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match register_player(&mut g.store, &body.name, body.elo) {
        Ok(player) => HttpResponse::Ok().json(player),
        Err(e) => error_response("Register player", &e),
    }
}

/// Stored stats of one player in one league.
#[get("/api/players/{id}/leagues/{league_id}")]
async fn api_player_league_stats(state: SharedState, path: Path<PlayerLeaguePath>) -> HttpResponse {
    let g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match player_league_stats(&g.store, path.id, path.league_id) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response("Player league stats", &e),
    }
}

/// A gameday with its matches.
#[get("/api/gamedays/{id}")]
async fn api_get_gameday(state: SharedState, path: Path<IdPath<GamedayId>>) -> HttpResponse {
    let g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.store.require_gameday(path.id) {
        Ok(gameday) => {
            let matches = g.store.matches_for_gameday(gameday.id);
            HttpResponse::Ok().json(serde_json::json!({ "gameday": gameday, "matches": matches }))
        }
        Err(e) => error_response("Get gameday", &e),
    }
}

/// Replace a gameday's present players (before the plan exists).
#[put("/api/gamedays/{id}/players")]
async fn api_set_present_players(
    state: SharedState,
    path: Path<IdPath<GamedayId>>,
    body: Json<PlayerIdsBody>,
) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let result = set_present_players(&mut g.store, path.id, &body.player_ids)
        .and_then(|()| g.store.require_gameday(path.id));
    match result {
        Ok(gameday) => HttpResponse::Ok().json(gameday),
        Err(e) => error_response("Set present players", &e),
    }
}

/// Generate the gameday's match plan.
#[post("/api/gamedays/{id}/plan")]
async fn api_generate_plan(state: SharedState, path: Path<IdPath<GamedayId>>) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let config = g.config.matchmaking;
    match generate_gameday_plan(&mut g.store, path.id, config) {
        Ok(ids) => {
            let matches: Vec<_> = ids.iter().filter_map(|&id| g.store.game_match(id)).collect();
            HttpResponse::Ok().json(matches)
        }
        Err(e) => error_response("Generate plan", &e),
    }
}

/// Enter or correct a match score.
#[put("/api/matches/{id}/score")]
async fn api_record_score(
    state: SharedState,
    path: Path<IdPath<MatchId>>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match record_score(&mut g.store, path.id, body.score_a, body.score_b) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response("Record score", &e),
    }
}

/// Finalize a gameday: settle Elo, snapshot rankings, refresh league stats and ranks.
#[post("/api/gamedays/{id}/finish")]
async fn api_finish_gameday(state: SharedState, path: Path<IdPath<GamedayId>>) -> HttpResponse {
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match finalize_gameday(&mut g.store, path.id) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response("Finish gameday", &e),
    }
}

/// Delete every record of one collection.
#[delete("/api/admin/{collection}")]
async fn api_purge(state: SharedState, path: Path<CollectionPath>) -> HttpResponse {
    let collection: Collection = match path.collection.parse() {
        Ok(c) => c,
        Err(e) => return error_response("Purge", &e),
    };
    let mut g = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match purge_collection(&mut g.store, collection) {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({ "removed": removed })),
        Err(e) => error_response("Purge", &e),
    }
}

/// Seed the store from the configured roster CSV, if any. A bad file is logged, not fatal.
fn load_roster(store: &mut MemoryStore, config: &AppConfig) {
    let Some(path) = &config.players_csv else {
        return;
    };
    let result = File::open(path)
        .map_err(|e| LeagueError::Import(format!("{}: {e}", path.display())))
        .and_then(|file| import_players_csv(store, file));
    if let Err(e) = result {
        log::error!("Roster import from {} failed: {e}", path.display());
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_level.as_str()));

    let mut store = MemoryStore::new();
    load_roster(&mut store, &config);

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(Mutex::new(AppState { store, config }));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_league)
            .service(api_league_standings)
            .service(api_recalculate)
            .service(api_add_to_roster)
            .service(api_create_gamedays)
            .service(api_create_player)
            .service(api_player_league_stats)
            .service(api_get_gameday)
            .service(api_set_present_players)
            .service(api_generate_plan)
            .service(api_record_score)
            .service(api_finish_gameday)
            .service(api_purge)
    })
    .bind(bind)?
    .run()
    .await
}
