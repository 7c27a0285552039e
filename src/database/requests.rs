use rocket::serde::{json::Json, Serialize};
use rocket::{delete, get, post, routes, Route, State};
use tokio::time::Instant;
use tracing::{error, warn};

use crate::admin::{AdminKey, ClearFailure, ClearFlow, ClearReport};
use crate::config::Config;
use crate::leaderboard::Leaderboard;
use crate::view::LeaderboardView;

use super::{
    save, top_records, GameMode, GameRecord, GameRecordInput, RequestError, RequestResult,
    SharedStore, StoreError, MAX_LIMIT,
};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ModeInfo {
    pub mode: GameMode,
    pub title: &'static str,
    pub description: &'static str,
}

// Query values are taken as raw strings: a value that fails to parse must be
// rejected, not treated as absent.
fn parse_mode(mode: Option<&str>) -> RequestResult<Option<GameMode>> {
    mode.map(str::parse::<GameMode>)
        .transpose()
        .map_err(|error| RequestError::InvalidQuery {
            reason: error.to_string(),
        })
}

fn parse_limit(limit: Option<&str>, config: &Config) -> RequestResult<usize> {
    let limit = match limit {
        Some(limit) => limit
            .trim()
            .parse::<usize>()
            .map_err(|_| RequestError::InvalidQuery {
                reason: format!("limit must be a non-negative integer, got {:?}", limit),
            })?,
        None => config.leaderboard_limit,
    };
    Ok(limit.min(MAX_LIMIT))
}

#[get("/")]
pub fn index() -> &'static str {
    "This is the geography quiz leaderboard server!"
}

/// Lists the quiz modes a record can be submitted for.
#[get("/modes")]
pub fn modes() -> Json<Vec<ModeInfo>> {
    let modes = GameMode::ALL
        .into_iter()
        .map(|mode| ModeInfo {
            mode,
            title: mode.title(),
            description: mode.description(),
        })
        .collect();
    Json(modes)
}

/// Stores the result of a finished quiz and returns the stored record.
#[post("/records", format = "json", data = "<record>")]
pub async fn save_record(
    record: Json<GameRecordInput>,
    database: &State<SharedStore>,
) -> RequestResult<Json<GameRecord>> {
    let record = save(database.inner().as_ref(), record.0).await?;
    Ok(Json(record))
}

/// Fetches the best records in ranking order, for one mode when `mode` is given.
#[get("/records?<mode>&<limit>")]
pub async fn get_records(
    mode: Option<&str>,
    limit: Option<&str>,
    database: &State<SharedStore>,
    config: &State<Config>,
) -> RequestResult<Json<Vec<GameRecord>>> {
    let mode = parse_mode(mode)?;
    let limit = parse_limit(limit, config.inner())?;
    let records = top_records(database.inner().as_ref(), mode, limit).await?;
    Ok(Json(records))
}

/// Ranked leaderboard of a single mode.
#[get("/leaderboard/<mode>?<limit>")]
pub async fn get_leaderboard(
    mode: GameMode,
    limit: Option<&str>,
    database: &State<SharedStore>,
    config: &State<Config>,
) -> RequestResult<Json<Leaderboard>> {
    let mut view = LeaderboardView::new(mode, parse_limit(limit, config.inner())?);

    match view.load(database.inner().as_ref()).await {
        Ok(leaderboard) => Ok(Json(leaderboard.clone())),
        Err(message) => {
            warn!("{}", message);
            Err(RequestError::Store(StoreError::Unavailable(message.clone())))
        }
    }
}

/// Deletes every record when the `api-key` header holds the admin password.
/// Returns how many records were removed out of how many there were.
#[delete("/records")]
pub async fn clear_records(
    api_key: AdminKey<'_>,
    database: &State<SharedStore>,
    config: &State<Config>,
) -> RequestResult<Json<ClearReport>> {
    let mut flow = ClearFlow::new(config.clear_reset_delay);
    flow.enter_password(api_key.0);
    let outcome = flow
        .submit(
            database.inner().as_ref(),
            &config.master_password,
            Instant::now(),
        )
        .await;

    match outcome {
        Ok(report) => {
            if !report.complete() {
                warn!(
                    "leaderboard only partially cleared: {}/{}",
                    report.deleted, report.total
                );
            }
            Ok(Json(report))
        }
        Err(ClearFailure::MissingPassword) => Err(RequestError::MissingPassword),
        Err(ClearFailure::WrongPassword) => Err(RequestError::Unauthorized),
        Err(ClearFailure::Store(error)) => {
            error!("failed to clear the leaderboard: {}", error);
            Err(RequestError::Store(error))
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        index,
        modes,
        save_record,
        get_records,
        get_leaderboard,
        clear_records
    ]
}
