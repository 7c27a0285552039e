use super::*;

/// Largest leaderboard a single query may ask for.
pub const MAX_LIMIT: usize = 100;

/// Default leaderboard size.
pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Decode { column: &'static str, reason: String },
    Unavailable(String),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(error) => Some(error),
            _ => None,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(error) => write!(f, "database request failed: {}", error),
            Self::Decode { column, reason } => {
                write!(f, "failed to decode column {}: {}", column, reason)
            }
            Self::Unavailable(reason) => write!(f, "record store is unavailable: {}", reason),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error)
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Selection of records: optional mode filter, ordered by score descending
/// then time ascending, truncated to `limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordQuery {
    pub mode: Option<GameMode>,
    pub limit: usize,
}

impl RecordQuery {
    pub fn new(mode: Option<GameMode>, limit: usize) -> Self {
        Self {
            mode,
            limit: limit.min(MAX_LIMIT),
        }
    }
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self::new(None, DEFAULT_LIMIT)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeletePredicate {
    All,
    Id(RecordId),
    IdIn(Vec<RecordId>),
}

impl DeletePredicate {
    pub fn matches(&self, id: RecordId) -> bool {
        match self {
            Self::All => true,
            Self::Id(target) => *target == id,
            Self::IdIn(ids) => ids.contains(&id),
        }
    }
}

/// Access to the `game_records` table.
#[rocket::async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts one row and returns it as stored.
    async fn insert(&self, input: GameRecordInput) -> StoreResult<GameRecord>;

    async fn select(&self, query: &RecordQuery) -> StoreResult<Vec<GameRecord>>;

    async fn record_ids(&self) -> StoreResult<Vec<RecordId>>;

    /// Returns the number of deleted rows.
    async fn delete(&self, predicate: &DeletePredicate) -> StoreResult<u64>;
}

pub type SharedStore = std::sync::Arc<dyn RecordStore>;

/// Validates and stores a finished game.
pub async fn save(store: &dyn RecordStore, input: GameRecordInput) -> RequestResult<GameRecord> {
    let input = input
        .validate()
        .map_err(|reason| RequestError::InvalidRecord { reason })?;

    match store.insert(input).await {
        Ok(record) => {
            debug!(id = record.id, mode = %record.game_mode, "saved game record");
            Ok(record)
        }
        Err(error) => {
            error!("failed to save a game record: {}", error);
            Err(error.into())
        }
    }
}

/// Fetches the best `limit` records, optionally for a single mode.
pub async fn top_records(
    store: &dyn RecordStore,
    mode: Option<GameMode>,
    limit: usize,
) -> StoreResult<Vec<GameRecord>> {
    let query = RecordQuery::new(mode, limit);
    store.select(&query).await.map_err(|error| {
        error!("failed to fetch top records: {}", error);
        error
    })
}
