use std::time::Duration;

use sqlx::any::{AnyPoolOptions, AnyRow};

use super::*;

const COLUMNS: &str = "id, player_name, score, total_questions, time_taken, game_mode, created_at";

/// `game_records` table behind a sqlx pool. Postgres and SQLite urls are supported.
pub struct SqlRecordStore {
    pool: DatabasePool,
}

impl SqlRecordStore {
    /// Connects to `database_url` and creates the table if it is missing.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        sqlx::any::install_default_drivers();

        let pool = pool_options(database_url).connect(database_url).await?;

        let store = Self { pool };
        store.create_table(schema_for(database_url)).await?;
        Ok(store)
    }

    async fn create_table(&self, schema: &str) -> StoreResult<()> {
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }
}

fn pool_options(database_url: &str) -> AnyPoolOptions {
    if database_url.contains(":memory:") {
        // Every SQLite in-memory connection is a separate database, and the data
        // lives only as long as that one connection
        AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        AnyPoolOptions::new().max_connections(5)
    }
}

fn schema_for(database_url: &str) -> &'static str {
    if database_url.starts_with("postgres") {
        "CREATE TABLE IF NOT EXISTS game_records (
            id BIGSERIAL PRIMARY KEY,
            player_name TEXT NOT NULL,
            score BIGINT NOT NULL,
            total_questions BIGINT NOT NULL,
            time_taken BIGINT NOT NULL,
            game_mode TEXT NOT NULL,
            created_at TEXT NOT NULL
        )"
    } else {
        "CREATE TABLE IF NOT EXISTS game_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_name TEXT NOT NULL,
            score INTEGER NOT NULL,
            total_questions INTEGER NOT NULL,
            time_taken INTEGER NOT NULL,
            game_mode TEXT NOT NULL,
            created_at TEXT NOT NULL
        )"
    }
}

fn get_u32(row: &AnyRow, column: &'static str) -> StoreResult<u32> {
    let value = row.try_get::<i64, _>(column)?;
    u32::try_from(value).map_err(|error| StoreError::Decode {
        column,
        reason: error.to_string(),
    })
}

fn decode_record(row: &AnyRow) -> StoreResult<GameRecord> {
    let game_mode = row
        .try_get::<String, _>("game_mode")?
        .parse()
        .map_err(|error: UnknownGameMode| StoreError::Decode {
            column: "game_mode",
            reason: error.to_string(),
        })?;

    Ok(GameRecord {
        id: row.try_get::<RecordId, _>("id")?,
        player_name: row.try_get::<String, _>("player_name")?,
        score: get_u32(row, "score")?,
        total_questions: get_u32(row, "total_questions")?,
        time_taken: get_u32(row, "time_taken")?,
        game_mode,
        created_at: row.try_get::<String, _>("created_at")?,
    })
}

#[rocket::async_trait]
impl RecordStore for SqlRecordStore {
    async fn insert(&self, input: GameRecordInput) -> StoreResult<GameRecord> {
        let created_at = timestamp_now();
        let row = sqlx::query(
            "INSERT INTO game_records (player_name, score, total_questions, time_taken, game_mode, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(input.player_name.clone())
        .bind(i64::from(input.score))
        .bind(i64::from(input.total_questions))
        .bind(i64::from(input.time_taken))
        .bind(input.game_mode.as_str())
        .bind(created_at.clone())
        .fetch_one(&self.pool)
        .await?;

        let id = row.try_get::<RecordId, _>("id")?;
        Ok(GameRecord::from_input(id, input, created_at))
    }

    async fn select(&self, query: &RecordQuery) -> StoreResult<Vec<GameRecord>> {
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let rows = match query.mode {
            Some(mode) => {
                sqlx::query(&format!(
                    "SELECT {} FROM game_records WHERE game_mode = $1 \
                     ORDER BY score DESC, time_taken ASC LIMIT $2",
                    COLUMNS
                ))
                .bind(mode.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM game_records ORDER BY score DESC, time_taken ASC LIMIT $1",
                    COLUMNS
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(decode_record).collect()
    }

    async fn record_ids(&self) -> StoreResult<Vec<RecordId>> {
        let rows = sqlx::query("SELECT id FROM game_records")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<RecordId, _>("id").map_err(StoreError::from))
            .collect()
    }

    async fn delete(&self, predicate: &DeletePredicate) -> StoreResult<u64> {
        let response = match predicate {
            DeletePredicate::All => {
                sqlx::query("DELETE FROM game_records")
                    .execute(&self.pool)
                    .await?
            }
            DeletePredicate::Id(id) => {
                sqlx::query("DELETE FROM game_records WHERE id = $1")
                    .bind(*id)
                    .execute(&self.pool)
                    .await?
            }
            DeletePredicate::IdIn(ids) if ids.is_empty() => return Ok(0),
            DeletePredicate::IdIn(ids) => {
                let placeholders: Vec<String> =
                    (1..=ids.len()).map(|index| format!("${}", index)).collect();
                let sql = format!(
                    "DELETE FROM game_records WHERE id IN ({})",
                    placeholders.join(", ")
                );
                let mut query = sqlx::query(&sql);
                for id in ids {
                    query = query.bind(*id);
                }
                query.execute(&self.pool).await?
            }
        };

        Ok(response.rows_affected())
    }
}
