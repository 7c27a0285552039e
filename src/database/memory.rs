use std::collections::HashSet;

use tokio::sync::Mutex;

use super::{
    timestamp_now, DeletePredicate, GameRecord, GameRecordInput, RecordId, RecordQuery,
    RecordStore, StoreError, StoreResult,
};
use crate::leaderboard;

/// Operations of [`MemoryRecordStore`] that can be made to fail.
#[derive(Clone, Debug, Default)]
pub struct FailureSwitches {
    pub insert: bool,
    pub select: bool,
    pub record_ids: bool,
    pub delete_all: bool,
    pub delete_id_list: bool,
    /// Single-row deletes of these ids fail.
    pub delete_rows: HashSet<RecordId>,
    /// Bulk deletes report success but leave these ids in place.
    pub sticky_rows: HashSet<RecordId>,
}

#[derive(Default)]
struct Table {
    rows: Vec<GameRecord>,
    last_id: RecordId,
    failures: FailureSwitches,
}

/// In-process `game_records` table.
#[derive(Default)]
pub struct MemoryRecordStore {
    table: Mutex<Table>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failures(&self, failures: FailureSwitches) {
        self.table.lock().await.failures = failures;
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn unavailable(operation: &str) -> StoreError {
    StoreError::Unavailable(format!("{} is switched off", operation))
}

#[rocket::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, input: GameRecordInput) -> StoreResult<GameRecord> {
        let mut table = self.table.lock().await;
        if table.failures.insert {
            return Err(unavailable("insert"));
        }

        table.last_id += 1;
        let record = GameRecord::from_input(table.last_id, input, timestamp_now());
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn select(&self, query: &RecordQuery) -> StoreResult<Vec<GameRecord>> {
        let table = self.table.lock().await;
        if table.failures.select {
            return Err(unavailable("select"));
        }

        let mut records: Vec<GameRecord> = table
            .rows
            .iter()
            .filter(|record| query.mode.map_or(true, |mode| record.game_mode == mode))
            .cloned()
            .collect();
        records.sort_by(leaderboard::rank_order);
        records.truncate(query.limit);
        Ok(records)
    }

    async fn record_ids(&self) -> StoreResult<Vec<RecordId>> {
        let table = self.table.lock().await;
        if table.failures.record_ids {
            return Err(unavailable("record ids"));
        }

        Ok(table.rows.iter().map(|record| record.id).collect())
    }

    async fn delete(&self, predicate: &DeletePredicate) -> StoreResult<u64> {
        let mut table = self.table.lock().await;
        match predicate {
            DeletePredicate::All if table.failures.delete_all => {
                return Err(unavailable("bulk delete"))
            }
            DeletePredicate::IdIn(_) if table.failures.delete_id_list => {
                return Err(unavailable("id list delete"))
            }
            DeletePredicate::Id(id) if table.failures.delete_rows.contains(id) => {
                return Err(unavailable("row delete"))
            }
            _ => {}
        }

        let Table { rows, failures, .. } = &mut *table;
        let before = rows.len();
        rows.retain(|record| {
            let sticky = !matches!(predicate, DeletePredicate::Id(_))
                && failures.sticky_rows.contains(&record.id);
            sticky || !predicate.matches(record.id)
        });
        Ok((before - rows.len()) as u64)
    }
}
