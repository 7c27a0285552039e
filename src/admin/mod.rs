use rand::{distributions::Alphanumeric, Rng};
use rocket::serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::database::{DeletePredicate, RecordStore, StoreError};

mod flow;
mod guard;

pub use flow::*;
pub use guard::*;

/// Secret that authorizes clearing the leaderboard. Never serialized or logged.
#[derive(Clone)]
pub struct MasterPassword {
    key: String,
}

impl MasterPassword {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// A random alphanumeric secret of `length` characters.
    pub fn generate(length: usize) -> Self {
        let mut rng = rand::thread_rng();
        let key = (0..length)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self { key }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && candidate == self.key
    }
}

impl std::fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterPassword(***)")
    }
}

#[derive(Debug)]
pub enum ClearFailure {
    MissingPassword,
    WrongPassword,
    Store(StoreError),
}

impl std::error::Error for ClearFailure {}

impl std::fmt::Display for ClearFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPassword => write!(f, "please enter the admin password"),
            Self::WrongPassword => write!(f, "incorrect admin password"),
            Self::Store(error) => write!(f, "failed to delete records: {}", error),
        }
    }
}

/// How the rows ended up being removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ClearStrategy {
    Bulk,
    IdList,
    RowByRow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ClearReport {
    pub strategy: ClearStrategy,
    pub deleted: u64,
    pub total: u64,
}

impl ClearReport {
    pub fn complete(&self) -> bool {
        self.deleted >= self.total
    }
}

/// Checks `password` against `secret`.
pub fn check_password(secret: &MasterPassword, password: &str) -> Result<(), ClearFailure> {
    if password.is_empty() {
        return Err(ClearFailure::MissingPassword);
    }
    if !secret.matches(password) {
        warn!("rejected an attempt to clear the leaderboard with a wrong password");
        return Err(ClearFailure::WrongPassword);
    }
    Ok(())
}

/// Checks `password` against `secret` and deletes every record.
pub async fn clear_all(
    store: &dyn RecordStore,
    secret: &MasterPassword,
    password: &str,
) -> Result<ClearReport, ClearFailure> {
    check_password(secret, password)?;
    delete_all_records(store).await
}

/// Deletes every record without any password check.
///
/// A single bulk delete is tried first. When it fails, the ids are fetched and
/// deleted as one list, and when that fails too, one by one. Rows that fail to
/// delete are only counted.
pub async fn delete_all_records(store: &dyn RecordStore) -> Result<ClearReport, ClearFailure> {
    let report = match store.delete(&DeletePredicate::All).await {
        Ok(deleted) => {
            let remaining = match store.record_ids().await {
                Ok(ids) => ids.len() as u64,
                Err(check_error) => {
                    warn!("could not count records left after a bulk delete: {}", check_error);
                    0
                }
            };
            ClearReport {
                strategy: ClearStrategy::Bulk,
                deleted,
                total: deleted + remaining,
            }
        }
        Err(bulk_error) => {
            error!("bulk delete failed, falling back to deleting by id: {}", bulk_error);
            delete_by_ids(store).await?
        }
    };

    info!(
        strategy = ?report.strategy,
        "cleared {}/{} game records",
        report.deleted,
        report.total
    );
    Ok(report)
}

async fn delete_by_ids(store: &dyn RecordStore) -> Result<ClearReport, ClearFailure> {
    let ids = store.record_ids().await.map_err(ClearFailure::Store)?;
    let total = ids.len() as u64;

    match store.delete(&DeletePredicate::IdIn(ids.clone())).await {
        Ok(deleted) => {
            return Ok(ClearReport {
                strategy: ClearStrategy::IdList,
                deleted,
                total,
            })
        }
        Err(list_error) => error!("id list delete failed: {}", list_error),
    }

    let mut deleted = 0;
    for id in ids {
        match store.delete(&DeletePredicate::Id(id)).await {
            Ok(count) => deleted += count,
            Err(row_error) => error!("failed to delete record {}: {}", id, row_error),
        }
    }

    Ok(ClearReport {
        strategy: ClearStrategy::RowByRow,
        deleted,
        total,
    })
}
