use std::sync::Arc;

use rocket::{Build, Rocket};
use tracing::info;

pub mod admin;
pub mod config;
pub mod database;
pub mod leaderboard;
pub mod view;
#[cfg(test)]
mod tests;

use config::Config;
use database::{MemoryRecordStore, SharedStore, SqlRecordStore, StoreResult};

/// Opens the record store named by the configuration.
pub async fn connect_store(config: &Config) -> StoreResult<SharedStore> {
    match &config.database_url {
        Some(database_url) => {
            info!("connecting to the records database");
            let store = SqlRecordStore::connect(database_url).await?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryRecordStore::new())),
    }
}

/// Builds the server around an already opened store.
pub fn build(config: Config, store: SharedStore) -> Rocket<Build> {
    rocket::build()
        .mount("/", database::requests::routes())
        .manage::<SharedStore>(store)
        .manage::<Config>(config)
}
