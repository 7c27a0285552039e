use sqlx::Row;
use tracing::{debug, error};

mod memory;
mod record;
mod request_error;
pub mod requests;
mod sql;
mod store;

pub use memory::{FailureSwitches, MemoryRecordStore};
pub use record::*;
pub use request_error::*;
pub use sql::SqlRecordStore;
pub use store::*;

pub type DatabasePool = sqlx::AnyPool;
