//! Postgres implementation of the repository traits, one file per table.

pub mod board;
pub mod column;
pub mod comment;
pub mod role;
pub mod status;
pub mod task;
pub mod user;

use diesel::PgConnection;

use super::connection::PgPool;
use super::StoreResult;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Runs blocking diesel work on a pooled connection off the async runtime.
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut db_connection = pool.get()?;
            f(&mut db_connection)
        })
        .await?
    }
}
