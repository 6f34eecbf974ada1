pub mod models;

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Shared database handle: connection pool plus embedded migrations.
#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open (creating if missing) the database at `database_url` and bring
    /// the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        tracing::info!(database_url, "running database migrations");
        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    /// In-memory database for model tests. A single connection keeps every
    /// query on the same memory instance.
    pub async fn memory_db() -> DBService {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        DBService { pool }
    }
}
