//! Database connection management

use sqlx::{Connection, PgPool, Postgres, Transaction, migrate::MigrateError};

/// Handle to the connection pool shared by the services.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Opens a savepoint inside `tx`. Dropping the returned transaction without
/// committing rolls back to the savepoint only.
///
/// # Errors
///
/// Returns an error when the savepoint cannot be created.
pub async fn savepoint<'t>(
    tx: &'t mut Transaction<'_, Postgres>,
) -> Result<Transaction<'t, Postgres>, sqlx::Error> {
    Connection::begin(&mut **tx).await
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
