//! Per-test Postgres databases inside one shared container.

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool, query};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

const USER: &str = "wellington_test";
const PASSWORD: &str = "wellington_test_password";

static CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);
static DROPPER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);
static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Database names are interpolated into DDL, so only plain identifiers pass.
fn is_safe_database_name(name: &str) -> bool {
    let mut chars = name.chars();

    (1..=63).contains(&name.len())
        && chars
            .next()
            .is_some_and(|first| first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

async fn start_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name("wellington_test")
        .with_tag("16-alpine")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn server_url(database: &str) -> String {
    let container = CONTAINER.get_or_init(start_container).await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}/{database}")
}

async fn start_dropper() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(name) = receiver.recv().await {
            if !is_safe_database_name(&name) {
                continue;
            }

            if let Ok(mut conn) = PgConnection::connect(&server_url("postgres").await).await {
                let dropped = query(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
                    .execute(&mut conn)
                    .await;

                if let Err(error) = dropped {
                    eprintln!("Failed to drop test database '{name}': {error}");
                }

                conn.close().await.ok();
            }
        }
    });

    sender
}

/// A freshly migrated database, dropped in the background once the value is dropped.
#[derive(Debug)]
pub(crate) struct TestDb {
    pool: PgPool,
    name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = DROPPER.get() {
            sender.send(self.name.clone()).ok();
        }
    }
}

impl TestDb {
    pub(crate) async fn new() -> Self {
        DROPPER.get_or_init(start_dropper).await;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Clock is before the Unix epoch")
            .as_nanos();

        let name = format!(
            "wellington_{nanos}_{}",
            SEQUENCE.fetch_add(1, Ordering::Relaxed)
        );

        assert!(is_safe_database_name(&name), "unsafe database name {name}");

        let mut admin = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("Failed to connect to postgres database");

        query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("Failed to create test database");

        admin.close().await.expect("Failed to close admin connection");

        let pool = PgPool::connect(&server_url(&name).await)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Self { pool, name }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(is_safe_database_name("wellington_1_2"), "plain name");
        assert!(is_safe_database_name("_leading"), "leading underscore");
    }

    #[test]
    fn rejects_names_that_need_quoting() {
        assert!(!is_safe_database_name(""), "empty");
        assert!(!is_safe_database_name("1abc"), "leading digit");
        assert!(!is_safe_database_name("has-hyphen"), "hyphen");
        assert!(!is_safe_database_name("quote\"d"), "quote");
        assert!(!is_safe_database_name(&"a".repeat(64)), "too long");
    }

    #[tokio::test]
    async fn migrated_database_has_the_registration_tables() {
        let db = TestDb::new().await;

        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema = 'public' \
             AND table_name IN ('carts', 'cart_items', 'reservations')",
        )
        .fetch_one(db.pool())
        .await
        .expect("Failed to query information schema");

        assert_eq!(count, 3, "registration tables should exist");
    }
}
