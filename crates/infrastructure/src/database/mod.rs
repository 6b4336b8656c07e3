pub mod sqlite;

use despacho_errors::DispatchResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Opens (creating if missing) an embedded SQLite database with WAL and
/// foreign keys enabled, and applies the schema.
pub async fn connect_embedded(database_url: &str, max_connections: u32) -> DispatchResult<SqlitePool> {
    debug!("opening embedded database at {database_url}");

    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .connect_with(connect_options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Creates the tables and indexes. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DispatchResult<()> {
    debug!("running database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hubs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            radius_meters REAL NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bindings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hub_id INTEGER NOT NULL REFERENCES hubs(id),
            professional_id TEXT NOT NULL,
            display_name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS queue_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hub_id INTEGER NOT NULL REFERENCES hubs(id),
            professional_id TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'WAITING',
            position INTEGER,
            entered_at DATETIME NOT NULL,
            dispatched_at DATETIME,
            returned_at DATETIME,
            checkin_latitude REAL NOT NULL,
            checkin_longitude REAL NOT NULL,
            single_ride INTEGER NOT NULL DEFAULT 0,
            original_position INTEGER,
            position_reason TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS history_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hub_id INTEGER NOT NULL,
            hub_name TEXT NOT NULL,
            professional_id TEXT NOT NULL,
            display_name TEXT NOT NULL,
            action TEXT NOT NULL,
            wait_minutes INTEGER,
            en_route_minutes INTEGER,
            note TEXT,
            admin_id TEXT,
            occurred_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            professional_id TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,
            message TEXT NOT NULL,
            payload TEXT NOT NULL DEFAULT '{}',
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bindings_active_professional ON bindings(professional_id) WHERE active = 1",
        "CREATE INDEX IF NOT EXISTS idx_bindings_hub ON bindings(hub_id)",
        "CREATE INDEX IF NOT EXISTS idx_queue_entries_hub_status ON queue_entries(hub_id, status)",
        "CREATE INDEX IF NOT EXISTS idx_queue_entries_hub_position ON queue_entries(hub_id, position)",
        "CREATE INDEX IF NOT EXISTS idx_history_hub_occurred ON history_events(hub_id, occurred_at)",
        "CREATE INDEX IF NOT EXISTS idx_history_action ON history_events(action)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("database migrations completed");
    Ok(())
}
