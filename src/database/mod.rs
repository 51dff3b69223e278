pub mod booking_repo;
pub mod current_user_repo;
pub mod preferences_repo;
pub mod user_repo;

use sqlx::SqlitePool;

const SQL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    name TEXT,
    bio TEXT,
    city TEXT,
    country TEXT,
    avatar_image_id TEXT
);

CREATE TABLE IF NOT EXISTS bookings (
    booking_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    gym_id TEXT NOT NULL,
    gym_name TEXT NOT NULL,
    session_date TEXT NOT NULL,
    session_time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'confirmed',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS preferences (
    profile_id TEXT NOT NULL,
    pref_key TEXT NOT NULL,
    pref_value TEXT NOT NULL,
    PRIMARY KEY (profile_id, pref_key)
);

CREATE TABLE IF NOT EXISTS current_user (
    user_id TEXT PRIMARY KEY
);
"#;

/// Bootstrap the schema so a fresh database file works without a separate
/// migration step.
pub async fn init_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(SQL_SCHEMA).execute(pool).await?;
    Ok(())
}
