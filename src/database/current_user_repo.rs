use sqlx::SqlitePool;

use crate::models::CurrentUserRow;

pub const SQL_LOAD_CURRENT_USER_ID: &str = r#"
SELECT user_id
FROM current_user
LIMIT 1
"#;

pub async fn load_current_user_id(pool: &SqlitePool) -> sqlx::Result<Option<String>> {
    let row = sqlx::query_as::<_, CurrentUserRow>(SQL_LOAD_CURRENT_USER_ID)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.user_id))
}

const SQL_REMEMBER_CURRENT_USER: &str = r#"
INSERT INTO current_user (user_id)
VALUES (?1)
ON CONFLICT (user_id) DO NOTHING
"#;

/// Remember the last signed-in user so the app stays usable when the auth
/// service is unreachable.
pub async fn remember_current_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM current_user").execute(pool).await?;
    sqlx::query(SQL_REMEMBER_CURRENT_USER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
