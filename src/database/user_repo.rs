use sqlx::SqlitePool;

use crate::models::UsersRow;

pub const SQL_LOAD_USER_PROFILE: &str = r#"
SELECT
    user_id,
    name,
    bio,
    city,
    country,
    avatar_image_id
FROM users
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn load_user_profile(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_UPSERT_USER_PROFILE: &str = r#"
INSERT INTO users (user_id, name, bio, city, country)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (user_id) DO UPDATE SET
    name = excluded.name,
    bio = excluded.bio,
    city = excluded.city,
    country = excluded.country
"#;

pub struct UserProfileUpdate<'a> {
    pub name: &'a str,
    pub bio: &'a str,
    pub city: &'a str,
    pub country: &'a str,
}

pub async fn upsert_user_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: UserProfileUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_USER_PROFILE)
        .bind(user_id)
        .bind(update.name)
        .bind(update.bio)
        .bind(update.city)
        .bind(update.country)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_then_load_profile() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::database::init_schema(&pool).await.unwrap();

        upsert_user_profile(
            &pool,
            "u-1",
            UserProfileUpdate {
                name: "Sam",
                bio: "Early riser",
                city: "Rotterdam",
                country: "NL",
            },
        )
        .await
        .unwrap();

        upsert_user_profile(
            &pool,
            "u-1",
            UserProfileUpdate {
                name: "Sam",
                bio: "Early riser",
                city: "Utrecht",
                country: "NL",
            },
        )
        .await
        .unwrap();

        let row = load_user_profile(&pool, "u-1").await.unwrap().unwrap();
        assert_eq!(row.city.as_deref(), Some("Utrecht"));
        assert!(load_user_profile(&pool, "nope").await.unwrap().is_none());
    }
}
