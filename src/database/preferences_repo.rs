use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::models::preferences::{normalize_radius, SortOption, UserPreferences};

pub const KEY_RADIUS_KM: &str = "radius_km";
pub const KEY_SEARCH_TERM: &str = "search_term";
pub const KEY_SORT_OPTION: &str = "sort_option";
pub const KEY_FAVORITE_GYM_IDS: &str = "favorite_gym_ids";

/// Small get/set abstraction over the per-profile preference rows, so the
/// presentation pipeline can be tested against an in-memory map instead of a
/// real database.
pub trait PreferenceStore {
    async fn get(&self, profile_id: &str, key: &str) -> sqlx::Result<Option<String>>;
    async fn set(&self, profile_id: &str, key: &str, value: &str) -> sqlx::Result<()>;
}

pub struct SqlitePreferenceStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SqlitePreferenceStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        SqlitePreferenceStore { pool }
    }
}

const SQL_GET_PREFERENCE: &str = r#"
SELECT pref_value
FROM preferences
WHERE profile_id = ?1 AND pref_key = ?2
LIMIT 1
"#;

const SQL_SET_PREFERENCE: &str = r#"
INSERT INTO preferences (profile_id, pref_key, pref_value)
VALUES (?1, ?2, ?3)
ON CONFLICT (profile_id, pref_key) DO UPDATE SET pref_value = excluded.pref_value
"#;

impl PreferenceStore for SqlitePreferenceStore<'_> {
    async fn get(&self, profile_id: &str, key: &str) -> sqlx::Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(SQL_GET_PREFERENCE)
            .bind(profile_id)
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, profile_id: &str, key: &str, value: &str) -> sqlx::Result<()> {
        sqlx::query(SQL_SET_PREFERENCE)
            .bind(profile_id)
            .bind(key)
            .bind(value)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Assemble the typed preferences from the individually stored keys.
/// Missing or unreadable values fall back to defaults rather than failing
/// the page.
pub async fn load_preferences<S: PreferenceStore>(
    store: &S,
    profile_id: &str,
) -> sqlx::Result<UserPreferences> {
    let mut prefs = UserPreferences::default();

    if let Some(raw) = store.get(profile_id, KEY_RADIUS_KM).await? {
        if let Ok(radius) = serde_json::from_str::<i64>(&raw) {
            prefs.radius_km = normalize_radius(radius);
        }
    }
    if let Some(raw) = store.get(profile_id, KEY_SEARCH_TERM).await? {
        if let Ok(term) = serde_json::from_str::<String>(&raw) {
            prefs.search_term = term;
        }
    }
    if let Some(raw) = store.get(profile_id, KEY_SORT_OPTION).await? {
        if let Ok(sort) = serde_json::from_str::<String>(&raw) {
            prefs.sort_option = SortOption::parse(&sort);
        }
    }
    if let Some(raw) = store.get(profile_id, KEY_FAVORITE_GYM_IDS).await? {
        if let Ok(ids) = serde_json::from_str::<Vec<String>>(&raw) {
            prefs.favorite_gym_ids = ids.into_iter().collect();
        }
    }

    Ok(prefs)
}

pub async fn save_radius<S: PreferenceStore>(
    store: &S,
    profile_id: &str,
    radius_km: i64,
) -> sqlx::Result<()> {
    store
        .set(profile_id, KEY_RADIUS_KM, &radius_km.to_string())
        .await
}

pub async fn save_search_term<S: PreferenceStore>(
    store: &S,
    profile_id: &str,
    term: &str,
) -> sqlx::Result<()> {
    let encoded = serde_json::to_string(term).unwrap_or_else(|_| "\"\"".to_string());
    store.set(profile_id, KEY_SEARCH_TERM, &encoded).await
}

pub async fn save_sort_option<S: PreferenceStore>(
    store: &S,
    profile_id: &str,
    sort: SortOption,
) -> sqlx::Result<()> {
    let encoded = serde_json::to_string(sort.as_str()).unwrap_or_else(|_| "\"distance\"".to_string());
    store.set(profile_id, KEY_SORT_OPTION, &encoded).await
}

pub async fn save_favorites<S: PreferenceStore>(
    store: &S,
    profile_id: &str,
    favorites: &HashSet<String>,
) -> sqlx::Result<()> {
    let mut ids: Vec<&str> = favorites.iter().map(|s| s.as_str()).collect();
    ids.sort_unstable();
    let encoded = serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string());
    store.set(profile_id, KEY_FAVORITE_GYM_IDS, &encoded).await
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in for the SQLite store.
    #[derive(Default)]
    pub struct MemoryPreferenceStore {
        values: Mutex<HashMap<(String, String), String>>,
    }

    impl PreferenceStore for MemoryPreferenceStore {
        async fn get(&self, profile_id: &str, key: &str) -> sqlx::Result<Option<String>> {
            let values = self.values.lock().unwrap();
            Ok(values.get(&(profile_id.to_string(), key.to_string())).cloned())
        }

        async fn set(&self, profile_id: &str, key: &str, value: &str) -> sqlx::Result<()> {
            let mut values = self.values.lock().unwrap();
            values.insert(
                (profile_id.to_string(), key.to_string()),
                value.to_string(),
            );
            Ok(())
        }
    }

    #[tokio::test]
    async fn load_defaults_when_nothing_stored() {
        let store = MemoryPreferenceStore::default();
        let prefs = load_preferences(&store, "profile-1").await.unwrap();
        assert_eq!(prefs.radius_km, 7);
        assert_eq!(prefs.sort_option, SortOption::Distance);
        assert!(prefs.search_term.is_empty());
        assert!(prefs.favorite_gym_ids.is_empty());
    }

    #[tokio::test]
    async fn round_trips_every_key() {
        let store = MemoryPreferenceStore::default();
        save_radius(&store, "p", 15).await.unwrap();
        save_search_term(&store, "p", "cross fit").await.unwrap();
        save_sort_option(&store, "p", SortOption::Favorites)
            .await
            .unwrap();
        let favorites: HashSet<String> = ["node-1".to_string(), "way-2".to_string()].into();
        save_favorites(&store, "p", &favorites).await.unwrap();

        let prefs = load_preferences(&store, "p").await.unwrap();
        assert_eq!(prefs.radius_km, 15);
        assert_eq!(prefs.search_term, "cross fit");
        assert_eq!(prefs.sort_option, SortOption::Favorites);
        assert_eq!(prefs.favorite_gym_ids, favorites);
    }

    #[tokio::test]
    async fn unknown_radius_normalizes_to_default() {
        let store = MemoryPreferenceStore::default();
        save_radius(&store, "p", 42).await.unwrap();
        let prefs = load_preferences(&store, "p").await.unwrap();
        assert_eq!(prefs.radius_km, 7);
    }

    #[tokio::test]
    async fn profiles_do_not_share_preferences() {
        let store = MemoryPreferenceStore::default();
        save_radius(&store, "a", 20).await.unwrap();
        let other = load_preferences(&store, "b").await.unwrap();
        assert_eq!(other.radius_km, 7);
    }

    #[tokio::test]
    async fn sqlite_store_round_trip() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::database::init_schema(&pool).await.unwrap();

        let store = SqlitePreferenceStore::new(&pool);
        save_radius(&store, "p", 10).await.unwrap();
        save_radius(&store, "p", 20).await.unwrap();
        let prefs = load_preferences(&store, "p").await.unwrap();
        assert_eq!(prefs.radius_km, 20);
    }
}
