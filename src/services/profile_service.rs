use sqlx::SqlitePool;

use crate::database::user_repo::{self, UserProfileUpdate};

pub struct UserProfileView {
    pub name: String,
    pub bio: String,
    pub city: String,
    pub country: String,
    pub location_label: String,
    pub avatar_image_id: String,
}

pub async fn load_user_profile_view(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<UserProfileView> {
    let Some(row) = user_repo::load_user_profile(pool, user_id).await? else {
        // First visit: the auth service knows the account, our store does not
        // have a profile row yet. Render an empty, editable profile.
        return Ok(UserProfileView {
            name: String::new(),
            bio: String::new(),
            city: String::new(),
            country: String::new(),
            location_label: String::new(),
            avatar_image_id: String::new(),
        });
    };

    let city = row.city.unwrap_or_default();
    let country = row.country.unwrap_or_default();
    Ok(UserProfileView {
        location_label: build_location_label(city.trim(), country.trim()),
        name: row.name.unwrap_or_default(),
        bio: row.bio.unwrap_or_default(),
        city,
        country,
        avatar_image_id: row.avatar_image_id.unwrap_or_default(),
    })
}

pub async fn update_user_profile(
    pool: &SqlitePool,
    user_id: &str,
    name: &str,
    bio: &str,
    city: &str,
    country: &str,
) -> sqlx::Result<()> {
    user_repo::upsert_user_profile(
        pool,
        user_id,
        UserProfileUpdate {
            name: name.trim(),
            bio: bio.trim(),
            city: city.trim(),
            country: country.trim(),
        },
    )
    .await?;
    Ok(())
}

fn build_location_label(city: &str, country: &str) -> String {
    match (city.is_empty(), country.is_empty()) {
        (false, false) => format!("{}, {}", city, country),
        (false, true) => city.to_string(),
        (true, false) => country.to_string(),
        (true, true) => String::new(),
    }
}
