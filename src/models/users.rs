#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub user_id: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub avatar_image_id: Option<String>,
}
