#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: String,
    pub user_id: String,
    pub gym_id: String,
    pub gym_name: String,
    pub session_date: String,
    pub session_time: String,
    pub status: String,
    pub created_at: String,
}
