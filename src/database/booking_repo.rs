use sqlx::SqlitePool;

use crate::models::BookingRow;

const SQL_INSERT_BOOKING: &str = r#"
INSERT INTO bookings (
  booking_id,
  user_id,
  gym_id,
  gym_name,
  session_date,
  session_time,
  status
) VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewBooking<'a> {
    pub booking_id: &'a str,
    pub user_id: &'a str,
    pub gym_id: &'a str,
    pub gym_name: &'a str,
    pub session_date: &'a str,
    pub session_time: &'a str,
}

pub async fn insert_booking(pool: &SqlitePool, booking: NewBooking<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_BOOKING)
        .bind(booking.booking_id)
        .bind(booking.user_id)
        .bind(booking.gym_id)
        .bind(booking.gym_name)
        .bind(booking.session_date)
        .bind(booking.session_time)
        .bind("confirmed")
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_BOOKINGS_FOR_USER: &str = r#"
SELECT
  booking_id,
  user_id,
  gym_id,
  gym_name,
  session_date,
  session_time,
  status,
  created_at
FROM bookings
WHERE user_id = ?1
ORDER BY session_date DESC, session_time DESC
"#;

pub async fn list_bookings_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(SQL_LIST_BOOKINGS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_list_bookings() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::database::init_schema(&pool).await.unwrap();

        let inserted = insert_booking(
            &pool,
            NewBooking {
                booking_id: "b-1",
                user_id: "u-1",
                gym_id: "node-42",
                gym_name: "Iron Temple",
                session_date: "2026-09-01",
                session_time: "18:00",
            },
        )
        .await
        .unwrap();
        assert_eq!(inserted, 1);

        let bookings = list_bookings_for_user(&pool, "u-1").await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].gym_name, "Iron Temple");
        assert_eq!(bookings[0].status, "confirmed");

        let none = list_bookings_for_user(&pool, "u-2").await.unwrap();
        assert!(none.is_empty());
    }
}
