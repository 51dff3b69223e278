pub mod bookings;
pub mod current_user;
pub mod gyms;
pub mod preferences;
pub mod users;

pub use bookings::BookingRow;
pub use current_user::CurrentUserRow;
pub use gyms::{Coordinates, GymRecord};
pub use preferences::{SortOption, UserPreferences};
pub use users::UsersRow;
