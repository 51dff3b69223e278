pub mod auth;
pub mod avatars;
pub mod booking;
pub mod gyms;
pub mod profile;
