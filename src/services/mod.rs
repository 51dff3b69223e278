pub mod booking_wizard;
pub mod geo;
pub mod geolocation;
pub mod gym_browse_service;
pub mod maps;
pub mod overpass;
pub mod presentation;
pub mod profile_service;
