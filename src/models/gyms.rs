#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One gym as shown on the discovery page. Built fresh from every Overpass
/// fetch and thrown away on the next one; never written to the database.
#[derive(Debug, Clone)]
pub struct GymRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub phone: Option<String>,
    pub opening_hours: Option<String>,
    pub distance_km: Option<f64>,
}
