use crate::models::Coordinates;

/// Static preview image for a gym's surroundings.
pub fn static_map_url(center: Coordinates, zoom: u8) -> String {
    format!(
        "https://staticmap.openstreetmap.de/staticmap.php?center={lat},{lon}&zoom={zoom}&size=600x300&markers={lat},{lon},red-pushpin",
        lat = center.lat,
        lon = center.lon,
    )
}

/// Deep link into Google Maps directions, destination only.
pub fn google_maps_directions_url(dest: Coordinates) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}",
        dest.lat, dest.lon
    )
}

/// Deep link into the OpenStreetMap directions UI.
pub fn osm_directions_url(dest: Coordinates) -> String {
    format!(
        "https://www.openstreetmap.org/directions?to={},{}",
        dest.lat, dest.lon
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_map_embeds_center_zoom_and_marker() {
        let url = static_map_url(Coordinates { lat: 40.01, lon: -74.01 }, 16);
        assert!(url.contains("center=40.01,-74.01"));
        assert!(url.contains("zoom=16"));
        assert!(url.contains("markers=40.01,-74.01"));
    }

    #[test]
    fn direction_links_point_at_the_destination() {
        let dest = Coordinates { lat: 52.37, lon: 4.89 };
        assert!(google_maps_directions_url(dest).contains("destination=52.37,4.89"));
        assert!(osm_directions_url(dest).contains("to=52.37,4.89"));
    }
}
