use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Coordinates, GymRecord};

pub const UNNAMED_GYM: &str = "Unnamed Gym";

const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Could not reach the gym directory: {0}")]
    Network(#[from] reqwest::Error),
    #[error("The gym directory returned an error ({status}): {body}")]
    Upstream { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct CenterPoint {
    lat: f64,
    lon: f64,
}

/// One node/way/relation as Overpass hands it back. Ways and relations carry
/// no direct lat/lon, only the computed `center`.
#[derive(Debug, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    elem_type: String,
    id: i64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<CenterPoint>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

impl RawElement {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .as_ref()
            .and_then(|tags| tags.get(name))
            .map(|v| v.as_str())
    }

    fn coordinates(&self) -> Option<Coordinates> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some(Coordinates { lat, lon });
        }
        self.center.as_ref().map(|c| Coordinates {
            lat: c.lat,
            lon: c.lon,
        })
    }
}

pub fn build_query(center: Coordinates, radius_km: i64) -> String {
    let radius_m = radius_km * 1000;
    format!(
        r#"[out:json][timeout:25];
(
  node["leisure"~"fitness_centre|gym"](around:{radius_m},{lat},{lon});
  way["leisure"~"fitness_centre|gym"](around:{radius_m},{lat},{lon});
  relation["leisure"~"fitness_centre|gym"](around:{radius_m},{lat},{lon});
);
out center;"#,
        lat = center.lat,
        lon = center.lon,
    )
}

/// One GET against the Overpass endpoint. Single attempt; a failure goes
/// straight back to the page as an inline message.
pub async fn fetch_gyms(
    client: &reqwest::Client,
    center: Coordinates,
    radius_km: i64,
) -> Result<Vec<RawElement>, QueryError> {
    let base_url =
        std::env::var("OVERPASS_API_URL").unwrap_or_else(|_| DEFAULT_OVERPASS_URL.to_string());
    let query = build_query(center, radius_km);

    let resp = client
        .get(&base_url)
        .query(&[("data", query.as_str())])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!("Overpass non-OK {}: {}", status, body);
        return Err(QueryError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: OverpassResponse = resp.json().await?;
    info!(
        "Overpass returned {} raw elements within {} km",
        parsed.elements.len(),
        radius_km
    );
    Ok(parsed.elements)
}

/// Flatten the raw elements into display records. Elements without any
/// resolvable coordinates are dropped; missing tags degrade to placeholders.
pub fn normalize(elements: Vec<RawElement>) -> Vec<GymRecord> {
    elements
        .into_iter()
        .filter_map(|elem| {
            let coordinates = elem.coordinates()?;
            Some(GymRecord {
                id: format!("{}-{}", elem.elem_type, elem.id),
                name: elem
                    .tag("name")
                    .map(str::to_string)
                    .unwrap_or_else(|| UNNAMED_GYM.to_string()),
                address: build_address(&elem),
                coordinates,
                phone: elem
                    .tag("phone")
                    .or_else(|| elem.tag("contact:phone"))
                    .map(str::to_string),
                opening_hours: elem.tag("opening_hours").map(str::to_string),
                distance_km: None,
            })
        })
        .collect()
}

fn build_address(elem: &RawElement) -> String {
    let street = elem.tag("addr:street").unwrap_or("");
    let number = elem.tag("addr:housenumber").unwrap_or("");
    let city = elem.tag("addr:city").unwrap_or("");

    let mut parts = Vec::new();
    if !street.is_empty() {
        if number.is_empty() {
            parts.push(street.to_string());
        } else {
            parts.push(format!("{} {}", street, number));
        }
    }
    if !city.is_empty() {
        parts.push(city.to_string());
    }

    if parts.is_empty() {
        return elem.tag("addr:full").unwrap_or("").to_string();
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> RawElement {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn query_selects_all_three_element_kinds_in_meters() {
        let q = build_query(Coordinates { lat: 40.0, lon: -74.0 }, 7);
        assert!(q.contains("around:7000,40,-74"));
        assert!(q.contains(r#"node["leisure"~"fitness_centre|gym"]"#));
        assert!(q.contains(r#"way["leisure"~"fitness_centre|gym"]"#));
        assert!(q.contains(r#"relation["leisure"~"fitness_centre|gym"]"#));
        assert!(q.ends_with("out center;"));
    }

    #[test]
    fn node_with_direct_coordinates_normalizes() {
        let gyms = normalize(vec![raw(serde_json::json!({
            "type": "node",
            "id": 42,
            "lat": 40.01,
            "lon": -74.01,
            "tags": {"leisure": "gym"}
        }))]);
        assert_eq!(gyms.len(), 1);
        assert_eq!(gyms[0].id, "node-42");
        assert_eq!(gyms[0].name, UNNAMED_GYM);
        assert_eq!(gyms[0].coordinates.lat, 40.01);
        assert!(gyms[0].address.is_empty());
    }

    #[test]
    fn way_falls_back_to_center_point() {
        let gyms = normalize(vec![raw(serde_json::json!({
            "type": "way",
            "id": 7,
            "center": {"lat": 40.5, "lon": -74.5},
            "tags": {"leisure": "fitness_centre", "name": "Beach Body"}
        }))]);
        assert_eq!(gyms.len(), 1);
        assert_eq!(gyms[0].id, "way-7");
        assert_eq!(gyms[0].name, "Beach Body");
        assert_eq!(gyms[0].coordinates.lat, 40.5);
        assert_eq!(gyms[0].coordinates.lon, -74.5);
    }

    #[test]
    fn element_without_any_coordinates_is_dropped() {
        let gyms = normalize(vec![raw(serde_json::json!({
            "type": "relation",
            "id": 9,
            "tags": {"name": "Ghost Gym"}
        }))]);
        assert!(gyms.is_empty());
    }

    #[test]
    fn address_prefers_street_parts_over_full_tag() {
        let with_parts = normalize(vec![raw(serde_json::json!({
            "type": "node",
            "id": 1,
            "lat": 1.0,
            "lon": 1.0,
            "tags": {
                "addr:street": "Hoofdstraat",
                "addr:housenumber": "12",
                "addr:city": "Leiden",
                "addr:full": "ignored"
            }
        }))]);
        assert_eq!(with_parts[0].address, "Hoofdstraat 12, Leiden");

        let full_only = normalize(vec![raw(serde_json::json!({
            "type": "node",
            "id": 2,
            "lat": 1.0,
            "lon": 1.0,
            "tags": {"addr:full": "Hoofdstraat 12, Leiden"}
        }))]);
        assert_eq!(full_only[0].address, "Hoofdstraat 12, Leiden");
    }

    #[test]
    fn phone_falls_back_to_contact_tag() {
        let gyms = normalize(vec![raw(serde_json::json!({
            "type": "node",
            "id": 3,
            "lat": 1.0,
            "lon": 1.0,
            "tags": {"contact:phone": "+31 10 1234567", "opening_hours": "Mo-Su 06:00-23:00"}
        }))]);
        assert_eq!(gyms[0].phone.as_deref(), Some("+31 10 1234567"));
        assert_eq!(gyms[0].opening_hours.as_deref(), Some("Mo-Su 06:00-23:00"));
    }
}
