use serde::Deserialize;
use std::collections::HashSet;

use crate::models::preferences::RADIUS_OPTIONS_KM;
use crate::models::{Coordinates, GymRecord, SortOption, UserPreferences};

/// Query string of the gyms page. Coordinates or the error code come from
/// the page script; everything else is the filter bar.
#[derive(Debug, Deserialize, Default)]
pub struct GymsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub loc_err: Option<String>,
    pub radius_km: Option<i64>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub favorites_only: Option<bool>,
}

#[derive(Clone, Default)]
pub struct AppliedGymFilters {
    pub radius_km: i64,
    pub radius_options: Vec<RadiusOptionView>,
    pub search_value: String,
    pub sort_options: Vec<SortOptionView>,
    pub favorites_only: bool,
    pub coord_label: String,
}

#[derive(Clone)]
pub struct RadiusOptionView {
    pub value: i64,
    pub selected: bool,
}

#[derive(Clone)]
pub struct SortOptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone)]
pub struct GymCardView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub distance_label: String,
    pub phone: String,
    pub opening_hours: String,
    pub is_favorite: bool,
    pub is_highlighted: bool,
}

pub fn applied_filters(
    preferences: &UserPreferences,
    favorites_only: bool,
    location: Option<Coordinates>,
) -> AppliedGymFilters {
    let sort_options = [
        (SortOption::Distance, "Nearest first"),
        (SortOption::Name, "By name"),
        (SortOption::Favorites, "Favorites first"),
    ]
    .into_iter()
    .map(|(option, label)| SortOptionView {
        value: option.as_str().to_string(),
        label: label.to_string(),
        selected: option == preferences.sort_option,
    })
    .collect();

    AppliedGymFilters {
        radius_km: preferences.radius_km,
        radius_options: RADIUS_OPTIONS_KM
            .iter()
            .map(|&value| RadiusOptionView {
                value,
                selected: value == preferences.radius_km,
            })
            .collect(),
        search_value: preferences.search_term.clone(),
        sort_options,
        favorites_only,
        coord_label: location
            .map(|loc| format!("{:.4}, {:.4}", loc.lat, loc.lon))
            .unwrap_or_default(),
    }
}

pub fn build_gym_cards(
    visible: &[GymRecord],
    favorites: &HashSet<String>,
    highlighted: &HashSet<String>,
) -> Vec<GymCardView> {
    visible
        .iter()
        .map(|gym| GymCardView {
            id: gym.id.clone(),
            name: gym.name.clone(),
            address: gym.address.clone(),
            distance_label: gym
                .distance_km
                .map(|d| format!("{:.1} km", d))
                .unwrap_or_default(),
            phone: gym.phone.clone().unwrap_or_default(),
            opening_hours: gym.opening_hours.clone().unwrap_or_default(),
            is_favorite: favorites.contains(&gym.id),
            is_highlighted: highlighted.contains(&gym.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    #[test]
    fn cards_carry_favorite_and_highlight_flags() {
        let gyms = vec![GymRecord {
            id: "node-1".to_string(),
            name: "Iron Temple".to_string(),
            address: "Hoofdstraat 12".to_string(),
            coordinates: Coordinates { lat: 40.0, lon: -74.0 },
            phone: None,
            opening_hours: Some("Mo-Su 06:00-23:00".to_string()),
            distance_km: Some(1.449),
        }];
        let favorites: HashSet<String> = ["node-1".to_string()].into();
        let highlighted: HashSet<String> = ["node-1".to_string()].into();

        let cards = build_gym_cards(&gyms, &favorites, &highlighted);
        assert_eq!(cards[0].distance_label, "1.4 km");
        assert!(cards[0].is_favorite);
        assert!(cards[0].is_highlighted);
        assert!(cards[0].phone.is_empty());
    }

    #[test]
    fn filters_reflect_preferences_and_location() {
        let prefs = UserPreferences::default();
        let filters = applied_filters(
            &prefs,
            true,
            Some(Coordinates { lat: 40.0, lon: -74.0 }),
        );
        assert_eq!(filters.radius_km, 7);
        assert!(filters.favorites_only);
        assert_eq!(filters.coord_label, "40.0000, -74.0000");

        let selected_radii: Vec<i64> = filters
            .radius_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected_radii, vec![7]);

        let selected_sorts: Vec<&str> = filters
            .sort_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected_sorts, vec!["distance"]);
    }
}
