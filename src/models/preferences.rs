use std::collections::HashSet;

pub const RADIUS_OPTIONS_KM: [i64; 6] = [3, 5, 7, 10, 15, 20];
pub const DEFAULT_RADIUS_KM: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Distance,
    Name,
    Favorites,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Distance => "distance",
            SortOption::Name => "name",
            SortOption::Favorites => "favorites",
        }
    }

    pub fn parse(input: &str) -> SortOption {
        match input {
            "name" => SortOption::Name,
            "favorites" => SortOption::Favorites,
            _ => SortOption::Distance,
        }
    }
}

/// Per-browser-profile search preferences. Keyed by the anonymous profile
/// cookie, not the authenticated account, so two browsers see independent
/// favorites even when logged into the same account.
#[derive(Debug, Clone)]
pub struct UserPreferences {
    pub radius_km: i64,
    pub favorite_gym_ids: HashSet<String>,
    pub search_term: String,
    pub sort_option: SortOption,
}

impl Default for UserPreferences {
    fn default() -> Self {
        UserPreferences {
            radius_km: DEFAULT_RADIUS_KM,
            favorite_gym_ids: HashSet::new(),
            search_term: String::new(),
            sort_option: SortOption::Distance,
        }
    }
}

/// Anything outside the fixed radius choices falls back to the default.
pub fn normalize_radius(radius_km: i64) -> i64 {
    if RADIUS_OPTIONS_KM.contains(&radius_km) {
        radius_km
    } else {
        DEFAULT_RADIUS_KM
    }
}
