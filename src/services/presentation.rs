use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::models::{Coordinates, GymRecord, SortOption, UserPreferences};
use crate::services::geo::haversine_km;

pub const FAVORITE_HIGHLIGHT: Duration = Duration::from_millis(400);

/// Build the visible gym list from the latest fetch. The stages run in a
/// fixed order: distance annotation and radius cut, favorites-only filter,
/// substring filter on the debounced term, then the selected sort.
pub fn apply(
    gyms: &[GymRecord],
    preferences: &UserPreferences,
    location: Coordinates,
    debounced_term: &str,
    favorites_only: bool,
) -> Vec<GymRecord> {
    let term = debounced_term.trim().to_lowercase();

    let mut visible: Vec<GymRecord> = gyms
        .iter()
        .map(|gym| {
            let mut gym = gym.clone();
            gym.distance_km = Some(haversine_km(location, gym.coordinates));
            gym
        })
        .filter(|gym| gym.distance_km.unwrap_or(f64::MAX) <= preferences.radius_km as f64)
        .filter(|gym| !favorites_only || preferences.favorite_gym_ids.contains(&gym.id))
        .filter(|gym| term.is_empty() || gym.name.to_lowercase().contains(&term))
        .collect();

    match preferences.sort_option {
        SortOption::Distance => visible.sort_by(|a, b| cmp_distance(a, b)),
        SortOption::Name => visible.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| cmp_distance(a, b))
        }),
        SortOption::Favorites => visible.sort_by(|a, b| {
            let a_fav = preferences.favorite_gym_ids.contains(&a.id);
            let b_fav = preferences.favorite_gym_ids.contains(&b.id);
            b_fav.cmp(&a_fav).then_with(|| cmp_distance(a, b))
        }),
    }

    visible
}

fn cmp_distance(a: &GymRecord, b: &GymRecord) -> std::cmp::Ordering {
    a.distance_km
        .unwrap_or(f64::MAX)
        .partial_cmp(&b.distance_km.unwrap_or(f64::MAX))
        .unwrap_or(std::cmp::Ordering::Equal)
}

/// Drop favorite ids that the latest fetch no longer contains. Returns true
/// when something was removed so the caller knows to write the set back.
pub fn prune_favorites(favorites: &mut HashSet<String>, gyms: &[GymRecord]) -> bool {
    let known: HashSet<&str> = gyms.iter().map(|g| g.id.as_str()).collect();
    let before = favorites.len();
    favorites.retain(|id| known.contains(id.as_str()));
    favorites.len() != before
}

/// Flip a gym in or out of the favorites set. Returns whether it is a
/// favorite afterwards.
pub fn toggle_favorite(favorites: &mut HashSet<String>, gym_id: &str) -> bool {
    if favorites.remove(gym_id) {
        false
    } else {
        favorites.insert(gym_id.to_string());
        true
    }
}

/// Tracks the applied search term. The page script owns the 250 ms quiet
/// window and only submits once it has elapsed, so a term reaching the
/// server is final: it must filter the very response that carries it.
/// Distinct terms are promoted exactly once; reloads carrying the already
/// applied term change nothing.
#[derive(Debug, Default)]
pub struct SearchDebouncer {
    applied: String,
    promotions: u64,
}

impl SearchDebouncer {
    pub fn settle(&mut self, text: &str) {
        if text != self.applied {
            self.applied = text.to_string();
            self.promotions += 1;
        }
    }

    /// The term the list is currently filtered by.
    pub fn current(&self) -> &str {
        &self.applied
    }

    pub fn promotions(&self) -> u64 {
        self.promotions
    }
}

/// Transient per-gym highlight shown right after a favorite toggle.
/// Marks expire on their own after the window elapses.
#[derive(Debug)]
pub struct HighlightTracker {
    window: Duration,
    marks: HashMap<String, Instant>,
}

impl HighlightTracker {
    pub fn new(window: Duration) -> Self {
        HighlightTracker {
            window,
            marks: HashMap::new(),
        }
    }

    pub fn mark(&mut self, gym_id: &str, now: Instant) {
        self.marks.insert(gym_id.to_string(), now);
    }

    pub fn active_ids(&mut self, now: Instant) -> HashSet<String> {
        let window = self.window;
        self.marks
            .retain(|_, marked_at| now.duration_since(*marked_at) < window);
        self.marks.keys().cloned().collect()
    }
}

impl Default for HighlightTracker {
    fn default() -> Self {
        HighlightTracker::new(FAVORITE_HIGHLIGHT)
    }
}

/// Guards against the fetch race on rapid radius changes: every triggered
/// fetch takes a ticket, and only the response holding the latest issued
/// ticket may be committed to session state.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    issued: AtomicU64,
}

impl FetchSequencer {
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn commit(&self, ticket: u64) -> bool {
        ticket == self.issued.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gym(id: &str, name: &str, lat: f64, lon: f64) -> GymRecord {
        GymRecord {
            id: id.to_string(),
            name: name.to_string(),
            address: String::new(),
            coordinates: Coordinates { lat, lon },
            phone: None,
            opening_hours: None,
            distance_km: None,
        }
    }

    fn here() -> Coordinates {
        Coordinates { lat: 40.0, lon: -74.0 }
    }

    fn prefs() -> UserPreferences {
        UserPreferences::default()
    }

    #[test]
    fn every_visible_gym_is_within_the_radius() {
        let gyms = vec![
            gym("node-1", "Close", 40.01, -74.01),
            gym("way-2", "Far", 40.5, -74.5),
        ];
        let visible = apply(&gyms, &prefs(), here(), "", false);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "node-1");
        let d = visible[0].distance_km.unwrap();
        assert!(d <= 7.0 && (d - 1.4).abs() < 0.05);
    }

    #[test]
    fn search_matches_case_insensitive_substrings() {
        let gyms = vec![
            gym("node-1", "Beach Body Club", 40.01, -74.0),
            gym("node-2", "Iron Temple", 40.0, -74.01),
        ];
        let visible = apply(&gyms, &prefs(), here(), "bEACH", false);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Beach Body Club");

        let all = apply(&gyms, &prefs(), here(), "", false);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn favorites_only_filters_to_the_set() {
        let gyms = vec![
            gym("node-1", "A", 40.01, -74.0),
            gym("node-2", "B", 40.0, -74.01),
        ];
        let mut p = prefs();
        p.favorite_gym_ids.insert("node-2".to_string());
        let visible = apply(&gyms, &p, here(), "", true);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "node-2");
    }

    #[test]
    fn distance_sort_is_ascending() {
        let gyms = vec![
            gym("node-1", "Farther", 40.03, -74.0),
            gym("node-2", "Nearer", 40.01, -74.0),
        ];
        let visible = apply(&gyms, &prefs(), here(), "", false);
        assert_eq!(visible[0].id, "node-2");
        assert_eq!(visible[1].id, "node-1");
    }

    #[test]
    fn name_sort_ignores_case() {
        let gyms = vec![
            gym("node-1", "zen fitness", 40.01, -74.0),
            gym("node-2", "Anchor Gym", 40.0, -74.01),
            gym("node-3", "beach body", 40.01, -74.01),
        ];
        let mut p = prefs();
        p.sort_option = SortOption::Name;
        let names: Vec<_> = apply(&gyms, &p, here(), "", false)
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Anchor Gym", "beach body", "zen fitness"]);
    }

    #[test]
    fn favorites_sort_partitions_then_orders_by_distance() {
        let gyms = vec![
            gym("node-1", "A", 40.04, -74.0),
            gym("node-2", "B", 40.01, -74.0),
            gym("node-3", "C", 40.03, -74.0),
            gym("node-4", "D", 40.02, -74.0),
        ];
        let mut p = prefs();
        p.sort_option = SortOption::Favorites;
        p.favorite_gym_ids.insert("node-1".to_string());
        p.favorite_gym_ids.insert("node-4".to_string());

        let visible = apply(&gyms, &p, here(), "", false);
        let ids: Vec<_> = visible.iter().map(|g| g.id.as_str()).collect();
        // Favorites first, each partition ordered by ascending distance.
        assert_eq!(ids, vec!["node-4", "node-1", "node-2", "node-3"]);
    }

    #[test]
    fn pruning_drops_ids_missing_from_the_fetch() {
        let gyms = vec![gym("node-1", "A", 40.01, -74.0)];
        let mut favorites: HashSet<String> =
            ["node-1".to_string(), "node-999".to_string()].into();
        let changed = prune_favorites(&mut favorites, &gyms);
        assert!(changed);
        assert_eq!(favorites.len(), 1);
        assert!(favorites.contains("node-1"));

        let unchanged = prune_favorites(&mut favorites, &gyms);
        assert!(!unchanged);
    }

    #[test]
    fn settled_term_filters_the_request_that_carries_it() {
        let mut debouncer = SearchDebouncer::default();
        assert_eq!(debouncer.current(), "");

        // The request delivering "beach" must already render filtered by it,
        // not wait for a follow-up request.
        debouncer.settle("beach");
        assert_eq!(debouncer.current(), "beach");
        assert_eq!(debouncer.promotions(), 1);

        debouncer.settle("beachb");
        assert_eq!(debouncer.current(), "beachb");
        assert_eq!(debouncer.promotions(), 2);
    }

    #[test]
    fn reloads_with_the_applied_term_promote_nothing() {
        let mut debouncer = SearchDebouncer::default();
        debouncer.settle("yoga");
        debouncer.settle("yoga");
        debouncer.settle("yoga");
        assert_eq!(debouncer.current(), "yoga");
        assert_eq!(debouncer.promotions(), 1);
    }

    #[test]
    fn double_toggle_restores_favorites_and_highlight_expires() {
        let t0 = Instant::now();
        let mut favorites: HashSet<String> = HashSet::new();
        let mut highlights = HighlightTracker::new(Duration::from_millis(400));

        assert!(toggle_favorite(&mut favorites, "node-1"));
        highlights.mark("node-1", t0);
        assert!(!toggle_favorite(
            &mut favorites,
            "node-1"
        ));
        highlights.mark("node-1", t0 + Duration::from_millis(150));

        assert!(favorites.is_empty());
        assert!(highlights
            .active_ids(t0 + Duration::from_millis(300))
            .contains("node-1"));
        assert!(highlights
            .active_ids(t0 + Duration::from_millis(600))
            .is_empty());
    }

    #[test]
    fn only_the_latest_fetch_ticket_commits() {
        let seq = FetchSequencer::default();
        let first = seq.begin();
        let second = seq.begin();
        // The slow first response arrives after the second was issued.
        assert!(!seq.commit(first));
        assert!(seq.commit(second));
    }
}
