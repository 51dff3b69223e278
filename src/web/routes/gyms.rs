use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::warn;

use crate::database::preferences_repo::{self, SqlitePreferenceStore};
use crate::models::preferences::normalize_radius;
use crate::models::{Coordinates, SortOption, UserPreferences};
use crate::services::gym_browse_service::{self, AppliedGymFilters, GymCardView, GymsQuery};
use crate::services::{geolocation, maps, overpass, presentation};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::middleware::profile::BrowserProfile;
use crate::web::state::AppState;

#[derive(Template)]
#[template(path = "gyms.html")]
pub struct GymsTemplate {
    pub gyms: Vec<GymCardView>,
    pub filters: AppliedGymFilters,
    pub location_banner: String,
    pub query_banner: String,
    pub has_location: bool,
}

pub async fn gyms_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Extension(profile): Extension<BrowserProfile>,
    Query(query): Query<GymsQuery>,
    State(state): State<AppState>,
) -> Html<String> {
    let store = SqlitePreferenceStore::new(&state.pool);
    let mut prefs = match preferences_repo::load_preferences(&store, &profile.id).await {
        Ok(prefs) => prefs,
        Err(e) => {
            warn!("Preference load failed for {}: {}", profile.id, e);
            UserPreferences::default()
        }
    };

    // Filter-bar changes are written through immediately; the page may be
    // reloaded or revisited and must come back the same.
    if let Some(radius) = query.radius_km {
        let radius = normalize_radius(radius);
        if radius != prefs.radius_km {
            prefs.radius_km = radius;
            if let Err(e) = preferences_repo::save_radius(&store, &profile.id, radius).await {
                warn!("Radius save failed: {}", e);
            }
        }
    }
    if let Some(sort) = query.sort.as_deref() {
        let sort = SortOption::parse(sort);
        if sort != prefs.sort_option {
            prefs.sort_option = sort;
            if let Err(e) = preferences_repo::save_sort_option(&store, &profile.id, sort).await {
                warn!("Sort save failed: {}", e);
            }
        }
    }
    if let Some(term) = query.q.as_deref() {
        if term != prefs.search_term {
            prefs.search_term = term.to_string();
            if let Err(e) = preferences_repo::save_search_term(&store, &profile.id, term).await {
                warn!("Search term save failed: {}", e);
            }
        }
    }
    let favorites_only = query.favorites_only.unwrap_or(false);

    let mut location_banner = String::new();
    let mut query_banner = String::new();
    let mut location: Option<Coordinates> = None;
    match geolocation::resolve(query.lat, query.lon, query.loc_err.as_deref()) {
        // First visit: the page script will ask the browser and reload.
        None => {}
        Some(Err(e)) => location_banner = e.to_string(),
        Some(Ok(loc)) => location = Some(loc),
    }

    if let Some(loc) = location {
        // Take a ticket before the fetch; a reload racing us may take a
        // newer one, and then this response must not be committed.
        let (ticket, sequencer) = {
            let mut sessions = state.sessions.lock().unwrap();
            let session = sessions.entry(profile.id.clone()).or_default();
            let sequencer = session.sequencer.clone();
            (sequencer.begin(), sequencer)
        };

        match overpass::fetch_gyms(&state.http, loc, prefs.radius_km).await {
            Ok(raw) => {
                let gyms = overpass::normalize(raw);
                let favorites_changed = {
                    let mut sessions = state.sessions.lock().unwrap();
                    let session = sessions.entry(profile.id.clone()).or_default();
                    if sequencer.commit(ticket) {
                        session.gyms = gyms;
                        presentation::prune_favorites(
                            &mut prefs.favorite_gym_ids,
                            &session.gyms,
                        )
                    } else {
                        false
                    }
                };
                if favorites_changed {
                    if let Err(e) =
                        preferences_repo::save_favorites(&store, &profile.id, &prefs.favorite_gym_ids)
                            .await
                    {
                        warn!("Favorites save failed: {}", e);
                    }
                }
            }
            Err(e) => {
                warn!("Gym fetch failed: {}", e);
                query_banner = e.to_string();
            }
        }
    }

    let now = Instant::now();
    let cards = {
        let mut sessions = state.sessions.lock().unwrap();
        let session = sessions.entry(profile.id.clone()).or_default();
        // The page script debounces keystrokes before submitting, and stored
        // terms settled long ago, so whatever term this request carries is
        // final and filters this very response.
        session.debouncer.settle(&prefs.search_term);
        let term = session.debouncer.current().to_string();
        let visible = match location {
            Some(loc) => presentation::apply(&session.gyms, &prefs, loc, &term, favorites_only),
            None => Vec::new(),
        };
        let highlighted = session.highlights.active_ids(now);
        gym_browse_service::build_gym_cards(&visible, &prefs.favorite_gym_ids, &highlighted)
    };

    let template = GymsTemplate {
        gyms: cards,
        filters: gym_browse_service::applied_filters(&prefs, favorites_only, location),
        location_banner,
        query_banner,
        has_location: location.is_some(),
    };
    Html(template.render().unwrap())
}

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub return_to: Option<String>,
}

pub async fn toggle_favorite_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Extension(profile): Extension<BrowserProfile>,
    Path(gym_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<FavoriteForm>,
) -> Redirect {
    let store = SqlitePreferenceStore::new(&state.pool);
    let mut prefs = preferences_repo::load_preferences(&store, &profile.id)
        .await
        .unwrap_or_default();

    presentation::toggle_favorite(&mut prefs.favorite_gym_ids, &gym_id);
    if let Err(e) =
        preferences_repo::save_favorites(&store, &profile.id, &prefs.favorite_gym_ids).await
    {
        warn!("Favorites save failed: {}", e);
    }

    {
        let mut sessions = state.sessions.lock().unwrap();
        let session = sessions.entry(profile.id.clone()).or_default();
        session.highlights.mark(&gym_id, Instant::now());
    }

    // Only bounce back to pages we own.
    let target = form
        .return_to
        .filter(|t| t.starts_with("/gyms"))
        .unwrap_or_else(|| "/gyms".to_string());
    Redirect::to(&target)
}

#[derive(Template)]
#[template(path = "gym_detail.html")]
pub struct GymDetailTemplate {
    pub gym: GymCardView,
    pub static_map_url: String,
    pub google_directions_url: String,
    pub osm_directions_url: String,
}

pub async fn gym_detail_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Extension(profile): Extension<BrowserProfile>,
    Path(gym_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let record = {
        let sessions = state.sessions.lock().unwrap();
        sessions
            .get(&profile.id)
            .and_then(|s| s.gyms.iter().find(|g| g.id == gym_id).cloned())
    };
    // Records only live as long as the last fetch; a stale deep link goes
    // back to the list.
    let Some(record) = record else {
        return Redirect::to("/gyms").into_response();
    };

    let store = SqlitePreferenceStore::new(&state.pool);
    let prefs = preferences_repo::load_preferences(&store, &profile.id)
        .await
        .unwrap_or_default();

    let cards = gym_browse_service::build_gym_cards(
        std::slice::from_ref(&record),
        &prefs.favorite_gym_ids,
        &HashSet::new(),
    );
    let template = GymDetailTemplate {
        gym: cards.into_iter().next().unwrap(),
        static_map_url: maps::static_map_url(record.coordinates, 16),
        google_directions_url: maps::google_maps_directions_url(record.coordinates),
        osm_directions_url: maps::osm_directions_url(record.coordinates),
    };
    Html(template.render().unwrap()).into_response()
}
