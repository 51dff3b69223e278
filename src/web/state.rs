use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sqlx::SqlitePool;

use crate::models::GymRecord;
use crate::services::booking_wizard::BookingWizard;
use crate::services::presentation::{FetchSequencer, HighlightTracker, SearchDebouncer};

/// Per-browser-profile UI state: the latest fetched result set plus the
/// timing bits (debounce, highlight, fetch ordering) and any booking wizard
/// in flight. Lives in memory only; preferences are the durable part.
pub struct GymSession {
    pub gyms: Vec<GymRecord>,
    pub debouncer: SearchDebouncer,
    pub highlights: HighlightTracker,
    pub sequencer: Arc<FetchSequencer>,
    pub wizards: HashMap<String, BookingWizard>,
}

impl Default for GymSession {
    fn default() -> Self {
        GymSession {
            gyms: Vec::new(),
            debouncer: SearchDebouncer::default(),
            highlights: HighlightTracker::default(),
            sequencer: Arc::new(FetchSequencer::default()),
            wizards: HashMap::new(),
        }
    }
}

pub type SharedSessions = Arc<Mutex<HashMap<String, GymSession>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub http: reqwest::Client,
    pub sessions: SharedSessions,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        AppState {
            pool,
            http: reqwest::Client::new(),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
