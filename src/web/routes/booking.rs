use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use crate::database::booking_repo::{self, NewBooking};
use crate::services::booking_wizard::{BookingWizard, WizardState, PAYMENT_DELAY};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::middleware::profile::BrowserProfile;
use crate::web::state::AppState;

#[derive(Template)]
#[template(path = "booking_select.html")]
pub struct BookingSelectTemplate {
    pub gym_id: String,
    pub gym_name: String,
    pub date_value: String,
    pub time_value: String,
    pub error_message: String,
}

#[derive(Template)]
#[template(path = "booking_review.html")]
pub struct BookingReviewTemplate {
    pub gym_id: String,
    pub gym_name: String,
    pub session_date: String,
    pub session_time: String,
}

#[derive(Template)]
#[template(path = "booking_complete.html")]
pub struct BookingCompleteTemplate {
    pub gym_name: String,
    pub session_date: String,
    pub session_time: String,
    pub access_code: String,
}

/// Entry point of the wizard: always starts a fresh flow for this gym,
/// replacing any abandoned one.
pub async fn start_booking_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Extension(profile): Extension<BrowserProfile>,
    Path(gym_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let gym_name = {
        let sessions = state.sessions.lock().unwrap();
        sessions
            .get(&profile.id)
            .and_then(|s| s.gyms.iter().find(|g| g.id == gym_id))
            .map(|g| g.name.clone())
    };
    let Some(gym_name) = gym_name else {
        return Redirect::to("/gyms").into_response();
    };

    {
        let mut sessions = state.sessions.lock().unwrap();
        let session = sessions.entry(profile.id.clone()).or_default();
        session
            .wizards
            .insert(gym_id.clone(), BookingWizard::new(&gym_id, &gym_name));
    }

    let template = BookingSelectTemplate {
        gym_id,
        gym_name,
        date_value: String::new(),
        time_value: String::new(),
        error_message: String::new(),
    };
    Html(template.render().unwrap()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct BookingStepForm {
    pub step: String, // select|confirm
    pub date: Option<String>,
    pub time: Option<String>,
}

pub async fn booking_step_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Extension(profile): Extension<BrowserProfile>,
    Path(gym_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<BookingStepForm>,
) -> impl IntoResponse {
    match form.step.as_str() {
        "select" => select_step(&state, &profile, &gym_id, &form).into_response(),
        "confirm" => confirm_step(&state, &auth_user, &profile, &gym_id)
            .await
            .into_response(),
        _ => Redirect::to(&format!("/gyms/{}/book", gym_id)).into_response(),
    }
}

fn select_step(
    state: &AppState,
    profile: &BrowserProfile,
    gym_id: &str,
    form: &BookingStepForm,
) -> impl IntoResponse {
    let date = form.date.as_deref().unwrap_or("");
    let time = form.time.as_deref().unwrap_or("");

    let mut sessions = state.sessions.lock().unwrap();
    let Some(wizard) = sessions
        .get_mut(&profile.id)
        .and_then(|s| s.wizards.get_mut(gym_id))
    else {
        return Redirect::to("/gyms").into_response();
    };

    match wizard.select(date, time) {
        Ok(()) => {
            let template = BookingReviewTemplate {
                gym_id: gym_id.to_string(),
                gym_name: wizard.gym_name.clone(),
                session_date: wizard.session_date.clone(),
                session_time: wizard.session_time.clone(),
            };
            Html(template.render().unwrap()).into_response()
        }
        Err(e) => {
            let template = BookingSelectTemplate {
                gym_id: gym_id.to_string(),
                gym_name: wizard.gym_name.clone(),
                date_value: date.to_string(),
                time_value: time.to_string(),
                error_message: e.to_string(),
            };
            Html(template.render().unwrap()).into_response()
        }
    }
}

async fn confirm_step(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    profile: &BrowserProfile,
    gym_id: &str,
) -> axum::response::Response {
    // Review → Payment before the simulated charge runs.
    {
        let mut sessions = state.sessions.lock().unwrap();
        let Some(wizard) = sessions
            .get_mut(&profile.id)
            .and_then(|s| s.wizards.get_mut(gym_id))
        else {
            return Redirect::to("/gyms").into_response();
        };
        if wizard.confirm().is_err() {
            return Redirect::to(&format!("/gyms/{}/book", gym_id)).into_response();
        }
    }

    // Simulated payment processor.
    tokio::time::sleep(PAYMENT_DELAY).await;

    let finished = {
        let mut sessions = state.sessions.lock().unwrap();
        let Some(session) = sessions.get_mut(&profile.id) else {
            return Redirect::to("/gyms").into_response();
        };
        let Some(wizard) = session.wizards.get_mut(gym_id) else {
            return Redirect::to("/gyms").into_response();
        };
        match wizard.complete_payment() {
            Ok(_) => session.wizards.remove(gym_id),
            Err(e) => {
                warn!("Payment completion refused for {}: {}", gym_id, e);
                return Redirect::to(&format!("/gyms/{}/book", gym_id)).into_response();
            }
        }
    };
    let Some(wizard) = finished else {
        return Redirect::to("/gyms").into_response();
    };
    let WizardState::Complete { access_code } = wizard.state().clone() else {
        return Redirect::to("/gyms").into_response();
    };

    let booking_id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    // The access code is deliberately not part of this row.
    if let Err(e) = booking_repo::insert_booking(
        &state.pool,
        NewBooking {
            booking_id: &booking_id,
            user_id: &auth_user.id,
            gym_id,
            gym_name: &wizard.gym_name,
            session_date: &wizard.session_date,
            session_time: &wizard.session_time,
        },
    )
    .await
    {
        warn!("Booking insert failed: {}", e);
    }

    let template = BookingCompleteTemplate {
        gym_name: wizard.gym_name.clone(),
        session_date: wizard.session_date.clone(),
        session_time: wizard.session_time.clone(),
        access_code,
    };
    Html(template.render().unwrap()).into_response()
}

#[derive(Template)]
#[template(path = "bookings.html")]
pub struct BookingsTemplate {
    pub bookings: Vec<BookingView>,
}

pub struct BookingView {
    pub gym_name: String,
    pub session_date: String,
    pub session_time: String,
    pub status: String,
}

pub async fn bookings_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Html<String> {
    let rows = booking_repo::list_bookings_for_user(&state.pool, &auth_user.id)
        .await
        .unwrap_or_else(|e| {
            warn!("Booking list failed for {}: {}", auth_user.id, e);
            vec![]
        });

    let template = BookingsTemplate {
        bookings: rows
            .into_iter()
            .map(|row| BookingView {
                gym_name: row.gym_name,
                session_date: row.session_date,
                session_time: row.session_time,
                status: row.status,
            })
            .collect(),
    };
    Html(template.render().unwrap())
}
