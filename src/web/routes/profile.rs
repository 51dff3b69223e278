use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use serde::Deserialize;
use tracing::warn;

use crate::services::profile_service::{self, UserProfileView};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::state::AppState;

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub profile: UserProfileView,
    pub error_message: String,
    pub notice: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfilePageQuery {
    pub notice: Option<String>,
}

pub async fn profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ProfilePageQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let profile = match profile_service::load_user_profile_view(&state.pool, &auth_user.id).await {
        Ok(view) => view,
        Err(e) => {
            warn!("Profile load failed for {}: {}", auth_user.id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let notice = match query.notice.as_deref() {
        Some("saved") => "Profile saved.".to_string(),
        _ => String::new(),
    };
    let template = ProfileTemplate {
        profile,
        error_message: String::new(),
        notice,
    };
    Html(template.render().unwrap()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub bio: String,
    pub city: String,
    pub country: String,
}

pub async fn update_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Form(form): Form<ProfileForm>,
) -> impl IntoResponse {
    if form.name.trim().is_empty() {
        let profile = UserProfileView {
            name: form.name.clone(),
            bio: form.bio.clone(),
            city: form.city.clone(),
            country: form.country.clone(),
            location_label: String::new(),
            avatar_image_id: String::new(),
        };
        let template = ProfileTemplate {
            profile,
            error_message: "A display name is required.".to_string(),
            notice: String::new(),
        };
        return Html(template.render().unwrap()).into_response();
    }

    match profile_service::update_user_profile(
        &state.pool,
        &auth_user.id,
        &form.name,
        &form.bio,
        &form.city,
        &form.country,
    )
    .await
    {
        Ok(()) => Redirect::to("/profile?notice=saved").into_response(),
        Err(e) => {
            warn!("Profile update failed for {}: {}", auth_user.id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
