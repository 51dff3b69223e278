use askama::Template;
use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use cookie::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use crate::database::current_user_repo;
use crate::web::middleware::auth::decode_jwt_sub;
use crate::web::state::AppState;

fn auth_base_url() -> String {
    std::env::var("AUTH_API_URL").unwrap_or_else(|_| "http://auth.localhost:8080".to_string())
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error_message: String,
    pub notice: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub error_message: String,
}

#[derive(Template)]
#[template(path = "password_reset.html")]
pub struct PasswordResetTemplate {
    pub error_message: String,
    pub notice: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    email: String,
    password: String,
    password_confirm: String,
}

#[derive(Deserialize)]
pub struct PasswordResetForm {
    email: String,
}

#[derive(Deserialize, Serialize)]
struct AuthTokens {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct AuthServiceResponse {
    #[serde(rename = "success")]
    _success: bool,
    data: AuthTokens,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginPageQuery {
    pub notice: Option<String>,
}

pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let notice = match query.notice.as_deref() {
        Some("signed_up") => "Account created. You can sign in now.".to_string(),
        Some("reset_sent") => "If that address exists, a reset mail is on its way.".to_string(),
        _ => String::new(),
    };
    let template = LoginTemplate {
        error_message: String::new(),
        notice,
    };
    Html(template.render().unwrap())
}

fn login_error(message: String) -> Html<String> {
    let template = LoginTemplate {
        error_message: message,
        notice: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, Html<String>> {
    let response = state
        .http
        .post(format!("{}/api/v1/auth/login", auth_base_url()))
        .json(&json!({
            "email": form.email,
            "password": form.password,
        }))
        .send()
        .await;

    let resp = match response {
        Ok(resp) => resp,
        Err(e) => {
            error!("Auth service unreachable: {}", e);
            return Err(login_error(format!("Connection error: {}", e)));
        }
    };

    let status = resp.status();
    if !status.is_success() {
        warn!("Login rejected by auth service: {}", status);
        return Err(login_error("Sign-in failed. Check your email and password.".to_string()));
    }

    let body_text = resp.text().await.unwrap_or_default();
    let tokens = match serde_json::from_str::<AuthServiceResponse>(&body_text) {
        Ok(wrapper) => wrapper.data,
        Err(e) => {
            error!("Unreadable auth response: {}", e);
            return Err(login_error(format!("Parse error: {}", e)));
        }
    };

    // Remember the user for the offline fallback in the auth middleware.
    if let Some(user_id) = decode_jwt_sub(&tokens.access_token) {
        if let Err(e) = current_user_repo::remember_current_user(&state.pool, &user_id).await {
            warn!("Could not remember current user: {}", e);
        }
    }

    let mut response = Redirect::to("/gyms").into_response();
    for (name, value) in [
        ("access_token", tokens.access_token),
        ("refresh_token", tokens.refresh_token),
    ] {
        let mut token_cookie = Cookie::new(name, value);
        token_cookie.set_path("/");
        token_cookie.set_http_only(true);
        token_cookie.set_same_site(cookie::SameSite::Lax);
        response
            .headers_mut()
            .append(header::SET_COOKIE, token_cookie.to_string().parse().unwrap());
    }

    Ok(response)
}

pub async fn signup_page() -> Html<String> {
    let template = SignupTemplate {
        error_message: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn signup_handler(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, Html<String>> {
    let render_error = |message: String| {
        let template = SignupTemplate {
            error_message: message,
        };
        Html(template.render().unwrap())
    };

    if form.password != form.password_confirm {
        return Err(render_error("Passwords do not match.".to_string()));
    }

    let response = state
        .http
        .post(format!("{}/api/v1/auth/register", auth_base_url()))
        .json(&json!({
            "email": form.email,
            "password": form.password,
        }))
        .send()
        .await;

    match response {
        Ok(resp) if resp.status().is_success() => Ok(Redirect::to("/login?notice=signed_up")),
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Signup rejected: {} {}", status, body);
            Err(render_error(format!("Sign-up failed: {}", status)))
        }
        Err(e) => {
            error!("Auth service unreachable: {}", e);
            Err(render_error(format!("Connection error: {}", e)))
        }
    }
}

pub async fn password_reset_page() -> Html<String> {
    let template = PasswordResetTemplate {
        error_message: String::new(),
        notice: String::new(),
    };
    Html(template.render().unwrap())
}

pub async fn password_reset_handler(
    State(state): State<AppState>,
    Form(form): Form<PasswordResetForm>,
) -> Result<Redirect, Html<String>> {
    let response = state
        .http
        .post(format!("{}/api/v1/auth/password-reset", auth_base_url()))
        .json(&json!({ "email": form.email }))
        .send()
        .await;

    match response {
        Ok(resp) if resp.status().is_success() => Ok(Redirect::to("/login?notice=reset_sent")),
        Ok(resp) => {
            warn!("Password reset rejected: {}", resp.status());
            // Do not reveal whether the address exists.
            Ok(Redirect::to("/login?notice=reset_sent"))
        }
        Err(e) => {
            error!("Auth service unreachable: {}", e);
            let template = PasswordResetTemplate {
                error_message: format!("Connection error: {}", e),
                notice: String::new(),
            };
            Err(Html(template.render().unwrap()))
        }
    }
}

pub async fn logout_handler() -> Response {
    let mut response = Redirect::to("/login").into_response();
    for name in ["access_token", "refresh_token"] {
        let mut cleared = Cookie::new(name, "");
        cleared.set_path("/");
        cleared.set_http_only(true);
        cleared.set_same_site(cookie::SameSite::Lax);
        cleared.set_max_age(cookie::time::Duration::ZERO);
        response
            .headers_mut()
            .append(header::SET_COOKIE, cleared.to_string().parse().unwrap());
    }
    response
}
