use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use cookie::Cookie;
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const PROFILE_COOKIE: &str = "fitspot_profile";

/// The anonymous id that keys search preferences and favorites. Deliberately
/// separate from the account: it identifies this browser profile.
#[derive(Clone, Debug)]
pub struct BrowserProfile {
    pub id: String,
}

/// Make sure every request carries a browser profile id, minting one on the
/// first visit.
pub async fn ensure_browser_profile(mut request: Request, next: Next) -> Response {
    let existing = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find(|c| c.starts_with("fitspot_profile="))
                .and_then(|c| c.strip_prefix("fitspot_profile="))
        })
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    if let Some(id) = existing {
        request.extensions_mut().insert(BrowserProfile { id });
        return next.run(request).await;
    }

    let id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    request
        .extensions_mut()
        .insert(BrowserProfile { id: id.clone() });

    let mut response = next.run(request).await;

    let mut profile_cookie = Cookie::new(PROFILE_COOKIE, id);
    profile_cookie.set_path("/");
    profile_cookie.set_http_only(true);
    profile_cookie.set_same_site(cookie::SameSite::Lax);
    profile_cookie.set_max_age(cookie::time::Duration::days(365));
    if let Ok(value) = profile_cookie.to_string().parse() {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    response
}
