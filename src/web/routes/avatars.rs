use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tracing::{error, warn};

use crate::web::state::AppState;

#[derive(serde::Deserialize)]
struct AvatarMeta {
    url: String,
}

fn image_base_url() -> String {
    std::env::var("IMAGE_API_URL").unwrap_or_else(|_| "http://localhost:8004".to_string())
}

/// Fetch an avatar from the object-storage service on the user's behalf.
/// Two hops: metadata first, then the actual bytes behind the public URL it
/// reports.
pub async fn avatar_proxy(
    Path(image_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let cookies = headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .unwrap_or("");
    let token = cookies
        .split("; ")
        .find_map(|cookie| cookie.strip_prefix("access_token="))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let base_url = image_base_url();
    let meta_url = format!("{}/api/v1/images/{}?size=medium", base_url, image_id);
    let meta_resp = state
        .http
        .get(&meta_url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .map_err(|e| {
            error!("Avatar metadata request failed: {}", e);
            StatusCode::BAD_GATEWAY
        })?;

    if !meta_resp.status().is_success() {
        warn!("Avatar metadata returned {}", meta_resp.status());
        return Err(StatusCode::NOT_FOUND);
    }

    let meta: AvatarMeta = meta_resp.json().await.map_err(|e| {
        error!("Avatar metadata unreadable: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // The reported url is a path like "/storage/avatars/..."; resolve it
    // against the same service, avoiding doubled slashes.
    let content_path = meta.url.trim_start_matches('/');
    let content_url = format!("{}/{}", base_url.trim_end_matches('/'), content_path);

    let content_resp = state
        .http
        .get(&content_url)
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .map_err(|e| {
            error!("Avatar content request failed: {}", e);
            StatusCode::BAD_GATEWAY
        })?;

    if !content_resp.status().is_success() {
        warn!("Avatar content returned {}", content_resp.status());
        return Err(StatusCode::NOT_FOUND);
    }

    let content_type = content_resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let bytes = content_resp.bytes().await.map_err(|e| {
        error!("Avatar body read failed: {}", e);
        StatusCode::BAD_GATEWAY
    })?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Cache-Control", "public, max-age=3600")
        .body(axum::body::Body::from(bytes))
        .unwrap())
}
