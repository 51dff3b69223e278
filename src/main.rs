use axum::{
    middleware,
    response::Redirect,
    routing::{get, get_service, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use fitspot::database;
use fitspot::web::middleware::{auth as auth_middleware, profile as profile_middleware};
use fitspot::web::routes::{auth, avatars, booking, gyms, profile};
use fitspot::web::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Database
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://fitspot.db".to_string());
    println!("Connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Cannot connect to database");
    database::init_schema(&pool)
        .await
        .expect("Cannot initialize schema");

    let state = AppState::new(pool);

    // 3. Protected routes behind one auth layer
    let protected_routes = Router::new()
        .route("/gyms", get(gyms::gyms_handler))
        .route("/gyms/:gym_id", get(gyms::gym_detail_handler))
        .route("/gyms/:gym_id/favorite", post(gyms::toggle_favorite_handler))
        .route(
            "/gyms/:gym_id/book",
            get(booking::start_booking_handler).post(booking::booking_step_handler),
        )
        .route("/bookings", get(booking::bookings_handler))
        .route(
            "/profile",
            get(profile::profile_handler).post(profile::update_profile_handler),
        )
        .route("/avatars/:image_id", get(avatars::avatar_proxy))
        .route("/logout", post(auth::logout_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    // 4. Whole application
    let app = Router::new()
        // Public routes
        .route("/", get(|| async { Redirect::to("/gyms") }))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/signup", get(auth::signup_page).post(auth::signup_handler))
        .route(
            "/password-reset",
            get(auth::password_reset_page).post(auth::password_reset_handler),
        )
        // Protected routes
        .merge(protected_routes)
        // Preferences are keyed to this cookie, so every route gets it.
        .layer(middleware::from_fn(
            profile_middleware::ensure_browser_profile,
        ))
        // Static files
        .nest_service(
            "/assets",
            get_service(ServeDir::new("assets")).layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
        )
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(state);

    // 5. Start the server (with fallback port)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Could not bind on {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!(
        "🚀 FitSpot (build {}) running on http://{}",
        env!("FITSPOT_BUILD_ID"),
        bound_addr
    );
    println!("📍 Open http://{}/login to get started", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
