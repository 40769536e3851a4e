use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use nirdaliya_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool)?;

    // Email outbox worker: drains queued notifications with retry/backoff so
    // SMTP never sits on the request path.
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                match state.email_service.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Email worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route(
            "/api/public/candidates",
            get(routes::public::list_candidates),
        )
        .route(
            "/api/public/candidates/:id",
            get(routes::public::get_candidate),
        )
        .route("/api/public/ballot", get(routes::ballot::get_ballot))
        .route(
            "/api/public/locations/provinces",
            get(routes::location_routes::list_provinces),
        )
        .route(
            "/api/public/locations/provinces/:id/districts",
            get(routes::location_routes::list_districts),
        )
        .route(
            "/api/public/locations/districts/:id/municipalities",
            get(routes::location_routes::list_municipalities),
        )
        .route(
            "/api/public/locations/municipalities/:id/wards",
            get(routes::location_routes::list_wards),
        )
        .layer(axum::middleware::from_fn_with_state(
            nirdaliya_backend::middleware::rate_limit::new_rpm_state(config.public_rpm),
            nirdaliya_backend::middleware::rate_limit::rpm_middleware,
        ));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth_routes::register))
        .route("/api/auth/login", post(routes::auth_routes::login))
        .route(
            "/api/auth/verify-email",
            post(routes::auth_routes::verify_email),
        )
        .route(
            "/api/auth/request-password-reset",
            post(routes::auth_routes::request_password_reset),
        )
        .route(
            "/api/auth/reset-password",
            post(routes::auth_routes::reset_password),
        )
        .layer(axum::middleware::from_fn_with_state(
            nirdaliya_backend::middleware::rate_limit::new_rpm_state(config.auth_rpm),
            nirdaliya_backend::middleware::rate_limit::rpm_middleware,
        ));

    let owner_api = Router::new()
        .route(
            "/api/candidate/me",
            get(routes::candidate_routes::get_own_profile)
                .patch(routes::candidate_routes::update_own_profile),
        )
        .layer(axum::middleware::from_fn(
            nirdaliya_backend::middleware::auth::require_bearer_auth,
        ));

    let admin_api = Router::new()
        .route("/api/admin/candidates", get(routes::admin::list_candidates))
        .route(
            "/api/admin/candidates/:id/approve",
            post(routes::admin::approve_candidate),
        )
        .route(
            "/api/admin/candidates/:id/reject",
            post(routes::admin::reject_candidate),
        )
        .layer(axum::middleware::from_fn(
            nirdaliya_backend::middleware::auth::require_admin,
        ));

    let app = base_routes
        .merge(public_api)
        .merge(auth_api)
        .merge(owner_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
