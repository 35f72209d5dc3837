//! leadctl - lead management for aesthetic clinics and beauty salons.
//!
//! A REST service tracking two kinds of leads (clinics and salons) plus
//! per-user outbound contacts, with filtered/paginated list views, CSV
//! export, and a WhatsApp messaging proxy.
//!
//! # Architecture
//!
//! - **[`api`]**: axum handlers and wire-facing request/response models
//! - **[`db`]**: repositories and row models over PostgreSQL (sqlx)
//! - **[`auth`]**: argon2 password hashing, JWT session cookies, and the
//!   `CurrentUser` extractor
//! - **[`export`]**: CSV rendering and download responses
//! - **[`messaging`]**: WhatsApp Cloud API client
//! - **[`config`]**: YAML + environment configuration (figment)
//!
//! # Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use leadctl::{Application, config::{Args, Config}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = Args::parse();
//!     let config = Config::load(&args)?;
//!     let app = Application::new(config).await?;
//!     app.serve(async { let _ = tokio::signal::ctrl_c().await; }).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod messaging;
pub mod openapi;
pub mod optimistic;
pub mod telemetry;
pub mod types;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use bon::Builder;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::handlers::{
    auth as auth_handlers, clinics, contacts, messaging as messaging_handlers, salons,
};
use crate::auth::password;
use crate::config::Config;
use crate::db::handlers::users::Users;
use crate::db::models::users::UserCreateDBRequest;
use crate::errors::Error;
use crate::openapi::ApiDoc;
use crate::types::UserId;

/// Shared application state available to all handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the user on first startup, or updates the password if
/// the user already exists and a password is configured.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    email: &str,
    password: Option<&str>,
    db: &PgPool,
) -> Result<UserId, Error> {
    let password_hash = password.map(password::hash_string).transpose()?;

    let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    if let Some(existing_user) = user_repo.get_by_email(email).await? {
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE email = $2")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *conn)
                .await
                .map_err(|e| Error::Database(e.into()))?;
        }
        return Ok(existing_user.id);
    }

    let created = user_repo
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            display_name: Some("Administrator".to_string()),
            is_admin: true,
            password_hash,
        })
        .await?;
    info!(user_id = %created.id, "Created initial admin user");
    Ok(created.id)
}

/// Connect the pool, run migrations, and ensure the admin user exists.
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.pool.max_connections)
        .min_connections(config.database.pool.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.pool.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;

    create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

    Ok(pool)
}

/// Create the CORS layer from configuration.
///
/// No configured origins means fully permissive (local development); with
/// origins listed, credentialed requests from those origins are allowed.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors.allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn health() -> &'static str {
    "ok"
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = create_cors_layer(&state.config)?;

    let auth_routes = Router::new()
        .route("/authentication/register", post(auth_handlers::register))
        .route("/authentication/login", post(auth_handlers::login))
        .route("/authentication/logout", post(auth_handlers::logout));

    let api_routes = Router::new()
        .route("/clinics", get(clinics::list_clinics).post(clinics::create_clinic))
        .route(
            "/clinics/{id}",
            get(clinics::get_clinic)
                .put(clinics::update_clinic)
                .delete(clinics::delete_clinic),
        )
        .route("/salons", get(salons::list_salons).post(salons::create_salon))
        .route(
            "/salons/{id}",
            get(salons::get_salon)
                .put(salons::update_salon)
                .delete(salons::delete_salon),
        )
        .route("/contacts", get(contacts::list_contacts).post(contacts::create_contact))
        .route("/contacts/statuses", get(contacts::list_statuses))
        .route(
            "/contacts/{id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route("/messages", post(messaging_handlers::send_message));

    let router = Router::new()
        .route("/healthz", get(health))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    Ok(router)
}

/// A fully initialized application, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let pool = setup_database(&config).await?;

        let state = AppState::builder().db(pool).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("leadctl listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::CurrentUser;
    use crate::auth::session::create_session_token;
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.secret_key = Some("router-test-secret".to_string());
        config
    }

    /// A lazily-connected pool: requests that never reach the database work
    /// without a running PostgreSQL instance.
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://localhost:1/unreachable")
            .expect("lazy pool")
    }

    fn server_with(config: Config) -> TestServer {
        let state = AppState::builder().db(lazy_pool()).config(config).build();
        TestServer::new(build_router(state).unwrap()).unwrap()
    }

    fn session_cookie(config: &Config) -> String {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "tester@example.com".to_string(),
            display_name: None,
            is_admin: false,
        };
        let token = create_session_token(&user, config).unwrap();
        format!("{}={}", config.auth.session.cookie_name, token)
    }

    #[sqlx::test]
    async fn admin_bootstrap_inserts_and_is_idempotent(pool: PgPool) {
        let first = create_initial_admin_user("admin@localhost", Some("bootstrap-pw"), &pool)
            .await
            .unwrap();
        let second = create_initial_admin_user("admin@localhost", None, &pool)
            .await
            .unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let admin = Users::new(&mut conn)
            .get_by_email("admin@localhost")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin);
        assert!(admin.password_hash.is_some());
    }

    #[tokio::test]
    async fn healthz_is_public() {
        let server = server_with(test_config());
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("ok");
    }

    #[tokio::test]
    async fn api_routes_require_a_session() {
        let server = server_with(test_config());
        for route in ["/api/v1/clinics", "/api/v1/salons", "/api/v1/contacts"] {
            let response = server.get(route).await;
            response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
        }
        let response = server.post("/api/v1/messages").json(&json!({"to": "1", "message": "x"})).await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_numeric_pagination_is_rejected() {
        let config = test_config();
        let cookie = session_cookie(&config);
        let server = server_with(config);

        let response = server
            .get("/api/v1/clinics")
            .add_header(axum::http::header::COOKIE, cookie)
            .add_query_param("page", "abc")
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_message_fields_fail_validation_before_any_send() {
        let config = test_config();
        let cookie = session_cookie(&config);
        let server = server_with(config);

        let response = server
            .post("/api/v1/messages")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&json!({"to": "", "message": ""}))
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn messaging_without_credentials_is_a_server_error() {
        let config = test_config();
        let cookie = session_cookie(&config);
        let server = server_with(config);

        let response = server
            .post("/api/v1/messages")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&json!({"to": "5511912345678", "message": "hi"}))
            .await;
        response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn messaging_relays_the_provider_response() {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/555/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [{ "id": "wamid.42" }]
            })))
            .mount(&provider)
            .await;

        let mut config = test_config();
        config.whatsapp.api_base = provider.uri();
        config.whatsapp.token = Some("t".to_string());
        config.whatsapp.phone_number_id = Some("555".to_string());
        let cookie = session_cookie(&config);
        let server = server_with(config);

        let response = server
            .post("/api/v1/messages")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&json!({"to": "+55 11 91234-5678", "message": "hello"}))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["messages"][0]["id"], "wamid.42");
    }

    #[tokio::test]
    async fn messaging_relays_provider_failures() {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/555/messages"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "message": "forbidden by provider" }
            })))
            .mount(&provider)
            .await;

        let mut config = test_config();
        config.whatsapp.api_base = provider.uri();
        config.whatsapp.token = Some("t".to_string());
        config.whatsapp.phone_number_id = Some("555".to_string());
        let cookie = session_cookie(&config);
        let server = server_with(config);

        let response = server
            .post("/api/v1/messages")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&json!({"to": "5511912345678", "message": "hello"}))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "forbidden by provider");
    }
}
