// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod notify;
mod session;

#[cfg(test)]
mod tests;

use agri_connect_api::{
    AcceptOfferResponse, ApiError, ApiResult, AuthenticatedActor, CompleteRequestResponse,
    CreateOfferRequest, CreateOfferResponse, CreateServiceRequestRequest,
    CreateServiceRequestResponse, GetOfferResponse, IdentityProvider, ListMyRequestsResponse,
    ListOffersResponse, ListServiceRequestsResponse, RejectOfferResponse, Role, TokenAuthority,
    accept_offer, complete_request, create_offer, create_service_request, get_offer,
    list_my_requests, list_offers, list_open_requests, reject_offer, translate_persistence_error,
};
use agri_connect_domain::FieldError;
use agri_connect_persistence::{Persistence, PersistenceError, StorageConfig};
use axum::{
    Json, Router,
    extract::{
        Path, State as AxumState,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::notify::NotificationDispatcher;
use crate::session::SessionActor;

/// `AgriConnect` Server - HTTP server for the `AgriConnect` marketplace
/// Upper bound for `--token-ttl-hours`.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an in-memory
    /// database served over a single connection.
    #[arg(short, long, env = "AGRI_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind the server to
    #[arg(long, env = "AGRI_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to bind the server to
    #[arg(short, long, env = "AGRI_PORT", default_value_t = 5000)]
    port: u16,

    /// Shared secret used to sign and verify bearer tokens
    #[arg(long, env = "AGRI_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Lifetime of tokens issued by `add-user`, at most ten years
    #[arg(
        long,
        default_value_t = 24,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_HOURS)
    )]
    token_ttl_hours: i64,

    /// How long a writer waits on a locked database before failing
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 8)]
    pool_size: u32,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Registers a user and prints a bearer token for them.
    AddUser {
        /// Unique login name
        #[arg(long)]
        username: String,
        /// One of farmer, `service_provider`, `tractor_owner`, admin
        #[arg(long)]
        role: Role,
    },
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The storage client. Cloning shares the connection pool.
    persistence: Persistence,
    /// Resolves bearer tokens to callers.
    identity: Arc<dyn IdentityProvider>,
    /// Receives notifications after each commit.
    notifier: NotificationDispatcher,
}

/// Body of a response that only carries a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error message.
    message: String,
    /// Per-field failures, for validation errors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The JSON body.
    body: ErrorResponse,
}

impl HttpError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                message: message.into(),
                errors: None,
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation { message, errors } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorResponse {
                    message,
                    errors: Some(errors),
                },
            },
            ApiError::AuthenticationFailed { reason } => {
                Self::new(StatusCode::UNAUTHORIZED, reason)
            }
            ApiError::Forbidden { message } => Self::new(StatusCode::FORBIDDEN, message),
            ApiError::NotFound { message } => Self::new(StatusCode::NOT_FOUND, message),
            ApiError::Conflict { message } => Self::new(StatusCode::CONFLICT, message),
            ApiError::InvalidState { message } => Self::new(StatusCode::BAD_REQUEST, message),
            ApiError::Internal { message } => {
                error!(error = %message, "Internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error. Please try again later.",
                )
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid path parameter: {}", rejection.body_text()),
        )
    }
}

/// Runs a synchronous API call on the blocking pool.
async fn run_blocking<T, F>(operation: &'static str, call: F) -> Result<T, HttpError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| {
            HttpError::from(ApiError::Internal {
                message: format!("{operation} task failed: {e}"),
            })
        })?
        .map_err(HttpError::from)
}

/// Handler for GET `/`.
async fn handle_root() -> &'static str {
    "AgriConnect Backend API is running..."
}

/// Handler for GET `/health`.
///
/// Round-trips a query through the pool.
async fn handle_health(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<MessageResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    run_blocking("health_check", move || {
        persistence
            .health_check()
            .map_err(translate_persistence_error)
    })
    .await?;

    Ok(Json(MessageResponse {
        message: String::from("AgriConnect Backend API is healthy."),
    }))
}

/// Handler for POST `/api/service-requests`.
async fn handle_create_service_request(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    body: Result<Json<CreateServiceRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateServiceRequestResponse>), HttpError> {
    let Json(request) = body?;
    let persistence: Persistence = app_state.persistence.clone();

    let result: ApiResult<CreateServiceRequestResponse> =
        run_blocking("create_service_request", move || {
            create_service_request(&persistence, request, &actor, OffsetDateTime::now_utc())
        })
        .await?;

    app_state.notifier.dispatch(result.notifications);
    Ok((StatusCode::CREATED, Json(result.response)))
}

/// Handler for GET `/api/service-requests`.
async fn handle_list_open_requests(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<ListServiceRequestsResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let response: ListServiceRequestsResponse = run_blocking("list_open_requests", move || {
        list_open_requests(&persistence, &actor)
    })
    .await?;

    Ok(Json(response))
}

/// Handler for GET `/api/service-requests/my-requests`.
async fn handle_list_my_requests(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<ListMyRequestsResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let response: ListMyRequestsResponse =
        run_blocking("list_my_requests", move || list_my_requests(&persistence, &actor)).await?;

    Ok(Json(response))
}

/// Handler for PUT `/api/service-requests/{request_id}/complete`.
async fn handle_complete_request(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<CompleteRequestResponse>, HttpError> {
    let Path(request_id) = path?;
    let persistence: Persistence = app_state.persistence.clone();

    let result: ApiResult<CompleteRequestResponse> =
        run_blocking("complete_request", move || {
            complete_request(&persistence, request_id, &actor, OffsetDateTime::now_utc())
        })
        .await?;

    app_state.notifier.dispatch(result.notifications);
    Ok(Json(result.response))
}

/// Handler for POST `/api/offers`.
async fn handle_create_offer(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    body: Result<Json<CreateOfferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOfferResponse>), HttpError> {
    let Json(request) = body?;
    let persistence: Persistence = app_state.persistence.clone();

    let result: ApiResult<CreateOfferResponse> = run_blocking("create_offer", move || {
        create_offer(&persistence, request, &actor, OffsetDateTime::now_utc())
    })
    .await?;

    app_state.notifier.dispatch(result.notifications);
    Ok((StatusCode::CREATED, Json(result.response)))
}

/// Handler for GET `/api/offers`.
async fn handle_list_offers(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<ListOffersResponse>, HttpError> {
    let persistence: Persistence = app_state.persistence;
    let response: ListOffersResponse =
        run_blocking("list_offers", move || list_offers(&persistence, &actor)).await?;

    Ok(Json(response))
}

/// Handler for GET `/api/offers/{offer_id}`.
async fn handle_get_offer(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<GetOfferResponse>, HttpError> {
    let Path(offer_id) = path?;
    let persistence: Persistence = app_state.persistence;
    let response: GetOfferResponse =
        run_blocking("get_offer", move || get_offer(&persistence, offer_id, &actor)).await?;

    Ok(Json(response))
}

/// Handler for PUT `/api/offers/{offer_id}/accept`.
async fn handle_accept_offer(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<AcceptOfferResponse>, HttpError> {
    let Path(offer_id) = path?;
    let persistence: Persistence = app_state.persistence.clone();

    let result: ApiResult<AcceptOfferResponse> = run_blocking("accept_offer", move || {
        accept_offer(&persistence, offer_id, &actor, OffsetDateTime::now_utc())
    })
    .await?;

    app_state.notifier.dispatch(result.notifications);
    Ok(Json(result.response))
}

/// Handler for PUT `/api/offers/{offer_id}/reject`.
async fn handle_reject_offer(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<RejectOfferResponse>, HttpError> {
    let Path(offer_id) = path?;
    let persistence: Persistence = app_state.persistence.clone();

    let result: ApiResult<RejectOfferResponse> = run_blocking("reject_offer", move || {
        reject_offer(&persistence, offer_id, &actor, OffsetDateTime::now_utc())
    })
    .await?;

    app_state.notifier.dispatch(result.notifications);
    Ok(Json(result.response))
}

/// Fallback for unknown routes.
async fn handle_not_found() -> HttpError {
    HttpError::new(StatusCode::NOT_FOUND, "Route not found.")
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route(
            "/api/service-requests",
            post(handle_create_service_request).get(handle_list_open_requests),
        )
        .route(
            "/api/service-requests/my-requests",
            get(handle_list_my_requests),
        )
        .route(
            "/api/service-requests/{request_id}/complete",
            put(handle_complete_request),
        )
        .route(
            "/api/offers",
            post(handle_create_offer).get(handle_list_offers),
        )
        .route("/api/offers/{offer_id}", get(handle_get_offer))
        .route("/api/offers/{offer_id}/accept", put(handle_accept_offer))
        .route("/api/offers/{offer_id}/reject", put(handle_reject_offer))
        .fallback(handle_not_found)
        .with_state(app_state)
}

/// Opens file-backed storage, or an in-memory database when no path is given.
fn open_persistence(
    database: Option<&FsPath>,
    config: &StorageConfig,
) -> Result<Persistence, PersistenceError> {
    if let Some(path) = database {
        info!(path = %path.display(), "Using file-based database");
        Persistence::new_with_file(path, config)
    } else {
        let persistence: Persistence = Persistence::new_in_memory()?;
        warn!(
            connections = persistence.max_connections(),
            "Using in-memory database; requests share one connection"
        );
        Ok(persistence)
    }
}

/// Registers a user and returns a bearer token for them.
fn add_user(
    persistence: &Persistence,
    authority: &TokenAuthority,
    username: &str,
    role: Role,
    ttl: time::Duration,
) -> Result<String, Box<dyn std::error::Error>> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let user_id: i64 = persistence.create_user(username, role.as_str(), now)?;
    let token: String = authority.issue(&AuthenticatedActor::new(user_id, role), ttl, now)?;

    info!(user_id, username, role = %role, "Registered user");
    Ok(token)
}

/// Resolves once the process receives Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing AgriConnect Server");

    let config: StorageConfig = StorageConfig {
        pool_size: args.pool_size,
        busy_timeout: std::time::Duration::from_millis(args.busy_timeout_ms),
    };
    let persistence: Persistence = open_persistence(args.database.as_deref(), &config)?;
    let authority: TokenAuthority = TokenAuthority::new(args.jwt_secret.as_bytes());

    if let Some(Commands::AddUser { username, role }) = args.command {
        if args.database.is_none() {
            warn!("No database given; the user will not outlive this process");
        }
        let token: String = add_user(
            &persistence,
            &authority,
            &username,
            role,
            time::Duration::hours(args.token_ttl_hours),
        )?;
        println!("{token}");
        return Ok(());
    }

    let notifier: NotificationDispatcher = NotificationDispatcher::new();
    let sink: JoinHandle<()> = notifier.spawn_log_sink();

    let app_state: AppState = AppState {
        persistence,
        identity: Arc::new(authority),
        notifier,
    };
    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = sink.await {
        warn!(error = %e, "Notification sink ended abnormally");
    }
    info!("Server stopped");

    Ok(())
}
