// rest_api/src/lib.rs

//! HTTP surface of the MediStaff server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error as AnyhowError};
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use lib::storage_engine::{FileStorage, NurseRequestStorageEngine, StaffStorageEngine, Stores, PUBLIC_PREFIX};
use security::SessionKeys;

pub mod error;
pub mod handlers;
pub mod services;

pub use error::{ApiResponse, RestApiError};

use handlers::auth::{change_password_handler, login_handler};
use handlers::health_check_handler;
use handlers::nurse_requests::{
    create_nurse_request_handler, list_nurse_requests_handler, update_nurse_request_handler,
};
use handlers::staff::{
    add_staff_handler, delete_staff_handler, get_staff_by_email_handler, list_doctor_essentials_handler,
    list_doctors_by_specialization_handler, list_doctors_handler, list_staff_handler, role_counts_handler,
};

/// Attachments accepted per registration: one profile picture plus ten certificates.
const MAX_FILES_PER_REQUEST: u64 = 11;
/// Allowance for the text fields of a registration form.
const FORM_FIELDS_ALLOWANCE: u64 = 1024 * 1024;

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub staff: Arc<dyn StaffStorageEngine>,
    pub nurse_requests: Arc<dyn NurseRequestStorageEngine>,
    pub files: Arc<FileStorage>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(stores: Stores, files: FileStorage, sessions: SessionKeys) -> Self {
        AppState {
            staff: stores.staff,
            nurse_requests: stores.nurse_requests,
            files: Arc::new(files),
            sessions: Arc::new(sessions),
        }
    }
}

/// Builds the full router, including static serving of committed uploads.
pub fn app_router(state: AppState) -> Router {
    let body_limit = state
        .files
        .max_file_bytes()
        .saturating_mul(MAX_FILES_PER_REQUEST)
        .saturating_add(FORM_FIELDS_ALLOWANCE);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    let uploads = ServeDir::new(state.files.upload_dir());

    Router::new()
        .route("/", get(health_check_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/staff", get(list_staff_handler))
        .route("/api/staff/add", post(add_staff_handler))
        .route("/api/staff/email/:email", get(get_staff_by_email_handler))
        .route("/api/staff/roles/count", get(role_counts_handler))
        .route("/api/staff/doctor", get(list_doctors_handler))
        .route("/api/staff/doctors", get(list_doctors_handler))
        .route("/api/staff/doctor/essential", get(list_doctor_essentials_handler))
        .route("/api/staff/doctors/essential", get(list_doctor_essentials_handler))
        .route("/api/staff/doctor/specialization/:specialization", get(list_doctors_by_specialization_handler))
        .route("/api/staff/doctors/specialization/:specialization", get(list_doctors_by_specialization_handler))
        .route("/api/staff/:staff_id", delete(delete_staff_handler))
        .route("/api/staff/:staff_id/password", put(change_password_handler))
        .route("/api/nurse-requests", get(list_nurse_requests_handler).post(create_nurse_request_handler))
        .route("/api/nurse-requests/:id", put(update_nurse_request_handler))
        .nest_service(PUBLIC_PREFIX, uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<(), AnyhowError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed to start or run")?;

    info!("REST API server stopped.");
    Ok(())
}
