// Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use lib::storage_engine::{
    FileStorage, InMemoryNurseRequestStorage, InMemoryStaffStorage, StaffStorageEngine, Stores, MAX_FILE_BYTES,
};
use rest_api::{app_router, AppState};
use security::SessionKeys;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
const BOUNDARY: &str = "medistaff-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_staff_storage(Arc::new(InMemoryStaffStorage::new())).await
    }

    pub async fn with_staff_storage(staff: Arc<dyn StaffStorageEngine>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = FileStorage::new(dir.path().join("uploads"), dir.path().join("staging"), MAX_FILE_BYTES)
            .await
            .unwrap();
        let stores = Stores { staff, nurse_requests: Arc::new(InMemoryNurseRequestStorage::new()) };
        let state = AppState::new(stores, files, SessionKeys::with_default_ttl(TEST_SECRET));
        TestApp { app: app_router(state.clone()), state, dir }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.dir.path().join("staging")
    }

    pub fn upload_count(&self) -> usize {
        count_entries(&self.upload_dir())
    }

    pub fn staging_count(&self) -> usize {
        count_entries(&self.staging_dir())
    }

    /// Maps a stored `/uploads/<name>` path to its location on disk.
    pub fn stored_file(&self, stored_path: &str) -> PathBuf {
        self.upload_dir().join(stored_path.trim_start_matches("/uploads/"))
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn register(&self, form: MultipartBuilder) -> (StatusCode, Value) {
        self.send(form.into_request("/api/staff/add")).await
    }

    pub async fn login(&self, work_email: &str, password: &str) -> (StatusCode, Value) {
        self.send(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "workEmail": work_email, "password": password }),
        ))
        .await
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Hand-assembled `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// A complete registration form with every required field.
pub fn registration(staff_id: &str, role: &str, work_email: &str, personal_email: &str) -> MultipartBuilder {
    MultipartBuilder::new()
        .text("staffId", staff_id)
        .text("fullName", &format!("Staff {staff_id}"))
        .text("role", role)
        .text("workEmail", work_email)
        .text("personalEmail", personal_email)
        .text("password", "secret")
}

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%test\n";
