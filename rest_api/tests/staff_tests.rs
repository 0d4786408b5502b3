//! Staff intake, queries and deletion through the full router.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{registration, MultipartBuilder, TestApp, PDF_BYTES, PNG_BYTES};
use lib::storage_engine::{InMemoryStaffStorage, StaffStorageEngine};
use models::{StaffError, StaffRecord, StaffResult};

#[tokio::test]
async fn test_root_reports_running() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::String("MediStaff API is running".to_string()));
}

#[tokio::test]
async fn test_register_normalizes_and_hides_password() {
    let app = TestApp::new().await;
    let form = MultipartBuilder::new()
        .text("staffId", "S1")
        .text("fullName", "A B")
        .text("role", "Doctor")
        .text("workEmail", "A@X.com")
        .text("personalEmail", "a2@x.com")
        .text("password", "secret")
        .text("specialization", "Cardiology, , Surgery")
        .text("languages[]", "English")
        .text("languages[]", "isiZulu");

    let (status, body) = app.register(form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Staff added successfully");
    assert_eq!(body["data"]["workEmail"], "a@x.com");
    assert_eq!(body["data"]["specialization"], serde_json::json!(["Cardiology", "Surgery"]));
    assert_eq!(body["data"]["languages"], serde_json::json!(["English", "isiZulu"]));
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password").is_none());

    let (status, fetched) = app.get("/api/staff/email/A@X.COM").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["staffId"], "S1");
    assert_eq!(fetched["data"]["fullName"], "A B");
    assert!(fetched["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_conflict_in_any_case_cleans_up_uploads() {
    let app = TestApp::new().await;
    let (status, _) = app.register(registration("S1", "Doctor", "a@x.com", "a2@x.com")).await;
    assert_eq!(status, StatusCode::CREATED);

    let duplicate = registration("S2", "Nurse", "A@X.COM", "other@x.com")
        .file("profilePic", "me.png", "image/png", PNG_BYTES)
        .file("certificates", "cert.pdf", "application/pdf", PDF_BYTES);
    let (status, body) = app.register(duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.staging_count(), 0);

    let (status, _) = app.register(registration("S1", "Nurse", "new@x.com", "new2@x.com")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.register(registration("S3", "Nurse", "new@x.com", " A2@x.com ")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = app.get("/api/staff").await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_missing_field_leaves_upload_dir_unchanged() {
    let app = TestApp::new().await;
    let form = MultipartBuilder::new()
        .text("staffId", "S1")
        .text("fullName", "A B")
        .text("role", "Doctor")
        .text("workEmail", "a@x.com")
        .text("personalEmail", "   ")
        .text("password", "secret")
        .file("profilePic", "me.png", "image/png", PNG_BYTES);

    let (status, body) = app.register(form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("personalEmail"));
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.staging_count(), 0);

    let (_, list) = app.get("/api/staff").await;
    assert_eq!(list["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_register_rejects_unknown_role() {
    let app = TestApp::new().await;
    let (status, _) = app.register(registration("S1", "Surgeon", "a@x.com", "a2@x.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_disallowed_mime_type() {
    let app = TestApp::new().await;
    let form = registration("S1", "Doctor", "a@x.com", "a2@x.com")
        .file("profilePic", "me.png", "image/png", PNG_BYTES)
        .file("certificates", "archive.zip", "application/zip", b"PK\x03\x04");

    let (status, body) = app.register(form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.staging_count(), 0);
}

#[tokio::test]
async fn test_register_rejects_oversized_file() {
    let app = TestApp::new().await;
    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let form = registration("S1", "Doctor", "a@x.com", "a2@x.com").file("certificates", "big.pdf", "application/pdf", &oversized);

    let (status, _) = app.register(form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.staging_count(), 0);
}

#[tokio::test]
async fn test_attachments_are_served_and_removed_on_delete() {
    let app = TestApp::new().await;
    let form = registration("S1", "Doctor", "a@x.com", "a2@x.com")
        .file("profilePic", "Me.PNG", "image/png", PNG_BYTES)
        .file("certificates", "one.pdf", "application/pdf", PDF_BYTES)
        .file("certificates", "two.pdf", "application/pdf", PDF_BYTES)
        .file("certificates", "", "application/octet-stream", b"");

    let (status, body) = app.register(form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let profile_pic = body["data"]["profilePic"].as_str().unwrap().to_string();
    assert!(profile_pic.starts_with("/uploads/profilePic-"));
    assert!(profile_pic.ends_with(".png"));
    assert_eq!(body["data"]["certificates"].as_array().unwrap().len(), 2);
    assert_eq!(app.upload_count(), 3);

    let (status, _) = app.get(&profile_pic).await;
    assert_eq!(status, StatusCode::OK);

    // A file already gone must not block the delete.
    let first_certificate = body["data"]["certificates"][0].as_str().unwrap().to_string();
    std::fs::remove_file(app.stored_file(&first_certificate)).unwrap();

    let (status, body) = app.delete("/api/staff/S1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Staff Staff S1 deleted successfully");
    assert_eq!(app.upload_count(), 0);

    let (status, body) = app.get("/api/staff/email/a@x.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Staff not found");

    let (status, _) = app.delete("/api/staff/S1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_doctor_queries() {
    let app = TestApp::new().await;
    let forms = [
        registration("D1", "Doctor", "d1@x.com", "d1p@x.com").text("specialization", "Interventional Cardiology"),
        registration("D2", "Doctor", "d2@x.com", "d2p@x.com").text("specialization", "Dermatology"),
        registration("N1", "Nurse", "n1@x.com", "n1p@x.com").text("specialization", "Cardiology"),
    ];
    for form in forms {
        let (status, _) = app.register(form).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for uri in ["/api/staff/doctor/specialization/cardio", "/api/staff/doctors/specialization/CARDIO"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["data"].as_array().unwrap().iter().map(|d| d["staffId"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["D1"]);
    }

    let (_, doctors) = app.get("/api/staff/doctors").await;
    assert_eq!(doctors["data"].as_array().unwrap().len(), 2);

    let (_, essentials) = app.get("/api/staff/doctor/essential").await;
    let first = &essentials["data"][0];
    assert_eq!(first["staffId"], "D1");
    assert!(first.get("personalEmail").is_none());
    assert!(first.get("workEmail").is_some());

    let (_, counts) = app.get("/api/staff/roles/count").await;
    assert_eq!(
        counts["data"],
        serde_json::json!([{ "role": "Doctor", "count": 2 }, { "role": "Nurse", "count": 1 }])
    );
}

fn with_certificates(form: MultipartBuilder, count: usize) -> MultipartBuilder {
    (0..count).fold(form, |form, i| form.file("certificates", &format!("cert-{i}.pdf"), "application/pdf", PDF_BYTES))
}

#[tokio::test]
async fn test_register_accepts_at_most_ten_certificates() {
    let app = TestApp::new().await;

    let too_many = with_certificates(registration("S1", "Doctor", "a@x.com", "a2@x.com"), 11);
    let (status, body) = app.register(too_many).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.staging_count(), 0);

    let ten = with_certificates(registration("S1", "Doctor", "a@x.com", "a2@x.com"), 10);
    let (status, body) = app.register(ten).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["certificates"].as_array().unwrap().len(), 10);
    assert_eq!(app.upload_count(), 10);
}

// Passes the uniqueness pre-check, then fails every insert.
struct FailingInsertStorage(InMemoryStaffStorage);

#[async_trait]
impl StaffStorageEngine for FailingInsertStorage {
    async fn insert_if_absent(&self, _record: &StaffRecord) -> StaffResult<()> {
        Err(StaffError::storage("write failed"))
    }

    async fn is_taken(&self, _staff_id: &str, _work_email: &str, _personal_email: &str) -> StaffResult<bool> {
        Ok(false)
    }

    async fn get_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>> {
        self.0.get_by_staff_id(staff_id).await
    }

    async fn get_by_work_email(&self, work_email: &str) -> StaffResult<Option<StaffRecord>> {
        self.0.get_by_work_email(work_email).await
    }

    async fn list(&self) -> StaffResult<Vec<StaffRecord>> {
        self.0.list().await
    }

    async fn update_password_hash(&self, staff_id: &str, password_hash: &str) -> StaffResult<Option<StaffRecord>> {
        self.0.update_password_hash(staff_id, password_hash).await
    }

    async fn delete_by_staff_id(&self, staff_id: &str) -> StaffResult<Option<StaffRecord>> {
        self.0.delete_by_staff_id(staff_id).await
    }
}

#[tokio::test]
async fn test_failed_insert_removes_committed_uploads() {
    let app = TestApp::with_staff_storage(Arc::new(FailingInsertStorage(InMemoryStaffStorage::new()))).await;
    let form = registration("S1", "Doctor", "a@x.com", "a2@x.com")
        .file("profilePic", "me.png", "image/png", PNG_BYTES)
        .file("certificates", "cert.pdf", "application/pdf", PDF_BYTES);

    let (status, body) = app.register(form).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server error");
    assert_eq!(body["error"], "ServerError");
    assert_eq!(app.upload_count(), 0);
    assert_eq!(app.staging_count(), 0);
}
