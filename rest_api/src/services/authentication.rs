// rest_api/src/services/authentication.rs

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::errors::{StaffError, StaffResult};
use models::util::{non_blank, normalize_email};
use models::Role;
use security::{hash_password, verify_password, verify_password_or_dummy, AuthError};

use crate::AppState;

pub const LOGIN_FIELDS_REQUIRED: &str = "Work email and password are required";
pub const PASSWORD_FIELDS_REQUIRED: &str = "currentPassword and newPassword are required";
pub const WRONG_CURRENT_PASSWORD: &str = "Current password is incorrect";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub work_email: Option<String>,
    pub password: Option<String>,
}

/// Token plus the profile summary a client needs after signing in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub id: Uuid,
    pub staff_id: String,
    pub name: String,
    pub work_email: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

fn typed_password(value: Option<String>) -> Option<String> {
    value.filter(|p| !p.trim().is_empty())
}

/// Checks the credentials and issues a session token.
///
/// Unknown emails still run a full hash verification, and both failure
/// paths return the same error.
pub async fn login(state: &AppState, request: LoginRequest) -> StaffResult<LoginResponse> {
    let (Some(work_email), Some(password)) =
        (non_blank(request.work_email.as_deref()), typed_password(request.password))
    else {
        return Err(StaffError::validation(LOGIN_FIELDS_REQUIRED));
    };

    let record = state.staff.get_by_work_email(&normalize_email(&work_email)).await?;
    let stored_hash = record.as_ref().map(|r| r.password_hash.clone());
    let verified =
        tokio::task::spawn_blocking(move || verify_password_or_dummy(&password, stored_hash.as_deref())).await??;

    let record = match record {
        Some(record) if verified => record,
        _ => return Err(AuthError::InvalidCredentials.into()),
    };

    let session = state.sessions.issue(&record)?;
    info!(staff_id = %record.staff_id, "Login successful");
    Ok(LoginResponse {
        token: session.token,
        id: record.id,
        staff_id: record.staff_id,
        name: record.full_name,
        work_email: record.work_email,
        role: record.role,
    })
}

/// Replaces the password of `staff_id` after checking the current one.
pub async fn change_password(state: &AppState, staff_id: &str, request: ChangePasswordRequest) -> StaffResult<()> {
    let (Some(current), Some(new_password)) =
        (typed_password(request.current_password), typed_password(request.new_password))
    else {
        return Err(StaffError::validation(PASSWORD_FIELDS_REQUIRED));
    };

    let record = state
        .staff
        .get_by_staff_id(staff_id)
        .await?
        .ok_or_else(|| StaffError::not_found(super::directory::STAFF_NOT_FOUND))?;

    let stored_hash = record.password_hash;
    let new_hash = tokio::task::spawn_blocking(move || -> Result<Option<String>, AuthError> {
        if !verify_password(&current, &stored_hash)? {
            return Ok(None);
        }
        hash_password(&new_password).map(Some)
    })
    .await??
    .ok_or_else(|| StaffError::auth(WRONG_CURRENT_PASSWORD))?;

    state
        .staff
        .update_password_hash(staff_id, &new_hash)
        .await?
        .ok_or_else(|| StaffError::not_found(super::directory::STAFF_NOT_FOUND))?;
    info!(staff_id = %staff_id, "Password changed");
    Ok(())
}
