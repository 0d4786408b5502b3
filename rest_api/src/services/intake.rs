// rest_api/src/services/intake.rs

//! Staff registration from a multipart form.

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::{info, warn};

use lib::storage_engine::{FileStorage, UploadBatch, UploadField};
use models::errors::{StaffError, StaffResult};
use models::{ListInput, NewStaff, StaffProfile, StaffRecord, StaffRegistration};
use security::hash_password;

use crate::error::RestApiError;
use crate::AppState;

pub const STAFF_ADDED: &str = "Staff added successfully";

// Text values of one form field, in arrival order. `bracketed` records
// whether the client used the `name[]` array notation.
#[derive(Debug, Default)]
struct FormValues {
    values: Vec<String>,
    bracketed: bool,
}

#[derive(Debug, Default)]
struct FormFields(HashMap<String, FormValues>);

impl FormFields {
    fn push(&mut self, raw_name: &str, value: String) {
        let (name, bracketed) = match raw_name.strip_suffix("[]") {
            Some(stripped) => (stripped, true),
            None => (raw_name, false),
        };
        let entry = self.0.entry(name.to_string()).or_default();
        entry.bracketed |= bracketed;
        entry.values.push(value);
    }

    fn scalar(&mut self, name: &str) -> Option<String> {
        self.0.remove(name).and_then(|field| field.values.into_iter().next())
    }

    fn list(&mut self, name: &str) -> ListInput {
        match self.0.remove(name) {
            Some(field) if field.bracketed && !field.values.is_empty() => ListInput::Sequence(field.values),
            Some(field) => ListInput::from(field.values),
            None => ListInput::Absent,
        }
    }

    fn into_registration(mut self) -> StaffRegistration {
        StaffRegistration {
            staff_id: self.scalar("staffId"),
            full_name: self.scalar("fullName"),
            role: self.scalar("role"),
            work_email: self.scalar("workEmail"),
            personal_email: self.scalar("personalEmail"),
            password: self.scalar("password"),
            specialization: self.list("specialization"),
            qualifications: self.list("qualifications"),
            languages: self.list("languages"),
            experience: self.scalar("experience"),
            hpcsa_number: self.scalar("hpcsaNumber"),
            location: self.scalar("location"),
        }
    }
}

/// Reads the whole form, staging attachments as they arrive.
///
/// On any error the batch is discarded before returning.
pub async fn read_registration_form(
    multipart: &mut Multipart,
    files: &FileStorage,
) -> Result<(StaffRegistration, UploadBatch), RestApiError> {
    let mut batch = files.begin_batch();
    match read_parts(multipart, &mut batch).await {
        Ok(fields) => Ok((fields.into_registration(), batch)),
        Err(e) => {
            batch.discard().await;
            Err(e)
        }
    }
}

async fn read_parts(multipart: &mut Multipart, batch: &mut UploadBatch) -> Result<FormFields, RestApiError> {
    let mut fields = FormFields::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await?;
            fields.push(&name, value);
            continue;
        };

        // Browsers send an empty part for a file input left blank.
        if file_name.is_empty() {
            continue;
        }

        let upload_field = UploadField::from_name(&name)
            .ok_or_else(|| StaffError::validation(format!("Unexpected file field '{}'", name)))?;
        let content_type = field.content_type().map(str::to_string);
        batch.stage(upload_field, Some(file_name.as_str()), content_type.as_deref(), field).await?;
    }
    Ok(fields)
}

/// Validates, hashes and stores a registration whose attachments are staged in `batch`.
///
/// Staged files are discarded when validation, the uniqueness pre-check or
/// hashing fails. Committed files are deleted again when the insert fails.
pub async fn register_staff(
    state: &AppState,
    registration: StaffRegistration,
    batch: UploadBatch,
) -> StaffResult<StaffProfile> {
    let (new_staff, password_hash) = match prepare(state, registration).await {
        Ok(prepared) => prepared,
        Err(e) => {
            batch.discard().await;
            return Err(e);
        }
    };

    let uploads = batch.commit().await?;
    let record = StaffRecord::from_new_staff(new_staff, password_hash, uploads.clone());

    if let Err(e) = state.staff.insert_if_absent(&record).await {
        if !uploads.is_empty() {
            warn!(staff_id = %record.staff_id, "Insert failed, removing committed uploads");
        }
        state.files.delete_all(&uploads).await;
        return Err(e);
    }

    info!(staff_id = %record.staff_id, role = %record.role, "Staff registered");
    Ok(StaffProfile::from(record))
}

async fn prepare(state: &AppState, registration: StaffRegistration) -> StaffResult<(NewStaff, String)> {
    let new_staff = NewStaff::try_from(registration)?;

    // Fails fast before the hashing cost. The insert re-checks atomically.
    if state
        .staff
        .is_taken(&new_staff.staff_id, &new_staff.work_email, &new_staff.personal_email)
        .await?
    {
        return Err(StaffError::conflict(lib::storage_engine::STAFF_CONFLICT));
    }

    let password = new_staff.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    Ok((new_staff, password_hash))
}
