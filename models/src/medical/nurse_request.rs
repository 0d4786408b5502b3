// models/src/medical/nurse_request.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StaffError, StaffResult};
use crate::util::non_blank;

pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_ATTENDED: &str = "Attended";

/// A nurse asking a doctor for assistance. `status` is an open set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NurseRequest {
    pub id: Uuid,
    pub nurse_id: String,
    pub nurse_name: Option<String>,
    pub doctor_id: String,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a nurse request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNurseRequest {
    pub nurse_id: Option<String>,
    pub nurse_name: Option<String>,
    pub doctor_id: Option<String>,
    pub reason: Option<String>,
}

impl NurseRequest {
    /// Validates the input and builds a request in the `Pending` state.
    pub fn from_new(input: NewNurseRequest) -> StaffResult<Self> {
        let nurse_id = non_blank(input.nurse_id.as_deref());
        let doctor_id = non_blank(input.doctor_id.as_deref());
        let reason = non_blank(input.reason.as_deref());
        let (Some(nurse_id), Some(doctor_id), Some(reason)) = (nurse_id, doctor_id, reason) else {
            return Err(StaffError::validation("nurseId, doctorId and reason are required"));
        };

        let now = Utc::now();
        Ok(NurseRequest {
            id: Uuid::new_v4(),
            nurse_id,
            nurse_name: non_blank(input.nurse_name.as_deref()),
            doctor_id,
            reason,
            status: STATUS_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a status update. A missing or blank status keeps the current one.
    pub fn apply_status(&mut self, status: Option<&str>) {
        if let Some(status) = non_blank(status) {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}
