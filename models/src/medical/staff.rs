// models/src/medical/staff.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StaffError, StaffResult};
use crate::medical::role::Role;
use crate::util::{non_blank, normalize_email, ListInput};

pub const REQUIRED_FIELDS: [&str; 6] = ["staffId", "fullName", "role", "workEmail", "personalEmail", "password"];

// --- Raw registration input ---
// Exactly what came off the wire, before any validation.
#[derive(Debug, Clone, Default)]
pub struct StaffRegistration {
    pub staff_id: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub work_email: Option<String>,
    pub personal_email: Option<String>,
    pub password: Option<String>,
    pub specialization: ListInput,
    pub qualifications: ListInput,
    pub languages: ListInput,
    pub experience: Option<String>,
    pub hpcsa_number: Option<String>,
    pub location: Option<String>,
}

// --- Validated registration ---
// Holds the plaintext password only until it is hashed.
#[derive(Clone, PartialEq)]
pub struct NewStaff {
    pub staff_id: String,
    pub full_name: String,
    pub role: Role,
    pub work_email: String,
    pub personal_email: String,
    pub password: String,
    pub specialization: Vec<String>,
    pub qualifications: Vec<String>,
    pub languages: Vec<String>,
    pub experience: String,
    pub hpcsa_number: String,
    pub location: String,
}

impl fmt::Debug for NewStaff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewStaff")
            .field("staff_id", &self.staff_id)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("work_email", &self.work_email)
            .field("personal_email", &self.personal_email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TryFrom<StaffRegistration> for NewStaff {
    type Error = StaffError;

    /// Checks the required fields and normalizes everything else.
    fn try_from(raw: StaffRegistration) -> StaffResult<Self> {
        let staff_id = non_blank(raw.staff_id.as_deref());
        let full_name = non_blank(raw.full_name.as_deref());
        let role = non_blank(raw.role.as_deref());
        let work_email = non_blank(raw.work_email.as_deref()).map(|e| normalize_email(&e));
        let personal_email = non_blank(raw.personal_email.as_deref()).map(|e| normalize_email(&e));
        // Passwords are kept as typed, but a blank one still counts as missing.
        let password = raw.password.filter(|p| !p.trim().is_empty());

        let present = [
            staff_id.is_some(),
            full_name.is_some(),
            role.is_some(),
            work_email.is_some(),
            personal_email.is_some(),
            password.is_some(),
        ];
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(StaffError::validation(format!(
                "Please fill in all required fields (missing: {})",
                missing.join(", ")
            )));
        }

        let (Some(staff_id), Some(full_name), Some(role), Some(work_email), Some(personal_email), Some(password)) =
            (staff_id, full_name, role, work_email, personal_email, password)
        else {
            return Err(StaffError::validation("Please fill in all required fields"));
        };

        Ok(NewStaff {
            staff_id,
            full_name,
            role: role.parse()?,
            work_email,
            personal_email,
            password,
            specialization: raw.specialization.into_vec(),
            qualifications: raw.qualifications.into_vec(),
            languages: raw.languages.into_vec(),
            experience: non_blank(raw.experience.as_deref()).unwrap_or_default(),
            hpcsa_number: non_blank(raw.hpcsa_number.as_deref()).unwrap_or_default(),
            location: non_blank(raw.location.as_deref()).unwrap_or_default(),
        })
    }
}

/// Public paths of the attachments committed for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredUploads {
    pub profile_pic: Option<String>,
    pub certificates: Vec<String>,
}

impl StoredUploads {
    pub fn is_empty(&self) -> bool {
        self.profile_pic.is_none() && self.certificates.is_empty()
    }

    /// Every path in the set, profile picture first.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.profile_pic.iter().map(String::as_str).chain(self.certificates.iter().map(String::as_str))
    }
}

// --- Stored record ---
// How a staff member is held in the credential store. Contains the password
// hash and therefore never leaves the service; see `StaffProfile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: Uuid,
    pub staff_id: String,
    pub full_name: String,
    pub role: Role,
    pub work_email: String,
    pub personal_email: String,
    pub password_hash: String,
    pub specialization: Vec<String>,
    pub qualifications: Vec<String>,
    pub languages: Vec<String>,
    pub certificates: Vec<String>,
    pub experience: String,
    pub hpcsa_number: String,
    pub location: String,
    pub profile_pic_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffRecord {
    /// Builds the record to persist from a validated registration.
    pub fn from_new_staff(new_staff: NewStaff, password_hash: String, uploads: StoredUploads) -> Self {
        let now = Utc::now();
        StaffRecord {
            id: Uuid::new_v4(),
            staff_id: new_staff.staff_id,
            full_name: new_staff.full_name,
            role: new_staff.role,
            work_email: new_staff.work_email,
            personal_email: new_staff.personal_email,
            password_hash,
            specialization: new_staff.specialization,
            qualifications: new_staff.qualifications,
            languages: new_staff.languages,
            certificates: uploads.certificates,
            experience: new_staff.experience,
            hpcsa_number: new_staff.hpcsa_number,
            location: new_staff.location,
            profile_pic_path: uploads.profile_pic.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Files owned by this record.
    pub fn uploads(&self) -> StoredUploads {
        StoredUploads {
            profile_pic: Some(self.profile_pic_path.clone()).filter(|p| !p.is_empty()),
            certificates: self.certificates.clone(),
        }
    }

    /// True if any of `specialization` contains `needle`, ignoring case.
    pub fn has_specialization_like(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.specialization.iter().any(|s| s.to_lowercase().contains(&needle))
    }
}

/// Client-facing view of a staff record. There is no password field to leak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub id: Uuid,
    pub staff_id: String,
    pub full_name: String,
    pub role: Role,
    pub work_email: String,
    pub personal_email: String,
    pub specialization: Vec<String>,
    pub qualifications: Vec<String>,
    pub languages: Vec<String>,
    pub certificates: Vec<String>,
    pub experience: String,
    pub hpcsa_number: String,
    pub location: String,
    #[serde(rename = "profilePic")]
    pub profile_pic_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StaffRecord> for StaffProfile {
    fn from(record: StaffRecord) -> Self {
        StaffProfile {
            id: record.id,
            staff_id: record.staff_id,
            full_name: record.full_name,
            role: record.role,
            work_email: record.work_email,
            personal_email: record.personal_email,
            specialization: record.specialization,
            qualifications: record.qualifications,
            languages: record.languages,
            certificates: record.certificates,
            experience: record.experience,
            hpcsa_number: record.hpcsa_number,
            location: record.location,
            profile_pic_path: record.profile_pic_path,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// The "essential fields" projection used by doctor pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: Uuid,
    pub staff_id: String,
    pub full_name: String,
    pub work_email: String,
    pub specialization: Vec<String>,
    pub location: String,
    #[serde(rename = "profilePic")]
    pub profile_pic_path: String,
}

impl From<StaffRecord> for DoctorSummary {
    fn from(record: StaffRecord) -> Self {
        DoctorSummary {
            id: record.id,
            staff_id: record.staff_id,
            full_name: record.full_name,
            work_email: record.work_email,
            specialization: record.specialization,
            location: record.location,
            profile_pic_path: record.profile_pic_path,
        }
    }
}
