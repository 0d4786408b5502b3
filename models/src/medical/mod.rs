// models/src/medical/mod.rs
pub mod nurse_request;
pub mod role;
pub mod staff;

pub use nurse_request::{NewNurseRequest, NurseRequest, STATUS_ATTENDED, STATUS_PENDING};
pub use role::{Role, RoleCount};
pub use staff::{DoctorSummary, NewStaff, StaffProfile, StaffRecord, StaffRegistration, StoredUploads};
