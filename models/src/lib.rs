// models/src/lib.rs

//! Data model shared by the MediStaff crates: staff records, nurse requests,
//! the request-normalization helpers and the error taxonomy.

pub mod errors;
pub mod medical;
pub mod util;

pub use errors::{StaffError, StaffResult};
pub use medical::{
    DoctorSummary, NewNurseRequest, NewStaff, NurseRequest, Role, RoleCount, StaffProfile,
    StaffRecord, StaffRegistration, StoredUploads,
};
pub use util::ListInput;
