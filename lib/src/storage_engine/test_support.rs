// lib/src/storage_engine/test_support.rs
use models::{NewNurseRequest, NurseRequest, Role, StaffRecord, StoredUploads};
use models::{NewStaff, StaffRegistration};

pub fn staff_record(staff_id: &str, work_email: &str, personal_email: &str, role: Role) -> StaffRecord {
    let new_staff = NewStaff::try_from(StaffRegistration {
        staff_id: Some(staff_id.to_string()),
        full_name: Some(format!("Staff {staff_id}")),
        role: Some(role.to_string()),
        work_email: Some(work_email.to_string()),
        personal_email: Some(personal_email.to_string()),
        password: Some("secret".to_string()),
        ..Default::default()
    })
    .unwrap();
    StaffRecord::from_new_staff(new_staff, "$argon2id$test".to_string(), StoredUploads::default())
}

pub fn nurse_request(nurse_id: &str, doctor_id: &str) -> NurseRequest {
    NurseRequest::from_new(NewNurseRequest {
        nurse_id: Some(nurse_id.to_string()),
        nurse_name: None,
        doctor_id: Some(doctor_id.to_string()),
        reason: Some("Assistance needed".to_string()),
    })
    .unwrap()
}
