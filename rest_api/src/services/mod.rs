// rest_api/src/services/mod.rs
pub mod authentication;
pub mod directory;
pub mod intake;
pub mod nurse_requests;
