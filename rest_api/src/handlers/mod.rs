// rest_api/src/handlers/mod.rs
pub mod auth;
pub mod nurse_requests;
pub mod staff;

pub const HEALTH_MESSAGE: &str = "MediStaff API is running";

pub async fn health_check_handler() -> &'static str {
    HEALTH_MESSAGE
}
