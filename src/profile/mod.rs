use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
mod repo;
pub mod services;

pub use services::DietPreference;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
