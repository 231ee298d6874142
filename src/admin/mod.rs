//! Cross-user console. Every route here requires the admin role.

use crate::{ingredients, markets, state::AppState};
use axum::Router;

mod dto;
pub mod handlers;
mod repo;

pub fn router() -> Router<AppState> {
    let admin = Router::new()
        .merge(handlers::admin_routes())
        .merge(ingredients::handlers::admin_routes())
        .merge(markets::handlers::admin_routes());
    Router::new().nest("/admin", admin)
}
