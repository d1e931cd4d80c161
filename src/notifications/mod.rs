pub mod engine;
pub mod handlers;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::notification_routes())
        .merge(handlers::recipe_routes())
}
