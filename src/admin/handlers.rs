use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::PublicUser, jwt::AdminUser, repo::User},
    error::ApiError,
    items::repo::FoodItem,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/overview", get(overview))
        .route("/admin/users/:id/approve", post(approve_user))
        .route("/admin/users/:id", delete(delete_user))
}

#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub pending_users: Vec<PublicUser>,
    pub users: Vec<PublicUser>,
    pub total_items: i64,
    pub expired_items: i64,
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn overview(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<AdminOverview>, ApiError> {
    let pending = User::list_pending(&state.db).await?;
    let users = User::list_all(&state.db).await?;
    let total_items = FoodItem::count_all(&state.db).await?;
    let expired_items = FoodItem::count_expired(&state.db).await?;

    Ok(Json(AdminOverview {
        pending_users: pending.iter().map(PublicUser::from).collect(),
        users: users.iter().map(PublicUser::from).collect(),
        total_items,
        expired_items,
    }))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn approve_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !User::approve(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = %id, "user approved");
    Ok(StatusCode::NO_CONTENT)
}

/// Removes a user and, via the cascade, all of their food items. Deleting
/// your own account is a silent no-op.
#[instrument(skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let AdminUser(admin) = admin;
    if id == admin.id {
        warn!("admin attempted self-deletion, ignoring");
        return Ok(StatusCode::NO_CONTENT);
    }

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_serialization() {
        let overview = AdminOverview {
            pending_users: vec![],
            users: vec![],
            total_items: 12,
            expired_items: 4,
        };
        let json = serde_json::to_string(&overview).unwrap();
        assert!(json.contains("\"total_items\":12"));
        assert!(json.contains("\"expired_items\":4"));
    }
}
