use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::CurrentUser,
    error::ApiError,
    items::{dto::ItemView, repo::FoodItem},
    notifications::{
        engine::{self, RECIPE_WINDOW_DAYS},
        repo::Notification,
    },
    state::AppState,
};

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/check", get(check_notifications))
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(recipes))
}

#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub kind: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct SweepStatus {
    pub status: &'static str,
    pub sent: usize,
}

#[derive(Debug, Serialize)]
pub struct RecipesResponse {
    pub ingredients: Vec<ItemView>,
    pub suggestion: String,
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let rows = Notification::latest_for_user(&state.db, user.0.id, 50).await?;
    let views = rows
        .into_iter()
        .map(|n| NotificationView {
            id: n.id,
            food_item_id: n.food_item_id,
            kind: n.kind,
            message: n.message,
            sent_at: n.sent_at,
        })
        .collect();
    Ok(Json(views))
}

/// Unauthenticated polling trigger for the expiry sweep.
#[instrument(skip(state))]
pub async fn check_notifications(
    State(state): State<AppState>,
) -> Result<Json<SweepStatus>, ApiError> {
    let sent = engine::run_sweep(&state).await?;
    Ok(Json(SweepStatus {
        status: "Notifications checked",
        sent,
    }))
}

/// Items expiring within the recipe window (not expired, not used) plus the
/// canned suggestion line.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn recipes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<RecipesResponse>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let cutoff = today + Duration::days(RECIPE_WINDOW_DAYS);

    let ingredients: Vec<FoodItem> = FoodItem::expiring_within(&state.db, user.0.id, cutoff)
        .await?
        .into_iter()
        .filter(|i| !i.is_used)
        .collect();

    let names: Vec<String> = ingredients.iter().map(|i| i.name.clone()).collect();
    let suggestion = engine::recipe_suggestions(&names);
    let views = ingredients
        .iter()
        .map(|i| ItemView::from_item(i, today))
        .collect();

    Ok(Json(RecipesResponse {
        ingredients: views,
        suggestion,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_view_serialization() {
        let view = NotificationView {
            id: Uuid::new_v4(),
            food_item_id: Uuid::new_v4(),
            kind: "week".into(),
            message: "milk expires in a week! Use it soon.".into(),
            sent_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"kind\":\"week\""));
        assert!(json.contains("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn sweep_status_serialization() {
        let json = serde_json::to_string(&SweepStatus {
            status: "Notifications checked",
            sent: 3,
        })
        .unwrap();
        assert!(json.contains("Notifications checked"));
        assert!(json.contains("\"sent\":3"));
    }
}
