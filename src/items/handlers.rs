use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use bytes::Bytes;
use time::{macros::format_description, Date, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::CurrentUser,
    error::ApiError,
    items::{
        dto::{group_items, CreatedItemResponse, DashboardResponse, ItemView},
        images,
        repo::{FoodItem, NewFoodItem},
    },
    notifications::engine,
    state::AppState,
    stats,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/items", get(list_items))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(create_item))
        .route("/items/:id", delete(delete_item))
        .route("/items/:id/used", post(mark_item_used))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// Dashboard view: runs the expiry sweep first, then returns the caller's
/// unused items bucketed by freshness along with their statistics.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let CurrentUser(user) = user;

    engine::run_sweep(&state).await?;

    let today = OffsetDateTime::now_utc().date();
    let items = FoodItem::list_unused_by_user(&state.db, user.id).await?;
    let (expired, expiring_soon, fresh) = group_items(&items, today);

    let all_items = FoodItem::list_by_user(&state.db, user.id).await?;
    let stats = stats::compute(&all_items, state.config.fallback_price);

    Ok(Json(DashboardResponse {
        expired,
        expiring_soon,
        fresh,
        stats,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_items(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ItemView>>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let items = FoodItem::list_by_user(&state.db, user.0.id).await?;
    let views = items.iter().map(|i| ItemView::from_item(i, today)).collect();
    Ok(Json(views))
}

/// POST /items (multipart): name, expiry_date, optional barcode/category/
/// quantity/price and an optional `image` file.
#[instrument(skip(state, user, mp), fields(user_id = %user.0.id))]
pub async fn create_item(
    State(state): State<AppState>,
    user: CurrentUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<CreatedItemResponse>), ApiError> {
    let CurrentUser(user) = user;

    let mut name = String::new();
    let mut barcode = None;
    let mut category = None;
    let mut expiry_raw = None;
    let mut quantity = 1i32;
    let mut price = None;
    let mut image: Option<(Bytes, String)> = None;

    while let Ok(Some(field)) = mp.next_field().await {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("name") => name = text(field).await?.trim().to_string(),
            Some("barcode") => barcode = non_empty(text(field).await?),
            Some("category") => category = non_empty(text(field).await?),
            Some("expiry_date") => expiry_raw = non_empty(text(field).await?),
            Some("quantity") => {
                quantity = text(field)
                    .await?
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| ApiError::Validation("Invalid quantity".into()))?;
            }
            Some("price") => {
                price = Some(
                    text(field)
                        .await?
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| ApiError::Validation("Invalid price".into()))?,
                );
            }
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                if !data.is_empty() {
                    image = Some((data, content_type));
                }
            }
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(ApiError::Validation("Item name is required".into()));
    }
    let expiry_raw = expiry_raw.ok_or_else(|| ApiError::Validation("Expiry date is required".into()))?;
    let expiry_date = parse_date(&expiry_raw)?;

    let image_path = match image {
        Some((data, content_type)) => {
            Some(images::save_image(&state.config.upload_dir, user.id, &content_type, data).await?)
        }
        None => None,
    };

    let item = FoodItem::create(
        &state.db,
        NewFoodItem {
            user_id: user.id,
            name,
            barcode,
            category,
            expiry_date,
            quantity,
            price,
            image_path,
        },
    )
    .await?;

    info!(item_id = %item.id, name = %item.name, "item added");
    Ok((
        StatusCode::CREATED,
        Json(CreatedItemResponse {
            id: item.id,
            name: item.name,
            expiry_date: item.expiry_date.to_string(),
            image_path: item.image_path,
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match FoodItem::delete_owned(&state.db, user.0.id, id).await? {
        Some(image_path) => {
            if let Some(path) = image_path {
                images::remove_image(&state.config.upload_dir, &path).await;
            }
            info!(item_id = %id, "item deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound("Item")),
    }
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn mark_item_used(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !FoodItem::mark_used(&state.db, user.0.id, id).await? {
        return Err(ApiError::NotFound("Item"));
    }
    info!(item_id = %id, "item marked used");
    Ok(StatusCode::NO_CONTENT)
}

async fn text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn parse_date(raw: &str) -> Result<Date, ApiError> {
    let fmt = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &fmt)
        .map_err(|_| ApiError::Validation(format!("Invalid date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2026-03-01").unwrap(), date!(2026 - 03 - 01));
        assert_eq!(parse_date(" 2026-03-01 ").unwrap(), date!(2026 - 03 - 01));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_date("03/01/2026").is_err());
        assert!(parse_date("soon").is_err());
        assert!(parse_date("2026-13-40").is_err());
    }

    #[test]
    fn non_empty_trims_and_drops_blank() {
        assert_eq!(non_empty("  milk ".into()), Some("milk".into()));
        assert_eq!(non_empty("   ".into()), None);
    }
}
