//! Waste-versus-savings statistics over a single user's items.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{auth::jwt::CurrentUser, error::ApiError, items::repo::FoodItem, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UserStats {
    pub total_items: usize,
    pub expired_items: usize,
    pub used_items: usize,
    pub active_items: usize,
    pub money_saved: f64,
    pub money_wasted: f64,
    pub waste_percentage: f64,
}

/// Counts and money sums over a user's items. Items without a price count at
/// the configured fallback value. Money rounds to 2 decimals, the waste
/// percentage to 1.
pub fn compute(items: &[FoodItem], fallback_price: f64) -> UserStats {
    let total_items = items.len();
    let expired_items = items.iter().filter(|i| i.is_expired).count();
    let used_items = items.iter().filter(|i| i.is_used).count();
    let active_items = items.iter().filter(|i| !i.is_expired && !i.is_used).count();

    let money_saved: f64 = items
        .iter()
        .filter(|i| i.is_used)
        .map(|i| i.price.unwrap_or(fallback_price))
        .sum();
    let money_wasted: f64 = items
        .iter()
        .filter(|i| i.is_expired)
        .map(|i| i.price.unwrap_or(fallback_price))
        .sum();

    let waste_percentage = if total_items > 0 {
        expired_items as f64 / total_items as f64 * 100.0
    } else {
        0.0
    };

    UserStats {
        total_items,
        expired_items,
        used_items,
        active_items,
        money_saved: round2(money_saved),
        money_wasted: round2(money_wasted),
        waste_percentage: round1(waste_percentage),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserStats>, ApiError> {
    let items = FoodItem::list_by_user(&state.db, user.0.id).await?;
    Ok(Json(compute(&items, state.config.fallback_price)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use uuid::Uuid;

    fn item(price: Option<f64>, is_expired: bool, is_used: bool) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "item".into(),
            barcode: None,
            category: None,
            purchase_date: date!(2025 - 01 - 01),
            expiry_date: date!(2025 - 02 - 01),
            quantity: 1,
            price,
            image_path: None,
            is_expired,
            is_used,
        }
    }

    #[test]
    fn empty_inventory_is_all_zeroes() {
        let stats = compute(&[], 5.0);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.money_saved, 0.0);
        assert_eq!(stats.money_wasted, 0.0);
        assert_eq!(stats.waste_percentage, 0.0);
    }

    #[test]
    fn fallback_price_fills_missing_prices() {
        // Priced used, priced expired, unpriced used.
        let items = vec![
            item(Some(5.0), false, true),
            item(Some(3.0), true, false),
            item(None, false, true),
        ];
        let stats = compute(&items, 5.0);
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.expired_items, 1);
        assert_eq!(stats.used_items, 2);
        assert_eq!(stats.active_items, 0);
        assert_eq!(stats.money_saved, 10.0);
        assert_eq!(stats.money_wasted, 3.0);
        assert_eq!(stats.waste_percentage, 33.3);
    }

    #[test]
    fn active_means_neither_expired_nor_used() {
        let items = vec![
            item(None, false, false),
            item(None, true, false),
            item(None, false, true),
        ];
        let stats = compute(&items, 5.0);
        assert_eq!(stats.active_items, 1);
    }

    #[test]
    fn money_rounds_to_two_decimals() {
        let items = vec![
            item(Some(1.111), false, true),
            item(Some(2.222), false, true),
        ];
        let stats = compute(&items, 5.0);
        assert_eq!(stats.money_saved, 3.33);
    }

    #[test]
    fn waste_percentage_rounds_to_one_decimal() {
        // 2 of 3 expired: 66.666... -> 66.7
        let items = vec![
            item(None, true, false),
            item(None, true, false),
            item(None, false, false),
        ];
        let stats = compute(&items, 5.0);
        assert_eq!(stats.waste_percentage, 66.7);
    }
}
