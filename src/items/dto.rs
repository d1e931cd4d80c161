use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::items::repo::FoodItem;
use crate::notifications::engine::days_until_expiry;
use crate::stats::UserStats;

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub purchase_date: String,
    pub expiry_date: String,
    pub quantity: i32,
    pub price: Option<f64>,
    pub image_path: Option<String>,
    pub is_expired: bool,
    pub is_used: bool,
    /// Whole days until expiry, clamped at zero.
    pub days_remaining: i64,
}

impl ItemView {
    pub fn from_item(item: &FoodItem, today: Date) -> Self {
        let days = days_until_expiry(item.expiry_date, today);
        Self {
            id: item.id,
            name: item.name.clone(),
            barcode: item.barcode.clone(),
            category: item.category.clone(),
            purchase_date: item.purchase_date.to_string(),
            expiry_date: item.expiry_date.to_string(),
            quantity: item.quantity,
            price: item.price,
            image_path: item.image_path.clone(),
            is_expired: item.is_expired,
            is_used: item.is_used,
            days_remaining: days.max(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub expired: Vec<ItemView>,
    pub expiring_soon: Vec<ItemView>,
    pub fresh: Vec<ItemView>,
    pub stats: UserStats,
}

#[derive(Debug, Serialize)]
pub struct CreatedItemResponse {
    pub id: Uuid,
    pub name: String,
    pub expiry_date: String,
    pub image_path: Option<String>,
}

/// Buckets for the dashboard: past expiry, within a week, everything else.
pub fn group_items(items: &[FoodItem], today: Date) -> (Vec<ItemView>, Vec<ItemView>, Vec<ItemView>) {
    let mut expired = Vec::new();
    let mut expiring_soon = Vec::new();
    let mut fresh = Vec::new();

    for item in items {
        let days = days_until_expiry(item.expiry_date, today);
        let view = ItemView::from_item(item, today);
        if item.is_expired || days < 0 {
            expired.push(view);
        } else if days <= 7 {
            expiring_soon.push(view);
        } else {
            fresh.push(view);
        }
    }

    (expired, expiring_soon, fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn item(name: &str, expiry: Date, is_expired: bool) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.into(),
            barcode: None,
            category: None,
            purchase_date: date!(2025 - 01 - 01),
            expiry_date: expiry,
            quantity: 1,
            price: None,
            image_path: None,
            is_expired,
            is_used: false,
        }
    }

    #[test]
    fn groups_by_days_remaining() {
        let today = date!(2025 - 06 - 15);
        let items = vec![
            item("old milk", date!(2025 - 06 - 10), true),
            item("yoghurt", date!(2025 - 06 - 20), false),
            item("rice", date!(2026 - 01 - 01), false),
        ];
        let (expired, soon, fresh) = group_items(&items, today);
        assert_eq!(expired.len(), 1);
        assert_eq!(soon.len(), 1);
        assert_eq!(fresh.len(), 1);
        assert_eq!(expired[0].name, "old milk");
        assert_eq!(soon[0].name, "yoghurt");
    }

    #[test]
    fn past_due_but_unflagged_item_lands_in_expired() {
        let today = date!(2025 - 06 - 15);
        let items = vec![item("forgotten ham", date!(2025 - 06 - 01), false)];
        let (expired, soon, fresh) = group_items(&items, today);
        assert_eq!(expired.len(), 1);
        assert!(soon.is_empty() && fresh.is_empty());
    }

    #[test]
    fn seven_days_out_counts_as_expiring_soon() {
        let today = date!(2025 - 06 - 15);
        let items = vec![item("cheese", date!(2025 - 06 - 22), false)];
        let (_, soon, fresh) = group_items(&items, today);
        assert_eq!(soon.len(), 1);
        assert!(fresh.is_empty());
    }

    #[test]
    fn days_remaining_clamped_at_zero() {
        let today = date!(2025 - 06 - 15);
        let view = ItemView::from_item(&item("gone", date!(2025 - 06 - 01), true), today);
        assert_eq!(view.days_remaining, 0);
    }
}
