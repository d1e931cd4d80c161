//! Expiry sweep: walks every not-yet-expired item, flags the past-due ones
//! and emits the staged 30/7/1-day reminders. Triggered from dashboard views
//! and the unauthenticated polling endpoint; there is no background
//! scheduler.

use time::{Date, Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::auth::repo::User;
use crate::items::repo::FoodItem;
use crate::notifications::repo::{Notification, NotificationKind};
use crate::state::AppState;

pub const RECIPE_WINDOW_DAYS: i64 = 30;

pub fn days_until_expiry(expiry: Date, today: Date) -> i64 {
    (expiry - today).whole_days()
}

/// Which reminders are due for an item, given days to expiry and the kinds
/// already sent. The thresholds are checked independently: an item logged a
/// day before expiry gets all three at once.
pub fn kinds_due(days_left: i64, already_sent: &[String]) -> Vec<NotificationKind> {
    let thresholds = [
        (30, NotificationKind::Month),
        (7, NotificationKind::Week),
        (1, NotificationKind::Day),
    ];
    thresholds
        .into_iter()
        .filter(|(limit, kind)| {
            days_left <= *limit && !already_sent.iter().any(|k| k == kind.as_str())
        })
        .map(|(_, kind)| kind)
        .collect()
}

/// Fixed template naming up to the first three expiring items.
pub fn recipe_suggestions(ingredient_names: &[String]) -> String {
    if ingredient_names.is_empty() {
        return "No recipes available".to_string();
    }
    let listed = ingredient_names
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("You have: {listed}. Try making a stir-fry, soup, or salad!")
}

fn reminder_message(kind: NotificationKind, item_name: &str, recipes: &str) -> String {
    match kind {
        NotificationKind::Month => {
            format!("{item_name} expires in a month! Recipe ideas: {recipes}")
        }
        NotificationKind::Week => format!("{item_name} expires in a week! Use it soon."),
        NotificationKind::Day => format!("{item_name} expires tomorrow! Use it today."),
        NotificationKind::Expired => format!("{item_name} has expired!"),
    }
}

pub async fn run_sweep(state: &AppState) -> anyhow::Result<usize> {
    sweep_at(state, OffsetDateTime::now_utc().date()).await
}

/// One pass over all users' unexpired items. Returns how many notifications
/// went out. Idempotent: re-running on the same day sends nothing new.
#[instrument(skip(state))]
pub async fn sweep_at(state: &AppState, today: Date) -> anyhow::Result<usize> {
    let items = FoodItem::list_unexpired(&state.db).await?;
    let mut sent = 0;

    for item in items {
        let days_left = days_until_expiry(item.expiry_date, today);

        if days_left < 0 {
            FoodItem::mark_expired(&state.db, item.id).await?;
            let message = reminder_message(NotificationKind::Expired, &item.name, "");
            dispatch(state, &item, NotificationKind::Expired, &message).await?;
            sent += 1;
            continue;
        }

        let history = Notification::kinds_for_item(&state.db, item.id).await?;
        for kind in kinds_due(days_left, &history) {
            let message = if kind == NotificationKind::Month {
                let cutoff = today + Duration::days(RECIPE_WINDOW_DAYS);
                let expiring = FoodItem::expiring_within(&state.db, item.user_id, cutoff).await?;
                let names: Vec<String> = expiring.into_iter().map(|i| i.name).collect();
                reminder_message(kind, &item.name, &recipe_suggestions(&names))
            } else {
                reminder_message(kind, &item.name, "")
            };
            dispatch(state, &item, kind, &message).await?;
            sent += 1;
        }
    }

    Ok(sent)
}

/// Persists the notification and fires the SMS stub when the owner has a
/// phone number on file. SMS failure never fails the sweep.
async fn dispatch(
    state: &AppState,
    item: &FoodItem,
    kind: NotificationKind,
    message: &str,
) -> anyhow::Result<()> {
    Notification::insert(&state.db, item.user_id, item.id, kind, message).await?;
    info!(kind = kind.as_str(), item = %item.name, %message, "notification sent");

    if let Some(user) = User::find_by_id(&state.db, item.user_id).await? {
        if let Some(phone) = user.phone.as_deref() {
            if let Err(e) = state.sms.send(phone, message).await {
                warn!(error = %e, user_id = %user.id, "sms dispatch failed");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sent(kinds: &[NotificationKind]) -> Vec<String> {
        kinds.iter().map(|k| k.as_str().to_string()).collect()
    }

    #[test]
    fn date_math() {
        let today = date!(2025 - 06 - 15);
        assert_eq!(days_until_expiry(date!(2025 - 06 - 15), today), 0);
        assert_eq!(days_until_expiry(date!(2025 - 06 - 16), today), 1);
        assert_eq!(days_until_expiry(date!(2025 - 07 - 15), today), 30);
        assert_eq!(days_until_expiry(date!(2025 - 06 - 10), today), -5);
    }

    #[test]
    fn far_out_items_trigger_nothing() {
        assert!(kinds_due(31, &[]).is_empty());
        assert!(kinds_due(365, &[]).is_empty());
    }

    #[test]
    fn exactly_thirty_days_fires_month_only() {
        assert_eq!(kinds_due(30, &[]), vec![NotificationKind::Month]);
    }

    #[test]
    fn exactly_seven_days_fires_month_and_week() {
        assert_eq!(
            kinds_due(7, &[]),
            vec![NotificationKind::Month, NotificationKind::Week]
        );
    }

    #[test]
    fn one_day_left_fires_all_three() {
        assert_eq!(
            kinds_due(1, &[]),
            vec![
                NotificationKind::Month,
                NotificationKind::Week,
                NotificationKind::Day
            ]
        );
    }

    #[test]
    fn already_sent_kinds_do_not_repeat() {
        let history = sent(&[NotificationKind::Month, NotificationKind::Week]);
        assert_eq!(kinds_due(1, &history), vec![NotificationKind::Day]);

        let full = sent(&[
            NotificationKind::Month,
            NotificationKind::Week,
            NotificationKind::Day,
        ]);
        assert!(kinds_due(0, &full).is_empty());
    }

    #[test]
    fn recipe_suggestions_names_at_most_three() {
        let names: Vec<String> = ["eggs", "milk", "spinach", "tofu"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let msg = recipe_suggestions(&names);
        assert_eq!(
            msg,
            "You have: eggs, milk, spinach. Try making a stir-fry, soup, or salad!"
        );
    }

    #[test]
    fn recipe_suggestions_fallback_when_empty() {
        assert_eq!(recipe_suggestions(&[]), "No recipes available");
    }

    #[test]
    fn reminder_messages() {
        assert_eq!(
            reminder_message(NotificationKind::Expired, "milk", ""),
            "milk has expired!"
        );
        assert_eq!(
            reminder_message(NotificationKind::Week, "milk", ""),
            "milk expires in a week! Use it soon."
        );
        assert_eq!(
            reminder_message(NotificationKind::Day, "milk", ""),
            "milk expires tomorrow! Use it today."
        );
        assert!(
            reminder_message(NotificationKind::Month, "milk", "No recipes available")
                .contains("Recipe ideas: No recipes available")
        );
    }
}
