use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Staged reminder thresholds. Each kind fires at most once per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Month,
    Week,
    Day,
    Expired,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Month => "month",
            NotificationKind::Week => "week",
            NotificationKind::Day => "day",
            NotificationKind::Expired => "expired",
        }
    }
}

/// Notification record. Append-only; rows are never mutated or deleted.
/// `food_item_id` deliberately has no foreign key so history survives item
/// deletion.
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_item_id: Uuid,
    pub kind: String,
    pub message: String,
    pub sent_at: OffsetDateTime,
}

impl Notification {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        food_item_id: Uuid,
        kind: NotificationKind,
        message: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, food_item_id, kind, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(food_item_id)
        .bind(kind.as_str())
        .bind(message)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Kinds already sent for an item; the de-duplication pre-check.
    pub async fn kinds_for_item(db: &PgPool, food_item_id: Uuid) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as(r#"SELECT kind FROM notifications WHERE food_item_id = $1"#)
                .bind(food_item_id)
                .fetch_all(db)
                .await?;
        Ok(rows.into_iter().map(|(k,)| k).collect())
    }

    pub async fn latest_for_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, food_item_id, kind, message, sent_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names() {
        assert_eq!(NotificationKind::Month.as_str(), "month");
        assert_eq!(NotificationKind::Week.as_str(), "week");
        assert_eq!(NotificationKind::Day.as_str(), "day");
        assert_eq!(NotificationKind::Expired.as_str(), "expired");
    }
}
