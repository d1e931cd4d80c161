use sqlx::{FromRow, PgPool};
use time::Date;
use uuid::Uuid;

/// Food item record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct FoodItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub purchase_date: Date,
    pub expiry_date: Date,
    pub quantity: i32,
    pub price: Option<f64>,
    pub image_path: Option<String>,
    pub is_expired: bool,
    pub is_used: bool,
}

/// Fields for inserting a new item; the rest take their column defaults.
#[derive(Debug)]
pub struct NewFoodItem {
    pub user_id: Uuid,
    pub name: String,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Date,
    pub quantity: i32,
    pub price: Option<f64>,
    pub image_path: Option<String>,
}

const COLUMNS: &str = "id, user_id, name, barcode, category, purchase_date, expiry_date, \
                       quantity, price, image_path, is_expired, is_used";

impl FoodItem {
    pub async fn create(db: &PgPool, new: NewFoodItem) -> anyhow::Result<FoodItem> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            INSERT INTO food_items (user_id, name, barcode, category, expiry_date, quantity, price, image_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.barcode)
        .bind(&new.category)
        .bind(new.expiry_date)
        .bind(new.quantity)
        .bind(new.price)
        .bind(&new.image_path)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    /// Every item a user owns, soonest expiry first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FoodItem>> {
        let rows = sqlx::query_as::<_, FoodItem>(&format!(
            r#"SELECT {COLUMNS} FROM food_items WHERE user_id = $1 ORDER BY expiry_date"#,
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Unused items for the dashboard view.
    pub async fn list_unused_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FoodItem>> {
        let rows = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            SELECT {COLUMNS} FROM food_items
            WHERE user_id = $1 AND is_used = FALSE
            ORDER BY expiry_date
            "#,
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Every not-yet-expired item across all users, for the expiry sweep.
    pub async fn list_unexpired(db: &PgPool) -> anyhow::Result<Vec<FoodItem>> {
        let rows = sqlx::query_as::<_, FoodItem>(&format!(
            r#"SELECT {COLUMNS} FROM food_items WHERE is_expired = FALSE"#,
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// A user's not-expired items with expiry on or before the cutoff date.
    pub async fn expiring_within(
        db: &PgPool,
        user_id: Uuid,
        cutoff: Date,
    ) -> anyhow::Result<Vec<FoodItem>> {
        let rows = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            SELECT {COLUMNS} FROM food_items
            WHERE user_id = $1 AND expiry_date <= $2 AND is_expired = FALSE
            ORDER BY expiry_date
            "#,
        ))
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn mark_expired(db: &PgPool, item_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE food_items SET is_expired = TRUE WHERE id = $1"#)
            .bind(item_id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Returns false when the item does not exist or belongs to someone else.
    pub async fn mark_used(db: &PgPool, user_id: Uuid, item_id: Uuid) -> anyhow::Result<bool> {
        let result =
            sqlx::query(r#"UPDATE food_items SET is_used = TRUE WHERE id = $1 AND user_id = $2"#)
                .bind(item_id)
                .bind(user_id)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes an owned item. `Some(image_path)` comes back so the caller can
    /// clean up the file; `None` when nothing was deleted.
    pub async fn delete_owned(
        db: &PgPool,
        user_id: Uuid,
        item_id: Uuid,
    ) -> anyhow::Result<Option<Option<String>>> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            r#"DELETE FROM food_items WHERE id = $1 AND user_id = $2 RETURNING image_path"#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row.map(|(path,)| path))
    }

    pub async fn count_all(db: &PgPool) -> anyhow::Result<i64> {
        let (n,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM food_items"#)
            .fetch_one(db)
            .await?;
        Ok(n)
    }

    pub async fn count_expired(db: &PgPool) -> anyhow::Result<i64> {
        let (n,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM food_items WHERE is_expired = TRUE"#)
                .fetch_one(db)
                .await?;
        Ok(n)
    }
}
