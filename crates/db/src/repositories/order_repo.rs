//! Repository for the `orders` table.
//!
//! The "one active order per user" rule is enforced twice: handlers check
//! [`OrderRepo::find_active_for_user`] first, and the partial unique index
//! `uq_orders_active_per_user` catches concurrent inserts.

use bartender_core::order::{OrderStatus, USER_HISTORY_LIMIT};
use bartender_core::types::DbId;
use sqlx::PgPool;

use crate::models::order::{Order, OrderCounts, OrderDrinkRow, OrderWithDrink, StatusChange};

/// Column list for plain `orders` rows.
const COLUMNS: &str = "id, drink_id, user_key, status, created_at, updated_at, completed_at";

/// Select clause joining an order with its drink and user.
const JOINED_SELECT: &str = "\
    SELECT o.id, o.drink_id, o.user_key, o.status, o.created_at, o.updated_at, \
           o.completed_at, d.name AS drink_name, d.image_url AS drink_image_url, \
           u.username \
    FROM orders o \
    JOIN drinks d ON d.id = o.drink_id \
    LEFT JOIN app_users u ON u.user_key = o.user_key";

/// Provides order placement, queue queries, and status transitions.
pub struct OrderRepo;

impl OrderRepo {
    /// The user's pending or in-progress order, if any.
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_key: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE user_key = $1 AND status IN ('pending', 'in_progress') \
             LIMIT 1"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_key)
            .fetch_optional(pool)
            .await
    }

    /// Place a new pending order.
    pub async fn create(
        pool: &PgPool,
        drink_id: DbId,
        user_key: DbId,
    ) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (drink_id, user_key, status) VALUES ($1, $2, 'pending') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(drink_id)
            .bind(user_key)
            .fetch_one(pool)
            .await
    }

    /// A user's orders, newest first.
    ///
    /// Without `include_completed` only active orders are returned; with it
    /// the last [`USER_HISTORY_LIMIT`] orders of any status are.
    pub async fn list_for_user(
        pool: &PgPool,
        user_key: DbId,
        include_completed: bool,
    ) -> Result<Vec<OrderWithDrink>, sqlx::Error> {
        let rows = if include_completed {
            let query = format!(
                "{JOINED_SELECT} WHERE o.user_key = $1 ORDER BY o.created_at DESC LIMIT $2"
            );
            sqlx::query_as::<_, OrderDrinkRow>(&query)
                .bind(user_key)
                .bind(USER_HISTORY_LIMIT)
                .fetch_all(pool)
                .await?
        } else {
            let query = format!(
                "{JOINED_SELECT} \
                 WHERE o.user_key = $1 AND o.status IN ('pending', 'in_progress') \
                 ORDER BY o.created_at DESC"
            );
            sqlx::query_as::<_, OrderDrinkRow>(&query)
                .bind(user_key)
                .fetch_all(pool)
                .await?
        };
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find one order with its drink summary.
    pub async fn find_with_drink(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrderWithDrink>, sqlx::Error> {
        let query = format!("{JOINED_SELECT} WHERE o.id = $1");
        let row = sqlx::query_as::<_, OrderDrinkRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    // -----------------------------------------------------------------------
    // Bar staff queue
    // -----------------------------------------------------------------------

    /// Every in-progress order, oldest first.
    pub async fn list_in_progress(pool: &PgPool) -> Result<Vec<OrderWithDrink>, sqlx::Error> {
        let query =
            format!("{JOINED_SELECT} WHERE o.status = 'in_progress' ORDER BY o.created_at ASC");
        let rows = sqlx::query_as::<_, OrderDrinkRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The oldest `limit` pending orders.
    pub async fn list_pending(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<OrderWithDrink>, sqlx::Error> {
        let query = format!(
            "{JOINED_SELECT} WHERE o.status = 'pending' ORDER BY o.created_at ASC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, OrderDrinkRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Most recent orders of any user, optionally filtered by status.
    pub async fn list_recent(
        pool: &PgPool,
        status: Option<OrderStatus>,
        limit: i64,
    ) -> Result<Vec<OrderWithDrink>, sqlx::Error> {
        let query = format!(
            "{JOINED_SELECT} WHERE ($1::text IS NULL OR o.status = $1) \
             ORDER BY o.created_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, OrderDrinkRow>(&query)
            .bind(status.map(OrderStatus::as_str))
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Total number of orders in any status.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
    }

    /// Queue counters: pending, in progress, and completed in the last 24 hours.
    pub async fn counts(pool: &PgPool) -> Result<OrderCounts, sqlx::Error> {
        sqlx::query_as::<_, OrderCounts>(
            "SELECT \
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_count, \
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress_count, \
                COUNT(*) FILTER ( \
                    WHERE status = 'completed' AND completed_at >= NOW() - INTERVAL '24 hours' \
                ) AS completed_24h_count \
             FROM orders",
        )
        .fetch_one(pool)
        .await
    }

    /// Move an order to `status`.
    ///
    /// `completed_at` is stamped when the new status is `completed` and
    /// cleared otherwise. Returns `None` when the order does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: OrderStatus,
    ) -> Result<Option<StatusChange>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };
        let previous_status =
            OrderStatus::try_from(previous).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let query = format!(
            "UPDATE orders SET \
                status = $2, \
                completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE NULL END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(StatusChange {
            order,
            previous_status,
        }))
    }
}
