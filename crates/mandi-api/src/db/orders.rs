//! Order persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mandi_core::{OrderId, OrderStatus, ProductId, UserId};
use mandi_state::Order;

/// Save an order record to the database (upsert).
pub async fn save(pool: &PgPool, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (order_id, buyer_id, product_id, quantity, total_price, status, delivery_date, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (order_id) DO UPDATE SET
            status = EXCLUDED.status,
            delivery_date = EXCLUDED.delivery_date,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(order.id.as_uuid())
    .bind(order.buyer.as_uuid())
    .bind(order.product.as_uuid())
    .bind(i64::from(order.quantity))
    .bind(order.total_price)
    .bind(order.status.as_str())
    .bind(order.delivery_date)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete(pool: &PgPool, id: &OrderId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM orders WHERE order_id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all orders from the database for hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT order_id, buyer_id, product_id, quantity, total_price, status, delivery_date, created_at, updated_at
         FROM orders ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Order {
            id: OrderId::from_uuid(row.order_id),
            buyer: UserId::from_uuid(row.buyer_id),
            product: ProductId::from_uuid(row.product_id),
            quantity: parse_quantity(row.order_id, row.quantity),
            total_price: row.total_price,
            status: parse_status(&row.status),
            delivery_date: row.delivery_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: Uuid,
    buyer_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    total_price: i64,
    status: String,
    delivery_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_quantity(id: Uuid, raw: i64) -> u32 {
    u32::try_from(raw).unwrap_or_else(|_| {
        tracing::warn!(order_id = %id, value = raw, "quantity out of range in database, clamping to 0");
        0
    })
}

fn parse_status(s: &str) -> OrderStatus {
    s.parse::<OrderStatus>().unwrap_or_else(|_| {
        tracing::warn!(value = s, "unrecognized order status in database, defaulting to pending");
        OrderStatus::Pending
    })
}
