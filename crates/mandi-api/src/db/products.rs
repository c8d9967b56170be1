//! Product persistence operations.
//!
//! Prices are stored as BIGINT minor units. Quantities are BIGINT in
//! Postgres but `u32` in memory; a row outside that range is clamped with
//! a warning on load.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mandi_core::{CategoryId, ProductId, ProductStatus, UserId};
use mandi_state::Product;

/// Save a product record to the database (upsert).
pub async fn save(pool: &PgPool, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (product_id, farmer_id, category_id, name, description, price, quantity, unit, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (product_id) DO UPDATE SET
            category_id = EXCLUDED.category_id,
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            quantity = EXCLUDED.quantity,
            unit = EXCLUDED.unit,
            status = EXCLUDED.status,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(product.id.as_uuid())
    .bind(product.farmer.as_uuid())
    .bind(product.category.as_uuid())
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(i64::from(product.quantity))
    .bind(&product.unit)
    .bind(product.status.as_str())
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete(pool: &PgPool, id: &ProductId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM products WHERE product_id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all products from the database for hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT product_id, farmer_id, category_id, name, description, price, quantity, unit, status, created_at, updated_at
         FROM products ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Product {
            id: ProductId::from_uuid(row.product_id),
            farmer: UserId::from_uuid(row.farmer_id),
            category: CategoryId::from_uuid(row.category_id),
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: parse_quantity(row.product_id, row.quantity),
            unit: row.unit,
            status: parse_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    farmer_id: Uuid,
    category_id: Uuid,
    name: String,
    description: String,
    price: i64,
    quantity: i64,
    unit: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_quantity(id: Uuid, raw: i64) -> u32 {
    u32::try_from(raw).unwrap_or_else(|_| {
        tracing::warn!(product_id = %id, value = raw, "quantity out of range in database, clamping to 0");
        0
    })
}

fn parse_status(s: &str) -> ProductStatus {
    s.parse::<ProductStatus>().unwrap_or_else(|_| {
        tracing::warn!(value = s, "unrecognized product status in database, defaulting to available");
        ProductStatus::Available
    })
}
