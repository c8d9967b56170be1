//! Category persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mandi_core::CategoryId;
use mandi_state::Category;

/// Save a category record to the database (upsert).
pub async fn save(pool: &PgPool, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories (category_id, name, description, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (category_id) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(category.id.as_uuid())
    .bind(&category.name)
    .bind(&category.description)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete(pool: &PgPool, id: &CategoryId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM categories WHERE category_id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all categories from the database for hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT category_id, name, description, created_at, updated_at
         FROM categories ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Category {
            id: CategoryId::from_uuid(row.category_id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category_id: Uuid,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
