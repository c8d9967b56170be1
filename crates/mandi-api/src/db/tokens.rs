//! Token digest persistence operations.
//!
//! Only the SHA-256 digest of a token is ever written; plaintext tokens
//! exist solely in the response that issued them.

use sqlx::PgPool;
use uuid::Uuid;

use mandi_core::UserId;

/// Save a token digest for a user.
pub async fn save(pool: &PgPool, digest: &str, user_id: &UserId) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tokens (digest, user_id, created_at)
         VALUES ($1, $2, NOW())
         ON CONFLICT (digest) DO NOTHING",
    )
    .bind(digest)
    .bind(user_id.as_uuid())
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove every token belonging to a user.
pub async fn delete_for_user(pool: &PgPool, user_id: &UserId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tokens WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all token digests for hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<(String, UserId)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TokenRow>("SELECT digest, user_id FROM tokens")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.digest, UserId::from_uuid(row.user_id)))
        .collect())
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    digest: String,
    user_id: Uuid,
}
