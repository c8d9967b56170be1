//! User persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mandi_core::{Role, UserId};
use mandi_state::User;

/// Save a user record to the database (upsert).
pub async fn save(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (user_id, email, password, name, phone_number, address, role, is_staff, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (user_id) DO UPDATE SET
            email = EXCLUDED.email,
            password = EXCLUDED.password,
            name = EXCLUDED.name,
            phone_number = EXCLUDED.phone_number,
            address = EXCLUDED.address,
            role = EXCLUDED.role,
            is_staff = EXCLUDED.is_staff,
            is_active = EXCLUDED.is_active,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(user.id.as_uuid())
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.name)
    .bind(&user.phone_number)
    .bind(&user.address)
    .bind(user.role.map(|r| r.as_str().to_string()))
    .bind(user.is_staff)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a user row. Tokens go with it via `ON DELETE CASCADE`.
pub async fn delete(pool: &PgPool, id: &UserId) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all users from the database for hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, email, password, name, phone_number, address, role, is_staff, is_active, created_at, updated_at
         FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| User {
            id: UserId::from_uuid(row.user_id),
            email: row.email,
            password: row.password,
            name: row.name,
            phone_number: row.phone_number,
            address: row.address,
            role: row.role.as_deref().and_then(parse_role),
            is_staff: row.is_staff,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password: String,
    name: String,
    phone_number: String,
    address: String,
    role: Option<String>,
    is_staff: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Option<Role> {
    match s.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            tracing::warn!(value = s, "unrecognized role in database, treating as unset");
            None
        }
    }
}
