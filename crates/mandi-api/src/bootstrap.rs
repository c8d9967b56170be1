//! Startup bootstrap of the staff account.
//!
//! Staff privilege can only be granted by staff, so a fresh deployment
//! needs one account seeded from outside the API. When
//! `MANDI_ADMIN_EMAIL` and `MANDI_ADMIN_PASSWORD` are both set, an active
//! staff account is created at startup unless the email already exists
//! (hydration may have brought it back).

use mandi_core::{normalize_email, validate_password};
use mandi_state::User;

use crate::auth::hash_password;
use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// Ensure the configured admin account exists. A no-op when the env vars
/// are absent or the account is already present.
pub async fn ensure_admin(state: &AppState) -> Result<(), AppError> {
    let (email, password) = match (
        std::env::var("MANDI_ADMIN_EMAIL"),
        std::env::var("MANDI_ADMIN_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => (email, password),
        (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
            tracing::warn!(
                "only one of MANDI_ADMIN_EMAIL / MANDI_ADMIN_PASSWORD is set — \
                 skipping admin bootstrap"
            );
            return Ok(());
        }
        (Err(_), Err(_)) => return Ok(()),
    };

    let email = normalize_email(&email)?;
    validate_password(&password)?;

    if let Some(existing) = state.store.user_by_email(&email) {
        if !existing.is_staff {
            tracing::warn!(
                user_id = %existing.id,
                "admin bootstrap email belongs to a non-staff account — leaving it untouched"
            );
        }
        return Ok(());
    }

    let mut admin = User::new(
        email,
        hash_password(&password),
        "Administrator".to_string(),
        String::new(),
        String::new(),
        None,
    );
    admin.is_staff = true;
    let id = admin.id;
    state.store.insert_user(admin.clone())?;
    if let Some(ref pool) = state.db_pool {
        if let Err(e) = db::users::save(pool, &admin).await {
            tracing::error!(user_id = %id, error = %e, "failed to persist admin account");
            return Err(AppError::Internal("failed to persist admin account".into()));
        }
    }
    tracing::info!(user_id = %id, "admin account bootstrapped");
    Ok(())
}
