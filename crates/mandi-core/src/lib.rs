//! # mandi-core — Foundational Types for the Mandi Marketplace
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace. This crate is the leaf of the dependency DAG — it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** [`UserId`], [`CategoryId`],
//!    [`ProductId`], [`OrderId`] are distinct types — you cannot pass a
//!    product id where a user id is expected.
//!
//! 2. **Closed enumerations at the data-entry edge.** [`Role`],
//!    [`ProductStatus`], and [`OrderStatus`] reject unknown strings at
//!    deserialization time, so nothing downstream ever branches on a
//!    free-form role string.
//!
//! 3. **Integer money.** Prices and totals are integer minor units
//!    ([`money`]). The wire format is a decimal string (`"10.50"`), never
//!    a float.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, `Serialize`/`Deserialize`.

pub mod error;
pub mod id;
pub mod money;
pub mod status;

pub use error::ValidationError;
pub use id::{CategoryId, OrderId, ProductId, UserId};
pub use money::{format_amount, parse_amount, total_price, Amount};
pub use status::{OrderStatus, ProductStatus, Role};

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Normalize an email address for storage and lookup.
///
/// Trims surrounding whitespace and lowercases the whole address, then
/// checks the minimal structural invariant (one `@` with non-empty local
/// and domain parts). Uniqueness is enforced on the normalized form, so
/// `Ali@Example.COM` and `ali@example.com` are the same account.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(raw.to_string()));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail(raw.to_string()));
    }
    Ok(email)
}

/// Validate a registration password against the minimum-length policy.
/// Length is counted in characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Ali@Example.COM ").unwrap(),
            "ali@example.com"
        );
    }

    #[test]
    fn email_without_at_rejected() {
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn email_with_empty_parts_rejected() {
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ali@").is_err());
    }

    #[test]
    fn email_with_inner_whitespace_rejected() {
        assert!(normalize_email("a li@example.com").is_err());
    }

    #[test]
    fn short_password_rejected() {
        assert!(validate_password("seven77").is_err());
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // Six Cyrillic characters occupy twelve bytes but are still short.
        assert!(validate_password("пароль").is_err());
        assert!(validate_password("парольно").is_ok());
    }
}
