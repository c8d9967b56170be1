//! # Authentication Middleware and Credential Primitives
//!
//! Token authentication for API endpoints. The middleware resolves the
//! `Authorization` header into an [`Actor`] and injects it into request
//! extensions; it never decides permissions — that is the engine's job,
//! invoked per handler.
//!
//! Credential storage is digest-only: passwords are salted SHA-256
//! digests (`salt:digest`, hex), tokens are 32 random bytes whose SHA-256
//! digest is the stored lookup key. Plaintext never touches the store,
//! and password verification is constant-time.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use mandi_authz::Actor;

use crate::error::AppError;
use crate::state::AppState;

/// Salt length for password digests, in bytes.
const SALT_LEN: usize = 16;

/// Token length, in bytes (hex-encoded to 64 chars on the wire).
const TOKEN_LEN: usize = 32;

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex_encode(&hasher.finalize())
}

/// Hash a password with a fresh random salt. Output format `salt:digest`,
/// both hex.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let digest = sha256_hex(&[&salt, password.as_bytes()]);
    format!("{}:{digest}", hex_encode(&salt))
}

/// Verify a password against a stored `salt:digest` value in constant
/// time. A malformed stored value verifies as false, never panics.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once(':') else {
        return false;
    };
    let Some(salt) = decode_hex(salt_hex) else {
        return false;
    };
    let candidate = sha256_hex(&[&salt, password.as_bytes()]);
    candidate.as_bytes().ct_eq(digest_hex.as_bytes()).into()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Issue a fresh opaque token. Returns `(plaintext, digest)` — the
/// plaintext goes to the client once, the digest into the token store.
pub fn issue_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    let plaintext = hex_encode(&bytes);
    let digest = token_digest(&plaintext);
    (plaintext, digest)
}

/// Digest of a presented token, as stored in the token index.
pub fn token_digest(token: &str) -> String {
    sha256_hex(&[token.as_bytes()])
}

/// Map an engine denial onto the HTTP taxonomy: anonymous actors get 401
/// (present a credential), authenticated ones get 403 (the decision table
/// said no).
pub fn denied(actor: &Actor) -> AppError {
    match actor {
        Actor::Anonymous => AppError::Unauthorized("authentication required".to_string()),
        Actor::Authenticated { .. } => {
            AppError::Forbidden("insufficient privilege for this action".to_string())
        }
    }
}

/// Resolve the `Authorization` header into an [`Actor`] extension.
///
/// Accepts `Bearer <token>` and the legacy `Token <token>` scheme. A
/// missing header yields [`Actor::Anonymous`] and the request proceeds —
/// public routes serve it, protected handlers turn the denial into 401.
/// A header that is present but does not resolve is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = match request.headers().get(axum::http::header::AUTHORIZATION) {
        None => Actor::Anonymous,
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AppError::Unauthorized("malformed authorization header".to_string()))?;
            let token = value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("Token "))
                .ok_or_else(|| {
                    AppError::Unauthorized("unsupported authorization scheme".to_string())
                })?;
            let user = state
                .store
                .user_for_token(&token_digest(token.trim()))
                .ok_or_else(|| AppError::Unauthorized("invalid or expired token".to_string()))?;
            Actor::Authenticated {
                id: user.id,
                role: user.role,
                is_staff: user.is_staff,
            }
        }
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
