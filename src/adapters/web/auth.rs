//! Caller identity and password hashing.
//!
//! Credential storage uses argon2id. Request identity comes from the
//! `x-user-id` header; verifying who set it is the auth collaborator's
//! job, not the core's.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::error::LongshotError;
use crate::domain::user::UserId;

use super::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

pub fn hash_password(password: &str) -> Result<String, LongshotError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LongshotError::PasswordHash {
            reason: e.to_string(),
        })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// The authenticated caller's user id, extracted from the identity header.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub UserId);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<UserId>().ok())
            .map(CallerId)
            .ok_or_else(|| ApiError::unauthorized("authentication required"))
    }
}
