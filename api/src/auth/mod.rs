//! Bearer-token authentication and the per-module access guards.

pub mod extractors;
pub mod guards;
pub mod middleware;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use util::config;

/// Token payload: the user id in `sub` and the global admin flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    pub admin: bool,
}

impl Claims {
    fn expiring_at(user_id: i64, admin: bool, expiry: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            exp: expiry.timestamp().max(0) as usize,
            admin,
        }
    }
}

/// The verified caller, inserted into request extensions by the guards.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.sub
    }
}

/// Signs a token for `user_id`. Returns the token and its RFC 3339 expiry.
pub fn generate_jwt(
    user_id: i64,
    admin: bool,
) -> Result<(String, String), jsonwebtoken::errors::Error> {
    let expiry = Utc::now() + Duration::minutes(config::jwt_duration_minutes() as i64);
    let key = EncodingKey::from_secret(config::jwt_secret().as_bytes());

    let token = encode(&Header::default(), &Claims::expiring_at(user_id, admin, expiry), &key)?;
    Ok((token, expiry.to_rfc3339()))
}
