use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub exp: i64,
    pub iat: i64,
}

/// Mints a token for a user. There is no login endpoint; tokens are issued
/// out of band by operational tooling that links against this crate.
pub fn create_jwt(
    email: String,
    user_id: String,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiry = now + Duration::hours(expiry_hours);

    let claims = Claims {
        sub: email,
        user_id,
        exp: expiry.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let token = create_jwt(
            "alice@example.com".to_string(),
            "user-1".to_string(),
            "secret",
            24,
        )
        .unwrap();

        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.user_id, "user-1");

        assert!(verify_jwt(&token, "wrong-secret").is_err());
    }
}
