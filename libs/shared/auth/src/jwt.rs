use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::{Identity, JwtClaims, Role};

pub fn issue_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    jwt_secret: &str,
    ttl_secs: u64,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now().timestamp() as u64;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp: now + ttl_secs,
        iat: Some(now),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {}", e))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Identity, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Token validation failed: {}", e);
        "Invalid or expired token".to_string()
    })?;

    let claims = data.claims;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| "Invalid subject in token".to_string())?;

    let authenticated_at = claims
        .iat
        .and_then(|ts| Utc.timestamp_opt(ts as i64, 0).single())
        .unwrap_or_else(Utc::now);

    debug!("Token validated for user {}", user_id);
    Ok(Identity {
        user_id,
        email: claims.email,
        role: claims.role,
        authenticated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_validates() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "admin@example.com", Role::Admin, SECRET, 3600).unwrap();

        let identity = validate_token(&token, SECRET).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "admin@example.com");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token =
            issue_token(Uuid::new_v4(), "a@example.com", Role::Patient, SECRET, 3600).unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validate_token("not.a.token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(issue_token(Uuid::new_v4(), "a@example.com", Role::Admin, "", 60).is_err());
        assert!(validate_token("whatever", "").is_err());
    }
}
