//! One gateway, two credential kinds. `Bearer` tokens and `Basic`
//! email/password both resolve to the same `Identity`, so handlers never
//! care how the caller proved who they are.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use tracing::debug;

use shared_models::auth::Identity;
use shared_models::error::AppError;
use shared_store::CareStore;

use crate::jwt::validate_token;
use crate::password::verify_password;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the scheme-specific part of the Authorization header into
    /// a caller identity.
    async fn authenticate(&self, credential: &str) -> Result<Identity, AppError>;
}

pub struct TokenAuthenticator {
    jwt_secret: String,
}

impl TokenAuthenticator {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, credential: &str) -> Result<Identity, AppError> {
        validate_token(credential, &self.jwt_secret).map_err(AppError::Auth)
    }
}

pub struct CredentialAuthenticator {
    store: Arc<dyn CareStore>,
}

impl CredentialAuthenticator {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Authenticator for CredentialAuthenticator {
    async fn authenticate(&self, credential: &str) -> Result<Identity, AppError> {
        let decoded = STANDARD
            .decode(credential)
            .map_err(|_| AppError::Auth("Invalid basic credential encoding".to_string()))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AppError::Auth("Invalid basic credential encoding".to_string()))?;

        let (email, password) = decoded
            .split_once(':')
            .ok_or_else(|| AppError::Auth("Invalid basic credential format".to_string()))?;

        let user = self
            .store
            .user_by_email(email)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

        if !verify_password(password, &user.password_hash) {
            debug!("Password verification failed for {}", email);
            return Err(AppError::Auth("Invalid email or password".to_string()));
        }

        Ok(Identity {
            user_id: user.id,
            email: user.email,
            role: user.role,
            authenticated_at: Utc::now(),
        })
    }
}

/// Dispatches on the Authorization scheme.
pub struct AuthGateway {
    token: TokenAuthenticator,
    credential: CredentialAuthenticator,
}

impl AuthGateway {
    pub fn new(jwt_secret: String, store: Arc<dyn CareStore>) -> Self {
        Self {
            token: TokenAuthenticator::new(jwt_secret),
            credential: CredentialAuthenticator::new(store),
        }
    }

    pub async fn authenticate(&self, header_value: &str) -> Result<Identity, AppError> {
        if let Some(token) = header_value.strip_prefix("Bearer ") {
            self.token.authenticate(token).await
        } else if let Some(credential) = header_value.strip_prefix("Basic ") {
            self.credential.authenticate(credential).await
        } else {
            Err(AppError::Auth(
                "Unsupported authorization scheme".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::issue_token;
    use crate::password::hash_password;
    use assert_matches::assert_matches;
    use shared_models::auth::Role;
    use shared_store::{MemoryStore, NewUser};
    use uuid::Uuid;

    const SECRET: &str = "gateway-secret";

    fn gateway_with(store: Arc<dyn CareStore>) -> AuthGateway {
        AuthGateway::new(SECRET.to_string(), store)
    }

    async fn seed_admin(store: &MemoryStore) -> Uuid {
        store
            .insert_user(NewUser {
                first_name: "Ada".into(),
                last_name: "Byrne".into(),
                email: "ada@example.com".into(),
                phone_number: "+3531111111".into(),
                password_hash: hash_password("s3cret").unwrap(),
                role: Role::Admin,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn bearer_token_resolves_identity() {
        let store = Arc::new(MemoryStore::new());
        let gateway = gateway_with(store);
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "ada@example.com", Role::Admin, SECRET, 3600).unwrap();

        let identity = gateway
            .authenticate(&format!("Bearer {}", token))
            .await
            .unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn basic_credentials_resolve_identity() {
        let store = Arc::new(MemoryStore::new());
        let user_id = seed_admin(&store).await;
        let gateway = gateway_with(store);

        let encoded = STANDARD.encode("ada@example.com:s3cret");
        let identity = gateway
            .authenticate(&format!("Basic {}", encoded))
            .await
            .unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "ada@example.com");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        seed_admin(&store).await;
        let gateway = gateway_with(store);

        let encoded = STANDARD.encode("ada@example.com:wrong");
        assert_matches!(
            gateway.authenticate(&format!("Basic {}", encoded)).await,
            Err(AppError::Auth(_))
        );
    }

    #[tokio::test]
    async fn unknown_scheme_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let gateway = gateway_with(store);
        assert_matches!(
            gateway.authenticate("Digest abc").await,
            Err(AppError::Auth(_))
        );
    }
}
