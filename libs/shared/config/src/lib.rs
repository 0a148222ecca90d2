use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| {
                warn!("BIND_ADDR not set, using default");
                "0.0.0.0:3000".to_string()
            }),
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| {
                warn!("ADMIN_EMAIL not set, using empty value");
                String::new()
            }),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
                warn!("ADMIN_PASSWORD not set, using empty value");
                String::new()
            }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_admin_seed_configured(&self) -> bool {
        !self.admin_email.is_empty() && !self.admin_password.is_empty()
    }
}
