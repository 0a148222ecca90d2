//! Authentication for the API: token and credential verification behind a
//! single gateway, plus the axum middleware that attaches the caller's
//! `Identity` to every request.

pub mod extractor;
pub mod gateway;
pub mod jwt;
pub mod password;

pub use extractor::auth_middleware;
pub use gateway::{AuthGateway, Authenticator, CredentialAuthenticator, TokenAuthenticator};
