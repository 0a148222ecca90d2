use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use shared_models::error::AppError;

use crate::gateway::AuthGateway;

/// Middleware for authentication. Resolves the Authorization header through
/// the gateway and stores the resulting `Identity` in request extensions.
pub async fn auth_middleware(
    State(gateway): State<Arc<AuthGateway>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let identity = gateway.authenticate(auth_value).await?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
