use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use shared_auth::password::hash_password;
use shared_auth::AuthGateway;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_store::{CareStore, MemoryStore, NewUser};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carelink API server");

    // Load configuration
    let config = AppConfig::from_env();

    let store: Arc<dyn CareStore> = Arc::new(MemoryStore::new());
    seed_admin(&store, &config).await?;

    let gateway = Arc::new(AuthGateway::new(config.jwt_secret.clone(), store.clone()));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(store, gateway)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_addr);
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Creates the bootstrap admin account from the environment, once.
async fn seed_admin(store: &Arc<dyn CareStore>, config: &AppConfig) -> anyhow::Result<()> {
    if !config.is_admin_seed_configured() {
        warn!("Admin seed not configured, skipping");
        return Ok(());
    }

    if store
        .user_by_email(&config.admin_email)
        .await
        .map_err(|e| anyhow::anyhow!("admin lookup failed: {}", e))?
        .is_some()
    {
        return Ok(());
    }

    let password_hash =
        hash_password(&config.admin_password).map_err(|e| anyhow::anyhow!(e))?;
    let admin = store
        .insert_user(NewUser {
            first_name: "System".to_string(),
            last_name: "Admin".to_string(),
            email: config.admin_email.clone(),
            phone_number: String::new(),
            password_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|e| anyhow::anyhow!("admin seed failed: {}", e))?;

    info!("Seeded admin account {}", admin.id);
    Ok(())
}
