//! Keystone server — identity and access control for HTTP APIs.
//!
//! Entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use keystone_api::{AppState, build_router};
use keystone_auth::access::AccessPipeline;
use keystone_auth::password::{PasswordHasher, PasswordPolicy};
use keystone_auth::permission::PermissionResolver;
use keystone_auth::recovery::PasswordRecovery;
use keystone_auth::store::{IdentityStore, PgIdentityStore};
use keystone_auth::token::{RefreshTokenCleanup, TokenCodec, TokenManager};
use keystone_core::config::AppConfig;
use keystone_core::traits::TracingMailer;
use keystone_database::connection::create_pool;
use keystone_database::migration::run_migrations;
use keystone_database::repositories::{
    PermissionRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("KEYSTONE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("Failed to load configuration")?;

    init_logging(&config);
    info!(env = %env, "Starting Keystone server");

    if let Err(e) = run(config).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let db_pool = create_pool(&config.database).await?;
    run_migrations(&db_pool).await?;

    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let role_repo = Arc::new(RoleRepository::new(db_pool.clone()));
    let permission_repo = Arc::new(PermissionRepository::new(db_pool.clone()));
    let refresh_repo = Arc::new(RefreshTokenRepository::new(db_pool.clone()));

    let store: Arc<dyn IdentityStore> = Arc::new(PgIdentityStore::new(
        Arc::clone(&user_repo),
        Arc::clone(&role_repo),
        Arc::clone(&refresh_repo),
    ));

    let token_manager = Arc::new(TokenManager::new(&config.auth, Arc::clone(&store)));
    let resolver = PermissionResolver::new(Arc::clone(&store));
    let pipeline = Arc::new(AccessPipeline::new(
        TokenCodec::new(&config.auth),
        resolver,
    ));
    let recovery = Arc::new(PasswordRecovery::new(
        &config.auth,
        Arc::clone(&store),
        Arc::new(TracingMailer),
    ));

    if config.worker.cleanup_enabled {
        spawn_cleanup_loop(
            RefreshTokenCleanup::new(Arc::clone(&store)),
            config.worker.cleanup_interval_seconds,
        );
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        token_manager,
        pipeline,
        recovery,
        password_hasher: PasswordHasher::new(),
        password_policy: PasswordPolicy::new(&config.auth),
        user_repo,
        role_repo,
        permission_repo,
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Keystone listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Periodic sweep of expired refresh token rows. Hygiene only; expired
/// tokens are rejected on use regardless.
fn spawn_cleanup_loop(cleanup: RefreshTokenCleanup, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            ticker.tick().await;
            if let Err(e) = cleanup.run_cleanup().await {
                warn!("Refresh token cleanup failed: {e}");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {e}");
    }
    info!("Shutdown signal received");
}
