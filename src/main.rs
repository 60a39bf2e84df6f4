use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use account_service as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.effective_log_level(), cfg.log_json);

    info!(
        environment = %cfg.environment,
        testing = cfg.testing,
        force_https = cfg.should_force_https(),
        "Starting account service"
    );

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    api::db::check_connection(&db_pool).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let accounts = api::repositories::SeaOrmAccountRepository::new(Arc::new(db_pool.clone()));
    let app = api::app(api::AppState::new(Arc::new(accounts)), &cfg);

    // Bind and serve
    let addr = cfg.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("account-service listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received; closing resources");
    api::db::close_pool(db_pool).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
