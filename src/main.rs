use std::{env, sync::Arc};

use anyhow::Context;
use aotf_session::{
    config::Config,
    db::{credential_store::CredentialStore, memory_store::MemoryCredentialStore},
    init_authority,
    routes::app_router,
    AppState,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing();

    let authority = match init_authority(&config) {
        Ok(authority) => authority,
        Err(err) => {
            error!(%err, "session authority could not be initialized");
            return Err(err).context("session signing secret missing or invalid");
        }
    };

    let accounts: Arc<dyn CredentialStore> = match env::var("ACCOUNTS_FILE") {
        Ok(path) => Arc::new(MemoryCredentialStore::from_json_file(&path)?),
        Err(_) => {
            warn!("ACCOUNTS_FILE not set; no account can log in");
            Arc::new(MemoryCredentialStore::default())
        }
    };

    let state = AppState {
        authority,
        accounts,
    };

    let app = app_router(state);
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, app = ?config.app, "Session service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
