//! Solace web server binary.
//!
//! Serves the submission form and entry list on a single route. Refuses to
//! start without an upstream API credential.

use std::time::Duration;

use clap::Parser;
use solace_core::completion::{self, CompletionClient, CompletionConfig, ConfigError};
use solace_core::db::{self, DbConfig};
use solace_core::entries::EntryStore;
use tokio::signal;
use tracing::{error, info};

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(
    name = "solace_server",
    version = solace_core::version(),
    about = "Solace addiction support web server"
)]
struct Args {
    /// Address to bind the HTTP listener.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    bind: String,

    /// SQLite database URL. The file is created if missing.
    #[arg(long, env = "DATABASE_URL", default_value = db::DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Bearer credential for the chat-completion API.
    #[arg(long, env = completion::config::API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Chat-completions endpoint URL.
    #[arg(long, env = "XAI_API_URL", default_value = completion::config::DEFAULT_ENDPOINT)]
    api_url: String,

    /// Model identifier sent with each request.
    #[arg(long, env = "XAI_MODEL", default_value = completion::config::DEFAULT_MODEL)]
    model: String,

    /// Per-attempt timeout for the upstream call, in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,
}

impl Args {
    fn completion_config(&self) -> Result<CompletionConfig, ConfigError> {
        let mut config = CompletionConfig::new(self.api_key.clone())?;
        config.endpoint = self.api_url.clone();
        config.model = self.model.clone();
        config.timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,solace_api=debug,solace_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    // Validate the credential before touching the database or binding.
    let completion_config = args
        .completion_config()
        .inspect_err(|e| error!(error = %e, "refusing to start"))?;

    info!(
        database_url = %args.database_url,
        bind = %args.bind,
        endpoint = %completion_config.endpoint,
        model = %completion_config.model,
        "starting solace_server"
    );

    let db_config = DbConfig {
        url: args.database_url.clone(),
        max_connections: args.max_connections,
    };
    info!("running database migrations");
    let pool = db::connect_and_migrate(&db_config).await?;

    let state = solace_api::AppState::new(
        EntryStore::new(pool),
        CompletionClient::new(completion_config)?,
    );
    let app = solace_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
