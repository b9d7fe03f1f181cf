//! sqlapi - Named, parameterized SQL queries served as JSON over HTTP.

mod cli;

use anyhow::Context;
use cli::Cli;
use sqlapi::config::Config;
use sqlapi::http::{self, AppState};
use sqlapi::logging;
use sqlapi::query::{CallResolver, Dispatcher};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    logging::init_stdout_logging();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_to(&mut config);

    info!("Connecting to database: {}", config.database.display_string());
    let db = sqlapi::db::connect(&config.database)
        .await
        .context("Can't connect to database")?;
    db.ping().await.context("Database is not answering")?;

    let addr = config.server.listen_addr();
    info!("Starting http server on address {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Can't listen on addr {addr}"))?;

    info!("Serving calls from {}", config.server.api_dir.display());
    let resolver = CallResolver::new(&config.server.api_dir);
    let state = AppState::new(Dispatcher::new(resolver, db.clone()));

    http::serve(listener, state).await?;

    db.close().await?;
    info!("Server stopped");
    Ok(())
}
