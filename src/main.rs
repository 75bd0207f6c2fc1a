use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfmark::{config, db, infrastructure::AppState, server};

/// Value following `--profile` on the command line, if any.
fn profile_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let pos = args.iter().position(|arg| arg == "--profile")?;
    args.get(pos + 1).cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfmark=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env_with_profile(profile_arg());
    tracing::info!("Starting Shelfmark (profile: {})", config.profile);

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .context("Failed to initialize database")?;

    tokio::fs::create_dir_all(&config.assets_dir)
        .await
        .with_context(|| format!("Failed to create assets dir {:?}", config.assets_dir))?;

    let state = AppState::new(db, &config);
    let app = server::build_router(state, &config);

    server::serve(app, config.port)
        .await
        .context("Failed to start server")?;

    Ok(())
}
