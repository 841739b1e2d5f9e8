//! `labelsheet` -- manage label-sheet templates from the terminal.
//!
//! Signs in (custom token first, anonymous as fallback), loads the
//! signed-in user's templates and reads commands from stdin. Logs go to
//! stderr. See [`labelsheet_app::config::AppConfig::from_env`] for the
//! environment variables.

use std::sync::Arc;

use labelsheet_app::bootstrap::build_store;
use labelsheet_app::config::AppConfig;
use labelsheet_app::console;
use labelsheet_app::manager::TemplateManager;
use labelsheet_identity::LocalIdentityProvider;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labelsheet_app=info,labelsheet_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        app_id = %config.app_id,
        remote_store = config.store_url.is_some(),
        custom_token = config.initial_auth_token.is_some(),
        "Starting labelsheet",
    );

    let store = build_store(&config)?;
    let provider = LocalIdentityProvider::new(config.auth_token_secret.clone());

    let manager = match TemplateManager::start(store, &provider, &config).await {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    let _follower = manager.follow_identity();

    let mut stdout = tokio::io::stdout();
    print!("{}", console::render_list(&manager).await);
    console::run(&manager, BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    tracing::info!("Bye");
    Ok(())
}
