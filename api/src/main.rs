use std::sync::Once;

use anyhow::{Context, anyhow};
use api::{config::ApiConfig, startup::Application};
use config::load_config;
use telemetry::tracing::init_tracing;
use tracing::info;

mod sentry;

static INIT_CRYPTO: Once = Once::new();

/// Installs the ring provider as the process-wide rustls default.
///
/// sqlx, reqwest and fred each build TLS clients, and rustls refuses to pick a
/// provider on its own once more than one is compiled in.
fn install_crypto_provider() -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT_CRYPTO.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            result = Err(anyhow!("failed to install default crypto provider"));
        }
    });

    result
}

fn main() -> anyhow::Result<()> {
    install_crypto_provider()?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    // Sentry must be initialized before the async runtime starts.
    let _sentry_guard = sentry::init()?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let config =
        load_config::<ApiConfig>().context("loading API configuration for server startup")?;
    info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        spreadsheet_id = %config.sheets.spreadsheet_id,
        sheet_name = %config.sheets.sheet_name,
        redis_host = %config.redis.host,
        sync_interval_mins = config.sync.interval_mins,
        "starting feed sync api"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
