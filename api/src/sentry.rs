use std::sync::Arc;

use anyhow::Result;
use api::config::ApiConfig;
use config::{Environment, load_config};
use secrecy::ExposeSecret;
use tracing::info;

/// Initializes Sentry error tracking and performance monitoring for the API.
///
/// Returns [`None`] when no Sentry configuration is provided.
pub fn init() -> Result<Option<sentry::ClientInitGuard>> {
    let sentry_config = match load_config::<ApiConfig>() {
        Ok(ApiConfig {
            sentry: Some(sentry_config),
            ..
        }) => sentry_config,
        _ => {
            info!("sentry not configured for api, skipping initialization");
            return Ok(None);
        }
    };

    info!("initializing sentry with supplied dsn");

    let environment = Environment::load()?;
    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(sentry_config.dsn.expose_secret().parse()?),
        environment: Some(environment.to_string().into()),
        traces_sampler: Some(Arc::new(|ctx: &sentry::TransactionContext| {
            sample_trace_rate(ctx)
        })),
        integrations: vec![Arc::new(
            sentry::integrations::panic::PanicIntegration::new(),
        )],
        attach_stacktrace: true,
        ..Default::default()
    });

    sentry::configure_scope(|scope| {
        scope.set_tag("service", "feed-sync-api");
    });

    Ok(Some(guard))
}

/// Samples status polling and liveness traffic far less than sync triggers.
fn sample_trace_rate(ctx: &sentry::TransactionContext) -> f32 {
    let transaction_name = ctx.name();
    let endpoint = transaction_name
        .split_once(' ')
        .map(|(_, path)| path)
        .unwrap_or(transaction_name);

    if endpoint == "/" || endpoint.starts_with("/sync/") {
        0.001
    } else {
        0.1
    }
}
