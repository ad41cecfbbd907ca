use std::{net::TcpListener, sync::Arc, time::Duration};

use actix_web::{App, HttpServer, dev::Server, web};
use feed::catalog::postgres::PostgresCatalogReader;
use feed::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use feed::destination::sheets::GoogleSheetsClient;
use feed::jobs::JobTracker;
use feed::lock::SyncLock;
use feed::mapping::RowMapper;
use feed::reconcile::Reconciler;
use feed::store::redis::RedisStore;
use feed::workers::scheduler::{SyncScheduler, SyncSchedulerHandle};
use postgres::lazy_catalog_pool;
use tracing::info;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::routes::{
    ErrorMessage,
    health_check::{HealthCheckResponse, health_check},
    openapi::openapi_json,
    sync::{ReadSyncJobResponse, StartSyncResponse, read_sync_job, start_sync},
};
use crate::service::{FeedSyncService, SyncService};

/// Feed sync service: the HTTP trigger layer plus the recurring sync.
pub struct Application {
    port: u16,
    server: Server,
    scheduler: SyncSchedulerHandle,
    shutdown_tx: ShutdownTx,
}

impl Application {
    /// Wires the catalog, sheet and Redis collaborators, starts the recurring
    /// sync and binds the HTTP server.
    pub async fn build(config: ApiConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let catalog = PostgresCatalogReader::new(
            lazy_catalog_pool(&config.database),
            config.feed.clone(),
        );
        let destination = GoogleSheetsClient::new(&config.sheets)?;
        let store = RedisStore::connect(&config.redis).await?;

        let lock = SyncLock::new(
            store.clone(),
            config.sync.lock_key.clone(),
            Duration::from_secs(config.sync.lock_ttl_secs),
        );
        let reconciler = Arc::new(Reconciler::new(
            catalog,
            destination,
            lock,
            RowMapper::new(config.feed.clone()),
        ));
        let tracker = JobTracker::new(
            store,
            config.sync.job_key_prefix.clone(),
            Duration::from_secs(config.sync.job_ttl_secs),
        );
        let sync_service = Arc::new(FeedSyncService::new(reconciler.clone(), tracker));

        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
        let scheduler = SyncScheduler::new(
            reconciler,
            Duration::from_secs(config.sync.interval_mins * 60),
            shutdown_rx,
        )
        .start();

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        info!(port, "feed sync api listening");

        let server = run(listener, sync_service).await?;

        Ok(Self {
            port,
            server,
            scheduler,
            shutdown_tx,
        })
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Runs the server until it receives a shutdown signal, then stops the recurring sync.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let result = self.server.await;

        self.shutdown_tx.shutdown();
        self.scheduler.wait().await;
        info!("feed sync api stopped");

        result
    }
}

/// Creates the HTTP server exposing the sync trigger and job status routes.
pub async fn run(
    listener: TcpListener,
    sync_service: Arc<dyn SyncService>,
) -> Result<Server, anyhow::Error> {
    let sync_service: web::Data<dyn SyncService> = sync_service.into();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::routes::health_check::health_check,
            crate::routes::sync::start_sync,
            crate::routes::sync::read_sync_job,
        ),
        components(schemas(
            HealthCheckResponse,
            StartSyncResponse,
            ReadSyncJobResponse,
            ErrorMessage,
        ))
    )]
    struct ApiDoc;

    let openapi = web::Data::new(ApiDoc::openapi());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(
                sentry::integrations::actix::Sentry::builder()
                    .capture_server_errors(true)
                    .start_transaction(true)
                    .finish(),
            )
            .service(health_check)
            .service(start_sync)
            .service(read_sync_job)
            .service(openapi_json)
            .app_data(sync_service.clone())
            .app_data(openapi.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
