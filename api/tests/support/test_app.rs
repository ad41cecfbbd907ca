use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use api::routes::sync::{ReadSyncJobResponse, StartSyncResponse};
use api::service::FeedSyncService;
use api::startup::run;
use feed::catalog::memory::MemoryCatalog;
use feed::destination::memory::MemoryDestination;
use feed::test_utils::default_headers;
use feed::test_utils::pipeline::MemoryPipeline;
use feed::types::Product;
use telemetry::tracing::init_test_tracing;

/// Attempts made while waiting for a sync job to finish.
const POLL_ATTEMPTS: usize = 200;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub pipeline: MemoryPipeline,
}

impl TestApp {
    pub async fn health_check(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn start_sync(&self) -> reqwest::Response {
        self.api_client
            .post(format!("{}/sync", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_sync_job(&self, job_id: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}/sync/{job_id}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_openapi(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api-docs/openapi.json", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    /// Starts a sync and returns its job id.
    pub async fn start_sync_job(&self) -> String {
        let response = self.start_sync().await;
        assert!(response.status().is_success());
        let body: StartSyncResponse = response
            .json()
            .await
            .expect("failed to deserialize start sync response");
        assert_eq!(body.status, "started");

        body.job_id
    }

    /// Polls the job until it reaches `success` or `failed`.
    pub async fn wait_for_finished_job(&self, job_id: &str) -> ReadSyncJobResponse {
        for _ in 0..POLL_ATTEMPTS {
            let response = self.read_sync_job(job_id).await;
            assert!(response.status().is_success());
            let job: ReadSyncJobResponse = response
                .json()
                .await
                .expect("failed to deserialize sync job");
            if job.status == "success" || job.status == "failed" {
                return job;
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }

        panic!("sync job {job_id} did not finish in time");
    }
}

/// Spawns the API on a random port over a sheet holding only the default header row.
pub async fn spawn_test_app(products: Vec<Product>) -> TestApp {
    let destination = MemoryDestination::with_headers(default_headers().as_slice());
    spawn_test_app_with(MemoryPipeline::new(MemoryCatalog::new(products), destination)).await
}

pub async fn spawn_test_app_with(pipeline: MemoryPipeline) -> TestApp {
    init_test_tracing();

    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let sync_service = Arc::new(FeedSyncService::new(
        Arc::new(pipeline.reconciler()),
        pipeline.tracker(),
    ));
    let server = run(listener, sync_service)
        .await
        .expect("failed to build server");
    tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        pipeline,
    }
}
