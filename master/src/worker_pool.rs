use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use shared::models::render::render_request::RenderRequest;
use shared::models::render::render_response::RenderResponse;
use shared::models::status::status_request::StatusRequest;
use shared::models::status::worker_info::WorkerInfo;
use shared::models::status::worker_status::WorkerState;
use shared::networking::call;
use shared::networking::envelope::{RpcFault, WorkerReply, WorkerRpc};
use shared::time::epoch_ms;
use tokio::time::timeout;

use crate::discovery::EndpointResolver;

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub discovery_interval: Duration,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            discovery_interval: Duration::from_secs(30),
            health_check_interval: Duration::from_secs(30),
            health_check_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One pooled worker endpoint. Scalar state lives in atomic cells so
/// calls never contend on a lock, only the health-check timestamp is
/// guarded, which also serializes concurrent probes of this worker.
pub struct WorkerConnection {
    endpoint: String,
    healthy: AtomicBool,
    active_jobs: AtomicI64,
    total_jobs_processed: AtomicU64,
    total_processing_time_ms: AtomicU64,
    last_known_worker_id: AtomicI32,
    last_health_check: tokio::sync::Mutex<Instant>,
    health_check_interval: Duration,
    health_check_timeout: Duration,
    request_timeout: Duration,
}

impl WorkerConnection {
    pub fn new(endpoint: String, config: &PoolConfig) -> Self {
        Self {
            endpoint,
            healthy: AtomicBool::new(true),
            active_jobs: AtomicI64::new(0),
            total_jobs_processed: AtomicU64::new(0),
            total_processing_time_ms: AtomicU64::new(0),
            last_known_worker_id: AtomicI32::new(0),
            last_health_check: tokio::sync::Mutex::new(Instant::now()),
            health_check_interval: config.health_check_interval,
            health_check_timeout: config.health_check_timeout,
            request_timeout: config.request_timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn active_jobs(&self) -> i64 {
        self.active_jobs.load(Ordering::SeqCst)
    }

    pub fn total_jobs_processed(&self) -> u64 {
        self.total_jobs_processed.load(Ordering::SeqCst)
    }

    /// Id the worker reported on its last successful probe, 0 before one.
    pub fn last_known_worker_id(&self) -> i32 {
        self.last_known_worker_id.load(Ordering::SeqCst)
    }

    /// Cached health flag without any probing or TTL check.
    pub fn last_known_health(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    pub fn mark_unhealthy(&self) {
        self.healthy.store(false, Ordering::SeqCst);
    }

    pub fn increment_active_jobs(&self) {
        self.active_jobs.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement_active_jobs(&self) {
        self.active_jobs.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn average_processing_time_ms(&self) -> f64 {
        let total_jobs = self.total_jobs_processed.load(Ordering::SeqCst);
        if total_jobs == 0 {
            return 0.0;
        }
        self.total_processing_time_ms.load(Ordering::SeqCst) as f64 / total_jobs as f64
    }

    fn record_job_stats(&self, processing_time_ms: u64) {
        self.total_jobs_processed.fetch_add(1, Ordering::SeqCst);
        self.total_processing_time_ms
            .fetch_add(processing_time_ms, Ordering::SeqCst);
    }

    /// Health as of the last check, re-probing first when that check is
    /// older than the health-check interval.
    pub async fn is_healthy(&self) -> bool {
        let mut last_check = self.last_health_check.lock().await;
        if last_check.elapsed() > self.health_check_interval {
            return self.probe(&mut last_check).await;
        }
        self.healthy.load(Ordering::SeqCst)
    }

    /// Unconditional status probe under the health-check deadline.
    pub async fn perform_health_check(&self) -> bool {
        let mut last_check = self.last_health_check.lock().await;
        self.probe(&mut last_check).await
    }

    async fn probe(&self, last_check: &mut Instant) -> bool {
        let rpc = WorkerRpc::GetWorkerStatus(StatusRequest {});
        let healthy = match timeout(
            self.health_check_timeout,
            call::<_, WorkerReply>(&self.endpoint, &rpc),
        )
        .await
        {
            Ok(Ok(WorkerReply::WorkerStatus(status))) => {
                self.last_known_worker_id
                    .store(status.worker_id, Ordering::SeqCst);
                true
            }
            Ok(Ok(reply)) => {
                warn!(
                    "Health check for worker {} returned an unexpected reply: {:?}",
                    self.endpoint, reply
                );
                false
            }
            Ok(Err(e)) => {
                warn!("Health check failed for worker {}: {}", self.endpoint, e);
                false
            }
            Err(_) => {
                warn!("Health check timed out for worker {}", self.endpoint);
                false
            }
        };

        self.healthy.store(healthy, Ordering::SeqCst);
        *last_check = Instant::now();
        healthy
    }

    async fn touch_last_health_check(&self) {
        *self.last_health_check.lock().await = Instant::now();
    }

    /// Forwards one render request under the request deadline. Stats and
    /// the active-job counter are updated whatever the outcome, a
    /// successful reply also counts as proof of health.
    pub async fn process_render_request(
        &self,
        request: RenderRequest,
    ) -> Result<RenderResponse, RpcFault> {
        let started = Instant::now();
        self.increment_active_jobs();

        let rpc = WorkerRpc::ProcessRenderRequest(request);
        let outcome = timeout(
            self.request_timeout,
            call::<_, WorkerReply>(&self.endpoint, &rpc),
        )
        .await;

        self.record_job_stats(started.elapsed().as_millis() as u64);
        self.decrement_active_jobs();

        let result = match outcome {
            Ok(Ok(WorkerReply::RenderResponse(response))) => Ok(response),
            Ok(Ok(WorkerReply::Fault(fault))) => Err(fault),
            Ok(Ok(reply)) => {
                warn!(
                    "Worker {} answered a render request with an unexpected reply: {:?}",
                    self.endpoint, reply
                );
                Err(RpcFault::internal("Unexpected reply from worker"))
            }
            Ok(Err(e)) => Err(RpcFault::from(e)),
            Err(_) => Err(RpcFault::deadline_exceeded(format!(
                "Worker {} did not answer within {:?}",
                self.endpoint, self.request_timeout
            ))),
        };

        match &result {
            Ok(_) => self.touch_last_health_check().await,
            Err(_) => self.mark_unhealthy(),
        }

        result
    }
}

/// Set of known worker connections, reconciled lazily against the
/// endpoint resolver. The structural lock is only ever held for list
/// edits and snapshots, probes run outside it.
pub struct WorkerPool {
    workers: Mutex<Vec<Arc<WorkerConnection>>>,
    resolver: Box<dyn EndpointResolver>,
    config: PoolConfig,
    last_discovery: tokio::sync::Mutex<Instant>,
}

impl WorkerPool {
    pub fn new(resolver: Box<dyn EndpointResolver>, config: PoolConfig) -> Self {
        Self {
            workers: Mutex::new(Vec::new()),
            resolver,
            config,
            last_discovery: tokio::sync::Mutex::new(Instant::now()),
        }
    }

    /// Reconciles the pool against the resolver now.
    pub async fn discover_workers(&self) {
        let mut last_discovery = self.last_discovery.lock().await;
        self.reconcile().await;
        *last_discovery = Instant::now();
    }

    /// Reconciles only when the previous discovery is older than the
    /// discovery interval. Callers racing past the gate at the same
    /// moment reconcile once each, which is harmless.
    pub async fn refresh_workers(&self) {
        let mut last_discovery = self.last_discovery.lock().await;
        if last_discovery.elapsed() < self.config.discovery_interval {
            return;
        }
        self.reconcile().await;
        *last_discovery = Instant::now();
    }

    async fn reconcile(&self) {
        let endpoints = self.resolver.resolve();

        let known: Vec<String> = {
            let mut workers = self.workers.lock().unwrap();
            workers.retain(|worker| {
                let keep = endpoints.iter().any(|endpoint| endpoint == worker.endpoint());
                if !keep {
                    info!("Removed worker: {}", worker.endpoint());
                }
                keep
            });
            workers
                .iter()
                .map(|worker| worker.endpoint().to_string())
                .collect()
        };

        for endpoint in endpoints {
            if known.contains(&endpoint) {
                continue;
            }
            self.try_add(endpoint).await;
        }
    }

    /// Probes a candidate endpoint and inserts it when the probe passes
    /// and no connection for it raced in meanwhile.
    async fn try_add(&self, endpoint: String) -> bool {
        let worker = Arc::new(WorkerConnection::new(endpoint.clone(), &self.config));
        if !worker.perform_health_check().await {
            debug!("Worker {} failed its first health check, not added", endpoint);
            return false;
        }

        let mut workers = self.workers.lock().unwrap();
        if workers.iter().any(|known| known.endpoint() == endpoint) {
            return false;
        }
        workers.push(worker);
        info!("Added worker: {}", endpoint);
        true
    }

    /// Manual registration. Already-known endpoints are left untouched.
    pub async fn add_worker(&self, endpoint: &str) -> bool {
        if self.find_worker(endpoint).is_some() {
            return false;
        }
        self.try_add(endpoint.to_string()).await
    }

    pub fn remove_worker(&self, endpoint: &str) {
        let mut workers = self.workers.lock().unwrap();
        workers.retain(|worker| worker.endpoint() != endpoint);
        info!("Removed worker: {}", endpoint);
    }

    pub fn find_worker(&self, endpoint: &str) -> Option<Arc<WorkerConnection>> {
        let workers = self.workers.lock().unwrap();
        workers
            .iter()
            .find(|worker| worker.endpoint() == endpoint)
            .cloned()
    }

    /// Snapshot of every known connection, healthy or not.
    pub fn all_workers(&self) -> Vec<Arc<WorkerConnection>> {
        self.workers.lock().unwrap().clone()
    }

    pub fn total_workers(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    /// Snapshot of the connections currently considered healthy. TTL
    /// probes triggered here run on the snapshot, outside the lock.
    pub async fn healthy_workers(&self) -> Vec<Arc<WorkerConnection>> {
        let snapshot = self.all_workers();
        let mut healthy = Vec::with_capacity(snapshot.len());
        for worker in snapshot {
            if worker.is_healthy().await {
                healthy.push(worker);
            }
        }
        healthy
    }

    pub async fn active_workers(&self) -> usize {
        self.healthy_workers().await.len()
    }

    /// Per-worker view for the master status report.
    pub async fn worker_info(&self) -> Vec<WorkerInfo> {
        let snapshot = self.all_workers();
        let mut info = Vec::with_capacity(snapshot.len());

        for worker in snapshot {
            let healthy = worker.is_healthy().await;
            let active_jobs = worker.active_jobs();
            let status = if !healthy {
                WorkerState::Error
            } else if active_jobs > 0 {
                WorkerState::Busy
            } else {
                WorkerState::Idle
            };

            info.push(WorkerInfo {
                endpoint: worker.endpoint().to_string(),
                worker_id: worker.last_known_worker_id(),
                status,
                active_jobs: active_jobs as i32,
                total_jobs_processed: worker.total_jobs_processed(),
                average_processing_time_ms: worker.average_processing_time_ms(),
                last_heartbeat: epoch_ms(),
            });
        }

        info
    }
}
