use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use shared::models::raycast::raycast_request::RaycastRequest;
use shared::models::raycast::raycast_response::RaycastResponse;
use shared::models::status::master_status::MasterStatus;
use shared::networking::envelope::RpcFault;
use shared::time::epoch_ms;

use crate::load_balancer::{LoadBalancer, LoadBalancingStrategy};
use crate::translate;
use crate::worker_pool::WorkerPool;

/// Gateway logic. Every client request triggers a lazy pool refresh,
/// one balancer pick, and one forwarded call.
pub struct MasterService {
    pool: Arc<WorkerPool>,
    balancer: LoadBalancer,
    total_requests_processed: AtomicU64,
    total_response_time_ms: AtomicU64,
}

impl MasterService {
    /// Runs an eager discovery so the pool is primed before the first
    /// request.
    pub async fn new(pool: Arc<WorkerPool>, strategy: LoadBalancingStrategy) -> Self {
        pool.discover_workers().await;
        info!(
            "Master service initialized with {} active workers",
            pool.active_workers().await
        );

        Self {
            balancer: LoadBalancer::new(Arc::clone(&pool), strategy),
            pool,
            total_requests_processed: AtomicU64::new(0),
            total_response_time_ms: AtomicU64::new(0),
        }
    }

    pub async fn process_raycast_request(
        &self,
        request: RaycastRequest,
    ) -> Result<RaycastResponse, RpcFault> {
        let started = Instant::now();

        self.pool.refresh_workers().await;

        let Some(worker) = self.balancer.next_worker().await else {
            return Err(RpcFault::unavailable("No workers available"));
        };

        let render_request = translate::render_request(&request);
        match worker.process_render_request(render_request).await {
            Ok(response) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                self.record_request(elapsed_ms);
                info!(
                    "Request {} processed by worker {} in {}ms",
                    request.request_id,
                    worker.endpoint(),
                    elapsed_ms
                );
                Ok(translate::raycast_response(
                    response,
                    worker.endpoint().to_string(),
                ))
            }
            Err(fault) => {
                error!("Worker request failed: {}", fault);
                Err(fault)
            }
        }
    }

    pub async fn master_status(&self) -> MasterStatus {
        self.pool.refresh_workers().await;

        let workers = self.pool.worker_info().await;
        let total_requests = self.total_requests_processed.load(Ordering::SeqCst);
        let total_response_time = self.total_response_time_ms.load(Ordering::SeqCst);

        MasterStatus {
            total_workers: self.pool.total_workers() as i32,
            active_workers: self.pool.active_workers().await as i32,
            total_requests_processed: total_requests,
            average_response_time_ms: if total_requests > 0 {
                total_response_time as f64 / total_requests as f64
            } else {
                0.0
            },
            timestamp: epoch_ms(),
            workers,
        }
    }

    /// Gateway latency counters. Only successfully answered requests
    /// count toward the average.
    fn record_request(&self, response_time_ms: u64) {
        self.total_requests_processed.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(response_time_ms, Ordering::SeqCst);
    }
}
