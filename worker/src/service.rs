use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use log::{debug, error};
use raycast_rs::map::Map;
use raycast_rs::raycast::{ColumnJob, Pose, RaycastEngine};
use shared::models::render::column_result::ColumnResult;
use shared::models::render::render_request::RenderRequest;
use shared::models::render::render_response::RenderResponse;
use shared::models::status::worker_status::{WorkerState, WorkerStatus};
use shared::networking::envelope::RpcFault;
use shared::time::epoch_ms;

/// Stateless render executor with per-process counters. Holds no job
/// state between requests, every request carries its own map and pose.
pub struct WorkerService {
    worker_id: i32,
    engine: RaycastEngine,
    active_jobs: AtomicI64,
    total_jobs_processed: AtomicU64,
    total_processing_time_ms: AtomicU64,
    last_heartbeat: AtomicU64,
}

impl WorkerService {
    pub fn new(worker_id: i32) -> Self {
        Self {
            worker_id,
            engine: RaycastEngine::new(),
            active_jobs: AtomicI64::new(0),
            total_jobs_processed: AtomicU64::new(0),
            total_processing_time_ms: AtomicU64::new(0),
            last_heartbeat: AtomicU64::new(epoch_ms()),
        }
    }

    pub fn worker_id(&self) -> i32 {
        self.worker_id
    }

    /// Traces the requested column span. The active-job counter is
    /// restored on every exit path, including rejected requests.
    pub fn process_render_request(
        &self,
        request: RenderRequest,
    ) -> Result<RenderResponse, RpcFault> {
        let started = Instant::now();
        self.active_jobs.fetch_add(1, Ordering::SeqCst);

        let result = self.render(request, started);

        self.active_jobs.fetch_sub(1, Ordering::SeqCst);
        self.last_heartbeat.store(epoch_ms(), Ordering::SeqCst);
        result
    }

    fn render(&self, request: RenderRequest, started: Instant) -> Result<RenderResponse, RpcFault> {
        let map = match Map::from_flat(request.map_width, request.map_height, request.map) {
            Some(map) => map,
            None => {
                error!(
                    "Request {} declares a {}x{} map that does not match its cell buffer",
                    request.request_id, request.map_width, request.map_height
                );
                return Err(RpcFault::invalid_argument(
                    "Map grid does not match the declared dimensions",
                ));
            }
        };

        let job = ColumnJob {
            pose: Pose::new(
                request.player.x,
                request.player.y,
                request.player.angle,
                request.player.pitch,
            ),
            screen_width: request.screen_width,
            fov: request.fov,
            start_column: request.start_column,
            end_column: request.end_column,
            map,
        };

        let results: Vec<ColumnResult> = self
            .engine
            .render_columns(&job)
            .into_iter()
            .map(|geometry| ColumnResult {
                column: geometry.column,
                distance: geometry.distance,
                wall_type: geometry.wall_type,
                wall_x: geometry.wall_x,
                wall_top: geometry.wall_top,
                wall_bottom: geometry.wall_bottom,
                r: geometry.r,
                g: geometry.g,
                b: geometry.b,
            })
            .collect();

        let processing_time_ms = started.elapsed().as_millis() as u64;
        self.total_jobs_processed.fetch_add(1, Ordering::SeqCst);
        self.total_processing_time_ms
            .fetch_add(processing_time_ms, Ordering::SeqCst);

        debug!(
            "Rendered columns [{}, {}) of request {} in {}ms",
            request.start_column, request.end_column, request.request_id, processing_time_ms
        );

        Ok(RenderResponse {
            request_id: request.request_id,
            player_id: request.player_id,
            worker_id: self.worker_id,
            timestamp: epoch_ms(),
            processing_time_ms,
            results,
        })
    }

    /// Point-in-time snapshot of the counters.
    pub fn worker_status(&self) -> WorkerStatus {
        let active_jobs = self.active_jobs.load(Ordering::SeqCst);
        let total_jobs = self.total_jobs_processed.load(Ordering::SeqCst);
        let total_time_ms = self.total_processing_time_ms.load(Ordering::SeqCst);

        WorkerStatus {
            worker_id: self.worker_id,
            status: if active_jobs > 0 {
                WorkerState::Busy
            } else {
                WorkerState::Idle
            },
            active_jobs: active_jobs as i32,
            total_jobs_processed: total_jobs,
            average_processing_time_ms: if total_jobs > 0 {
                total_time_ms as f64 / total_jobs as f64
            } else {
                0.0
            },
            last_heartbeat: self.last_heartbeat.load(Ordering::SeqCst),
        }
    }
}
