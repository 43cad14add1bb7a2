use serde::{Deserialize, Serialize};

use crate::models::status::worker_status::WorkerState;

/// What the master knows about one pooled worker, embedded in the master
/// status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub endpoint: String,
    pub worker_id: i32,
    pub status: WorkerState,
    pub active_jobs: i32,
    pub total_jobs_processed: u64,
    pub average_processing_time_ms: f64,
    pub last_heartbeat: u64,
}
