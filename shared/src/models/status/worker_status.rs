use serde::{Deserialize, Serialize};

/// Coarse activity state reported in status snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Idle,
    Busy,
    Error,
}

/// Snapshot a worker reports about itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub worker_id: i32,
    pub status: WorkerState,
    pub active_jobs: i32,
    pub total_jobs_processed: u64,
    pub average_processing_time_ms: f64,
    pub last_heartbeat: u64,
}
