use serde::{Deserialize, Serialize};

use crate::models::status::worker_info::WorkerInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterStatus {
    pub total_workers: i32,
    pub active_workers: i32,
    pub total_requests_processed: u64,
    pub average_response_time_ms: f64,
    pub timestamp: u64,
    pub workers: Vec<WorkerInfo>,
}
