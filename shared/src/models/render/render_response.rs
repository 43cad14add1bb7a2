use serde::{Deserialize, Serialize};

use crate::models::render::column_result::ColumnResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub request_id: String,
    pub player_id: String,
    pub worker_id: i32,
    pub timestamp: u64,
    pub processing_time_ms: u64,
    pub results: Vec<ColumnResult>,
}
