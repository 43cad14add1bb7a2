use serde::{Deserialize, Serialize};

use crate::models::render::column_result::ColumnResult;

/// Worker response relayed back to the client, annotated with the
/// endpoint that served it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaycastResponse {
    pub request_id: String,
    pub client_id: String,
    pub worker_id: i32,
    pub worker_endpoint: String,
    pub success: bool,
    pub error_message: String,
    pub timestamp: u64,
    pub processing_time_ms: u64,
    pub results: Vec<ColumnResult>,
}
