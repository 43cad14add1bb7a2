use serde::{Deserialize, Serialize};

/// Empty payload for the status operations.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusRequest {}
