use serde::{Deserialize, Serialize};

/// Client pose carried inside every render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub pitch: f64,
    pub id: String,
    pub timestamp: u64,
}

impl Player {
    pub fn new(x: f64, y: f64, angle: f64, pitch: f64, id: String, timestamp: u64) -> Self {
        Self {
            x,
            y,
            angle,
            pitch,
            id,
            timestamp,
        }
    }
}
