use serde::{Deserialize, Serialize};

use crate::models::player::Player;

/// Client-facing render request accepted by the master gateway. Identical
/// to the worker schema except that clients identify themselves with
/// `client_id` rather than `player_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaycastRequest {
    pub request_id: String,
    pub client_id: String,
    pub player: Player,
    pub screen_width: i32,
    pub screen_height: i32,
    pub fov: f64,
    pub start_column: i32,
    pub end_column: i32,
    pub map: Vec<i32>,
    pub map_width: i32,
    pub map_height: i32,
    pub timestamp: u64,
}
