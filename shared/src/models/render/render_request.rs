use serde::{Deserialize, Serialize};

use crate::models::player::Player;

/// Span of screen columns for one worker to trace, together with the map
/// the columns are traced against. The map travels as a row-major flat
/// buffer plus its dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub request_id: String,
    pub player_id: String,
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
