use serde::{Deserialize, Serialize};

/// Traced geometry and shading for one screen column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnResult {
    pub column: i32,
    pub distance: f64,
    pub wall_type: i32,
    pub wall_x: f64,
    pub wall_top: i32,
    pub wall_bottom: i32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
