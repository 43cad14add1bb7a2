use serde::{Deserialize, Serialize};

use crate::color;
use crate::map::Map;

pub const MAX_DISTANCE: f64 = 800.0;
pub const SCREEN_HEIGHT: i32 = 768;

/// Floor applied to the distance before the wall height projection, so a
/// ray that terminates on the player's own cell boundary cannot divide by
/// zero. The reported distance stays unclamped.
const MIN_WALL_DISTANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub pitch: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, angle: f64, pitch: f64) -> Self {
        Self { x, y, angle, pitch }
    }
}

/// Contiguous span of screen columns to trace against one map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnJob {
    pub pose: Pose,
    pub screen_width: i32,
    pub fov: f64,
    pub start_column: i32,
    pub end_column: i32,
    pub map: Map,
}

/// Projected geometry and shading for a single traced column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnGeometry {
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

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    pub wall_type: i32,
    pub wall_x: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastEngine {
    pub max_distance: f64,
    pub screen_height: i32,
}

impl Default for RaycastEngine {
    fn default() -> Self {
        Self {
            max_distance: MAX_DISTANCE,
            screen_height: SCREEN_HEIGHT,
        }
    }
}

impl RaycastEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marches one ray through the grid and returns the perpendicular
    /// distance to the first wall, the wall type derived from the hit
    /// cell, and the horizontal texture coordinate on the wall face.
    pub fn cast_ray(
        &self,
        ray_angle: f64,
        player_x: f64,
        player_y: f64,
        pitch: f64,
        map: &Map,
    ) -> RayHit {
        let ray_dir_x = ray_angle.cos() * pitch.cos();
        let ray_dir_y = ray_angle.sin() * pitch.cos();

        // An exactly zero component never advances, so its crossing
        // distance is pushed out of reach instead.
        let delta_dist_x = if ray_dir_x == 0.0 {
            1e30
        } else {
            (1.0 / ray_dir_x).abs()
        };
        let delta_dist_y = if ray_dir_y == 0.0 {
            1e30
        } else {
            (1.0 / ray_dir_y).abs()
        };

        let mut map_x = player_x as i32;
        let mut map_y = player_y as i32;

        let (step_x, mut side_dist_x) = if ray_dir_x < 0.0 {
            (-1, (player_x - map_x as f64) * delta_dist_x)
        } else {
            (1, (map_x as f64 + 1.0 - player_x) * delta_dist_x)
        };
        let (step_y, mut side_dist_y) = if ray_dir_y < 0.0 {
            (-1, (player_y - map_y as f64) * delta_dist_y)
        } else {
            (1, (map_y as f64 + 1.0 - player_y) * delta_dist_y)
        };

        // Step to the nearer grid line each round until a wall stops the
        // ray. Out of bounds counts as a wall, so this always terminates.
        let mut side = 0;
        loop {
            if side_dist_x < side_dist_y {
                side_dist_x += delta_dist_x;
                map_x += step_x;
                side = 0;
            } else {
                side_dist_y += delta_dist_y;
                map_y += step_y;
                side = 1;
            }
            if map.wall_at(map_x, map_y) {
                break;
            }
        }

        let (distance, wall_x) = if side == 0 {
            let distance = side_dist_x - delta_dist_x;
            (distance, player_y + distance * ray_dir_y)
        } else {
            let distance = side_dist_y - delta_dist_y;
            (distance, player_x + distance * ray_dir_x)
        };

        RayHit {
            // Fisheye correction.
            distance: distance * pitch.cos(),
            wall_type: (map_x + map_y).rem_euclid(6),
            wall_x,
        }
    }

    /// Traces every column in `[start_column, end_column)` and projects
    /// each hit to screen space.
    pub fn render_columns(&self, job: &ColumnJob) -> Vec<ColumnGeometry> {
        let span = (job.end_column - job.start_column).max(0) as usize;
        let mut results = Vec::with_capacity(span);

        for column in job.start_column..job.end_column {
            let ray_angle = job.pose.angle - job.fov / 2.0
                + column as f64 * job.fov / job.screen_width as f64;

            let hit = self.cast_ray(ray_angle, job.pose.x, job.pose.y, job.pose.pitch, &job.map);

            let wall_height =
                (self.screen_height as f64 / hit.distance.max(MIN_WALL_DISTANCE)) as i32;
            let wall_top = (self.screen_height - wall_height) / 2;
            let wall_bottom = wall_top + wall_height;

            let intensity = self.shade_intensity(hit.distance);
            let (r, g, b) = color::wall_color(hit.wall_type, intensity);

            results.push(ColumnGeometry {
                column,
                distance: hit.distance,
                wall_type: hit.wall_type,
                wall_x: hit.wall_x,
                wall_top,
                wall_bottom,
                r,
                g,
                b,
            });
        }

        results
    }

    /// Linear falloff from 255 at the player to the floor of 50 at
    /// `max_distance` and beyond.
    pub fn shade_intensity(&self, distance: f64) -> u8 {
        (255.0 * (1.0 - distance / self.max_distance)).max(50.0) as u8
    }
}
