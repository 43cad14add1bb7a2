use serde::{Deserialize, Serialize};

/// Grid of wall cells, row-major, where any non-zero cell is solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    width: i32,
    height: i32,
    cells: Vec<i32>,
}

impl Map {
    /// Builds a map from a row-major cell buffer. Returns `None` when the
    /// dimensions are not positive or do not match the buffer length.
    pub fn from_flat(width: i32, height: i32, cells: Vec<i32>) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        if cells.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Open map enclosed by a one-cell wall on every edge.
    pub fn walled(width: i32, height: i32) -> Self {
        let mut cells = vec![0; (width.max(0) as usize) * (height.max(0) as usize)];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    cells[y as usize * width as usize + x as usize] = 1;
                }
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Cells outside the grid count as walls so rays always terminate.
    pub fn wall_at(&self, cell_x: i32, cell_y: i32) -> bool {
        if cell_x < 0 || cell_x >= self.width || cell_y < 0 || cell_y >= self.height {
            return true;
        }
        self.cells[cell_y as usize * self.width as usize + cell_x as usize] == 1
    }

    /// Wall test for a world-space position, truncating toward zero.
    pub fn is_wall(&self, x: f64, y: f64) -> bool {
        self.wall_at(x as i32, y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_rejects_mismatched_dimensions() {
        assert!(Map::from_flat(4, 4, vec![0; 15]).is_none());
        assert!(Map::from_flat(4, 4, vec![0; 17]).is_none());
        assert!(Map::from_flat(0, 0, vec![]).is_none());
        assert!(Map::from_flat(-4, 4, vec![0; 16]).is_none());
        assert!(Map::from_flat(4, 4, vec![0; 16]).is_some());
    }

    #[test]
    fn walled_map_has_solid_border_and_open_interior() {
        let map = Map::walled(16, 16);
        assert!(map.wall_at(0, 0));
        assert!(map.wall_at(15, 7));
        assert!(map.wall_at(7, 15));
        assert!(!map.wall_at(1, 1));
        assert!(!map.wall_at(8, 8));
    }

    #[test]
    fn cells_outside_the_grid_are_walls() {
        let map = Map::from_flat(4, 4, vec![0; 16]).unwrap();
        assert!(map.wall_at(-1, 0));
        assert!(map.wall_at(0, -1));
        assert!(map.wall_at(4, 0));
        assert!(map.wall_at(0, 4));
        assert!(!map.wall_at(3, 3));
    }

    #[test]
    fn is_wall_truncates_world_coordinates_toward_zero() {
        let map = Map::from_flat(4, 4, vec![0; 16]).unwrap();
        // -0.5 truncates to cell 0, which is inside the open grid.
        assert!(!map.is_wall(-0.5, 3.0));
        assert!(map.is_wall(-1.5, 3.0));
        assert!(!map.is_wall(3.9, 3.9));
        assert!(map.is_wall(4.1, 3.9));
    }
}
