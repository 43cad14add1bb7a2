/// Base palette indexed by wall type.
const WALL_PALETTE: [(u8, u8, u8); 6] = [
    (34, 139, 34),
    (105, 105, 105),
    (128, 128, 128),
    (139, 69, 19),
    (160, 82, 45),
    (178, 34, 34),
];

/// Scales the palette entry for `wall_type` by `intensity`. Types outside
/// the palette shade to plain gray.
pub fn wall_color(wall_type: i32, intensity: u8) -> (u8, u8, u8) {
    match WALL_PALETTE.get(wall_type as usize) {
        Some(&(r, g, b)) => (
            (r as u32 * intensity as u32 / 255) as u8,
            (g as u32 * intensity as u32 / 255) as u8,
            (b as u32 * intensity as u32 / 255) as u8,
        ),
        None => (intensity, intensity, intensity),
    }
}
