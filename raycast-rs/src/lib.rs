pub mod color;
pub mod map;
pub mod raycast;
