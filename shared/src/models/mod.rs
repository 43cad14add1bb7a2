pub mod player;
pub mod raycast;
pub mod render;
pub mod status;
