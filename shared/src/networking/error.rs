use std::fmt;

use super::MAX_FRAME_LEN;

#[derive(Debug)]
pub enum NetworkingError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    FrameTooLarge(usize),
}

impl fmt::Display for NetworkingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkingError::Io(e) => write!(f, "io error: {}", e),
            NetworkingError::Serialization(e) => write!(f, "serialization error: {}", e),
            NetworkingError::FrameTooLarge(length) => write!(
                f,
                "frame of {} bytes exceeds the {} byte limit",
                length, MAX_FRAME_LEN
            ),
        }
    }
}

impl std::error::Error for NetworkingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkingError::Io(e) => Some(e),
            NetworkingError::Serialization(e) => Some(e),
            NetworkingError::FrameTooLarge(_) => None,
        }
    }
}

impl From<std::io::Error> for NetworkingError {
    fn from(error: std::io::Error) -> Self {
        NetworkingError::Io(error)
    }
}

impl From<serde_json::Error> for NetworkingError {
    fn from(error: serde_json::Error) -> Self {
        NetworkingError::Serialization(error)
    }
}
