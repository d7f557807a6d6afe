//! Core error types for wirebuf

#[derive(thiserror::Error, Debug)]
pub enum WireError {
    /// A read wanted more bytes than the valid range holds
    #[error("Buffer underrun: attempted to get {size} bytes at pos {pos} (size: {total})")]
    BufferUnderrun { pos: usize, size: usize, total: usize },

    /// Storage growth could not be satisfied
    #[error("Allocation failure: could not grow buffer to {requested} bytes")]
    AllocationFailure { requested: usize },

    /// An in-place patch targeted a region that was never written
    #[error("Invalid patch: attempted to put {size} bytes at pos {pos} (written: {total})")]
    InvalidPatch { pos: usize, size: usize, total: usize },

    #[error("Invalid bit width: {0} (max 64)")]
    InvalidBitWidth(u32),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// True for errors raised by reading past the valid range
    pub fn is_underrun(&self) -> bool {
        matches!(self, WireError::BufferUnderrun { .. })
    }
}

pub type Result<T> = std::result::Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underrun_message_carries_positions() {
        let err = WireError::BufferUnderrun { pos: 4, size: 8, total: 6 };
        assert!(err.is_underrun());
        assert_eq!(
            err.to_string(),
            "Buffer underrun: attempted to get 8 bytes at pos 4 (size: 6)"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: WireError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, WireError::Io(_)));
        assert!(!err.is_underrun());
    }
}
