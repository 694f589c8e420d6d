use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpdError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EpdError {
    #[error("unsupported image size {actual:?}, expected {expected:?}")]
    Size {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("packed {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}
