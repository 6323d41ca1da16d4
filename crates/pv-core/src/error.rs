use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds,
    EmptyPyramid,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected} samples, got {actual}")
            }
            Self::OutOfBounds => write!(f, "region out of bounds"),
            Self::EmptyPyramid => write!(f, "pyramid has no levels"),
        }
    }
}

impl std::error::Error for Error {}
