use thiserror::Error;

/// Errors surfaced by the terrain core. None of them terminate the host process.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("grid coordinate ({x}, {y}) is outside a {side}x{side} tile")]
    IndexOutOfBounds { x: usize, y: usize, side: usize },

    #[error("retained height {value} at ({x}, {y}) exceeds the ceiling of {ceiling}")]
    NumericOverflow {
        x: usize,
        y: usize,
        value: f64,
        ceiling: f64,
    },

    #[error("box counting produced {levels} level(s); at least 2 are needed for a slope")]
    InsufficientData { levels: usize },

    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),

    #[error("terrain export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preview export failed: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
