/// Errors raised while building or querying the world.
#[derive(thiserror::Error, Debug)]
pub enum WorldError {
    #[error("terrain resolution must be at least 2x2 (got {resolution_x}x{resolution_z})")]
    ResolutionTooSmall { resolution_x: usize, resolution_z: usize },

    #[error("expected {expected} height samples, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("height query ({x}, {z}) outside {resolution_x}x{resolution_z} grid")]
    HeightQueryOutOfRange {
        x: usize,
        z: usize,
        resolution_x: usize,
        resolution_z: usize,
    },

    #[error("height image is {width}x{height}, terrain expects {resolution_x}x{resolution_z}")]
    ImageDimensionMismatch {
        width: u32,
        height: u32,
        resolution_x: usize,
        resolution_z: usize,
    },

    #[error("height image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, WorldError>;
