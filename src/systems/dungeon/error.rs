use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Triangulation failed: {reason}")]
    TriangulationFailed { reason: String },

    #[error("Rooms did not settle within {ticks} physics ticks")]
    SettleTimeout { ticks: u32 },
}

pub type GenerationResult<T> = Result<T, GenerationError>;
