use settings::SettingsError;
use shared::TransportError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("world bounds {width}x{height} must be finite and positive")]
    InvalidBounds { width: f32, height: f32 },
    #[error("spawn box {width}x{height} must be finite and positive")]
    InvalidBoxSize { width: f32, height: f32 },
    #[error("placed {placed} of {requested} entities before running out of {attempts} attempts")]
    Exhausted {
        placed: usize,
        requested: usize,
        attempts: usize,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
