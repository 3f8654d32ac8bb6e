use thiserror::Error;

/// Custom error types for the volsurf-viz library
#[derive(Error, Debug)]
pub enum VizError {
    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("{0}")]
    Other(String),
}

impl VizError {
    /// Plain-text message shown to end users in place of the detailed error.
    pub fn user_message(&self) -> &'static str {
        match self {
            VizError::MalformedGrid(_) => "Invalid volatility surface data.",
            VizError::FetchError(_) | VizError::ParseError(_) => {
                "Failed to fetch volatility surface data."
            }
            VizError::ConfigError(_) => "Invalid configuration.",
            VizError::RenderError(_) | VizError::ImageError(_) => {
                "Failed to render volatility surface."
            }
            _ => "Unexpected error.",
        }
    }
}

pub type Result<T> = std::result::Result<T, VizError>;
