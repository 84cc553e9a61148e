use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid bbox: {0}")]
    Bbox(String),
    #[error("baseline_end cannot be earlier than baseline_start")]
    BaselineOrder,
    #[error("color_min must be lower than color_max")]
    ColorRange,
    #[error("contour_step must be a positive number")]
    ContourStep,
    #[error("fps must be greater than 0")]
    Fps,
}
