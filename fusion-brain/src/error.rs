use crate::GenerationStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("no TEXT2IMAGE pipelines available")]
    NoPipelines,
    #[error(
        "generation failed with status {status}{}",
        .description.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
    )]
    GenerationFailed {
        status: GenerationStatus,
        description: Option<String>,
    },
    #[error("generation {uuid} still pending after {attempts} status checks")]
    Timeout { uuid: String, attempts: u32 },
    #[error("generation finished without any image")]
    NoImages,
}
