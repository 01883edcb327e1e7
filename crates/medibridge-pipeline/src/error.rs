use medibridge_core::MediBridgeError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the conversation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conversation not found: {0}")]
    NotFound(Uuid),

    #[error("{0} service is not configured")]
    ServiceUnavailable(&'static str),

    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("audio upload failed: {0}")]
    UploadFailed(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl PipelineError {
    /// Whether retrying the same call could plausibly succeed. Input
    /// validation and missing credentials never heal on retry; remote
    /// engine failures might.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::TranslationFailed(_)
                | PipelineError::SummarizationFailed(_)
                | PipelineError::UploadFailed(_)
        )
    }
}

impl From<MediBridgeError> for PipelineError {
    fn from(err: MediBridgeError) -> Self {
        PipelineError::Storage(err.to_string())
    }
}
