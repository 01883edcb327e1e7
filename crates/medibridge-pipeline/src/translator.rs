//! Translation step of the message pipeline.

use std::sync::Arc;

use tracing::debug;

use medibridge_engines::{TargetLanguage, Translation, TranslationEngine};

use crate::error::PipelineError;

/// Wraps the remote translation engine with the pipeline's policy:
/// empty input never leaves the process, and a missing engine is a
/// configuration problem, not a translation failure.
pub struct TranslationService {
    engine: Option<Arc<dyn TranslationEngine>>,
}

impl TranslationService {
    pub fn new(engine: Option<Arc<dyn TranslationEngine>>) -> Self {
        Self { engine }
    }

    /// Translate `text` into `target_lang`.
    ///
    /// Whitespace-only input short-circuits to an empty translation without
    /// calling the engine; the engine would either waste quota or reject it.
    pub async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<Translation, PipelineError> {
        if target_lang.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "target language is required".to_string(),
            ));
        }

        if text.trim().is_empty() {
            debug!("skipping translation of empty input");
            return Ok(Translation {
                translated_text: String::new(),
                detected_language: source_lang.map(|s| s.to_string()),
            });
        }

        let engine = self
            .engine
            .as_ref()
            .ok_or(PipelineError::ServiceUnavailable("translation"))?;

        let translation = engine
            .translate(text, target_lang, source_lang)
            .await
            .map_err(|e| PipelineError::TranslationFailed(e.to_string()))?;

        debug!(
            target_lang,
            detected = translation.detected_language.as_deref().unwrap_or("-"),
            "translated utterance"
        );
        Ok(translation)
    }

    /// Languages the configured engine can translate into.
    pub async fn target_languages(&self) -> Result<Vec<TargetLanguage>, PipelineError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(PipelineError::ServiceUnavailable("translation"))?;

        engine
            .target_languages()
            .await
            .map_err(|e| PipelineError::TranslationFailed(e.to_string()))
    }
}
