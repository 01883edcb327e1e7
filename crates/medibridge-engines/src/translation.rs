//! Translation engine adapter.
//!
//! The `TranslationEngine` trait is the contract the pipeline consumes;
//! `DeepLClient` is the HTTP implementation against a DeepL-compatible
//! REST API. Language detection is delegated to the engine when no source
//! language is given, and the detected code is surfaced so callers can
//! show "translated from X".

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use medibridge_core::config::TranslationConfig;

use crate::error::EngineError;

/// One translated utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub translated_text: String,
    /// Source language the engine detected, when detection ran.
    pub detected_language: Option<String>,
}

/// A language the engine can translate into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLanguage {
    pub code: String,
    pub name: String,
}

/// Contract for a remote translation engine.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate `text` into `target_lang`. A `None` source language asks
    /// the engine to detect it.
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<Translation, EngineError>;

    /// List the languages the engine can translate into.
    async fn target_languages(&self) -> Result<Vec<TargetLanguage>, EngineError>;
}

// ---------------------------------------------------------------------------
// DeepL wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
    detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct DeepLLanguage {
    language: String,
    name: String,
}

/// HTTP client for a DeepL-compatible translation API.
pub struct DeepLClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DeepLClient {
    /// Build a client from configuration.
    ///
    /// Fails if the API key is empty; callers decide up front whether the
    /// engine exists at all, so a constructed client is always usable.
    pub fn new(config: &TranslationConfig) -> Result<Self, EngineError> {
        if config.api_key.trim().is_empty() {
            return Err(EngineError::Config("translation api_key is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }
}

#[async_trait]
impl TranslationEngine for DeepLClient {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<Translation, EngineError> {
        let url = format!("{}/v2/translate", self.base_url);

        let mut form: Vec<(&str, &str)> = vec![
            ("text", text),
            ("target_lang", target_lang),
            ("preserve_formatting", "1"),
        ];
        if let Some(source) = source_lang {
            form.push(("source_lang", source));
        }

        debug!(target_lang, "Calling translation engine");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth_header())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: DeepLResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        let first = parsed
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Decode("empty translations array".into()))?;

        Ok(Translation {
            translated_text: first.text,
            detected_language: first.detected_source_language,
        })
    }

    async fn target_languages(&self) -> Result<Vec<TargetLanguage>, EngineError> {
        let url = format!("{}/v2/languages", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.auth_header())
            .query(&[("type", "target")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Vec<DeepLLanguage> = response
            .json()
            .await
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        Ok(parsed
            .into_iter()
            .map(|l| TargetLanguage {
                code: l.language,
                name: l.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> TranslationConfig {
        TranslationConfig {
            api_key: api_key.to_string(),
            base_url: "https://api.deepl.com/".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let result = DeepLClient::new(&config(""));
        assert!(matches!(result, Err(EngineError::Config(_))));

        let result = DeepLClient::new(&config("   "));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = DeepLClient::new(&config("key")).unwrap();
        assert_eq!(client.base_url, "https://api.deepl.com");
    }

    #[test]
    fn test_auth_header_format() {
        let client = DeepLClient::new(&config("abc123")).unwrap();
        assert_eq!(client.auth_header(), "DeepL-Auth-Key abc123");
    }

    #[test]
    fn test_decode_translate_response() {
        let body = r#"{
            "translations": [
                {"detected_source_language": "EN", "text": "Tengo fiebre"}
            ]
        }"#;
        let parsed: DeepLResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.translations.len(), 1);
        assert_eq!(parsed.translations[0].text, "Tengo fiebre");
        assert_eq!(
            parsed.translations[0].detected_source_language.as_deref(),
            Some("EN")
        );
    }

    #[test]
    fn test_decode_translate_response_without_detection() {
        let body = r#"{"translations": [{"text": "Bonjour"}]}"#;
        let parsed: DeepLResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.translations[0].detected_source_language.is_none());
    }

    #[test]
    fn test_decode_languages_response() {
        let body = r#"[
            {"language": "ES", "name": "Spanish"},
            {"language": "FR", "name": "French"}
        ]"#;
        let parsed: Vec<DeepLLanguage> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].language, "ES");
        assert_eq!(parsed[1].name, "French");
    }
}
