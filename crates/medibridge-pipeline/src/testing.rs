//! Engine test doubles shared by the service tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use medibridge_engines::{
    BlobStore, CompletionEngine, CompletionParams, EngineError, TargetLanguage, Translation,
    TranslationEngine,
};

/// Translation engine that bracket-tags the input instead of translating it.
pub struct FakeTranslator {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationEngine for FakeTranslator {
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        _source_lang: Option<&str>,
    ) -> Result<Translation, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EngineError::Api {
                status: 503,
                body: "engine down".to_string(),
            });
        }
        Ok(Translation {
            translated_text: format!("[{}] {}", target_lang, text),
            detected_language: Some("EN".to_string()),
        })
    }

    async fn target_languages(&self) -> Result<Vec<TargetLanguage>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EngineError::Http("connection refused".to_string()));
        }
        Ok(vec![
            TargetLanguage {
                code: "ES".to_string(),
                name: "Spanish".to_string(),
            },
            TargetLanguage {
                code: "FR".to_string(),
                name: "French".to_string(),
            },
        ])
    }
}

/// Completion engine that returns a canned response.
pub struct FakeCompletion {
    pub calls: AtomicUsize,
    pub response: Option<String>,
}

impl FakeCompletion {
    pub fn returning(response: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: None,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionEngine for FakeCompletion {
    async fn complete(
        &self,
        _prompt: &str,
        _params: CompletionParams,
    ) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(EngineError::Api {
                status: 500,
                body: "model error".to_string(),
            }),
        }
    }
}

/// Blob store that records uploads and returns a deterministic URL.
pub struct FakeBlobStore {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EngineError::Http("upload interrupted".to_string()));
        }
        Ok(format!("https://blobs.test/{}", key))
    }
}
