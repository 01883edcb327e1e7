//! Remote service adapters for MediBridge.
//!
//! Typed request/response wrappers around the translation engine, the
//! summarization engine, and the audio blob store. Each adapter is an
//! async trait with an HTTP implementation; clients are constructed from
//! explicit configuration so tests can substitute fakes without touching
//! process-wide environment state.

pub mod blob;
pub mod completion;
pub mod error;
pub mod translation;

pub use blob::{BlobStore, BucketClient};
pub use completion::{CompletionEngine, CompletionParams, MistralClient};
pub use error::EngineError;
pub use translation::{DeepLClient, TargetLanguage, Translation, TranslationEngine};
