pub mod config;
pub mod error;
pub mod types;

pub use config::MediBridgeConfig;
pub use error::{MediBridgeError, Result};
pub use types::*;
