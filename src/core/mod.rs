pub mod completion;
pub mod config;
pub mod error;
pub mod git;
pub mod hosting;
pub mod manifest;
pub mod notifier;
pub mod orchestrator;
pub mod reconciler;
pub mod synthesizer;
pub mod types;

pub use error::AppError;
pub use types::{ErrorCategory, ErrorSeverity, Strategy};
