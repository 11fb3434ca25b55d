//! Commit message generator library
//!
//! Sends the staged diff with a selected system prompt to an
//! OpenAI-compatible chat API, wraps the answer to a column width and either
//! inserts it into the message of a commit being edited or creates a commit
//! with it.
pub mod actions;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod format;
pub mod generator;
pub mod git;
pub mod install;
pub mod llm;
pub mod notify;
pub mod prompts;
pub mod style;
pub mod types;

// Re-export commonly used types
pub use config::CommitConfig;
pub use error::{CommitGenError, Result};
pub use format::wrap_message;
pub use generator::{CommitMessageGenerator, GeneratorConfig};
pub use prompts::Prompt;
