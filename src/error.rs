use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommitGenError {
   /// Local precondition failed before any request was issued
   #[error("{0}")]
   UserInput(String),

   #[error("Git command failed: {0}")]
   GitError(String),

   #[error("No changes found in {mode}")]
   NoChanges { mode: String },

   #[error("API request failed (HTTP {status}): {body}")]
   ApiError { status: u16, body: String },

   #[error("API returned an empty response")]
   EmptyResponse,

   #[error("HTTP error: {0}")]
   HttpError(#[from] reqwest::Error),

   #[error("Invalid configuration: {0}")]
   Config(String),

   #[error("Prompt template error: {0}")]
   Template(String),

   #[error("A prepare-commit-msg hook already exists at {}; use --force to replace it", .0.display())]
   HookExists(PathBuf),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   JsonError(#[from] serde_json::Error),

   #[error("{0}")]
   Other(String),
}

impl CommitGenError {
   pub fn no_commit_in_progress() -> Self {
      Self::UserInput("no commit in progress".to_string())
   }
}

pub type Result<T> = std::result::Result<T, CommitGenError>;
