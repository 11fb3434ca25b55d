use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
   error::{CommitGenError, Result},
   generator::GeneratorConfig,
   prompts::Prompt,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
   /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
   pub api_base_url: String,

   /// Optional API key for authentication (overridden by `DIFFSCRIBE_API_KEY`
   /// or `OPENAI_API_KEY`)
   pub api_key: Option<String>,

   pub model:       String,
   pub temperature: f32,
   pub max_tokens:  u32,

   /// HTTP request timeout in seconds
   pub request_timeout_secs: u64,

   /// HTTP connection timeout in seconds
   pub connect_timeout_secs: u64,

   /// Built-in prompt name: `conventional-commits` or `free-form`
   pub prompt: String,

   /// Custom system prompt text; takes precedence over `prompt` when set
   pub custom_prompt: Option<String>,

   /// Column the generated message is wrapped at
   pub column_width: usize,

   /// Diffs longer than this many characters are truncated before sending
   pub max_diff_length: usize,
}

impl Default for CommitConfig {
   fn default() -> Self {
      Self {
         api_base_url:         "https://api.openai.com/v1".to_string(),
         api_key:              None,
         model:                "gpt-4o-mini".to_string(),
         temperature:          0.2, // Low temperature keeps messages close to the diff
         max_tokens:           1024,
         request_timeout_secs: 120,
         connect_timeout_secs: 30,
         prompt:               Prompt::ConventionalCommits.name().to_string(),
         custom_prompt:        None,
         column_width:         72,
         max_diff_length:      100_000,
      }
   }
}

impl CommitConfig {
   /// Load config from `DIFFSCRIBE_CONFIG` or the default location
   /// (~/.config/diffscribe/config.toml). Falls back to Default if the file
   /// doesn't exist. Environment variables override file values:
   /// - `DIFFSCRIBE_API_URL` overrides `api_base_url`
   /// - `DIFFSCRIBE_API_KEY` (then `OPENAI_API_KEY`) overrides `api_key`
   /// - `DIFFSCRIBE_MODEL` overrides `model`
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var("DIFFSCRIBE_CONFIG") {
         PathBuf::from(custom_path)
      } else {
         Self::default_config_path().unwrap_or_default()
      };

      if config_path.exists() {
         return Self::from_file(&config_path);
      }

      tracing::debug!(path = %config_path.display(), "no config file, using defaults");
      let mut config = Self::default();
      config.apply_env_overrides(|key| std::env::var(key).ok());
      config.validate()?;
      Ok(config)
   }

   /// Load config from specific file
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path).map_err(|e| {
         CommitGenError::Config(format!("failed to read {}: {e}", path.display()))
      })?;
      let mut config = Self::parse(&contents)?;
      config.apply_env_overrides(|key| std::env::var(key).ok());
      config.validate()?;

      tracing::debug!(path = %path.display(), "loaded config");
      Ok(config)
   }

   fn parse(contents: &str) -> Result<Self> {
      toml::from_str(contents).map_err(|e| CommitGenError::Config(format!("failed to parse: {e}")))
   }

   /// Apply environment overrides, reading variables through `lookup`
   fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
      if let Some(api_url) = lookup("DIFFSCRIBE_API_URL") {
         self.api_base_url = api_url;
      }

      if let Some(api_key) = lookup("DIFFSCRIBE_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
         self.api_key = Some(api_key);
      }

      if let Some(model) = lookup("DIFFSCRIBE_MODEL") {
         self.model = model;
      }
   }

   pub fn validate(&self) -> Result<()> {
      if self.column_width == 0 {
         return Err(CommitGenError::Config("column_width must be at least 1".to_string()));
      }
      if !(0.0..=2.0).contains(&self.temperature) {
         return Err(CommitGenError::Config(format!(
            "temperature {} out of range [0.0, 2.0]",
            self.temperature
         )));
      }
      self.active_prompt().map(|_| ())
   }

   /// The prompt selected by this config
   pub fn active_prompt(&self) -> Result<Prompt> {
      match self.custom_prompt {
         Some(ref text) if !text.trim().is_empty() => Ok(Prompt::Custom(text.clone())),
         _ => self.prompt.parse(),
      }
   }

   /// Extract the settings the generator needs
   pub fn generator_config(&self) -> Result<GeneratorConfig> {
      Ok(GeneratorConfig { prompt: self.active_prompt()?, column_width: self.column_width })
   }

   /// Get the config directory (platform-safe).
   /// Tries HOME (Unix/Linux/macOS) then USERPROFILE (Windows)
   pub fn config_dir() -> Result<PathBuf> {
      std::env::var("HOME")
         .or_else(|_| std::env::var("USERPROFILE"))
         .map(|home| PathBuf::from(home).join(".config").join("diffscribe"))
         .map_err(|_| {
            CommitGenError::Other("No home directory found (tried HOME and USERPROFILE)".to_string())
         })
   }

   pub fn default_config_path() -> Result<PathBuf> {
      Self::config_dir().map(|dir| dir.join("config.toml"))
   }
}
