//! System prompts that steer the style of the generated message.
//!
//! Built-in prompts are embedded in the binary and can be overridden per user
//! by dropping a file with the same name into
//! `~/.config/diffscribe/prompts/`. They are rendered with Tera so that they
//! can refer to `{{ column_width }}`. Custom prompt text is used verbatim.

use std::{
   fmt,
   path::{Path, PathBuf},
   str::FromStr,
};

use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::{
   config::CommitConfig,
   error::{CommitGenError, Result},
};

/// Embedded prompts folder (compiled into binary)
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct BuiltinPrompts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
   /// Strict `type(scope): description` messages
   ConventionalCommits,
   /// Conventional git style without a type prefix
   FreeForm,
   /// User-supplied system prompt
   Custom(String),
}

impl Prompt {
   pub const BUILTIN: [Self; 2] = [Self::ConventionalCommits, Self::FreeForm];

   pub fn name(&self) -> &str {
      match self {
         Self::ConventionalCommits => "conventional-commits",
         Self::FreeForm => "free-form",
         Self::Custom(_) => "custom",
      }
   }

   /// Render the system prompt text for the given wrap column
   pub fn system_prompt(&self, column_width: usize) -> Result<String> {
      self.render(user_prompts_dir().as_deref(), column_width)
   }

   fn render(&self, override_dir: Option<&Path>, column_width: usize) -> Result<String> {
      let template = match self {
         Self::Custom(text) => return Ok(text.clone()),
         builtin => load_template(builtin.name(), override_dir)?,
      };

      let mut context = Context::new();
      context.insert("column_width", &column_width);

      Tera::one_off(&template, &context, false).map_err(|e| {
         CommitGenError::Template(format!("failed to render prompt '{}': {e}", self.name()))
      })
   }
}

impl FromStr for Prompt {
   type Err = CommitGenError;

   fn from_str(s: &str) -> Result<Self> {
      Self::BUILTIN
         .into_iter()
         .find(|p| p.name() == s.trim())
         .ok_or_else(|| {
            CommitGenError::Config(format!(
               "unknown prompt '{s}' (expected one of: {})",
               Self::BUILTIN.map(|p| p.name().to_string()).join(", ")
            ))
         })
   }
}

/// Plain listing of the built-in prompts for stdout, marking `active`
pub fn listing(active: Option<&Prompt>) -> Vec<String> {
   let mut lines: Vec<String> = Prompt::BUILTIN
      .iter()
      .map(|prompt| {
         if active == Some(prompt) {
            format!("{prompt} (active)")
         } else {
            prompt.to_string()
         }
      })
      .collect();

   if let Some(custom @ Prompt::Custom(_)) = active {
      lines.push(format!("{custom} (active, from config)"));
   }
   lines
}

impl fmt::Display for Prompt {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.name())
   }
}

/// Determine user prompts directory (~/.config/diffscribe/prompts/) if a home
/// dir exists.
fn user_prompts_dir() -> Option<PathBuf> {
   CommitConfig::config_dir().ok().map(|dir| dir.join("prompts"))
}

/// Load template content, preferring a user override over the embedded copy
fn load_template(name: &str, override_dir: Option<&Path>) -> Result<String> {
   if let Some(dir) = override_dir {
      let path = dir.join(format!("{name}.md"));
      if path.exists() {
         tracing::debug!(path = %path.display(), "using prompt override");
         return std::fs::read_to_string(&path).map_err(|e| {
            CommitGenError::Template(format!("failed to read {}: {e}", path.display()))
         });
      }
   }

   let key = format!("{name}.md");
   let file = BuiltinPrompts::get(&key)
      .ok_or_else(|| CommitGenError::Template(format!("no embedded prompt named '{name}'")))?;

   std::str::from_utf8(file.data.as_ref())
      .map(str::to_string)
      .map_err(|e| CommitGenError::Template(format!("embedded prompt {key} is not UTF-8: {e}")))
}
