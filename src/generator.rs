//! Diff → language model → wrapped commit message.

use std::rc::Rc;

use crate::{
   error::Result,
   format::{clean_response, wrap_message},
   git::DiffSource,
   llm::LlmRequest,
   prompts::Prompt,
};

/// The settings generation depends on, passed in explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
   pub prompt:       Prompt,
   pub column_width: usize,
}

impl Default for GeneratorConfig {
   fn default() -> Self {
      Self { prompt: Prompt::ConventionalCommits, column_width: 72 }
   }
}

pub struct CommitMessageGenerator {
   llm:    Rc<dyn LlmRequest>,
   config: GeneratorConfig,
}

impl CommitMessageGenerator {
   pub fn new(llm: Rc<dyn LlmRequest>, config: GeneratorConfig) -> Self {
      Self { llm, config }
   }

   /// Issue one request for the current diff using `prompt_text` as the system
   /// prompt.
   ///
   /// The diff is read before returning; a failure there is returned and no
   /// request is made. When the model answers, the response is cleaned and
   /// wrapped, then passed to `on_complete` exactly once. Request failures are
   /// left to the [`LlmRequest`] implementation.
   pub fn generate<D, F>(&self, diff_source: &D, prompt_text: &str, on_complete: F) -> Result<()>
   where
      D: DiffSource + ?Sized,
      F: FnOnce(String) + 'static,
   {
      let diff = diff_source.staged_diff()?;
      let column_width = self.config.column_width;

      tracing::debug!(diff_len = diff.len(), column_width, "requesting commit message");

      self.llm.request(
         diff,
         prompt_text.to_string(),
         Box::new(move |raw| {
            let message = wrap_message(&clean_response(&raw), column_width);
            on_complete(message);
         }),
      );
      Ok(())
   }

   /// [`Self::generate`] with the configured prompt
   pub fn generate_active<D, F>(&self, diff_source: &D, on_complete: F) -> Result<()>
   where
      D: DiffSource + ?Sized,
      F: FnOnce(String) + 'static,
   {
      let prompt_text = self.config.prompt.system_prompt(self.config.column_width)?;
      self.generate(diff_source, &prompt_text, on_complete)
   }
}
