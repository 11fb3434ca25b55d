use std::{rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
   config::CommitConfig,
   error::{CommitGenError, Result},
   event_loop::EventLoop,
   notify::Notifier,
};

/// One-shot continuation receiving the raw response text
pub type ResponseCallback = Box<dyn FnOnce(String)>;

/// Asynchronous language-model request.
///
/// Implementations call `on_response` exactly once when the request succeeds.
/// Failures are reported by the implementation itself and the callback is
/// dropped without being called; nothing is retried.
pub trait LlmRequest {
   fn request(&self, content: String, system_prompt: String, on_response: ResponseCallback);
}

#[derive(Debug, Serialize)]
struct Message {
   role:    &'static str,
   content: String,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
   model:       String,
   max_tokens:  u32,
   temperature: f32,
   messages:    Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
   #[serde(default)]
   choices: Vec<Choice>,
}

/// Chat-completions client for OpenAI-compatible APIs.
///
/// Requests run on an [`EventLoop`] worker; the response callback runs on the
/// loop thread. Errors go to the [`Notifier`].
pub struct ChatClient {
   client:      reqwest::blocking::Client,
   endpoint:    String,
   api_key:     Option<String>,
   model:       String,
   temperature: f32,
   max_tokens:  u32,
   event_loop:  Rc<EventLoop>,
   notifier:    Rc<dyn Notifier>,
}

impl ChatClient {
   pub fn new(
      config: &CommitConfig,
      event_loop: Rc<EventLoop>,
      notifier: Rc<dyn Notifier>,
   ) -> Result<Self> {
      let client = reqwest::blocking::Client::builder()
         .timeout(Duration::from_secs(config.request_timeout_secs))
         .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
         .build()?;

      Ok(Self {
         client,
         endpoint: chat_endpoint(&config.api_base_url),
         api_key: config.api_key.clone(),
         model: config.model.clone(),
         temperature: config.temperature,
         max_tokens: config.max_tokens,
         event_loop,
         notifier,
      })
   }

   fn build_request(&self, content: String, system_prompt: String) -> ApiRequest {
      ApiRequest {
         model:       self.model.clone(),
         max_tokens:  self.max_tokens,
         temperature: self.temperature,
         messages:    vec![
            Message { role: "system", content: system_prompt },
            Message { role: "user", content },
         ],
      }
   }
}

impl LlmRequest for ChatClient {
   fn request(&self, content: String, system_prompt: String, on_response: ResponseCallback) {
      let request = self.build_request(content, system_prompt);
      let client = self.client.clone();
      let endpoint = self.endpoint.clone();
      let api_key = self.api_key.clone();
      let notifier = Rc::clone(&self.notifier);

      tracing::debug!(model = %request.model, endpoint = %endpoint, "issuing chat request");

      self.event_loop.spawn(
         move || send_chat_request(&client, &endpoint, api_key.as_deref(), &request),
         move |result| match result {
            Ok(text) => on_response(text),
            Err(err) => notifier.error(&err),
         },
      );
   }
}

fn chat_endpoint(base_url: &str) -> String {
   format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn send_chat_request(
   client: &reqwest::blocking::Client,
   endpoint: &str,
   api_key: Option<&str>,
   request: &ApiRequest,
) -> Result<String> {
   let mut request_builder = client
      .post(endpoint)
      .header("content-type", "application/json");

   // Add Authorization header if API key is configured
   if let Some(api_key) = api_key {
      request_builder = request_builder.header("Authorization", format!("Bearer {api_key}"));
   }

   let response = request_builder.json(request).send()?;
   let status = response.status();
   let body = response.text()?;

   if !status.is_success() {
      return Err(CommitGenError::ApiError { status: status.as_u16(), body });
   }

   parse_response(&body)
}

/// Extract the first choice's message text from a chat-completions body
fn parse_response(body: &str) -> Result<String> {
   let response: ApiResponse = serde_json::from_str(body)?;

   response
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .filter(|content| !content.trim().is_empty())
      .ok_or(CommitGenError::EmptyResponse)
}
