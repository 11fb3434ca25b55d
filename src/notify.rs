//! User-facing status and error reporting.

use std::cell::Cell;

use crate::{error::CommitGenError, style};

/// Where status lines and asynchronous failures are reported.
pub trait Notifier {
   /// Short status line
   fn message(&self, text: &str);

   /// A failure that happened after the command returned (request errors,
   /// buffer writes, commit creation)
   fn error(&self, err: &CommitGenError);

   /// Echo a finished commit message
   fn generated(&self, message: &str) {
      self.message(message);
   }
}

/// Prints to stderr, keeping stdout free for `diffscribe message`.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
   errors: Cell<usize>,
}

impl TerminalNotifier {
   pub fn new() -> Self {
      Self::default()
   }

   /// How many errors were reported so far
   pub fn error_count(&self) -> usize {
      self.errors.get()
   }
}

impl Notifier for TerminalNotifier {
   fn message(&self, text: &str) {
      style::print_info(text);
   }

   fn error(&self, err: &CommitGenError) {
      self.errors.set(self.errors.get() + 1);
      tracing::debug!(error = ?err, "reported error");
      eprintln!("{} {}", style::error(style::icons::ERROR), style::error(&err.to_string()));
   }

   fn generated(&self, message: &str) {
      let width = style::term_width().min(80);
      eprintln!("{}", style::boxed_message("Generated commit message", message, width));
   }
}

#[cfg(test)]
pub mod tests {
   use std::cell::RefCell;

   use super::*;

   /// Collects everything it is told, for assertions
   #[derive(Debug, Default)]
   pub struct RecordingNotifier {
      messages:  RefCell<Vec<String>>,
      errors:    RefCell<Vec<String>>,
      generated: RefCell<Vec<String>>,
   }

   impl RecordingNotifier {
      pub fn messages(&self) -> Vec<String> {
         self.messages.borrow().clone()
      }

      pub fn errors(&self) -> Vec<String> {
         self.errors.borrow().clone()
      }

      pub fn generated_messages(&self) -> Vec<String> {
         self.generated.borrow().clone()
      }
   }

   impl Notifier for RecordingNotifier {
      fn message(&self, text: &str) {
         self.messages.borrow_mut().push(text.to_string());
      }

      fn error(&self, err: &CommitGenError) {
         self.errors.borrow_mut().push(err.to_string());
      }

      fn generated(&self, message: &str) {
         self.generated.borrow_mut().push(message.to_string());
      }
   }

   #[test]
   fn test_terminal_notifier_counts_errors() {
      let notifier = TerminalNotifier::new();
      assert_eq!(notifier.error_count(), 0);
      notifier.error(&CommitGenError::EmptyResponse);
      notifier.error(&CommitGenError::no_commit_in_progress());
      assert_eq!(notifier.error_count(), 2);
   }

   #[test]
   fn test_default_generated_uses_message() {
      struct Plain(RefCell<Vec<String>>);
      impl Notifier for Plain {
         fn message(&self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
         }

         fn error(&self, _err: &CommitGenError) {}
      }

      let plain = Plain(RefCell::new(Vec::new()));
      plain.generated("fix: thing");
      assert_eq!(*plain.0.borrow(), vec!["fix: thing"]);
   }
}
