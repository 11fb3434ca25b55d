//! The two user-facing actions: fill in the message of a commit being edited,
//! or create a new commit with a generated message.
//!
//! Completions act on their own target in the order they arrive. Triggering
//! generation twice for one buffer inserts both messages, the one that
//! completed last ending up on top.

use std::rc::Rc;

use crate::{
   buffer::{CommitContext, save_excursion},
   error::{CommitGenError, Result},
   generator::CommitMessageGenerator,
   git::{CommitCreator, DiffSource},
   notify::Notifier,
};

pub const GENERATING: &str = "Generating commit message...";

pub struct ActionDispatcher {
   generator:   CommitMessageGenerator,
   diff_source: Rc<dyn DiffSource>,
   notifier:    Rc<dyn Notifier>,
}

impl ActionDispatcher {
   pub fn new(
      generator: CommitMessageGenerator,
      diff_source: Rc<dyn DiffSource>,
      notifier: Rc<dyn Notifier>,
   ) -> Self {
      Self { generator, diff_source, notifier }
   }

   /// Generate a message and insert it at the start of the active commit
   /// buffer, keeping the cursor where it was.
   ///
   /// Fails with "no commit in progress" before any request when `context`
   /// has no buffer.
   pub fn insert_into_buffer(&self, context: &dyn CommitContext) -> Result<()> {
      let buffer = context
         .active_buffer()?
         .ok_or_else(CommitGenError::no_commit_in_progress)?;

      self.notifier.message(GENERATING);
      let notifier = Rc::clone(&self.notifier);

      self.generator.generate_active(&*self.diff_source, move |message| {
         let mut buffer = buffer.borrow_mut();

         save_excursion(&mut *buffer, |b| {
            let separator = if b.text().is_empty() || message.ends_with('\n') {
               ""
            } else {
               "\n"
            };
            b.set_point(0);
            b.insert(&format!("{message}{separator}"));
         });

         if let Err(err) = buffer.save() {
            notifier.error(&err);
            return;
         }
         notifier.generated(&message);
      })
   }

   /// Generate a message and create a commit with it, passing `args` through
   /// to the commit creator followed by `--message <msg> --edit`.
   pub fn create_commit(&self, creator: Rc<dyn CommitCreator>, args: Vec<String>) -> Result<()> {
      self.notifier.message(GENERATING);
      let notifier = Rc::clone(&self.notifier);

      self.generator.generate_active(&*self.diff_source, move |message| {
         notifier.generated(&message);

         let mut commit_args = args;
         commit_args.extend(["--message".to_string(), message, "--edit".to_string()]);

         if let Err(err) = creator.create_commit(&commit_args) {
            notifier.error(&err);
         }
      })
   }
}

#[cfg(test)]
mod tests {
   use std::cell::RefCell;

   use super::*;
   use crate::{
      buffer::{MemoryBuffer, MessageBuffer, SharedBuffer},
      generator::{GeneratorConfig, tests::FakeLlm},
      llm::LlmRequest,
      notify::tests::RecordingNotifier,
      prompts::Prompt,
   };

   struct StaticContext(Option<SharedBuffer>);

   impl CommitContext for StaticContext {
      fn active_buffer(&self) -> Result<Option<SharedBuffer>> {
         Ok(self.0.clone())
      }
   }

   /// Commit in progress whose message can't be opened
   struct BrokenContext;

   impl CommitContext for BrokenContext {
      fn active_buffer(&self) -> Result<Option<SharedBuffer>> {
         Err(CommitGenError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
         )))
      }
   }

   #[derive(Default)]
   struct RecordingCreator {
      calls: RefCell<Vec<Vec<String>>>,
      fail:  bool,
   }

   impl CommitCreator for RecordingCreator {
      fn create_commit(&self, args: &[String]) -> Result<()> {
         self.calls.borrow_mut().push(args.to_vec());
         if self.fail {
            return Err(CommitGenError::GitError("hook rejected commit".to_string()));
         }
         Ok(())
      }
   }

   /// Buffer whose storage is read-only
   struct ReadOnlyBuffer(MemoryBuffer);

   impl MessageBuffer for ReadOnlyBuffer {
      fn text(&self) -> &str {
         self.0.text()
      }

      fn point(&self) -> usize {
         self.0.point()
      }

      fn set_point(&mut self, point: usize) {
         self.0.set_point(point);
      }

      fn insert(&mut self, text: &str) {
         self.0.insert(text);
      }

      fn save(&mut self) -> Result<()> {
         Err(CommitGenError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
         )))
      }
   }

   struct Harness {
      llm:        Rc<FakeLlm>,
      notifier:   Rc<RecordingNotifier>,
      dispatcher: ActionDispatcher,
   }

   fn harness(column_width: usize) -> Harness {
      harness_with_diff(column_width, Rc::new(|| -> Result<String> {
         Ok("diff --git a/a.rs b/a.rs\n+// change\n".to_string())
      }))
   }

   fn harness_with_diff(column_width: usize, diff_source: Rc<dyn DiffSource>) -> Harness {
      let llm = Rc::new(FakeLlm::default());
      let notifier = Rc::new(RecordingNotifier::default());
      let generator = CommitMessageGenerator::new(
         Rc::clone(&llm) as Rc<dyn LlmRequest>,
         GeneratorConfig { prompt: Prompt::Custom("SYSTEM".to_string()), column_width },
      );
      let dispatcher =
         ActionDispatcher::new(generator, diff_source, Rc::clone(&notifier) as Rc<dyn Notifier>);
      Harness { llm, notifier, dispatcher }
   }

   fn shared(text: &str) -> SharedBuffer {
      Rc::new(RefCell::new(MemoryBuffer::new(text)))
   }

   // ========== insert_into_buffer Tests ==========

   #[test]
   fn test_insert_without_commit_fails_before_request() {
      let h = harness(72);
      let err = h
         .dispatcher
         .insert_into_buffer(&StaticContext(None))
         .unwrap_err();

      assert!(matches!(err, CommitGenError::UserInput(_)));
      assert_eq!(err.to_string(), "no commit in progress");
      assert_eq!(h.llm.request_count(), 0);
      assert!(h.notifier.messages().is_empty());
   }

   #[test]
   fn test_insert_unreadable_buffer_is_not_missing_commit() {
      let h = harness(72);
      let err = h.dispatcher.insert_into_buffer(&BrokenContext).unwrap_err();

      assert!(matches!(err, CommitGenError::IoError(_)));
      assert_ne!(err.to_string(), "no commit in progress");
      assert_eq!(h.llm.request_count(), 0);
      assert!(h.notifier.messages().is_empty());
   }

   #[test]
   fn test_insert_places_message_at_start() {
      let h = harness(72);
      let buffer = shared("\n# Please enter the commit message for your changes.\n");

      h.dispatcher
         .insert_into_buffer(&StaticContext(Some(Rc::clone(&buffer))))
         .unwrap();
      assert_eq!(h.notifier.messages(), vec![GENERATING]);
      assert!(h.notifier.generated_messages().is_empty());

      h.llm.complete(0, "fix: corrected off-by-one in loop bound");

      assert_eq!(
         buffer.borrow().text(),
         "fix: corrected off-by-one in loop bound\n\n# Please enter the commit message for your \
          changes.\n"
      );
      assert_eq!(buffer.borrow().point(), 0);
      assert_eq!(h.notifier.generated_messages(), vec!["fix: corrected off-by-one in loop bound"]);
   }

   #[test]
   fn test_insert_wraps_message() {
      let h = harness(20);
      let buffer = shared("");

      h.dispatcher
         .insert_into_buffer(&StaticContext(Some(Rc::clone(&buffer))))
         .unwrap();
      h.llm
         .complete(0, "Fix bug\n\nThis change fixes the thing that was broken because of an off");

      let text = buffer.borrow().text().to_string();
      assert!(text.starts_with("Fix bug\n\n"));
      assert!(text.lines().all(|l| l.chars().count() <= 20));
   }

   #[test]
   fn test_insert_restores_cursor() {
      let h = harness(72);
      let buffer = shared("\n# comment");
      buffer.borrow_mut().set_point(3);

      h.dispatcher
         .insert_into_buffer(&StaticContext(Some(Rc::clone(&buffer))))
         .unwrap();
      h.llm.complete(0, "docs: updated readme");

      let buffer = buffer.borrow();
      let inserted = "docs: updated readme\n".len();
      assert_eq!(buffer.point(), 3 + inserted);
      assert_eq!(&buffer.text()[buffer.point()..], "comment");
   }

   #[test]
   fn test_insert_twice_last_completion_on_top() {
      let h = harness(72);
      let buffer = shared("\n# template");
      let context = StaticContext(Some(Rc::clone(&buffer)));

      h.dispatcher.insert_into_buffer(&context).unwrap();
      h.dispatcher.insert_into_buffer(&context).unwrap();
      assert_eq!(h.llm.request_count(), 2);

      h.llm.complete(1, "feat: second request");
      h.llm.complete(0, "feat: first request");

      assert_eq!(
         buffer.borrow().text(),
         "feat: first request\nfeat: second request\n\n# template"
      );
   }

   #[test]
   fn test_insert_save_failure_reported() {
      let h = harness(72);
      let buffer: SharedBuffer =
         Rc::new(RefCell::new(ReadOnlyBuffer(MemoryBuffer::new("# template"))));

      h.dispatcher
         .insert_into_buffer(&StaticContext(Some(buffer)))
         .unwrap();
      h.llm.complete(0, "fix: thing");

      assert_eq!(h.notifier.errors().len(), 1);
      assert!(h.notifier.errors()[0].contains("read-only"));
      assert!(h.notifier.generated_messages().is_empty());
   }

   #[test]
   fn test_insert_diff_failure_propagates() {
      let h = harness_with_diff(
         72,
         Rc::new(|| -> Result<String> {
            Err(CommitGenError::NoChanges { mode: "staged changes".to_string() })
         }),
      );
      let buffer = shared("");

      let err = h
         .dispatcher
         .insert_into_buffer(&StaticContext(Some(buffer)))
         .unwrap_err();
      assert!(matches!(err, CommitGenError::NoChanges { .. }));
      assert_eq!(h.llm.request_count(), 0);
   }

   // ========== create_commit Tests ==========

   #[test]
   fn test_create_commit_passes_args_and_message() {
      let h = harness(72);
      let creator = Rc::new(RecordingCreator::default());

      h.dispatcher
         .create_commit(Rc::clone(&creator) as Rc<dyn CommitCreator>, vec![
            "--allow-empty".to_string(),
            "--gpg-sign".to_string(),
         ])
         .unwrap();
      assert_eq!(h.notifier.messages(), vec![GENERATING]);
      assert!(creator.calls.borrow().is_empty());

      h.llm.complete(0, "chore: bumped version");

      assert_eq!(*creator.calls.borrow(), vec![vec![
         "--allow-empty",
         "--gpg-sign",
         "--message",
         "chore: bumped version",
         "--edit",
      ]]);
      assert_eq!(h.notifier.generated_messages(), vec!["chore: bumped version"]);
   }

   #[test]
   fn test_two_rapid_commits_follow_completion_order() {
      let h = harness(72);
      let creator = Rc::new(RecordingCreator::default());

      h.dispatcher
         .create_commit(Rc::clone(&creator) as Rc<dyn CommitCreator>, Vec::new())
         .unwrap();
      h.dispatcher
         .create_commit(Rc::clone(&creator) as Rc<dyn CommitCreator>, Vec::new())
         .unwrap();
      assert_eq!(h.llm.request_count(), 2);

      h.llm.complete(1, "fix: from second invocation");
      h.llm.complete(0, "fix: from first invocation");

      let calls = creator.calls.borrow();
      assert_eq!(calls.len(), 2);
      assert_eq!(calls[0], vec!["--message", "fix: from second invocation", "--edit"]);
      assert_eq!(calls[1], vec!["--message", "fix: from first invocation", "--edit"]);
   }

   #[test]
   fn test_create_commit_failure_reported() {
      let h = harness(72);
      let creator = Rc::new(RecordingCreator { fail: true, ..Default::default() });

      h.dispatcher
         .create_commit(Rc::clone(&creator) as Rc<dyn CommitCreator>, Vec::new())
         .unwrap();
      h.llm.complete(0, "fix: thing");

      assert_eq!(h.notifier.errors(), vec!["Git command failed: hook rejected commit"]);
   }

   #[test]
   fn test_create_commit_request_failure_creates_nothing() {
      let h = harness(72);
      let creator = Rc::new(RecordingCreator::default());

      h.dispatcher
         .create_commit(Rc::clone(&creator) as Rc<dyn CommitCreator>, Vec::new())
         .unwrap();
      h.llm.fail(0, &*h.notifier, &CommitGenError::EmptyResponse);

      assert!(creator.calls.borrow().is_empty());
      assert_eq!(h.notifier.errors().len(), 1);
   }
}
