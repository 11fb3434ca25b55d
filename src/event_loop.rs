//! Single-threaded callback loop on a tokio current-thread runtime.
//!
//! Blocking work (HTTP requests) runs on tokio's blocking pool; the matching
//! callback runs as a local task on the thread that owns the loop, in
//! completion order. Callbacks therefore don't need to be `Send` and may
//! capture `Rc<RefCell<_>>` state such as an open message buffer.

use std::{cell::Cell, rc::Rc};

use tokio::{
   runtime::{Builder, Runtime},
   sync::Notify,
   task::LocalSet,
};

use crate::error::{CommitGenError, Result};

pub struct EventLoop {
   runtime:   Runtime,
   local:     LocalSet,
   pending:   Rc<Cell<usize>>,
   /// Signalled every time a callback finished
   completed: Rc<Notify>,
}

impl EventLoop {
   pub fn new() -> Result<Self> {
      let runtime = Builder::new_current_thread().enable_all().build()?;
      Ok(Self {
         runtime,
         local: LocalSet::new(),
         pending: Rc::new(Cell::new(0)),
         completed: Rc::new(Notify::new()),
      })
   }

   /// Run `job` on the blocking pool and invoke `callback` with its result on
   /// the loop thread during a later [`EventLoop::run`].
   pub fn spawn<J, C>(&self, job: J, callback: C)
   where
      J: FnOnce() -> Result<String> + Send + 'static,
      C: FnOnce(Result<String>) + 'static,
   {
      self.pending.set(self.pending.get() + 1);
      let pending = Rc::clone(&self.pending);
      let completed = Rc::clone(&self.completed);

      self.local.spawn_local(async move {
         let result = tokio::task::spawn_blocking(job)
            .await
            .unwrap_or_else(|err| {
               Err(CommitGenError::Other(format!("background request failed: {err}")))
            });

         tracing::debug!(ok = result.is_ok(), "dispatching completion");
         callback(result);

         // Decrement after the callback so work it spawned keeps the loop alive
         pending.set(pending.get() - 1);
         completed.notify_one();
      });

      tracing::debug!(pending = self.pending.get(), "spawned background job");
   }

   /// Number of jobs whose callbacks have not run yet
   pub fn pending(&self) -> usize {
      self.pending.get()
   }

   /// Dispatch completions until no work is pending. Callbacks may spawn more
   /// work; the loop keeps running until that completes too.
   pub fn run(&self) {
      self.runtime.block_on(self.local.run_until(async {
         while self.pending.get() > 0 {
            self.completed.notified().await;
         }
      }));
   }
}
