//! Commit-message buffers and the context that hands them out.

use std::{
   cell::RefCell,
   io::ErrorKind,
   path::{Path, PathBuf},
   rc::Rc,
};

use crate::error::{CommitGenError, Result};

/// Shared handle to an open buffer
pub type SharedBuffer = Rc<RefCell<dyn MessageBuffer>>;

/// An editable commit message with a cursor.
///
/// Positions are byte offsets into [`MessageBuffer::text`] and always sit on
/// a char boundary.
pub trait MessageBuffer {
   fn text(&self) -> &str;

   fn point(&self) -> usize;

   /// Move the cursor, clamping to the buffer and to a char boundary
   fn set_point(&mut self, point: usize);

   /// Insert at the cursor and leave the cursor after the inserted text
   fn insert(&mut self, text: &str);

   /// Persist the contents, if the buffer is backed by something
   fn save(&mut self) -> Result<()> {
      Ok(())
   }
}

/// Returns the buffer of the commit currently being edited, if any.
pub trait CommitContext {
   /// `Ok(None)` when no commit is in progress; `Err` when there is one but
   /// its buffer can't be opened
   fn active_buffer(&self) -> Result<Option<SharedBuffer>>;
}

/// Run `f` and restore the cursor afterwards.
///
/// The saved position behaves like a marker for text inserted before it: a
/// cursor at the very start stays there, any other cursor moves with the
/// text it was pointing at.
pub fn save_excursion<B, T>(buffer: &mut B, f: impl FnOnce(&mut B) -> T) -> T
where
   B: MessageBuffer + ?Sized,
{
   let saved_point = buffer.point();
   let saved_len = buffer.text().len();

   let result = f(buffer);

   let restored = if saved_point == 0 {
      0
   } else {
      (saved_point + buffer.text().len()).saturating_sub(saved_len)
   };
   buffer.set_point(restored);
   result
}

/// In-memory buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBuffer {
   text:  String,
   point: usize,
}

impl MemoryBuffer {
   pub fn new(text: impl Into<String>) -> Self {
      Self { text: text.into(), point: 0 }
   }
}

impl MessageBuffer for MemoryBuffer {
   fn text(&self) -> &str {
      &self.text
   }

   fn point(&self) -> usize {
      self.point
   }

   fn set_point(&mut self, point: usize) {
      let mut point = point.min(self.text.len());
      while !self.text.is_char_boundary(point) {
         point -= 1;
      }
      self.point = point;
   }

   fn insert(&mut self, text: &str) {
      self.text.insert_str(self.point, text);
      self.point += text.len();
   }
}

/// Buffer backed by a commit message file such as `.git/COMMIT_EDITMSG`
#[derive(Debug)]
pub struct FileBuffer {
   path:  PathBuf,
   inner: MemoryBuffer,
}

impl FileBuffer {
   pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
      let path = path.into();
      let bytes = std::fs::read(&path)?;
      let text = String::from_utf8(bytes).map_err(|_| {
         CommitGenError::UserInput(format!(
            "{} is not valid UTF-8 (check i18n.commitEncoding)",
            path.display()
         ))
      })?;
      Ok(Self { path, inner: MemoryBuffer::new(text) })
   }

   pub fn path(&self) -> &Path {
      &self.path
   }
}

impl MessageBuffer for FileBuffer {
   fn text(&self) -> &str {
      self.inner.text()
   }

   fn point(&self) -> usize {
      self.inner.point()
   }

   fn set_point(&mut self, point: usize) {
      self.inner.set_point(point);
   }

   fn insert(&mut self, text: &str) {
      self.inner.insert(text);
   }

   fn save(&mut self) -> Result<()> {
      std::fs::write(&self.path, self.inner.text())?;
      Ok(())
   }
}

/// Context for a message file handed over by git (hook argument or editor).
///
/// There is a commit in progress only when a path was given and the file
/// exists. A file that exists but can't be read is an error.
#[derive(Debug, Clone, Default)]
pub struct EditMsgContext {
   path: Option<PathBuf>,
}

impl EditMsgContext {
   pub fn new(path: Option<PathBuf>) -> Self {
      Self { path }
   }
}

impl CommitContext for EditMsgContext {
   fn active_buffer(&self) -> Result<Option<SharedBuffer>> {
      let Some(path) = self.path.as_ref() else {
         return Ok(None);
      };

      match FileBuffer::open(path) {
         Ok(buffer) => Ok(Some(Rc::new(RefCell::new(buffer)))),
         Err(CommitGenError::IoError(err)) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no commit message file");
            Ok(None)
         },
         Err(err) => Err(err),
      }
   }
}
