use std::{
   path::{Path, PathBuf},
   process::Command,
};

use crate::error::{CommitGenError, Result};

/// Source of the diff a message is generated for.
pub trait DiffSource {
   fn staged_diff(&self) -> Result<String>;
}

impl<F> DiffSource for F
where
   F: Fn() -> Result<String>,
{
   fn staged_diff(&self) -> Result<String> {
      self()
   }
}

/// Creates commits from a list of `git commit` arguments.
pub trait CommitCreator {
   fn create_commit(&self, args: &[String]) -> Result<()>;
}

/// Run a git command in `dir` and return its stdout
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
   let output = Command::new("git")
      .args(args)
      .current_dir(dir)
      .output()
      .map_err(|e| CommitGenError::GitError(format!("Failed to run git {}: {e}", args.join(" "))))?;

   if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(CommitGenError::GitError(format!(
         "git {} failed: {}",
         args.join(" "),
         stderr.trim()
      )));
   }

   Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Resolve `name` inside the git directory of the repository at `dir`
/// (`git rev-parse --git-path`), so worktrees and `core.hooksPath` are
/// honoured. Relative results are joined onto `dir`.
pub fn git_path(dir: &Path, name: &str) -> Result<PathBuf> {
   let out = run_git(dir, &["rev-parse", "--git-path", name])?;
   let path = PathBuf::from(out.trim());
   Ok(if path.is_absolute() { path } else { dir.join(path) })
}

/// Message file of the commit being edited in the repository at `dir`
pub fn commit_message_path(dir: &Path) -> Result<PathBuf> {
   git_path(dir, "COMMIT_EDITMSG")
}

/// `git diff --cached` in a working tree
#[derive(Debug, Clone)]
pub struct GitDiffSource {
   dir:        PathBuf,
   max_length: usize,
}

impl GitDiffSource {
   pub fn new(dir: impl Into<PathBuf>, max_length: usize) -> Self {
      Self { dir: dir.into(), max_length }
   }
}

impl DiffSource for GitDiffSource {
   fn staged_diff(&self) -> Result<String> {
      let diff = run_git(&self.dir, &["diff", "--cached"])?;

      if diff.trim().is_empty() {
         return Err(CommitGenError::NoChanges { mode: "staged changes".to_string() });
      }

      if diff.len() > self.max_length {
         tracing::warn!(
            size = diff.len(),
            limit = self.max_length,
            "staged diff exceeds max_diff_length, truncating"
         );
      }
      Ok(truncate_diff(diff, self.max_length))
   }
}

/// Cut `diff` to at most `max_len` bytes on a line boundary, noting the cut
pub fn truncate_diff(diff: String, max_len: usize) -> String {
   if diff.len() <= max_len {
      return diff;
   }

   let mut end = max_len;
   while !diff.is_char_boundary(end) {
      end -= 1;
   }
   let end = diff[..end].rfind('\n').map_or(end, |pos| pos + 1);

   let mut truncated = diff[..end].to_string();
   if !truncated.is_empty() && !truncated.ends_with('\n') {
      truncated.push('\n');
   }
   truncated.push_str(&format!(
      "[... diff truncated: showing {end} of {} bytes ...]\n",
      diff.len()
   ));
   truncated
}

/// Runs `git commit` with inherited stdio so `--edit` can open the editor
#[derive(Debug, Clone)]
pub struct GitCommitCreator {
   dir:     PathBuf,
   dry_run: bool,
}

impl GitCommitCreator {
   pub fn new(dir: impl Into<PathBuf>, dry_run: bool) -> Self {
      Self { dir: dir.into(), dry_run }
   }
}

impl CommitCreator for GitCommitCreator {
   fn create_commit(&self, args: &[String]) -> Result<()> {
      if self.dry_run {
         println!("DRY RUN - Would execute:");
         println!("git commit {}", shell_words(args));
         return Ok(());
      }

      tracing::debug!(?args, "running git commit");
      let status = Command::new("git")
         .arg("commit")
         .args(args)
         .current_dir(&self.dir)
         .status()
         .map_err(|e| CommitGenError::GitError(format!("Failed to run git commit: {e}")))?;

      if !status.success() {
         return Err(CommitGenError::GitError(format!("git commit exited with {status}")));
      }

      Ok(())
   }
}

/// Quote arguments for display the way a shell would accept them
fn shell_words(args: &[String]) -> String {
   args
      .iter()
      .map(|arg| shell_quote(arg))
      .collect::<Vec<_>>()
      .join(" ")
}

/// Single-quote `arg` for `sh` unless it only contains safe characters
pub fn shell_quote(arg: &str) -> String {
   if !arg.is_empty()
      && arg
         .chars()
         .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
   {
      arg.to_string()
   } else {
      format!("'{}'", arg.replace('\'', r"'\''"))
   }
}
