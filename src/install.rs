//! Wires the two actions into git: a `prepare-commit-msg` hook that fills in
//! the message of a commit being edited, and a `git scribe` alias that
//! creates a commit with a generated message.

use std::path::{Path, PathBuf};

use crate::{
   error::{CommitGenError, Result},
   git::{git_path, run_git, shell_quote},
};

/// Marks hooks this tool wrote, so they can be replaced or removed safely
pub const HOOK_MARKER: &str = "# installed by diffscribe";

pub const HOOK_NAME: &str = "prepare-commit-msg";

pub const ALIAS_NAME: &str = "scribe";

/// What [`install`] set up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
   pub hook_path: PathBuf,
   pub alias:     String,
}

/// Whether the hook should generate a message for git's message `source`.
///
/// Git passes `message` for `-m`/`-F`, `merge`/`squash` for prepared merge
/// messages and `commit` for `-c`/`-C`/`--amend`; those already carry a
/// message.
pub fn hook_should_generate(source: Option<&str>) -> bool {
   !matches!(source, Some("message" | "merge" | "squash" | "commit"))
}

/// Hooks directory of the repository at `repo`, honouring `core.hooksPath`
pub fn hooks_dir(repo: &Path) -> Result<PathBuf> {
   git_path(repo, "hooks")
}

fn hook_script(binary: &Path) -> String {
   format!(
      "#!/bin/sh\n{HOOK_MARKER}\nexec {} hook \"$@\"\n",
      shell_quote(&binary.to_string_lossy())
   )
}

fn is_own_hook(path: &Path) -> bool {
   std::fs::read_to_string(path).is_ok_and(|content| content.contains(HOOK_MARKER))
}

/// Install the hook and the alias for `repo`, pointing both at `binary`.
///
/// An existing hook written by something else is kept unless `force` is set.
pub fn install(repo: &Path, binary: &Path, force: bool) -> Result<Installation> {
   let dir = hooks_dir(repo)?;
   std::fs::create_dir_all(&dir)?;

   let hook_path = dir.join(HOOK_NAME);
   if hook_path.exists() && !force && !is_own_hook(&hook_path) {
      return Err(CommitGenError::HookExists(hook_path));
   }

   std::fs::write(&hook_path, hook_script(binary))?;
   make_executable(&hook_path)?;
   tracing::debug!(path = %hook_path.display(), "wrote hook");

   let alias = format!("!{} commit", shell_quote(&binary.to_string_lossy()));
   run_git(repo, &["config", &format!("alias.{ALIAS_NAME}"), &alias])?;

   Ok(Installation { hook_path, alias })
}

/// Remove what [`install`] set up. Returns whether anything was removed.
pub fn uninstall(repo: &Path) -> Result<bool> {
   let mut removed = false;

   let hook_path = hooks_dir(repo)?.join(HOOK_NAME);
   if is_own_hook(&hook_path) {
      std::fs::remove_file(&hook_path)?;
      removed = true;
   }

   let key = format!("alias.{ALIAS_NAME}");
   // `git config --get` exits non-zero when the key is unset
   if run_git(repo, &["config", "--get", &key]).is_ok() {
      run_git(repo, &["config", "--unset", &key])?;
      removed = true;
   }

   Ok(removed)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
   use std::os::unix::fs::PermissionsExt;

   let mut permissions = std::fs::metadata(path)?.permissions();
   permissions.set_mode(0o755);
   std::fs::set_permissions(path, permissions)?;
   Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
   Ok(())
}
