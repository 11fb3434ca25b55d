use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::prompts::Prompt;

#[derive(Parser, Debug)]
#[command(name = "diffscribe", version, about = "Generate commit messages for staged changes")]
pub struct Args {
   #[command(subcommand)]
   pub command: Command,

   /// Directory to run git commands in
   #[arg(long, global = true, default_value = ".")]
   pub dir: PathBuf,

   /// Path to config file (default: ~/.config/diffscribe/config.toml)
   #[arg(long, global = true)]
   pub config: Option<PathBuf>,

   /// Built-in prompt to use (conventional-commits, free-form)
   #[arg(long, global = true)]
   pub prompt: Option<Prompt>,

   /// Model name sent to the API
   #[arg(long, short = 'm', global = true)]
   pub model: Option<String>,

   /// Column to wrap the message at
   #[arg(long, short = 'w', global = true)]
   pub width: Option<usize>,

   /// Debug logging (RUST_LOG takes precedence)
   #[arg(long, short = 'v', global = true)]
   pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
   /// Insert a generated message at the top of a commit message file
   Insert {
      /// Message file of the commit being edited (default: the repository's
      /// COMMIT_EDITMSG, resolved with `git rev-parse --git-path`)
      file: Option<PathBuf>,
   },

   /// Entry point for the prepare-commit-msg hook
   #[command(hide = true)]
   Hook {
      file:   PathBuf,
      source: Option<String>,
      sha:    Option<String>,
   },

   /// Create a commit with a generated message, opened for editing
   Commit(CommitArgs),

   /// Print a generated message for the staged changes
   Message,

   /// Install the prepare-commit-msg hook and the `git scribe` alias
   Install {
      /// Replace an existing prepare-commit-msg hook
      #[arg(long)]
      force: bool,

      /// Binary the hook and alias should run (default: this executable)
      #[arg(long)]
      binary: Option<PathBuf>,
   },

   /// Remove the hook and alias
   Uninstall,

   /// List built-in prompts
   Prompts,
}

/// Flags passed through to `git commit`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct CommitArgs {
   /// Allow a commit without changes (git commit --allow-empty)
   #[arg(long)]
   pub allow_empty: bool,

   /// GPG sign the commit (equivalent to git commit -S)
   #[arg(long, short = 'S')]
   pub sign: bool,

   /// Add Signed-off-by trailer (equivalent to git commit -s)
   #[arg(long, short = 's')]
   pub signoff: bool,

   /// Skip pre-commit and commit-msg hooks (equivalent to git commit
   /// --no-verify)
   #[arg(long, short = 'n')]
   pub skip_hooks: bool,

   /// Print the git command instead of running it
   #[arg(long)]
   pub dry_run: bool,

   /// Extra arguments for git commit, after `--`
   #[arg(last = true)]
   pub git_args: Vec<String>,
}

impl CommitArgs {
   pub fn to_git_args(&self) -> Vec<String> {
      let flags = [
         (self.allow_empty, "--allow-empty"),
         (self.sign, "--gpg-sign"),
         (self.signoff, "--signoff"),
         (self.skip_hooks, "--no-verify"),
      ];

      flags
         .into_iter()
         .filter_map(|(enabled, flag)| enabled.then(|| flag.to_string()))
         .chain(self.git_args.iter().cloned())
         .collect()
   }
}
