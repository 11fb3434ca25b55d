use std::{path::Path, rc::Rc};

use clap::Parser;
use diffscribe::{
   actions::ActionDispatcher,
   buffer::EditMsgContext,
   config::CommitConfig,
   error::Result,
   event_loop::EventLoop,
   generator::CommitMessageGenerator,
   git::{DiffSource, GitCommitCreator, GitDiffSource, commit_message_path},
   install::{self, hook_should_generate},
   llm::ChatClient,
   notify::{Notifier, TerminalNotifier},
   prompts,
   style,
   types::{Args, Command},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
   let log_level = if verbose { "debug" } else { "warn" };

   tracing_subscriber::registry()
      .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
      .with(
         tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
      )
      .init();
}

/// Apply CLI overrides to config
fn apply_cli_overrides(config: &mut CommitConfig, args: &Args) {
   if let Some(ref prompt) = args.prompt {
      config.prompt = prompt.name().to_string();
      config.custom_prompt = None;
   }
   if let Some(ref model) = args.model {
      config.model.clone_from(model);
   }
   if let Some(width) = args.width {
      config.column_width = width;
   }
}

/// Load config from args or default
fn load_config_from_args(args: &Args) -> Result<CommitConfig> {
   let mut config = if let Some(ref config_path) = args.config {
      CommitConfig::from_file(config_path)?
   } else {
      CommitConfig::load()?
   };
   apply_cli_overrides(&mut config, args);
   config.validate()?;
   Ok(config)
}

fn run_install(dir: &Path, binary: Option<&Path>, force: bool) -> Result<()> {
   let binary = match binary {
      Some(path) => path.to_path_buf(),
      None => std::env::current_exe()?,
   };

   let installation = install::install(dir, &binary, force)?;
   eprintln!(
      "{} Installed {} hook at {}",
      style::success(style::icons::SUCCESS),
      install::HOOK_NAME,
      installation.hook_path.display()
   );
   eprintln!(
      "{} Added alias: git {} = {}",
      style::success(style::icons::SUCCESS),
      install::ALIAS_NAME,
      installation.alias
   );
   Ok(())
}

fn run_uninstall(dir: &Path) -> Result<()> {
   if install::uninstall(dir)? {
      eprintln!("{} Removed hook and alias", style::success(style::icons::SUCCESS));
   } else {
      eprintln!("{}", style::dim("Nothing to remove"));
   }
   Ok(())
}

fn list_prompts(args: &Args) {
   let active = load_config_from_args(args)
      .and_then(|config| config.active_prompt())
      .ok();

   for line in prompts::listing(active.as_ref()) {
      println!("{line}");
   }
}

fn main() -> Result<()> {
   dotenvy::dotenv().ok();
   let args = Args::parse();
   init_logging(args.verbose);

   // Commands that never talk to the API
   match args.command {
      Command::Install { force, ref binary } => {
         return run_install(&args.dir, binary.as_deref(), force);
      },
      Command::Uninstall => return run_uninstall(&args.dir),
      Command::Prompts => {
         list_prompts(&args);
         return Ok(());
      },
      Command::Hook { ref source, .. } if !hook_should_generate(source.as_deref()) => {
         tracing::debug!(?source, "commit already has a message, skipping");
         return Ok(());
      },
      _ => {},
   }

   let is_hook = matches!(args.command, Command::Hook { .. });
   match run_generation(&args) {
      Ok(0) => Ok(()),
      // A failing prepare-commit-msg hook aborts the commit; leave the
      // message empty for the user instead
      Ok(_) if is_hook => Ok(()),
      Ok(_) => std::process::exit(1),
      Err(err) if is_hook => {
         style::warn(&format!("diffscribe: {err}"));
         Ok(())
      },
      Err(err) => Err(err),
   }
}

/// Start the selected action, drive the event loop until every request
/// finished, and return how many errors were reported along the way.
fn run_generation(args: &Args) -> Result<usize> {
   let config = load_config_from_args(args)?;

   let event_loop = Rc::new(EventLoop::new()?);
   let notifier = Rc::new(TerminalNotifier::new());
   let llm = ChatClient::new(
      &config,
      Rc::clone(&event_loop),
      Rc::clone(&notifier) as Rc<dyn Notifier>,
   )?;
   let generator = CommitMessageGenerator::new(Rc::new(llm), config.generator_config()?);
   let diff_source: Rc<dyn DiffSource> =
      Rc::new(GitDiffSource::new(&args.dir, config.max_diff_length));

   match args.command {
      Command::Message => {
         generator.generate_active(&*diff_source, |message| println!("{message}"))?;
      },
      Command::Insert { ref file } => {
         let path = match file {
            Some(path) => path.clone(),
            None => commit_message_path(&args.dir)?,
         };
         let dispatcher =
            ActionDispatcher::new(generator, diff_source, Rc::clone(&notifier) as Rc<dyn Notifier>);
         dispatcher.insert_into_buffer(&EditMsgContext::new(Some(path)))?;
      },
      Command::Hook { ref file, .. } => {
         let dispatcher =
            ActionDispatcher::new(generator, diff_source, Rc::clone(&notifier) as Rc<dyn Notifier>);
         dispatcher.insert_into_buffer(&EditMsgContext::new(Some(file.clone())))?;
      },
      Command::Commit(ref commit_args) => {
         let dispatcher =
            ActionDispatcher::new(generator, diff_source, Rc::clone(&notifier) as Rc<dyn Notifier>);
         let creator = Rc::new(GitCommitCreator::new(&args.dir, commit_args.dry_run));
         dispatcher.create_commit(creator, commit_args.to_git_args())?;
      },
      Command::Install { .. } | Command::Uninstall | Command::Prompts => {},
   }

   event_loop.run();
   Ok(notifier.error_count())
}
