//! the-notepad: a plain text notepad driven by line commands.
//!
//! Reads one command per line from stdin (`insert TEXT`, `find PATTERN`,
//! `save`, `quit`, ...) and prints the title, status line and notices to
//! stdout. See `command.rs` for the full list.

mod app;
mod cli;
mod command;
mod config;
mod logging;

use std::io;

use eyre::Result;
use the_lib::session::{
  MIN_FONT_SIZE,
  Session,
  SessionState,
};
use the_runtime::{
  CommandPrinter,
  DiskFileSystem,
  SystemClipboard,
};

use crate::{
  app::{
    App,
    LogObserver,
  },
  cli::CliOptions,
  config::Config,
};

fn main() -> Result<()> {
  let options = CliOptions::parse();
  logging::setup_logging(options.verbosity, options.log_file.clone())?;

  let config = Config::load_or_default(options.config_file.as_deref())?;
  let font_size = options
    .font_size
    .unwrap_or(config.font_size)
    .max(MIN_FONT_SIZE);

  let mut session = Session::new(
    Box::new(DiskFileSystem::new()),
    Box::new(CommandPrinter::new(config.print_command.clone())),
  )
  .with_clipboard(Box::new(SystemClipboard::new(
    &config.clipboard_provider(),
  )))
  .with_history_limit(config.history_limit)
  .with_state(SessionState {
    font_size,
    default_font_size: font_size,
    status_bar_visible: config.show_status_bar,
    ..SessionState::default()
  });
  session.subscribe(Box::new(LogObserver));

  let mut app = App::new(session, io::stdin().lock(), io::stdout().lock());
  if let Some(file) = options.file {
    app.open_initial(file)?;
  }
  app.run()
}
