//! Print service backed by an external command.
//!
//! The document is piped to the command's stdin. Arguments may contain the
//! `{title}` placeholder, replaced by the window title. The default is
//! `lpr -T {title}`.

use std::io;

use ropey::Rope;
use the_lib::host::Printer;

use crate::command::ExternalCommand;

pub const TITLE_PLACEHOLDER: &str = "{title}";

pub fn default_print_command() -> ExternalCommand {
  ExternalCommand::new("lpr", ["-T", TITLE_PLACEHOLDER])
}

#[derive(Debug, Clone)]
pub struct CommandPrinter {
  command: ExternalCommand,
}

impl Default for CommandPrinter {
  fn default() -> Self {
    Self::new(default_print_command())
  }
}

impl CommandPrinter {
  pub fn new(command: ExternalCommand) -> Self {
    Self { command }
  }
}

impl Printer for CommandPrinter {
  fn print(&self, title: &str, content: &Rope) -> io::Result<()> {
    self
      .command
      .substitute(TITLE_PLACEHOLDER, title)
      .execute(Some(content), false)
      .map(|_| ())
  }
}

#[cfg(all(test, unix))]
mod tests {
  use std::fs;

  use super::*;

  #[test]
  fn pipes_content_and_title() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let out = dir.path().join("printed.txt");
    let printer = CommandPrinter::new(ExternalCommand::new("sh", [
      "-c".to_string(),
      r#"printf '%s\n' "$1" > "$2"; cat >> "$2""#.to_string(),
      "sh".to_string(),
      TITLE_PLACEHOLDER.to_string(),
      out.to_string_lossy().into_owned(),
    ]));

    printer
      .print("notes.txt - the-notepad", &Rope::from("a\r\nb\n"))
      .unwrap();
    assert_eq!(
      fs::read_to_string(&out).unwrap(),
      "notes.txt - the-notepad\na\r\nb\n"
    );
  }

  #[test]
  fn failing_command_is_an_error() {
    let printer = CommandPrinter::new(ExternalCommand::new("sh", ["-c", "cat > /dev/null; exit 3"]));
    assert!(printer.print("t", &Rope::from("x")).is_err());

    let missing = CommandPrinter::new(ExternalCommand::new(
      "/nonexistent/printer",
      Vec::<String>::new(),
    ));
    assert!(missing.print("t", &Rope::from("x")).is_err());
  }

  #[test]
  fn default_uses_lpr() {
    let command = default_print_command();
    assert_eq!(command.command, "lpr");
    assert_eq!(command.args, ["-T", "{title}"]);
  }
}
