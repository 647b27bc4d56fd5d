//! Host collaborators for the-lib sessions: disk access, printing and the
//! system clipboard.

pub mod clipboard;
pub mod command;
pub mod file_io;
pub mod print;

pub use clipboard::{
  ClipboardProvider,
  SystemClipboard,
};
pub use command::ExternalCommand;
pub use file_io::DiskFileSystem;
pub use print::{
  CommandPrinter,
  default_print_command,
};
