//! Collaborators the session delegates to: the filesystem, the print
//! service and the clipboard. Implementations live outside this crate (see `the-runtime`); the
//! session only sees these traits.

use std::{
  cell::RefCell,
  io,
  path::{
    Path,
    PathBuf,
  },
};

use ropey::Rope;
use thiserror::Error;

pub trait FileSystem {
  /// Read the whole file as text. Line separators are returned verbatim.
  fn load(&self, path: &Path) -> io::Result<String>;

  /// Write `content` to `path`. Must not leave a truncated or partially
  /// written file behind when it fails.
  fn save(&self, path: &Path, content: &Rope) -> io::Result<()>;
}

pub trait Printer {
  fn print(&self, title: &str, content: &Rope) -> io::Result<()>;
}

pub trait Clipboard {
  fn get_contents(&self) -> io::Result<String>;
  fn set_contents(&self, content: &str) -> io::Result<()>;
}

/// Clipboard private to the process, for hosts without a system clipboard.
#[derive(Debug, Default)]
pub struct LocalClipboard {
  contents: RefCell<String>,
}

impl Clipboard for LocalClipboard {
  fn get_contents(&self) -> io::Result<String> {
    Ok(self.contents.borrow().clone())
  }

  fn set_contents(&self, content: &str) -> io::Result<()> {
    *self.contents.borrow_mut() = content.to_string();
    Ok(())
  }
}

/// An I/O failure at a collaborator boundary. These are the only errors shown
/// to the user.
#[derive(Debug, Error)]
pub enum IoFailure {
  #[error("could not open {}: {source}", .path.display())]
  Open {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("could not save {}: {source}", .path.display())]
  Save {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("printing failed: {0}")]
  Print(#[source] io::Error),
  #[error("clipboard failed: {0}")]
  Clipboard(#[source] io::Error),
}

impl IoFailure {
  /// Short notice for the status area.
  pub fn user_message(&self) -> &'static str {
    match self {
      Self::Open { .. } => "Could not open file.",
      Self::Save { .. } => "Could not save file.",
      Self::Print(_) => "Printing failed.",
      Self::Clipboard(_) => "Clipboard is unavailable.",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_messages() {
    let err = IoFailure::Save {
      path:   PathBuf::from("/tmp/notes.txt"),
      source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(err.user_message(), "Could not save file.");
    assert_eq!(err.to_string(), "could not save /tmp/notes.txt: denied");

    let err = IoFailure::Print(io::Error::other("no printer"));
    assert_eq!(err.user_message(), "Printing failed.");

    let err = IoFailure::Clipboard(io::Error::from(io::ErrorKind::NotFound));
    assert_eq!(err.user_message(), "Clipboard is unavailable.");
  }

  #[test]
  fn local_clipboard_keeps_last_copy() {
    let clipboard = LocalClipboard::default();
    assert_eq!(clipboard.get_contents().unwrap(), "");
    clipboard.set_contents("first").unwrap();
    clipboard.set_contents("second").unwrap();
    assert_eq!(clipboard.get_contents().unwrap(), "second");
  }
}
