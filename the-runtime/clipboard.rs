//! System clipboard through the platform's copy/paste tools.
//!
//! The provider is detected from the environment at startup or set in the
//! config. When no tool is available the clipboard is private to the process.

use std::io;

use ropey::Rope;
use serde::{
  Deserialize,
  Serialize,
};
use the_lib::host::{
  Clipboard,
  LocalClipboard,
};

use crate::command::ExternalCommand;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandProvider {
  pub copy:  ExternalCommand,
  pub paste: ExternalCommand,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClipboardProvider {
  Pasteboard,
  Wayland,
  XClip,
  XSel,
  Custom(CommandProvider),
  /// Process-local clipboard.
  #[default]
  None,
}

impl ClipboardProvider {
  pub fn detect() -> Self {
    let display = |var: &str| std::env::var_os(var).is_some_and(|value| !value.is_empty());

    if cfg!(target_os = "macos") && binary_exists("pbcopy") && binary_exists("pbpaste") {
      Self::Pasteboard
    } else if display("WAYLAND_DISPLAY") && binary_exists("wl-copy") && binary_exists("wl-paste") {
      Self::Wayland
    } else if display("DISPLAY") && binary_exists("xclip") {
      Self::XClip
    } else if display("DISPLAY") && binary_exists("xsel") {
      Self::XSel
    } else {
      Self::None
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Pasteboard => "pbcopy+pbpaste",
      Self::Wayland => "wl-copy+wl-paste",
      Self::XClip => "xclip",
      Self::XSel => "xsel",
      Self::Custom(_) => "custom",
      Self::None => "none",
    }
  }

  fn commands(&self) -> Option<CommandProvider> {
    match self {
      Self::Pasteboard => Some(provider(("pbcopy", &[]), ("pbpaste", &[]))),
      Self::Wayland => {
        Some(provider(
          ("wl-copy", &["--type", "text/plain"]),
          ("wl-paste", &["--no-newline"]),
        ))
      },
      Self::XClip => {
        Some(provider(
          ("xclip", &["-i", "-selection", "clipboard"]),
          ("xclip", &["-o", "-selection", "clipboard"]),
        ))
      },
      Self::XSel => Some(provider(("xsel", &["-i", "-b"]), ("xsel", &["-o", "-b"]))),
      Self::Custom(commands) => Some(commands.clone()),
      Self::None => None,
    }
  }
}

type Invocation = (&'static str, &'static [&'static str]);

fn provider(copy: Invocation, paste: Invocation) -> CommandProvider {
  CommandProvider {
    copy:  ExternalCommand::new(copy.0, copy.1.iter().copied()),
    paste: ExternalCommand::new(paste.0, paste.1.iter().copied()),
  }
}

fn binary_exists(name: &str) -> bool {
  which::which(name).is_ok()
}

#[derive(Debug)]
pub struct SystemClipboard {
  commands: Option<CommandProvider>,
  local:    LocalClipboard,
}

impl SystemClipboard {
  pub fn new(provider: &ClipboardProvider) -> Self {
    tracing::debug!(provider = provider.name(), "clipboard provider");
    Self {
      commands: provider.commands(),
      local:    LocalClipboard::default(),
    }
  }
}

impl Clipboard for SystemClipboard {
  fn get_contents(&self) -> io::Result<String> {
    match &self.commands {
      Some(commands) => Ok(commands.paste.execute(None, true)?.unwrap_or_default()),
      None => self.local.get_contents(),
    }
  }

  fn set_contents(&self, content: &str) -> io::Result<()> {
    match &self.commands {
      Some(commands) => {
        commands
          .copy
          .execute(Some(&Rope::from(content)), false)
          .map(|_| ())
      },
      None => self.local.set_contents(content),
    }
  }
}
