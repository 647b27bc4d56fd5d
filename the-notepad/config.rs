//! Optional TOML configuration, read once at startup and never written.
//!
//! ```toml
//! font_size = 16
//! history_limit = 200
//! show_status_bar = false
//!
//! clipboard = "xsel"
//!
//! [print_command]
//! command = "lp"
//! args = ["-t", "{title}"]
//! ```
//!
//! Without a `clipboard` key the provider is detected from the environment.

use std::{
  fs,
  path::Path,
};

use eyre::{
  Result,
  WrapErr,
};
use serde::Deserialize;
use the_lib::{
  history::DEFAULT_HISTORY_LIMIT,
  session::DEFAULT_FONT_SIZE,
};
use the_runtime::{
  ClipboardProvider,
  ExternalCommand,
  default_print_command,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub font_size:       u16,
  pub history_limit:   usize,
  pub show_status_bar: bool,
  pub print_command:   ExternalCommand,
  pub clipboard:       Option<ClipboardProvider>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      font_size:       DEFAULT_FONT_SIZE,
      history_limit:   DEFAULT_HISTORY_LIMIT,
      show_status_bar: true,
      print_command:   default_print_command(),
      clipboard:       None,
    }
  }
}

impl Config {
  pub fn from_toml(source: &str) -> std::result::Result<Self, toml::de::Error> {
    toml::from_str(source)
  }

  pub fn load(path: &Path) -> Result<Self> {
    let source = fs::read_to_string(path)
      .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let config = Self::from_toml(&source)
      .wrap_err_with(|| format!("invalid config {}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
  }

  /// Configured clipboard provider, or the one detected from the environment.
  pub fn clipboard_provider(&self) -> ClipboardProvider {
    self.clipboard.clone().unwrap_or_else(ClipboardProvider::detect)
  }

  /// Load `path` when given, otherwise the defaults.
  pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
    path.map_or_else(|| Ok(Self::default()), Self::load)
  }
}

#[cfg(test)]
mod tests {
  use std::borrow::Cow;

  use super::*;

  #[test]
  fn empty_file_is_default() {
    assert_eq!(Config::from_toml("").unwrap(), Config::default());
  }

  #[test]
  fn partial_file_keeps_other_defaults() {
    let config = Config::from_toml(
      r#"
      font_size = 20

      [print_command]
      command = "lp"
      "#,
    )
    .unwrap();
    assert_eq!(config.font_size, 20);
    assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    assert!(config.show_status_bar);
    assert_eq!(config.print_command.command, Cow::Borrowed("lp"));
    assert!(config.print_command.args.is_empty());
    assert_eq!(config.clipboard, None);
  }

  #[test]
  fn clipboard_provider_can_be_pinned() {
    let config = Config::from_toml("clipboard = \"none\"").unwrap();
    assert_eq!(config.clipboard_provider(), ClipboardProvider::None);

    let config = Config::from_toml(
      r#"
      [clipboard.custom]
      copy = { command = "tee", args = ["/tmp/clip"] }
      paste = { command = "cat", args = ["/tmp/clip"] }
      "#,
    )
    .unwrap();
    assert!(matches!(
      config.clipboard_provider(),
      ClipboardProvider::Custom(_)
    ));
    assert!(Config::from_toml("clipboard = \"carrier-pigeon\"").is_err());
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(Config::from_toml("theme = \"dark\"").is_err());
  }

  #[test]
  fn load_reports_missing_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("missing.toml");
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));

    std::fs::write(&path, "history_limit = 5\nshow_status_bar = false\n").unwrap();
    let config = Config::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.history_limit, 5);
    assert!(!config.show_status_bar);
    assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
  }
}
