use std::path::PathBuf;

use clap::{
  ArgAction,
  Parser,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliOptions {
  pub verbosity:   u8,
  pub log_file:    Option<PathBuf>,
  pub config_file: Option<PathBuf>,
  pub font_size:   Option<u16>,
  pub file:        Option<PathBuf>,
}

impl CliOptions {
  pub fn parse() -> Self {
    RawCli::parse().into()
  }
}

#[derive(Parser, Debug)]
#[command(
  name = "the-notepad",
  about = "Plain text notepad driven by line commands on stdin",
  version
)]
struct RawCli {
  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Load configuration from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config_file: Option<PathBuf>,

  /// Initial font size, overrides the config file
  #[arg(long = "font-size", value_name = "POINTS", value_parser = parse_font_size)]
  font_size: Option<u16>,

  /// File to open
  #[arg(value_name = "FILE")]
  file: Option<PathBuf>,
}

impl From<RawCli> for CliOptions {
  fn from(raw: RawCli) -> Self {
    Self {
      verbosity:   raw.verbosity,
      log_file:    raw.log_file,
      config_file: raw.config_file,
      font_size:   raw.font_size,
      file:        raw.file,
    }
  }
}

fn parse_font_size(value: &str) -> std::result::Result<u16, String> {
  match value.parse::<u16>() {
    Ok(0) => Err("font size must be positive".to_string()),
    Ok(size) => Ok(size),
    Err(err) => Err(format!("invalid font size '{value}': {err}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(args: &[&str]) -> std::result::Result<CliOptions, clap::Error> {
    RawCli::try_parse_from(std::iter::once("the-notepad").chain(args.iter().copied()))
      .map(CliOptions::from)
  }

  #[test]
  fn defaults() {
    let options = parse(&[]).unwrap();
    assert_eq!(options, CliOptions {
      verbosity:   0,
      log_file:    None,
      config_file: None,
      font_size:   None,
      file:        None,
    });
  }

  #[test]
  fn all_flags() {
    let options = parse(&[
      "-vv",
      "--log",
      "/tmp/np.log",
      "-c",
      "np.toml",
      "--font-size",
      "18",
      "notes.txt",
    ])
    .unwrap();
    assert_eq!(options.verbosity, 2);
    assert_eq!(options.log_file, Some(PathBuf::from("/tmp/np.log")));
    assert_eq!(options.config_file, Some(PathBuf::from("np.toml")));
    assert_eq!(options.font_size, Some(18));
    assert_eq!(options.file, Some(PathBuf::from("notes.txt")));
  }

  #[test]
  fn rejects_bad_font_size() {
    assert!(parse(&["--font-size", "0"]).is_err());
    assert!(parse(&["--font-size", "big"]).is_err());
  }
}
