use std::{
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use eyre::{
  Result,
  WrapErr,
};
use log::LevelFilter;

pub fn cache_dir() -> Result<PathBuf> {
  let strategy = choose_base_strategy().wrap_err("unable to find the cache directory")?;
  Ok(strategy.cache_dir().join("the-notepad"))
}

pub fn default_log_file() -> Result<PathBuf> {
  Ok(cache_dir()?.join("the-notepad.log"))
}

pub fn level_for(verbosity: u8) -> LevelFilter {
  match verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  }
}

/// Route `log` records (and `tracing` events from the libraries) to the log
/// file. Returns the file in use.
pub fn setup_logging(verbosity: u8, log_file: Option<PathBuf>) -> Result<PathBuf> {
  let path = match log_file {
    Some(path) => path,
    None => default_log_file()?,
  };
  ensure_parent_dir(&path)?;

  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "[{}] {}: {}",
        record.level(),
        record.target(),
        message
      ))
    })
    .level(level_for(verbosity))
    .chain(fern::log_file(&path).wrap_err_with(|| format!("cannot open log {}", path.display()))?)
    .apply()?;

  log::info!("logging to {}", path.display());
  Ok(path)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .wrap_err_with(|| format!("cannot create log directory {}", parent.display()))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn verbosity_levels() {
    assert_eq!(level_for(0), LevelFilter::Warn);
    assert_eq!(level_for(1), LevelFilter::Info);
    assert_eq!(level_for(2), LevelFilter::Debug);
    assert_eq!(level_for(7), LevelFilter::Trace);
  }

  #[test]
  fn parent_dir_is_created() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested").join("logs").join("np.log");
    ensure_parent_dir(&path).unwrap();
    assert!(path.parent().unwrap().is_dir());
    ensure_parent_dir(Path::new("bare.log")).unwrap();
  }
}
