//! Disk-backed [`FileSystem`].
//!
//! Files are read and written as raw UTF-8 with line separators untouched.
//! Saves go to a temporary file in the target's directory which is then
//! renamed over the target, so a failed save never leaves a truncated file.

use std::{
  fs,
  io::{
    self,
    BufWriter,
    Write,
  },
  path::{
    Path,
    PathBuf,
  },
};

use ropey::Rope;
use tempfile::NamedTempFile;
use the_lib::host::FileSystem;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl DiskFileSystem {
  pub fn new() -> Self {
    Self
  }
}

impl FileSystem for DiskFileSystem {
  fn load(&self, path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
  }

  fn save(&self, path: &Path, content: &Rope) -> io::Result<()> {
    // Write through symlinks instead of replacing them.
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = parent_dir(&target);

    let mut file = NamedTempFile::new_in(&dir)?;
    {
      let mut writer = BufWriter::new(file.as_file_mut());
      for chunk in content.chunks() {
        writer.write_all(chunk.as_bytes())?;
      }
      writer.flush()?;
    }
    file.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(&target) {
      fs::set_permissions(file.path(), metadata.permissions())?;
    }

    file.persist(&target).map_err(|err| err.error)?;
    tracing::debug!(path = %target.display(), bytes = content.len_bytes(), "wrote file");
    Ok(())
  }
}

fn parent_dir(path: &Path) -> PathBuf {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  }
}
