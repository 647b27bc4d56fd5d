//! Versioned text buffer.
//!
//! [`TextBuffer`] wraps a [`Rope`] and counts every mutation in a monotonic
//! `version`. All offsets are char indices. Line indices are 0-based and a
//! CRLF pair counts as a single line break.

use std::{
  fmt,
  ops::Range,
};

use ropey::Rope;
use the_core::line_ending::LineEnding;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BufferError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
  #[error("offset {offset} (+{len}) is out of range for buffer of length {max}")]
  OutOfRange {
    offset: usize,
    len:    usize,
    max:    usize,
  },
  #[error("line {line} is out of range (buffer has {max} lines)")]
  LineOutOfRange { line: usize, max: usize },
  #[error("expected {expected:?} at offset {offset}, found {found:?}")]
  Mismatch {
    offset:   usize,
    expected: String,
    found:    String,
  },
}

#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
  text:    Rope,
  version: u64,
}

impl TextBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn len_chars(&self) -> usize {
    self.text.len_chars()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.text.len_chars() == 0
  }

  /// Number of lines. An empty buffer has one (empty) line.
  #[inline]
  pub fn len_lines(&self) -> usize {
    self.text.len_lines()
  }

  #[inline]
  pub fn version(&self) -> u64 {
    self.version
  }

  /// Immutable snapshot of the current content.
  ///
  /// Ropes share structure, so this is O(1) and later edits to the buffer do
  /// not show through.
  pub fn read(&self) -> Rope {
    self.text.clone()
  }

  /// Borrow the underlying rope without taking a snapshot.
  #[inline]
  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
    self.check_range(offset, 0)?;
    if text.is_empty() {
      return Ok(());
    }
    self.text.insert(offset, text);
    self.bump();
    Ok(())
  }

  /// Remove `len` chars starting at `offset`, returning the removed text.
  pub fn delete(&mut self, offset: usize, len: usize) -> Result<String> {
    self.check_range(offset, len)?;
    if len == 0 {
      return Ok(String::new());
    }
    let end = offset + len;
    let removed = self.text.slice(offset..end).to_string();
    self.text.remove(offset..end);
    self.bump();
    Ok(removed)
  }

  /// Replace the whole content, e.g. when a file is opened.
  pub fn replace_all(&mut self, content: &str) {
    self.text = Rope::from_str(content);
    self.bump();
  }

  pub fn slice_to_string(&self, range: Range<usize>) -> Result<String> {
    let len = range.end.saturating_sub(range.start);
    self.check_range(range.start, len)?;
    Ok(self.text.slice(range).to_string())
  }

  /// Char offset where line `line_index` (0-based) begins.
  pub fn line_start_offset(&self, line_index: usize) -> Result<usize> {
    let max = self.text.len_lines();
    if line_index >= max {
      return Err(BufferError::LineOutOfRange {
        line: line_index,
        max,
      });
    }
    Ok(self.text.line_to_char(line_index))
  }

  /// 0-based line containing `offset`. `offset == len` is the last line.
  pub fn line_of_offset(&self, offset: usize) -> Result<usize> {
    self.check_range(offset, 0)?;
    Ok(self.text.char_to_line(offset))
  }

  /// True when `offset` sits between the `\r` and `\n` of a CRLF pair.
  pub fn splits_crlf(&self, offset: usize) -> bool {
    offset > 0
      && offset < self.text.len_chars()
      && LineEnding::from_rope_slice(&self.text.slice(offset - 1..offset + 1))
        == Some(LineEnding::Crlf)
  }

  /// Move an offset inside a CRLF pair to the start of the pair.
  pub fn snap_to_boundary(&self, offset: usize) -> usize {
    if self.splits_crlf(offset) {
      offset - 1
    } else {
      offset
    }
  }

  /// Previous char boundary, stepping over a CRLF pair as one unit.
  pub fn prev_boundary(&self, offset: usize) -> usize {
    match offset {
      0 => 0,
      _ if self.splits_crlf(offset - 1) => offset - 2,
      _ => offset - 1,
    }
  }

  /// Next char boundary, stepping over a CRLF pair as one unit.
  pub fn next_boundary(&self, offset: usize) -> usize {
    let len = self.text.len_chars();
    if offset >= len {
      len
    } else if self.splits_crlf(offset + 1) {
      offset + 2
    } else {
      offset + 1
    }
  }

  /// Grow `range` so neither end splits a CRLF pair.
  pub fn widen_over_crlf(&self, range: Range<usize>) -> Range<usize> {
    if range.is_empty() {
      let at = self.snap_to_boundary(range.start);
      return at..at;
    }
    let start = self.snap_to_boundary(range.start);
    let end = if self.splits_crlf(range.end) {
      range.end + 1
    } else {
      range.end
    };
    start..end
  }

  pub(crate) fn check_range(&self, offset: usize, len: usize) -> Result<()> {
    let max = self.text.len_chars();
    match offset.checked_add(len) {
      Some(end) if end <= max => Ok(()),
      _ => Err(BufferError::OutOfRange { offset, len, max }),
    }
  }

  fn bump(&mut self) {
    self.version = self.version.saturating_add(1);
  }
}

impl From<&str> for TextBuffer {
  fn from(value: &str) -> Self {
    Self {
      text:    Rope::from_str(value),
      version: 0,
    }
  }
}

impl From<Rope> for TextBuffer {
  fn from(text: Rope) -> Self {
    Self { text, version: 0 }
  }
}

impl fmt::Display for TextBuffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for chunk in self.text.chunks() {
      f.write_str(chunk)?;
    }
    Ok(())
  }
}
