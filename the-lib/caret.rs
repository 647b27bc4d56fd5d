use std::fmt;

use ropey::RopeSlice;

use crate::buffer::{
  BufferError,
  Result,
  TextBuffer,
};

/// Caret location. `line` and `column` are 1-based; `column` counts chars
/// since the preceding line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaretPosition {
  pub offset: usize,
  pub line:   usize,
  pub column: usize,
}

impl Default for CaretPosition {
  fn default() -> Self {
    Self {
      offset: 0,
      line:   1,
      column: 1,
    }
  }
}

/// Status line rendering, e.g. `Ln 3, Col 7`.
impl fmt::Display for CaretPosition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Ln {}, Col {}", self.line, self.column)
  }
}

/// Converts a char index into 0-based `(line, column)`.
///
/// `pos` is clamped to the end of the text.
pub fn coords_at_pos(text: RopeSlice, pos: usize) -> (usize, usize) {
  let pos = pos.min(text.len_chars());
  let line = text.char_to_line(pos);
  (line, pos - text.line_to_char(line))
}

/// Convert 0-based `(line, column)` to a char index.
///
/// If `line` exceeds the number of lines, the last line is used. If `column`
/// runs past the line's content, the position before the line ending is used.
pub fn char_idx_at_coords(text: RopeSlice, line: usize, column: usize) -> usize {
  let line = line.min(text.len_lines().saturating_sub(1));
  let line_start = text.line_to_char(line);
  let ending = the_core::line_ending::get_line_ending(&text.line(line))
    .map(|ending| ending.len_chars())
    .unwrap_or(0);
  let line_end = text.line_to_char(line + 1) - ending;
  (line_start + column).min(line_end)
}

#[derive(Debug, Default, Clone)]
pub struct CaretTracker {
  position: CaretPosition,
}

impl CaretTracker {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn position(&self) -> CaretPosition {
    self.position
  }

  #[inline]
  pub fn offset(&self) -> usize {
    self.position.offset
  }

  /// Move the caret to `offset` and recompute line and column.
  pub fn update(&mut self, buffer: &TextBuffer, offset: usize) -> Result<CaretPosition> {
    if offset > buffer.len_chars() {
      return Err(BufferError::OutOfRange {
        offset,
        len: 0,
        max: buffer.len_chars(),
      });
    }
    let (line, column) = coords_at_pos(buffer.text().slice(..), offset);
    self.position = CaretPosition {
      offset,
      line: line + 1,
      column: column + 1,
    };
    Ok(self.position)
  }

  /// Recompute against new content, clamping the offset if the text shrank.
  pub fn refresh(&mut self, buffer: &TextBuffer) -> CaretPosition {
    let offset = self.position.offset.min(buffer.len_chars());
    let (line, column) = coords_at_pos(buffer.text().slice(..), offset);
    self.position = CaretPosition {
      offset,
      line: line + 1,
      column: column + 1,
    };
    self.position
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn origin_is_always_first_line_first_column() {
    for text in ["", "abc", "\n\n\n", "\r\nx", "héllo\nworld"] {
      let buffer = TextBuffer::from(text);
      let mut caret = CaretTracker::new();
      let pos = caret.update(&buffer, 0).unwrap();
      assert_eq!((pos.line, pos.column), (1, 1), "{text:?}");
    }
  }

  #[test]
  fn line_and_column() {
    let buffer = TextBuffer::from("ab\ncd\r\nef");
    let mut caret = CaretTracker::new();

    let pos = caret.update(&buffer, 2).unwrap();
    assert_eq!((pos.line, pos.column), (1, 3));
    let pos = caret.update(&buffer, 3).unwrap();
    assert_eq!((pos.line, pos.column), (2, 1));
    let pos = caret.update(&buffer, 4).unwrap();
    assert_eq!((pos.line, pos.column), (2, 2));
    let pos = caret.update(&buffer, 7).unwrap();
    assert_eq!((pos.line, pos.column), (3, 1));
    let pos = caret.update(&buffer, 9).unwrap();
    assert_eq!((pos.line, pos.column), (3, 3));
    assert_eq!(pos.to_string(), "Ln 3, Col 3");
  }

  #[test]
  fn columns_count_chars() {
    let buffer = TextBuffer::from("日本語\nx");
    let mut caret = CaretTracker::new();
    assert_eq!(caret.update(&buffer, 3).unwrap().column, 4);
  }

  #[test]
  fn update_is_deterministic() {
    let buffer = TextBuffer::from("one\ntwo\nthree");
    let mut a = CaretTracker::new();
    let mut b = CaretTracker::new();
    b.update(&buffer, 11).unwrap();
    assert_eq!(a.update(&buffer, 6).unwrap(), b.update(&buffer, 6).unwrap());
  }

  #[test]
  fn out_of_range_keeps_position() {
    let buffer = TextBuffer::from("abc");
    let mut caret = CaretTracker::new();
    caret.update(&buffer, 2).unwrap();
    assert!(caret.update(&buffer, 4).is_err());
    assert_eq!(caret.offset(), 2);
  }

  #[test]
  fn refresh_clamps() {
    let mut buffer = TextBuffer::from("abc\ndef");
    let mut caret = CaretTracker::new();
    caret.update(&buffer, 7).unwrap();
    buffer.replace_all("x");
    assert_eq!(caret.refresh(&buffer), CaretPosition {
      offset: 1,
      line:   1,
      column: 2,
    });
  }

  #[test]
  fn coords_roundtrip() {
    let buffer = TextBuffer::from("ab\r\ncde\nf");
    let text = buffer.text().slice(..);
    assert_eq!(char_idx_at_coords(text, 1, 2), 6);
    assert_eq!(coords_at_pos(text, 6), (1, 2));
    // Column past the end stops before the line ending.
    assert_eq!(char_idx_at_coords(text, 0, 10), 2);
    // Line past the end uses the last line.
    assert_eq!(char_idx_at_coords(text, 9, 0), 8);
  }
}
