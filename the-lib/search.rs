//! Literal substring search over a rope.
//!
//! Patterns are matched char for char and case-sensitively; there is no
//! pattern language. The scan walks the rope's chars once using a
//! Knuth-Morris-Pratt failure table, so it is linear in the searched text and
//! never copies the buffer.
//!
//! # Examples
//!
//! ```ignore
//! use the_lib::{buffer::TextBuffer, search::find};
//!
//! let text = TextBuffer::from("xxabcyyabc");
//! assert_eq!(find(&text, "abc", 0), Some(2..5));
//! assert_eq!(find(&text, "abc", 5), Some(7..10));
//! assert_eq!(find(&text, "abc", 10), None);
//! ```
//!
//! Positions are char indices and ranges are half-open. Searching never wraps
//! around the end of the buffer, and an empty pattern never matches.

use std::ops::Range;

use ropey::RopeSlice;

use crate::{
  Tendril,
  buffer::{
    Result,
    TextBuffer,
  },
  history::EditHistory,
  transaction::{
    EditOperation,
    Transaction,
  },
};

/// A compiled literal pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
  needle: Vec<char>,
  // table[i] is the length of the longest proper prefix of needle[..=i]
  // that is also a suffix of it.
  table:  Vec<usize>,
}

impl Literal {
  /// `None` for the empty pattern.
  pub fn new(pattern: &str) -> Option<Self> {
    let needle: Vec<char> = pattern.chars().collect();
    if needle.is_empty() {
      return None;
    }

    let mut table = vec![0; needle.len()];
    let mut k = 0;
    for i in 1..needle.len() {
      while k > 0 && needle[i] != needle[k] {
        k = table[k - 1];
      }
      if needle[i] == needle[k] {
        k += 1;
      }
      table[i] = k;
    }

    Some(Self { needle, table })
  }

  /// Length of the pattern in chars.
  #[inline]
  pub fn len_chars(&self) -> usize {
    self.needle.len()
  }

  /// First occurrence starting at or after `from`.
  pub fn find_in(&self, text: RopeSlice, from: usize) -> Option<Range<usize>> {
    if from > text.len_chars() {
      return None;
    }

    let mut matched = 0;
    for (i, ch) in text.chars_at(from).enumerate() {
      while matched > 0 && self.needle[matched] != ch {
        matched = self.table[matched - 1];
      }
      if self.needle[matched] == ch {
        matched += 1;
      }
      if matched == self.needle.len() {
        let end = from + i + 1;
        return Some(end - matched..end);
      }
    }

    None
  }
}

/// Find the first occurrence of `pattern` at or after `from`.
pub fn find(buffer: &TextBuffer, pattern: &str, from: usize) -> Option<Range<usize>> {
  Literal::new(pattern)?.find_in(buffer.text().slice(..), from)
}

/// Replace the first occurrence of `pattern` (searching from the start) with
/// `replacement`.
///
/// The delete and the insert are applied together and recorded as a single
/// history entry, so one undo restores the original text. Returns whether a
/// replacement happened.
pub fn replace_first(
  buffer: &mut TextBuffer,
  history: &mut EditHistory,
  pattern: &str,
  replacement: &str,
) -> Result<bool> {
  let Some(range) = find(buffer, pattern, 0) else {
    return Ok(false);
  };

  let matched = buffer.slice_to_string(range.clone())?;
  let transaction = Transaction::new()
    .with(EditOperation::delete(range.start, matched))
    .with(EditOperation::insert(range.start, replacement));
  transaction.apply(buffer)?;
  history.record_edit(transaction);
  Ok(true)
}

/// Search state kept between invocations of find-next.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
  pattern:    Tendril,
  literal:    Option<Literal>,
  last_match: Option<Range<usize>>,
}

impl SearchState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  pub fn last_match(&self) -> Option<Range<usize>> {
    self.last_match.clone()
  }

  /// Change the pattern. The last match is forgotten only if the pattern is
  /// actually different.
  pub fn set_pattern(&mut self, pattern: &str) {
    if self.pattern.as_str() == pattern {
      return;
    }
    self.pattern = pattern.into();
    self.literal = Literal::new(pattern);
    self.last_match = None;
  }

  /// Search from `from` and remember the result.
  pub fn find_from(&mut self, buffer: &TextBuffer, from: usize) -> Option<Range<usize>> {
    self.last_match = self
      .literal
      .as_ref()
      .and_then(|literal| literal.find_in(buffer.text().slice(..), from));
    self.last_match.clone()
  }

  /// Continue after the last match, or from the start if there is none.
  pub fn find_next(&mut self, buffer: &TextBuffer) -> Option<Range<usize>> {
    let from = self.last_match.as_ref().map_or(0, |range| range.end);
    self.find_from(buffer, from)
  }

  pub fn reset(&mut self) {
    self.last_match = None;
  }
}
