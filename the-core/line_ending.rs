use std::fmt;

use ropey::{
  Rope,
  RopeSlice,
};

#[cfg(target_os = "windows")]
pub const NATIVE_LINE_ENDING: LineEnding = LineEnding::Crlf;

#[cfg(not(target_os = "windows"))]
pub const NATIVE_LINE_ENDING: LineEnding = LineEnding::LF;

/// The line breaks the buffer recognizes. These match the set ropey is
/// compiled to count (`cr_lines`), so line queries and line endings agree.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,

  /// U+000D -- CarriageReturn
  CR,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Crlf => "\u{000D}\u{000A}",
      Self::LF => "\u{000A}",
      Self::CR => "\u{000D}",
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      '\u{000D}' => Some(LineEnding::CR),
      _ => None,
    }
  }

  // Normally we'd want to implement the FromStr trait, but in this case
  // that would force us into a different return type than from_char or
  // or from_rope_slice, which would be weird.
  #[allow(clippy::should_implement_trait)]
  #[inline]
  pub fn from_str(g: &str) -> Option<LineEnding> {
    match g {
      "\u{000D}\u{000A}" => Some(LineEnding::Crlf),
      "\u{000A}" => Some(LineEnding::LF),
      "\u{000D}" => Some(LineEnding::CR),
      _ => None,
    }
  }

  #[inline]
  pub fn from_rope_slice(g: &RopeSlice) -> Option<LineEnding> {
    if let Some(text) = g.as_str() {
      LineEnding::from_str(text)
    } else {
      // Non-contiguous, so it can't be a line ending. Ropey keeps CRLF
      // contiguous and the other endings are single chars.
      None
    }
  }
}

impl fmt::Display for LineEnding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Crlf => write!(f, "CRLF"),
      Self::LF => write!(f, "LF"),
      Self::CR => write!(f, "CR"),
    }
  }
}

/// Attempts to detect what line ending the passed document uses.
///
/// Only the first hundred lines are inspected; the first ending found wins.
pub fn auto_detect_line_ending(doc: &Rope) -> Option<LineEnding> {
  doc
    .lines()
    .take(100)
    .find_map(|line| get_line_ending(&line))
}

/// Returns the passed line's line ending, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  if len == 0 {
    return None;
  }

  // Last 2 chars as str, or empty str if they're not contiguous.
  // It's fine to punt on the non-contiguous case, because Ropey guarantees
  // that CRLF is always contiguous.
  let g2 = line.slice(len.saturating_sub(2)..).as_str().unwrap_or("");

  // First check the 2-character case for CRLF, then check the single-character
  // case.
  LineEnding::from_str(g2).or_else(|| LineEnding::from_char(line.char(len - 1)))
}

#[cfg(test)]
mod line_ending_tests {
  use super::*;

  #[test]
  fn line_ending_autodetect() {
    assert_eq!(
      auto_detect_line_ending(&Rope::from_str("\n")),
      Some(LineEnding::LF)
    );
    assert_eq!(
      auto_detect_line_ending(&Rope::from_str("\r\n")),
      Some(LineEnding::Crlf)
    );
    assert_eq!(
      auto_detect_line_ending(&Rope::from_str("one\rtwo")),
      Some(LineEnding::CR)
    );
    assert_eq!(auto_detect_line_ending(&Rope::from_str("hello")), None);
    assert_eq!(auto_detect_line_ending(&Rope::from_str("")), None);
  }

  #[test]
  fn str_to_line_ending() {
    assert_eq!(LineEnding::from_str("\r"), Some(LineEnding::CR));
    assert_eq!(LineEnding::from_str("\n"), Some(LineEnding::LF));
    assert_eq!(LineEnding::from_str("\r\n"), Some(LineEnding::Crlf));
    assert_eq!(LineEnding::from_str("hello\n"), None);
  }

  #[test]
  fn rope_slice_to_line_ending() {
    let r = Rope::from_str("hello\r\n");

    assert_eq!(
      LineEnding::from_rope_slice(&r.slice(5..6)),
      Some(LineEnding::CR)
    );
    assert_eq!(
      LineEnding::from_rope_slice(&r.slice(5..7)),
      Some(LineEnding::Crlf)
    );
    assert_eq!(LineEnding::from_rope_slice(&r.slice(0..5)), None);
  }

  #[test]
  fn get_line_ending_rope_slice() {
    let r = Rope::from_str("Hello\rworld\nhow\r\nare you?");

    assert_eq!(get_line_ending(&r.slice(..6)), Some(LineEnding::CR));
    assert_eq!(get_line_ending(&r.slice(..12)), Some(LineEnding::LF));
    assert_eq!(get_line_ending(&r.slice(..17)), Some(LineEnding::Crlf));
    assert_eq!(get_line_ending(&r.slice(..)), None);
    assert_eq!(get_line_ending(&r.slice(0..0)), None);
  }

  #[test]
  fn display_names() {
    assert_eq!(LineEnding::Crlf.to_string(), "CRLF");
    assert_eq!(LineEnding::LF.to_string(), "LF");
    assert_eq!(LineEnding::CR.to_string(), "CR");
  }
}
