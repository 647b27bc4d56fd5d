//! Line commands read from stdin.

use std::{
  path::PathBuf,
  str::FromStr,
};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontChange {
  Increase,
  Decrease,
  Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Insert(String),
  Newline,
  Delete(usize),
  Backspace(usize),
  Goto(usize),
  Line(usize),
  Find(String),
  Next,
  Replace {
    pattern:     String,
    replacement: String,
  },
  Select {
    start: usize,
    end:   usize,
  },
  SelectAll,
  Cut,
  Copy,
  Paste,
  Undo,
  Redo,
  New,
  Open(PathBuf),
  Save,
  SaveAs(PathBuf),
  Print,
  Font(FontChange),
  Status(bool),
  Show,
  About,
  Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("empty command")]
  Empty,
  #[error("unknown command '{0}'")]
  Unknown(String),
  #[error("'{0}' needs an argument")]
  MissingArgument(&'static str),
  #[error("'{command}' does not take '{value}'")]
  InvalidArgument {
    command: &'static str,
    value:   String,
  },
}

const REPLACE_SEPARATOR: &str = " => ";

impl FromStr for Command {
  type Err = ParseError;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
      return Err(ParseError::Empty);
    }
    // Only the single separating space is dropped so text keeps its spacing.
    let (name, rest) = match trimmed.split_once(' ') {
      Some((name, rest)) => (name, Some(rest)),
      None => (trimmed, None),
    };

    let command = match name {
      "insert" => Self::Insert(unescape(required("insert", rest)?)),
      "newline" => Self::Newline,
      "delete" => Self::Delete(count("delete", rest)?),
      "backspace" => Self::Backspace(count("backspace", rest)?),
      "goto" => Self::Goto(number("goto", required("goto", rest)?)?),
      "line" => Self::Line(number("line", required("line", rest)?)?),
      "find" => Self::Find(unescape(required("find", rest)?)),
      "next" => Self::Next,
      "replace" => {
        let rest = required("replace", rest)?;
        let (pattern, replacement) = rest.split_once(REPLACE_SEPARATOR).ok_or_else(|| {
          ParseError::InvalidArgument {
            command: "replace",
            value:   rest.to_string(),
          }
        })?;
        if pattern.is_empty() {
          return Err(ParseError::MissingArgument("replace"));
        }
        Self::Replace {
          pattern:     unescape(pattern),
          replacement: unescape(replacement),
        }
      },
      "select" => {
        let rest = required("select", rest)?;
        let (start, end) = rest.trim().split_once(' ').ok_or(ParseError::MissingArgument("select"))?;
        Self::Select {
          start: number("select", start)?,
          end:   number("select", end)?,
        }
      },
      "selectall" => Self::SelectAll,
      "cut" => Self::Cut,
      "copy" => Self::Copy,
      "paste" => Self::Paste,
      "undo" => Self::Undo,
      "redo" => Self::Redo,
      "new" => Self::New,
      "open" => Self::Open(PathBuf::from(required("open", rest)?.trim())),
      "save" => Self::Save,
      "saveas" => Self::SaveAs(PathBuf::from(required("saveas", rest)?.trim())),
      "print" => Self::Print,
      "font" => {
        match required("font", rest)?.trim() {
          "+" => Self::Font(FontChange::Increase),
          "-" => Self::Font(FontChange::Decrease),
          "reset" => Self::Font(FontChange::Reset),
          other => {
            return Err(ParseError::InvalidArgument {
              command: "font",
              value:   other.to_string(),
            });
          },
        }
      },
      "status" => {
        match required("status", rest)?.trim() {
          "on" => Self::Status(true),
          "off" => Self::Status(false),
          other => {
            return Err(ParseError::InvalidArgument {
              command: "status",
              value:   other.to_string(),
            });
          },
        }
      },
      "show" => Self::Show,
      "about" => Self::About,
      "quit" | "exit" => Self::Quit,
      other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
  }
}

fn required<'a>(command: &'static str, rest: Option<&'a str>) -> Result<&'a str, ParseError> {
  rest
    .filter(|rest| !rest.is_empty())
    .ok_or(ParseError::MissingArgument(command))
}

fn number(command: &'static str, value: &str) -> Result<usize, ParseError> {
  value
    .trim()
    .parse()
    .map_err(|_| ParseError::InvalidArgument {
      command,
      value: value.to_string(),
    })
}

/// Optional repeat count, 1 when absent.
fn count(command: &'static str, rest: Option<&str>) -> Result<usize, ParseError> {
  match rest.map(str::trim).filter(|rest| !rest.is_empty()) {
    Some(value) => number(command, value),
    None => Ok(1),
  }
}

/// Expand `\n`, `\t` and `\\`. Other backslashes are kept as written.
pub fn unescape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars();
  while let Some(ch) = chars.next() {
    if ch != '\\' {
      out.push(ch);
      continue;
    }
    match chars.next() {
      Some('n') => out.push('\n'),
      Some('t') => out.push('\t'),
      Some('\\') => out.push('\\'),
      Some(other) => {
        out.push('\\');
        out.push(other);
      },
      None => out.push('\\'),
    }
  }
  out
}
