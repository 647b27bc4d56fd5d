//! External commands used by the print and clipboard providers.

use std::{
  borrow::Cow,
  io::{
    self,
    Write,
  },
  process::{
    Child,
    Command as ProcessCommand,
    Stdio,
  },
};

use ropey::Rope;
use serde::{
  Deserialize,
  Serialize,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalCommand {
  pub command: Cow<'static, str>,
  #[serde(default)]
  pub args:    Vec<Cow<'static, str>>,
}

impl ExternalCommand {
  pub fn new(
    command: impl Into<Cow<'static, str>>,
    args: impl IntoIterator<Item = impl Into<Cow<'static, str>>>,
  ) -> Self {
    Self {
      command: command.into(),
      args:    args.into_iter().map(Into::into).collect(),
    }
  }

  /// Copy with every `placeholder` in the arguments replaced by `value`.
  pub fn substitute(&self, placeholder: &str, value: &str) -> Self {
    Self {
      command: self.command.clone(),
      args:    self
        .args
        .iter()
        .map(|arg| Cow::Owned(arg.replace(placeholder, value)))
        .collect(),
    }
  }

  /// Run the command, piping `input` to its stdin. With `capture_output` the
  /// command's stdout is returned as UTF-8 text. A non-zero exit is an error.
  ///
  /// The child is always waited on, also when feeding its stdin fails.
  pub fn execute(&self, input: Option<&Rope>, capture_output: bool) -> io::Result<Option<String>> {
    let stdin = if input.is_some() {
      Stdio::piped()
    } else {
      Stdio::null()
    };
    let stdout = if capture_output {
      Stdio::piped()
    } else {
      Stdio::null()
    };

    tracing::debug!(command = %self.command, "spawning command");
    let mut child = ProcessCommand::new(&*self.command)
      .args(self.args.iter().map(|arg| &**arg))
      .stdin(stdin)
      .stdout(stdout)
      .stderr(Stdio::null())
      .spawn()?;

    if let Some(input) = input {
      if let Err(err) = write_input(&mut child, input) {
        let _ = child.kill();
        let _ = child.wait();
        return Err(err);
      }
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
      return Err(io::Error::other(format!(
        "`{}` exited with {}",
        self.command, output.status
      )));
    }

    if !capture_output {
      return Ok(None);
    }
    String::from_utf8(output.stdout)
      .map(Some)
      .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
  }
}

/// Feed `input` to the child and close its stdin so it sees EOF.
fn write_input(child: &mut Child, input: &Rope) -> io::Result<()> {
  let mut stdin = child
    .stdin
    .take()
    .ok_or_else(|| io::Error::other("command has no stdin"))?;
  for chunk in input.chunks() {
    stdin.write_all(chunk.as_bytes())?;
  }
  Ok(())
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  #[test]
  fn captures_output() {
    let cat = ExternalCommand::new("cat", Vec::<String>::new());
    let out = cat.execute(Some(&Rope::from("a\r\nb")), true).unwrap();
    assert_eq!(out.as_deref(), Some("a\r\nb"));

    let echo = ExternalCommand::new("echo", ["{word}"]).substitute("{word}", "hi");
    assert_eq!(echo.execute(None, true).unwrap().as_deref(), Some("hi\n"));
    assert_eq!(echo.execute(None, false).unwrap(), None);
  }

  #[test]
  fn failures() {
    let fail = ExternalCommand::new("sh", ["-c", "exit 3"]);
    let err = fail.execute(None, false).unwrap_err();
    assert!(err.to_string().contains("exited with"));

    let missing = ExternalCommand::new("/nonexistent/tool", Vec::<String>::new());
    assert!(missing.execute(None, false).is_err());
  }

  #[test]
  fn child_that_ignores_stdin_is_reaped() {
    // Larger than any pipe buffer, so the write fails once the child exits.
    let input = Rope::from("x".repeat(4 << 20));
    let quitter = ExternalCommand::new("sh", ["-c", "exit 0"]);
    assert!(quitter.execute(Some(&input), false).is_err());
  }
}
