//! Command loop: reads [`Command`]s, drives the [`Session`] and renders the
//! title, status line and notices as plain text.

use std::{
  io::{
    BufRead,
    Write,
  },
  path::PathBuf,
};

use eyre::Result;
use the_lib::session::{
  APP_NAME,
  Session,
  SessionError,
  SessionObserver,
  UnsavedChoice,
};

use crate::command::{
  Command,
  FontChange,
  ParseError,
};

/// Mirrors session signals into the log.
pub struct LogObserver;

impl SessionObserver for LogObserver {
  fn on_buffer_changed(&mut self, version: u64) {
    log::trace!("buffer changed: version {version}");
  }

  fn on_caret_moved(&mut self, line: usize, column: usize) {
    log::trace!("caret moved: Ln {line}, Col {column}");
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
  Continue,
  Quit,
}

pub struct App<R, W> {
  session: Session,
  input:   R,
  output:  W,
}

impl<R: BufRead, W: Write> App<R, W> {
  pub fn new(session: Session, input: R, output: W) -> Self {
    Self {
      session,
      input,
      output,
    }
  }

  pub fn into_output(self) -> W {
    self.output
  }

  /// Open the file named on the command line. A missing file leaves an empty
  /// document with the failure shown as a notice.
  pub fn open_initial(&mut self, path: PathBuf) -> Result<()> {
    let result = self.session.open(path, |_| UnsavedChoice::Discard);
    self.report(result.map(|_| ()))?;
    self.render_status()
  }

  pub fn run(&mut self) -> Result<()> {
    writeln!(self.output, "{}", self.session.title())?;
    let mut line = String::new();
    loop {
      line.clear();
      if self.input.read_line(&mut line)? == 0 {
        if self.session.is_modified() {
          log::warn!("input closed with unsaved changes");
          writeln!(
            self.output,
            "Unsaved changes to {} were not saved.",
            self.session.state().display_name()
          )?;
        }
        break;
      }

      let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(ParseError::Empty) => continue,
        Err(err) => {
          writeln!(self.output, "error: {err}")?;
          continue;
        },
      };
      log::debug!("command: {command:?}");

      if self.execute(command)? == Flow::Quit {
        break;
      }
      self.render_status()?;
    }
    self.output.flush()?;
    Ok(())
  }

  fn execute(&mut self, command: Command) -> Result<Flow> {
    let result = match command {
      Command::Insert(text) => self.session.insert(&text),
      Command::Newline => self.session.insert_newline(),
      Command::Delete(count) => self.session.delete_forward(count),
      Command::Backspace(count) => self.session.backspace(count),
      Command::Goto(offset) => self.session.move_caret(offset).map(|_| ()),
      Command::Line(line) => self.session.goto_line(line, 1).map(|_| ()),
      Command::Find(pattern) => {
        self.session.find(&pattern);
        Ok(())
      },
      Command::Next => {
        let pattern = self.session.search().pattern().to_string();
        if pattern.is_empty() {
          self.session.messages_mut().info("Nothing to find");
        } else {
          self.session.find(&pattern);
        }
        Ok(())
      },
      Command::Replace {
        pattern,
        replacement,
      } => {
        self
          .session
          .replace_first(&pattern, &replacement)
          .map(|_| ())
      },
      Command::Select { start, end } => self.session.select(start..end),
      Command::SelectAll => {
        self.session.select_all();
        Ok(())
      },
      Command::Cut => {
        let cut = self.session.cut();
        self.notice_unless_done(cut, "Nothing selected")
      },
      Command::Copy => {
        let copied = self.session.copy();
        self.notice_unless_done(copied, "Nothing selected")
      },
      Command::Paste => {
        let pasted = self.session.paste();
        self.notice_unless_done(pasted, "Clipboard is empty")
      },
      Command::Undo => self.session.undo().map(|_| ()),
      Command::Redo => self.session.redo().map(|_| ()),
      Command::New => {
        self
          .session
          .new_file(|session| prompt_unsaved(&mut self.input, &mut self.output, session))
          .map(|_| ())
      },
      Command::Open(path) => {
        self
          .session
          .open(path, |session| {
            prompt_unsaved(&mut self.input, &mut self.output, session)
          })
          .map(|_| ())
      },
      Command::Save => {
        match self.session.save() {
          Err(SessionError::Untitled) => {
            match read_path(&mut self.input, &mut self.output, "Save as: ")? {
              Some(path) => self.session.save_as(path),
              None => Ok(()),
            }
          },
          other => other,
        }
      },
      Command::SaveAs(path) => self.session.save_as(path),
      Command::Print => self.session.print(),
      Command::Font(change) => {
        let size = match change {
          FontChange::Increase => self.session.increase_font(),
          FontChange::Decrease => self.session.decrease_font(),
          FontChange::Reset => self.session.reset_font(),
        };
        writeln!(self.output, "Font size: {size}")?;
        Ok(())
      },
      Command::Status(visible) => {
        self.session.set_status_bar_visible(visible);
        Ok(())
      },
      Command::Show => {
        write!(self.output, "{}", self.session.buffer())?;
        if !self.session.buffer().is_empty() {
          writeln!(self.output)?;
        }
        Ok(())
      },
      Command::About => {
        writeln!(
          self.output,
          "{APP_NAME} {}: a plain text notepad",
          env!("CARGO_PKG_VERSION")
        )?;
        Ok(())
      },
      Command::Quit => {
        let closed = self
          .session
          .close(|session| prompt_unsaved(&mut self.input, &mut self.output, session));
        match closed {
          Ok(true) => return Ok(Flow::Quit),
          other => other.map(|_| ()),
        }
      },
    };

    self.report(result)?;
    Ok(Flow::Continue)
  }

  fn notice_unless_done(
    &mut self,
    result: the_lib::session::Result<bool>,
    notice: &str,
  ) -> the_lib::session::Result<()> {
    if let Ok(false) = result {
      self.session.messages_mut().info(notice);
    }
    result.map(|_| ())
  }

  /// Print pending notices. I/O failures are already published as messages;
  /// anything else is a rejected command.
  fn report(&mut self, result: the_lib::session::Result<()>) -> Result<()> {
    match result {
      Ok(()) | Err(SessionError::Io(_)) => {},
      Err(err) => writeln!(self.output, "error: {err}")?,
    }
    if let Some(message) = self.session.messages_mut().dismiss_active() {
      writeln!(self.output, "{}", message.text)?;
    }
    Ok(())
  }

  fn render_status(&mut self) -> Result<()> {
    if !self.session.state().status_bar_visible {
      return Ok(());
    }
    let modified = if self.session.is_modified() { "*" } else { "" };
    writeln!(
      self.output,
      "[{}{modified}] {}",
      self.session.title(),
      self.session.status_line()
    )?;
    Ok(())
  }
}

/// Ask what to do with unsaved changes. End of input cancels.
fn prompt_unsaved<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  session: &Session,
) -> UnsavedChoice {
  loop {
    let question = format!(
      "Save changes to {}? [y/n/c] ",
      session.state().display_name()
    );
    let Ok(Some(answer)) = read_answer(input, output, &question) else {
      return UnsavedChoice::Cancel;
    };
    match answer.to_lowercase().as_str() {
      "y" | "yes" => {
        if session.state().current_file.is_some() {
          return UnsavedChoice::Save;
        }
        return match read_path(input, output, "Save as: ") {
          Ok(Some(path)) => UnsavedChoice::SaveAs(path),
          _ => UnsavedChoice::Cancel,
        };
      },
      "n" | "no" => return UnsavedChoice::Discard,
      "c" | "cancel" => return UnsavedChoice::Cancel,
      _ => continue,
    }
  }
}

fn read_path<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  question: &str,
) -> std::io::Result<Option<PathBuf>> {
  Ok(read_answer(input, output, question)?.map(PathBuf::from))
}

/// `None` on end of input or an empty answer.
fn read_answer<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  question: &str,
) -> std::io::Result<Option<String>> {
  write!(output, "{question}")?;
  output.flush()?;
  let mut answer = String::new();
  if input.read_line(&mut answer)? == 0 {
    return Ok(None);
  }
  let answer = answer.trim();
  Ok((!answer.is_empty()).then(|| answer.to_string()))
}
