//! Editing session state and transitions.
//!
//! A [`Session`] owns the single open document: its [`TextBuffer`], the
//! [`EditHistory`], the caret, selection, search state and the session fields
//! (current file, font size, status bar visibility). Everything runs on the
//! caller's thread; file, print and clipboard access go through the
//! [`FileSystem`], [`Printer`] and [`Clipboard`] collaborators.
//!
//! # Design
//!
//! - Every mutation goes through a [`Transaction`] that is applied atomically
//!   and recorded as one history entry, then the caret is recomputed and
//!   observers are told about the new buffer version and caret position.
//! - Offsets never land between the `\r` and `\n` of a CRLF pair: carets
//!   snap to the start of the pair and deletions cover the whole pair.
//! - A failed load/save/print/clipboard access leaves buffer, history and session fields as
//!   they were and publishes a user-facing message.
//! - Destructive actions (new, open, close) first pass the unsaved-changes
//!   gate; [`UnsavedChoice::Cancel`] aborts them without side effects.
//!
//! # Example
//!
//! ```ignore
//! let mut session = Session::new(Box::new(fs), Box::new(printer));
//! session.insert("hello")?;
//! session.save_as("notes.txt")?;
//! assert_eq!(session.status_line(), "Ln 1, Col 6");
//! ```

use std::{
  ops::Range,
  path::{
    Path,
    PathBuf,
  },
};

use ropey::Rope;
use the_core::line_ending::{
  LineEnding,
  NATIVE_LINE_ENDING,
  auto_detect_line_ending,
};
use thiserror::Error;

use crate::{
  buffer::{
    BufferError,
    TextBuffer,
  },
  caret::{
    CaretPosition,
    CaretTracker,
    char_idx_at_coords,
  },
  history::EditHistory,
  host::{
    Clipboard,
    FileSystem,
    IoFailure,
    LocalClipboard,
    Printer,
  },
  messages::MessageCenter,
  search::{
    self,
    SearchState,
  },
  transaction::{
    EditOperation,
    Transaction,
  },
};

pub const APP_NAME: &str = "the-notepad";
pub const DEFAULT_FONT_SIZE: u16 = 14;
pub const FONT_SIZE_STEP: u16 = 2;
pub const MIN_FONT_SIZE: u16 = 8;

#[derive(Debug, Error)]
pub enum SessionError {
  #[error(transparent)]
  Io(#[from] IoFailure),
  #[error(transparent)]
  Buffer(#[from] BufferError),
  #[error("buffer has no file name")]
  Untitled,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Receives the only signals the session emits. Both methods default to
/// doing nothing.
pub trait SessionObserver {
  fn on_buffer_changed(&mut self, _version: u64) {}
  fn on_caret_moved(&mut self, _line: usize, _column: usize) {}
}

/// Answer to the unsaved-changes prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsavedChoice {
  /// Save to the current file, then proceed.
  Save,
  /// Save to the given path, then proceed.
  SaveAs(PathBuf),
  /// Drop the changes and proceed.
  Discard,
  /// Abort the action.
  Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Viewing,
  Editing,
  Searching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
  pub current_file:       Option<PathBuf>,
  pub font_size:          u16,
  pub default_font_size:  u16,
  pub status_bar_visible: bool,
}

impl Default for SessionState {
  fn default() -> Self {
    Self {
      current_file:       None,
      font_size:          DEFAULT_FONT_SIZE,
      default_font_size:  DEFAULT_FONT_SIZE,
      status_bar_visible: true,
    }
  }
}

impl SessionState {
  /// File name shown in the title bar.
  pub fn display_name(&self) -> String {
    self
      .current_file
      .as_deref()
      .and_then(Path::file_name)
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "Untitled".to_string())
  }
}

pub struct Session {
  buffer:        TextBuffer,
  history:       EditHistory,
  caret:         CaretTracker,
  search:        SearchState,
  selection:     Option<Range<usize>>,
  state:         SessionState,
  mode:          Mode,
  line_ending:   LineEnding,
  saved_version: u64,
  messages:      MessageCenter,
  observers:     Vec<Box<dyn SessionObserver>>,
  fs:            Box<dyn FileSystem>,
  printer:       Box<dyn Printer>,
  clipboard:     Box<dyn Clipboard>,
}

impl Session {
  pub fn new(fs: Box<dyn FileSystem>, printer: Box<dyn Printer>) -> Self {
    Self {
      buffer: TextBuffer::new(),
      history: EditHistory::default(),
      caret: CaretTracker::new(),
      search: SearchState::new(),
      selection: None,
      state: SessionState::default(),
      mode: Mode::Viewing,
      line_ending: NATIVE_LINE_ENDING,
      saved_version: 0,
      messages: MessageCenter::default(),
      observers: Vec::new(),
      fs,
      printer,
      clipboard: Box::new(LocalClipboard::default()),
    }
  }

  pub fn with_state(mut self, state: SessionState) -> Self {
    self.state = state;
    self
  }

  pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
    self.clipboard = clipboard;
    self
  }

  pub fn with_history_limit(mut self, limit: usize) -> Self {
    self.history.set_limit(limit);
    self
  }

  pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
    self.observers.push(observer);
  }

  pub fn buffer(&self) -> &TextBuffer {
    &self.buffer
  }

  pub fn snapshot(&self) -> Rope {
    self.buffer.read()
  }

  pub fn history(&self) -> &EditHistory {
    &self.history
  }

  pub fn caret(&self) -> CaretPosition {
    self.caret.position()
  }

  pub fn selection(&self) -> Option<Range<usize>> {
    self.selection.clone()
  }

  pub fn search(&self) -> &SearchState {
    &self.search
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn line_ending(&self) -> LineEnding {
    self.line_ending
  }

  pub fn messages(&self) -> &MessageCenter {
    &self.messages
  }

  pub fn messages_mut(&mut self) -> &mut MessageCenter {
    &mut self.messages
  }

  pub fn is_modified(&self) -> bool {
    self.buffer.version() != self.saved_version
  }

  /// `Ln {line}, Col {column}`.
  pub fn status_line(&self) -> String {
    self.caret.position().to_string()
  }

  pub fn title(&self) -> String {
    format!("{} - {APP_NAME}", self.state.display_name())
  }

  // Editing

  /// Apply `transaction` as one undoable step.
  pub fn apply(&mut self, transaction: Transaction) -> Result<()> {
    if transaction.is_empty() {
      return Ok(());
    }
    self.enter(Mode::Editing);
    let result = transaction.apply(&mut self.buffer);
    if let Err(err) = result {
      self.enter(Mode::Viewing);
      return Err(self.internal(err));
    }

    let caret = transaction.caret_after().unwrap_or(self.caret.offset());
    self.history.record_edit(transaction);
    self.after_mutation(caret);
    Ok(())
  }

  /// Insert at the caret and move the caret past the inserted text.
  pub fn insert(&mut self, text: &str) -> Result<()> {
    self.insert_at(self.caret.offset(), text)
  }

  /// Insert at `offset`. An offset inside a CRLF pair inserts before it.
  pub fn insert_at(&mut self, offset: usize, text: &str) -> Result<()> {
    let offset = self.buffer.snap_to_boundary(offset);
    self.apply(EditOperation::insert(offset, text).into())
  }

  /// Insert the document's line ending at the caret.
  pub fn insert_newline(&mut self) -> Result<()> {
    self.insert(self.line_ending.as_str())
  }

  /// Delete `len` chars at `offset`, widened so no CRLF pair is split.
  pub fn delete(&mut self, offset: usize, len: usize) -> Result<()> {
    self
      .buffer
      .check_range(offset, len)
      .map_err(|err| self.internal(err))?;
    let range = self.buffer.widen_over_crlf(offset..offset + len);
    self.delete_range(range)
  }

  /// Delete up to `count` chars after the caret. A CRLF pair counts as one.
  pub fn delete_forward(&mut self, count: usize) -> Result<()> {
    let start = self.caret.offset();
    let mut end = start;
    for _ in 0..count {
      let next = self.buffer.next_boundary(end);
      if next == end {
        break;
      }
      end = next;
    }
    self.delete(start, end - start)
  }

  /// Delete up to `count` chars before the caret. A CRLF pair counts as one.
  pub fn backspace(&mut self, count: usize) -> Result<()> {
    let end = self.caret.offset();
    let mut start = end;
    for _ in 0..count {
      if start == 0 {
        break;
      }
      start = self.buffer.prev_boundary(start);
    }
    self.delete(start, end - start)
  }

  pub fn undo(&mut self) -> Result<bool> {
    let caret = self
      .history
      .peek_undo()
      .and_then(|transaction| transaction.invert().caret_after());
    self.enter(Mode::Editing);
    match self.history.undo(&mut self.buffer) {
      Ok(true) => {
        self.after_mutation(caret.unwrap_or(self.caret.offset()));
        Ok(true)
      },
      Ok(false) => {
        self.enter(Mode::Viewing);
        Ok(false)
      },
      Err(err) => {
        self.enter(Mode::Viewing);
        Err(self.internal(err))
      },
    }
  }

  pub fn redo(&mut self) -> Result<bool> {
    let caret = self.history.peek_redo().and_then(Transaction::caret_after);
    self.enter(Mode::Editing);
    match self.history.redo(&mut self.buffer) {
      Ok(true) => {
        self.after_mutation(caret.unwrap_or(self.caret.offset()));
        Ok(true)
      },
      Ok(false) => {
        self.enter(Mode::Viewing);
        Ok(false)
      },
      Err(err) => {
        self.enter(Mode::Viewing);
        Err(self.internal(err))
      },
    }
  }

  // Caret

  /// Move the caret. An offset inside a CRLF pair moves to its start.
  pub fn move_caret(&mut self, offset: usize) -> Result<CaretPosition> {
    let offset = self.buffer.snap_to_boundary(offset);
    let position = self
      .caret
      .update(&self.buffer, offset)
      .map_err(|err| self.internal(err))?;
    self.selection = None;
    self.notify_caret();
    Ok(position)
  }

  /// Move to a 1-based line and column, clamped to the document.
  pub fn goto_line(&mut self, line: usize, column: usize) -> Result<CaretPosition> {
    let offset = char_idx_at_coords(
      self.buffer.text().slice(..),
      line.saturating_sub(1),
      column.saturating_sub(1),
    );
    self.move_caret(offset)
  }

  // Search

  /// Find the next occurrence of `pattern`.
  ///
  /// A new pattern starts at the beginning of the buffer; repeating the same
  /// pattern continues after the previous match. The match is selected and
  /// the caret moves to its end.
  pub fn find(&mut self, pattern: &str) -> Option<Range<usize>> {
    self.enter(Mode::Searching);
    self.search.set_pattern(pattern);
    let found = self.search.find_next(&self.buffer);
    self.enter(Mode::Viewing);

    match &found {
      Some(range) => self.set_selection(range.clone()),
      None => {
        self.messages.info(format!("Cannot find \"{pattern}\""));
      },
    }
    found
  }

  /// Replace the first occurrence of `pattern` in the buffer. Returns whether
  /// anything was replaced.
  pub fn replace_first(&mut self, pattern: &str, replacement: &str) -> Result<bool> {
    self.enter(Mode::Editing);
    let replaced = search::replace_first(&mut self.buffer, &mut self.history, pattern, replacement)
      .map_err(|err| self.internal(err));
    match replaced {
      Ok(true) => {
        let caret = self
          .history
          .peek_undo()
          .and_then(Transaction::caret_after)
          .unwrap_or(self.caret.offset());
        self.after_mutation(caret);
        Ok(true)
      },
      Ok(false) => {
        self.enter(Mode::Viewing);
        self.messages.info(format!("Cannot find \"{pattern}\""));
        Ok(false)
      },
      Err(err) => {
        self.enter(Mode::Viewing);
        Err(err)
      },
    }
  }

  // Selection and clipboard

  /// Select `range` and put the caret at its end.
  pub fn select(&mut self, range: Range<usize>) -> Result<()> {
    let len = range.end.saturating_sub(range.start);
    self
      .buffer
      .check_range(range.start, len)
      .map_err(|err| self.internal(err))?;
    self.set_selection(range.start..range.start + len);
    Ok(())
  }

  pub fn select_all(&mut self) {
    self.set_selection(0..self.buffer.len_chars());
  }

  pub fn selected_text(&self) -> Option<String> {
    let range = self.selection.clone().filter(|range| !range.is_empty())?;
    self.buffer.slice_to_string(range).ok()
  }

  /// Copy the selection to the clipboard. Returns whether anything was
  /// selected.
  pub fn copy(&mut self) -> Result<bool> {
    let Some(text) = self.selected_text() else {
      return Ok(false);
    };
    if let Err(source) = self.clipboard.set_contents(&text) {
      return Err(self.io_failure(IoFailure::Clipboard(source)));
    }
    tracing::debug!(chars = text.chars().count(), "copied selection");
    Ok(true)
  }

  /// Copy the selection, then delete it as one undoable step.
  pub fn cut(&mut self) -> Result<bool> {
    if !self.copy()? {
      return Ok(false);
    }
    match self.selection.clone() {
      Some(range) => self.delete_range(range).map(|()| true),
      None => Ok(false),
    }
  }

  /// Insert the clipboard contents at the caret, replacing the selection.
  /// Both halves form one undoable step. Returns whether anything was pasted.
  pub fn paste(&mut self) -> Result<bool> {
    let text = match self.clipboard.get_contents() {
      Ok(text) => text,
      Err(source) => return Err(self.io_failure(IoFailure::Clipboard(source))),
    };
    if text.is_empty() {
      return Ok(false);
    }

    let mut transaction = Transaction::new();
    let at = match self.selection.clone().filter(|range| !range.is_empty()) {
      Some(range) => {
        let removed = self
          .buffer
          .slice_to_string(range.clone())
          .map_err(|err| self.internal(err))?;
        transaction.push(EditOperation::delete(range.start, removed));
        range.start
      },
      None => self.caret.offset(),
    };
    transaction.push(EditOperation::insert(at, text));
    self.apply(transaction).map(|()| true)
  }

  // Files

  /// Ask `decide` what to do with unsaved changes. Returns whether the
  /// destructive action may proceed. Unmodified buffers never ask.
  pub fn confirm_discard(&mut self, decide: impl FnOnce(&Self) -> UnsavedChoice) -> Result<bool> {
    if !self.is_modified() {
      return Ok(true);
    }
    match decide(self) {
      UnsavedChoice::Save => self.save().map(|()| true),
      UnsavedChoice::SaveAs(path) => self.save_as(path).map(|()| true),
      UnsavedChoice::Discard => Ok(true),
      UnsavedChoice::Cancel => Ok(false),
    }
  }

  /// Start an empty untitled document.
  pub fn new_file(&mut self, decide: impl FnOnce(&Self) -> UnsavedChoice) -> Result<bool> {
    if !self.confirm_discard(decide)? {
      return Ok(false);
    }
    self.replace_document("", None);
    tracing::info!("new untitled document");
    Ok(true)
  }

  /// Replace the document with the contents of `path`.
  pub fn open(
    &mut self,
    path: impl Into<PathBuf>,
    decide: impl FnOnce(&Self) -> UnsavedChoice,
  ) -> Result<bool> {
    let path = path.into();
    if !self.confirm_discard(decide)? {
      return Ok(false);
    }

    let content = match self.fs.load(&path) {
      Ok(content) => content,
      Err(source) => return Err(self.io_failure(IoFailure::Open { path, source })),
    };
    self.replace_document(&content, Some(path));
    tracing::info!(
      path = ?self.state.current_file,
      chars = self.buffer.len_chars(),
      line_ending = %self.line_ending,
      "opened file"
    );
    Ok(true)
  }

  /// Save to the current file.
  pub fn save(&mut self) -> Result<()> {
    let Some(path) = self.state.current_file.clone() else {
      return Err(SessionError::Untitled);
    };
    self.write_to(&path)
  }

  /// Save to `path` and make it the current file.
  pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
    let path = path.into();
    self.write_to(&path)?;
    self.state.current_file = Some(path);
    Ok(())
  }

  /// Gate for closing the session. Returns whether it may close.
  pub fn close(&mut self, decide: impl FnOnce(&Self) -> UnsavedChoice) -> Result<bool> {
    self.confirm_discard(decide)
  }

  pub fn print(&mut self) -> Result<()> {
    let title = self.title();
    if let Err(source) = self.printer.print(&title, self.buffer.text()) {
      return Err(self.io_failure(IoFailure::Print(source)));
    }
    tracing::info!(%title, "sent document to printer");
    Ok(())
  }

  // Presentation settings

  pub fn increase_font(&mut self) -> u16 {
    self.set_font_size(self.state.font_size.saturating_add(FONT_SIZE_STEP))
  }

  pub fn decrease_font(&mut self) -> u16 {
    self.set_font_size(self.state.font_size.saturating_sub(FONT_SIZE_STEP))
  }

  pub fn reset_font(&mut self) -> u16 {
    self.set_font_size(self.state.default_font_size)
  }

  /// Sizes below [`MIN_FONT_SIZE`] are clamped.
  pub fn set_font_size(&mut self, size: u16) -> u16 {
    self.state.font_size = size.max(MIN_FONT_SIZE);
    self.state.font_size
  }

  pub fn set_status_bar_visible(&mut self, visible: bool) {
    self.state.status_bar_visible = visible;
  }

  // Internals

  fn write_to(&mut self, path: &Path) -> Result<()> {
    if let Err(source) = self.fs.save(path, self.buffer.text()) {
      return Err(self.io_failure(IoFailure::Save {
        path: path.to_path_buf(),
        source,
      }));
    }
    self.saved_version = self.buffer.version();
    tracing::info!(path = %path.display(), version = self.saved_version, "saved file");
    Ok(())
  }

  fn delete_range(&mut self, range: Range<usize>) -> Result<()> {
    let text = self
      .buffer
      .slice_to_string(range.clone())
      .map_err(|err| self.internal(err))?;
    self.apply(EditOperation::delete(range.start, text).into())
  }

  /// Select `range` widened over CRLF pairs, caret at its end.
  fn set_selection(&mut self, range: Range<usize>) {
    let range = self.buffer.widen_over_crlf(range);
    if let Err(err) = self.caret.update(&self.buffer, range.end) {
      self.internal(err);
    }
    self.selection = Some(range);
    self.notify_caret();
  }

  fn replace_document(&mut self, content: &str, path: Option<PathBuf>) {
    self.buffer.replace_all(content);
    self.history.clear();
    self.search.reset();
    self.selection = None;
    self.line_ending = auto_detect_line_ending(self.buffer.text()).unwrap_or(NATIVE_LINE_ENDING);
    self.saved_version = self.buffer.version();
    self.state.current_file = path;
    self.caret = CaretTracker::new();
    self.notify_buffer_changed();
    self.notify_caret();
  }

  fn after_mutation(&mut self, caret: usize) {
    self.search.reset();
    self.selection = None;
    if self.caret.update(&self.buffer, caret).is_err() {
      self.caret.refresh(&self.buffer);
    }
    self.notify_buffer_changed();
    self.notify_caret();
    self.enter(Mode::Viewing);
  }

  fn enter(&mut self, mode: Mode) {
    if self.mode != mode {
      tracing::trace!(from = ?self.mode, to = ?mode, "session mode");
      self.mode = mode;
    }
  }

  fn io_failure(&mut self, failure: IoFailure) -> SessionError {
    tracing::warn!(error = %failure, "{}", failure.user_message());
    self.messages.error(failure.user_message());
    failure.into()
  }

  /// Out-of-range errors mean a caller passed a bad offset. They are logged
  /// and returned, never shown to the user.
  fn internal(&self, err: BufferError) -> SessionError {
    tracing::error!(error = %err, "buffer operation rejected");
    err.into()
  }

  fn notify_buffer_changed(&mut self) {
    let version = self.buffer.version();
    for observer in &mut self.observers {
      observer.on_buffer_changed(version);
    }
  }

  fn notify_caret(&mut self) {
    let CaretPosition { line, column, .. } = self.caret.position();
    for observer in &mut self.observers {
      observer.on_caret_moved(line, column);
    }
  }
}
