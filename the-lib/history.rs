use std::collections::VecDeque;

use crate::{
  buffer::{
    Result,
    TextBuffer,
  },
  transaction::Transaction,
};

/// Undo depth used when none is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Stores the reversible edits made to a buffer.
///
/// The history is two stacks of [`Transaction`]s. `past` holds what can be
/// undone (most recent at the back) and `future` holds what has been undone
/// and can be redone.
///
/// Undo applies the inverse of the newest `past` entry and moves it to
/// `future`; redo reapplies the newest `future` entry and moves it back.
/// Recording a new edit clears `future`, so the redo path is lost as soon as
/// new work happens after an undo.
///
/// The stacks are only touched after the buffer has accepted the change, so a
/// failed apply leaves both the buffer and the history as they were.
///
/// `past` is bounded by `limit`; once full, the oldest entry is forgotten.
#[derive(Debug)]
pub struct EditHistory {
  past:   VecDeque<Transaction>,
  future: Vec<Transaction>,
  limit:  usize,
}

impl Default for EditHistory {
  fn default() -> Self {
    Self::with_limit(DEFAULT_HISTORY_LIMIT)
  }
}

impl EditHistory {
  pub fn with_limit(limit: usize) -> Self {
    Self {
      past:   VecDeque::new(),
      future: Vec::new(),
      limit:  limit.max(1),
    }
  }

  #[inline]
  pub fn limit(&self) -> usize {
    self.limit
  }

  pub fn set_limit(&mut self, limit: usize) {
    self.limit = limit.max(1);
    self.trim();
  }

  /// Push an already applied edit. Empty transactions are ignored.
  pub fn record_edit(&mut self, transaction: impl Into<Transaction>) {
    let transaction = transaction.into();
    if transaction.is_empty() {
      return;
    }
    self.past.push_back(transaction);
    self.future.clear();
    self.trim();
  }

  /// Revert the newest edit. Returns `Ok(false)` when there is nothing to
  /// undo.
  pub fn undo(&mut self, buffer: &mut TextBuffer) -> Result<bool> {
    let Some(transaction) = self.past.back() else {
      return Ok(false);
    };
    transaction.invert().apply(buffer)?;

    if let Some(transaction) = self.past.pop_back() {
      self.future.push(transaction);
    }
    Ok(true)
  }

  /// Reapply the most recently undone edit. Returns `Ok(false)` when there is
  /// nothing to redo.
  pub fn redo(&mut self, buffer: &mut TextBuffer) -> Result<bool> {
    let Some(transaction) = self.future.last() else {
      return Ok(false);
    };
    transaction.apply(buffer)?;

    if let Some(transaction) = self.future.pop() {
      self.past.push_back(transaction);
    }
    Ok(true)
  }

  /// The entry the next undo would revert.
  pub fn peek_undo(&self) -> Option<&Transaction> {
    self.past.back()
  }

  /// The entry the next redo would reapply.
  pub fn peek_redo(&self) -> Option<&Transaction> {
    self.future.last()
  }

  #[inline]
  pub fn can_undo(&self) -> bool {
    !self.past.is_empty()
  }

  #[inline]
  pub fn can_redo(&self) -> bool {
    !self.future.is_empty()
  }

  #[inline]
  pub fn past_len(&self) -> usize {
    self.past.len()
  }

  #[inline]
  pub fn future_len(&self) -> usize {
    self.future.len()
  }

  /// Forget everything, e.g. after the buffer was replaced wholesale.
  pub fn clear(&mut self) {
    self.past.clear();
    self.future.clear();
  }

  fn trim(&mut self) {
    while self.past.len() > self.limit {
      self.past.pop_front();
    }
  }
}

#[cfg(test)]
mod test {
  use quickcheck::{
    Arbitrary,
    Gen,
    quickcheck,
  };

  use super::*;
  use crate::transaction::EditOperation;

  fn edit(history: &mut EditHistory, buffer: &mut TextBuffer, op: EditOperation) {
    let tx = Transaction::from(op);
    tx.apply(buffer).unwrap();
    history.record_edit(tx);
  }

  #[test]
  fn test_undo_redo() {
    let mut history = EditHistory::default();
    let mut buffer = TextBuffer::from("hello");

    assert!(!history.undo(&mut buffer).unwrap());
    assert!(!history.redo(&mut buffer).unwrap());

    edit(&mut history, &mut buffer, EditOperation::insert(5, " world!"));
    edit(&mut history, &mut buffer, EditOperation::delete(6, "world"));
    edit(&mut history, &mut buffer, EditOperation::insert(6, "世界"));
    assert_eq!(buffer.to_string(), "hello 世界!");

    assert!(history.undo(&mut buffer).unwrap());
    assert_eq!(buffer.to_string(), "hello !");
    assert!(history.undo(&mut buffer).unwrap());
    assert_eq!(buffer.to_string(), "hello world!");
    assert!(history.undo(&mut buffer).unwrap());
    assert_eq!(buffer.to_string(), "hello");
    assert!(!history.can_undo());

    assert!(history.redo(&mut buffer).unwrap());
    assert_eq!(buffer.to_string(), "hello world!");
    assert_eq!(history.past_len(), 1);
    assert_eq!(history.future_len(), 2);
  }

  #[test]
  fn test_new_edit_clears_future() {
    let mut history = EditHistory::default();
    let mut buffer = TextBuffer::from("abc");

    edit(&mut history, &mut buffer, EditOperation::insert(3, "d"));
    history.undo(&mut buffer).unwrap();
    assert!(history.can_redo());

    edit(&mut history, &mut buffer, EditOperation::insert(0, "z"));
    assert!(!history.can_redo());
    assert!(!history.redo(&mut buffer).unwrap());
    assert_eq!(buffer.to_string(), "zabc");
  }

  #[test]
  fn test_failed_undo_does_not_mutate() {
    let mut history = EditHistory::default();
    let mut buffer = TextBuffer::from("abc");
    edit(&mut history, &mut buffer, EditOperation::insert(3, "def"));

    // Change the buffer behind the history's back.
    buffer.replace_all("x");
    let version = buffer.version();

    assert!(history.undo(&mut buffer).is_err());
    assert_eq!(buffer.to_string(), "x");
    assert_eq!(buffer.version(), version);
    assert_eq!(history.past_len(), 1);
    assert_eq!(history.future_len(), 0);
  }

  #[test]
  fn test_limit_drops_oldest() {
    let mut history = EditHistory::with_limit(2);
    let mut buffer = TextBuffer::new();
    for (i, s) in ["a", "b", "c"].iter().enumerate() {
      edit(&mut history, &mut buffer, EditOperation::insert(i, *s));
    }
    assert_eq!(history.past_len(), 2);

    while history.undo(&mut buffer).unwrap() {}
    assert_eq!(buffer.to_string(), "a");

    history.set_limit(0);
    assert_eq!(history.limit(), 1);
  }

  #[test]
  fn test_empty_transaction_ignored() {
    let mut history = EditHistory::default();
    history.record_edit(Transaction::new());
    assert!(!history.can_undo());
  }

  /// A random edit, resolved against the buffer at apply time so that it is
  /// always in range.
  #[derive(Debug, Clone)]
  enum Step {
    Insert { at: usize, text: String },
    Delete { at: usize, len: usize },
  }

  impl Arbitrary for Step {
    fn arbitrary(g: &mut Gen) -> Self {
      if bool::arbitrary(g) {
        Step::Insert {
          at:   usize::arbitrary(g),
          text: String::arbitrary(g),
        }
      } else {
        Step::Delete {
          at:  usize::arbitrary(g),
          len: usize::arbitrary(g) % 8,
        }
      }
    }
  }

  fn resolve(step: &Step, buffer: &TextBuffer) -> EditOperation {
    let len = buffer.len_chars();
    match step {
      Step::Insert { at, text } => EditOperation::insert(at % (len + 1), text.as_str()),
      Step::Delete { at, len: n } => {
        let start = at % (len + 1);
        let end = (start + n).min(len);
        EditOperation::delete(start, buffer.slice_to_string(start..end).unwrap())
      },
    }
  }

  quickcheck! {
    fn undo_restores_every_snapshot(initial: String, steps: Vec<Step>) -> bool {
      let mut history = EditHistory::with_limit(usize::MAX);
      let mut buffer = TextBuffer::from(initial.as_str());
      let mut snapshots = Vec::new();

      for step in &steps {
        let op = resolve(step, &buffer);
        // No-op edits never reach the history.
        if !op.is_noop() {
          snapshots.push(buffer.to_string());
        }
        edit(&mut history, &mut buffer, op);
      }

      while let Some(expected) = snapshots.pop() {
        if !history.undo(&mut buffer).unwrap() || buffer.to_string() != expected {
          return false;
        }
      }
      !history.undo(&mut buffer).unwrap() && buffer.to_string() == initial
    }

    fn redo_after_undo_is_identity(initial: String, steps: Vec<Step>) -> bool {
      let mut history = EditHistory::with_limit(usize::MAX);
      let mut buffer = TextBuffer::from(initial.as_str());
      for step in &steps {
        let op = resolve(step, &buffer);
        edit(&mut history, &mut buffer, op);
      }

      let after = buffer.to_string();
      if !history.undo(&mut buffer).unwrap() {
        return after == initial;
      }
      history.redo(&mut buffer).unwrap() && buffer.to_string() == after
    }
  }
}
