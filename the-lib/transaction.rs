//! Reversible edit primitives.
//!
//! An [`EditOperation`] is a single insert or delete that carries the text it
//! touches, so it can always be inverted without consulting the document:
//!
//! - **Insert { offset, text }** - splice `text` in at `offset`
//! - **Delete { offset, text }** - remove `text`, which must be at `offset`
//!
//! The inverse of one variant is the other with the same offset and text.
//!
//! A [`Transaction`] groups operations that are undone and redone as one
//! unit. Operations run in order, each against the result of the previous
//! one. Applying a transaction is atomic: it is staged on a copy of the
//! buffer (ropes clone in O(1)) and only swapped in once every operation has
//! succeeded.
//!
//! ```ignore
//! use the_lib::{buffer::TextBuffer, transaction::{EditOperation, Transaction}};
//!
//! let mut buf = TextBuffer::from("hello world");
//! let tx = Transaction::from(vec![
//!   EditOperation::delete(6, "world"),
//!   EditOperation::insert(6, "rust"),
//! ]);
//! tx.apply(&mut buf).unwrap();
//! assert_eq!(buf.to_string(), "hello rust");
//!
//! tx.invert().apply(&mut buf).unwrap();
//! assert_eq!(buf.to_string(), "hello world");
//! ```

use smallvec::SmallVec;

use crate::{
  Tendril,
  buffer::{
    BufferError,
    Result,
    TextBuffer,
  },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
  Insert { offset: usize, text: Tendril },
  Delete { offset: usize, text: Tendril },
}

impl EditOperation {
  pub fn insert(offset: usize, text: impl Into<Tendril>) -> Self {
    Self::Insert {
      offset,
      text: text.into(),
    }
  }

  pub fn delete(offset: usize, text: impl Into<Tendril>) -> Self {
    Self::Delete {
      offset,
      text: text.into(),
    }
  }

  #[inline]
  pub fn offset(&self) -> usize {
    match self {
      Self::Insert { offset, .. } | Self::Delete { offset, .. } => *offset,
    }
  }

  #[inline]
  pub fn text(&self) -> &str {
    match self {
      Self::Insert { text, .. } | Self::Delete { text, .. } => text.as_str(),
    }
  }

  /// True if applying this operation would leave the buffer unchanged.
  #[inline]
  pub fn is_noop(&self) -> bool {
    self.text().is_empty()
  }

  pub fn invert(&self) -> Self {
    match self.clone() {
      Self::Insert { offset, text } => Self::Delete { offset, text },
      Self::Delete { offset, text } => Self::Insert { offset, text },
    }
  }

  /// Char offset just past the text this operation leaves behind.
  ///
  /// Useful for placing the caret after an edit.
  pub fn end_offset(&self) -> usize {
    match self {
      Self::Insert { offset, text } => offset + text.chars().count(),
      Self::Delete { offset, .. } => *offset,
    }
  }

  /// Apply to `buffer`. A delete only succeeds if the buffer holds exactly
  /// the recorded text at the recorded offset; on error nothing is changed.
  pub fn apply(&self, buffer: &mut TextBuffer) -> Result<()> {
    match self {
      Self::Insert { offset, text } => buffer.insert(*offset, text),
      Self::Delete { offset, text } => {
        let len = text.chars().count();
        buffer.check_range(*offset, len)?;
        let found = buffer.text().slice(*offset..*offset + len);
        if found != text.as_str() {
          return Err(BufferError::Mismatch {
            offset:   *offset,
            expected: text.to_string(),
            found:    found.to_string(),
          });
        }
        buffer.delete(*offset, len).map(|_| ())
      },
    }
  }
}

/// One logical history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
  operations: SmallVec<[EditOperation; 2]>,
}

impl Transaction {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an operation. No-op operations are dropped.
  pub fn push(&mut self, op: EditOperation) {
    if !op.is_noop() {
      self.operations.push(op);
    }
  }

  pub fn with(mut self, op: EditOperation) -> Self {
    self.push(op);
    self
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.operations.is_empty()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.operations.len()
  }

  pub fn operations(&self) -> &[EditOperation] {
    &self.operations
  }

  /// The reversed sequence of inverted operations.
  pub fn invert(&self) -> Self {
    Self {
      operations: self.operations.iter().rev().map(EditOperation::invert).collect(),
    }
  }

  /// Apply every operation in order, or none of them.
  pub fn apply(&self, buffer: &mut TextBuffer) -> Result<()> {
    let mut staged = buffer.clone();
    for op in &self.operations {
      op.apply(&mut staged)?;
    }
    *buffer = staged;
    Ok(())
  }

  /// Where the caret belongs after this transaction has been applied.
  pub fn caret_after(&self) -> Option<usize> {
    self.operations.last().map(EditOperation::end_offset)
  }
}

impl From<EditOperation> for Transaction {
  fn from(op: EditOperation) -> Self {
    Self::new().with(op)
  }
}

impl From<Vec<EditOperation>> for Transaction {
  fn from(ops: Vec<EditOperation>) -> Self {
    ops.into_iter().fold(Self::new(), Self::with)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn invert_swaps_variants() {
    let insert = EditOperation::insert(3, "abc");
    assert_eq!(insert.invert(), EditOperation::delete(3, "abc"));
    assert_eq!(insert.invert().invert(), insert);
  }

  #[test]
  fn apply_and_invert_operation() {
    let mut buf = TextBuffer::from("hello");
    let op = EditOperation::insert(5, " world");
    op.apply(&mut buf).unwrap();
    assert_eq!(buf.to_string(), "hello world");
    op.invert().apply(&mut buf).unwrap();
    assert_eq!(buf.to_string(), "hello");
  }

  #[test]
  fn delete_checks_recorded_text() {
    let mut buf = TextBuffer::from("hello");
    let err = EditOperation::delete(0, "help").apply(&mut buf).unwrap_err();
    assert!(matches!(err, BufferError::Mismatch { offset: 0, .. }));
    assert_eq!(buf.to_string(), "hello");
    assert_eq!(buf.version(), 0);
  }

  #[test]
  fn transaction_is_atomic() {
    let mut buf = TextBuffer::from("hello world");
    let tx = Transaction::from(vec![
      EditOperation::delete(6, "world"),
      EditOperation::insert(6, "rust"),
      // fails: offset past the end after the first two operations
      EditOperation::insert(100, "!"),
    ]);
    assert!(tx.apply(&mut buf).is_err());
    assert_eq!(buf.to_string(), "hello world");
    assert_eq!(buf.version(), 0);
  }

  #[test]
  fn transaction_roundtrip() {
    let mut buf = TextBuffer::from("hello world");
    let tx = Transaction::from(vec![
      EditOperation::delete(6, "world"),
      EditOperation::insert(6, "rust"),
    ]);
    tx.apply(&mut buf).unwrap();
    assert_eq!(buf.to_string(), "hello rust");
    assert_eq!(tx.caret_after(), Some(10));

    tx.invert().apply(&mut buf).unwrap();
    assert_eq!(buf.to_string(), "hello world");
  }

  #[test]
  fn noop_operations_are_dropped() {
    let tx = Transaction::new()
      .with(EditOperation::insert(0, ""))
      .with(EditOperation::delete(0, "x"));
    assert_eq!(tx.len(), 1);
    assert!(Transaction::from(EditOperation::delete(2, "")).is_empty());
  }
}
