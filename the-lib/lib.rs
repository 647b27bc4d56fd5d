//! Editing core for the-notepad: text buffer, undo history, caret tracking,
//! literal search and the session that ties them together.

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod buffer;
pub mod caret;
pub mod history;
pub mod host;
pub mod messages;
pub mod search;
pub mod session;
pub mod transaction;

pub type Tendril = SmartString<LazyCompact>;
