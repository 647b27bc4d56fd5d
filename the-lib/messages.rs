use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
  Info,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub id:    u64,
  pub level: MessageLevel,
  pub text:  String,
}

/// User-facing notices (save failures, search misses).
///
/// The newest message is `active` until dismissed; every message also goes
/// into a bounded history.
#[derive(Debug, Clone)]
pub struct MessageCenter {
  active:          Option<Message>,
  history:         VecDeque<Message>,
  next_message_id: u64,
  history_limit:   usize,
}

impl Default for MessageCenter {
  fn default() -> Self {
    Self::with_limit(DEFAULT_HISTORY_LIMIT)
  }
}

impl MessageCenter {
  pub fn with_limit(history_limit: usize) -> Self {
    Self {
      active:          None,
      history:         VecDeque::new(),
      next_message_id: 1,
      history_limit:   history_limit.max(1),
    }
  }

  pub fn active(&self) -> Option<&Message> {
    self.active.as_ref()
  }

  pub fn history_len(&self) -> usize {
    self.history.len()
  }

  pub fn history(&self) -> impl Iterator<Item = &Message> {
    self.history.iter()
  }

  pub fn publish(&mut self, level: MessageLevel, text: impl Into<String>) -> Message {
    let message = Message {
      id: self.next_message_id,
      level,
      text: text.into(),
    };
    self.next_message_id = self.next_message_id.saturating_add(1);

    self.active = Some(message.clone());
    self.history.push_back(message.clone());
    while self.history.len() > self.history_limit {
      self.history.pop_front();
    }
    message
  }

  pub fn info(&mut self, text: impl Into<String>) -> Message {
    self.publish(MessageLevel::Info, text)
  }

  pub fn warning(&mut self, text: impl Into<String>) -> Message {
    self.publish(MessageLevel::Warning, text)
  }

  pub fn error(&mut self, text: impl Into<String>) -> Message {
    self.publish(MessageLevel::Error, text)
  }

  pub fn dismiss_active(&mut self) -> Option<Message> {
    self.active.take()
  }

  pub fn clear(&mut self) {
    self.active = None;
    self.history.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn publish_sets_active() {
    let mut center = MessageCenter::default();
    let message = center.error("Could not save file.");
    assert_eq!(center.active(), Some(&message));
    assert_eq!(message.level, MessageLevel::Error);
    assert_eq!(center.history_len(), 1);
  }

  #[test]
  fn newer_message_replaces_active() {
    let mut center = MessageCenter::default();
    center.info("a");
    let b = center.warning("b");
    assert_eq!(center.active().map(|m| m.id), Some(b.id));
    assert_eq!(center.dismiss_active(), Some(b));
    assert!(center.active().is_none());
    assert_eq!(center.history_len(), 2);
  }

  #[test]
  fn history_limit_is_enforced() {
    let mut center = MessageCenter::with_limit(2);
    center.info("a");
    center.info("b");
    center.info("c");
    let texts: Vec<_> = center.history().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["b", "c"]);

    center.clear();
    assert_eq!(center.history_len(), 0);
    assert!(center.active().is_none());
  }
}
