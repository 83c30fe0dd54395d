// src/filter.rs
//! Chat record predicate
//!
//! A chat record is kept when it holds at least `min_assistant_messages`
//! messages with `role == "assistant"`. Records that fail to parse are kept
//! as well; unreadable content is never a reason to delete anything.

use serde_json::Value;

use crate::consts::DEFAULT_MIN_ASSISTANT_MESSAGES;

/// Outcome of inspecting one chat record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVerdict {
    Keep { assistant_messages: usize },
    Drop { assistant_messages: usize },
    /// Content is not a chat document; passed through untouched.
    Malformed,
}

impl ChatVerdict {
    pub fn is_kept(&self) -> bool {
        !matches!(self, ChatVerdict::Drop { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatFilter {
    min_assistant_messages: usize,
}

impl ChatFilter {
    pub fn new(min_assistant_messages: usize) -> Self {
        Self {
            min_assistant_messages,
        }
    }

    pub fn min_assistant_messages(&self) -> usize {
        self.min_assistant_messages
    }

    pub fn evaluate(&self, record: &[u8]) -> ChatVerdict {
        match count_assistant_messages(record) {
            Some(n) if n >= self.min_assistant_messages => ChatVerdict::Keep {
                assistant_messages: n,
            },
            Some(n) => ChatVerdict::Drop {
                assistant_messages: n,
            },
            None => ChatVerdict::Malformed,
        }
    }

    pub fn keep(&self, record: &[u8]) -> bool {
        self.evaluate(record).is_kept()
    }
}

impl Default for ChatFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ASSISTANT_MESSAGES)
    }
}

/// `None` when the bytes are not a chat document
pub fn count_assistant_messages(record: &[u8]) -> Option<usize> {
    let doc: Value = serde_json::from_slice(record).ok()?;
    let messages = match doc.as_object()?.get("messages") {
        None => return Some(0),
        Some(Value::Array(messages)) => messages,
        Some(other) if is_empty_value(other) => return Some(0),
        Some(_) => return None,
    };

    let mut count = 0;
    for message in messages {
        if message.as_object()?.get("role").and_then(Value::as_str) == Some("assistant") {
            count += 1;
        }
    }
    Some(count)
}

/// `null`, `false`, zero, `""` and `{}` all mean "no messages"
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
