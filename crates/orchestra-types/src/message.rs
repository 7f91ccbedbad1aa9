//! A2A message envelopes and message identifiers.
//!
//! An [`Envelope`] is assembled through an [`EnvelopeBuilder`] and receives its
//! message id when built; after that it has no setters. Answering a message
//! always produces a *new* envelope through [`Envelope::reply`], which inverts
//! sender/recipient and carries the exchange's correlation id forward.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::intent::Intent;

/// Message body: a JSON object keyed by field name.
pub type Payload = Map<String, Value>;

/// Coerce a JSON value into a payload.
///
/// Objects are taken as-is; `null` becomes an empty payload; any other value
/// is wrapped under a `"value"` key.
pub fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        Value::Null => Payload::new(),
        other => {
            let mut map = Payload::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Sequence-numbered message identifier, rendered as `msg-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Hands out strictly increasing message ids, starting at 1.
///
/// One allocator is shared (behind an `Arc`) by every participant of a mesh,
/// which keeps ids unique for the lifetime of that mesh without a hidden
/// process global.
#[derive(Debug)]
pub struct MessageIdAllocator {
    next: AtomicU64,
}

impl MessageIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next id. Never returns the same id twice.
    pub fn allocate(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for MessageIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A message travelling between two participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    intent: Intent,
    sender: String,
    recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(default)]
    payload: Payload,
    message_id: MessageId,
    timestamp: DateTime<Utc>,
}

/// An envelope that has not been given a message id yet.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    intent: Intent,
    sender: String,
    recipient: String,
    correlation_id: Option<String>,
    payload: Payload,
}

impl EnvelopeBuilder {
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Allocate a message id from `ids` and seal the envelope.
    pub fn build(self, ids: &MessageIdAllocator) -> Envelope {
        Envelope {
            intent: self.intent,
            sender: self.sender,
            recipient: self.recipient,
            correlation_id: self.correlation_id,
            payload: self.payload,
            message_id: ids.allocate(),
            timestamp: Utc::now(),
        }
    }
}

impl Envelope {
    /// Start an envelope with no correlation id and an empty payload.
    pub fn builder(
        intent: Intent,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> EnvelopeBuilder {
        EnvelopeBuilder {
            intent,
            sender: sender.into(),
            recipient: recipient.into(),
            correlation_id: None,
            payload: Payload::new(),
        }
    }

    /// Create an envelope with no correlation id and an empty payload.
    pub fn new(
        ids: &MessageIdAllocator,
        intent: Intent,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self::builder(intent, sender, recipient).build(ids)
    }

    /// Build the answer to this envelope.
    ///
    /// The reply goes back to this envelope's sender, comes from `sender`, and
    /// keeps this envelope's correlation id -- or, when there is none, uses
    /// this envelope's message id so the whole exchange shares one key.
    pub fn reply(
        &self,
        ids: &MessageIdAllocator,
        sender: impl Into<String>,
        intent: Intent,
        payload: Payload,
    ) -> Envelope {
        Envelope::builder(intent, sender, self.sender.clone())
            .correlation_id(self.correlation_key())
            .payload(payload)
            .build(ids)
    }

    /// The key a reply to this envelope is correlated on: the correlation id
    /// if present, otherwise the message id.
    pub fn correlation_key(&self) -> String {
        self.correlation_id
            .clone()
            .unwrap_or_else(|| self.message_id.to_string())
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consume the envelope, keeping only its payload.
    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// String field of the payload, if present.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
