//! Messages exchanged between control agents through the engine

use crate::events::bounded::BoundedLog;
use crate::types::{MessageId, MessageType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of messages kept before the oldest is evicted
pub const MESSAGE_LOG_CAPACITY: usize = 200;

/// Recipient literal addressing every agent
pub const BROADCAST_RECIPIENT: &str = "broadcast";

/// A natural-language message from one agent to another (or to all)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Unique identifier of the message
    pub id: MessageId,
    /// Sending agent
    pub sender: String,
    /// Receiving agent or `broadcast`
    pub recipient: String,
    /// Speech-act type
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Natural-language content
    pub content: String,
    /// Simulated time the message was posted
    pub timestamp: NaiveDateTime,
    /// Optional structured context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl AgentMessage {
    /// Check if the message is addressed to every agent
    pub fn is_broadcast(&self) -> bool {
        self.recipient == BROADCAST_RECIPIENT
    }
}

/// Request to post a message; id and timestamp are assigned on insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Sending agent
    pub sender: String,
    /// Receiving agent or `broadcast`
    pub recipient: String,
    /// Speech-act type
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Natural-language content
    pub content: String,
    /// Optional structured context
    #[serde(default)]
    pub context: Option<BTreeMap<String, String>>,
}

impl NewMessage {
    /// Create a new message request
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        message_type: MessageType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            message_type,
            content: content.into(),
            context: None,
        }
    }

    /// Create a message addressed to every agent
    pub fn broadcast(sender: impl Into<String>, message_type: MessageType, content: impl Into<String>) -> Self {
        Self::new(sender, BROADCAST_RECIPIENT, message_type, content)
    }

    /// Add one context entry
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());
        self
    }

    /// Turn the request into a stored message
    pub fn into_message(self, timestamp: NaiveDateTime) -> AgentMessage {
        AgentMessage {
            id: MessageId::new(),
            sender: self.sender,
            recipient: self.recipient,
            message_type: self.message_type,
            content: self.content,
            timestamp,
            context: self.context,
        }
    }
}

/// Selection applied when reading the message log
///
/// With a `recipient`, messages addressed to that agent match, plus broadcasts
/// when `include_broadcast` is set. Without one, every recipient matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageFilter {
    /// Only messages for this agent
    #[serde(default)]
    pub recipient: Option<String>,
    /// Only messages from this agent
    #[serde(default)]
    pub sender: Option<String>,
    /// Also match broadcasts when filtering by recipient
    #[serde(default)]
    pub include_broadcast: bool,
    /// Only messages strictly newer than this time
    #[serde(default)]
    pub after: Option<NaiveDateTime>,
}

impl MessageFilter {
    /// Match everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Messages an agent should read: addressed to it or broadcast
    pub fn inbox(recipient: impl Into<String>) -> Self {
        Self { recipient: Some(recipient.into()), include_broadcast: true, ..Self::default() }
    }

    /// Restrict to one sender
    pub fn from_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Restrict to messages after a time
    pub fn after(mut self, after: NaiveDateTime) -> Self {
        self.after = Some(after);
        self
    }

    /// Check a message against the filter
    pub fn matches(&self, message: &AgentMessage) -> bool {
        let recipient_ok = match &self.recipient {
            Some(recipient) => {
                message.recipient == *recipient || (self.include_broadcast && message.is_broadcast())
            }
            None => true,
        };
        let sender_ok = self.sender.as_ref().map_or(true, |sender| message.sender == *sender);
        let after_ok = self.after.map_or(true, |after| message.timestamp > after);
        recipient_ok && sender_ok && after_ok
    }
}

/// Ring buffer of the most recent agent messages
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct MessageLog {
    messages: BoundedLog<AgentMessage>,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    /// Create an empty log with the standard capacity
    pub fn new() -> Self {
        Self { messages: BoundedLog::with_capacity(MESSAGE_LOG_CAPACITY) }
    }

    /// Store a message, evicting the oldest when full
    pub fn push(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    /// Messages matching a filter, oldest first
    pub fn query(&self, filter: &MessageFilter) -> Vec<AgentMessage> {
        self.messages.iter().filter(|message| filter.matches(message)).cloned().collect()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
