//! Stored messages and their visibility state machine
//!
//! A message moves `Delayed -> Available -> InFlight` and back to
//! `Available` when its visibility window lapses or is reset. Deletion and
//! redrive remove it from the queue entirely.

use chrono::{DateTime, Duration, Utc};
use mqstack_core::{md5_of_attributes, md5_of_body, MessageAttributes};
use std::collections::HashMap;
use uuid::Uuid;

pub const APPROXIMATE_FIRST_RECEIVE_TIMESTAMP: &str = "ApproximateFirstReceiveTimestamp";
pub const APPROXIMATE_RECEIVE_COUNT: &str = "ApproximateReceiveCount";
pub const SENT_TIMESTAMP: &str = "SentTimestamp";
pub const SEQUENCE_NUMBER: &str = "SequenceNumber";

/// Readable message system attributes
pub const SYSTEM_ATTRIBUTES: &[&str] = &[
    APPROXIMATE_FIRST_RECEIVE_TIMESTAMP,
    APPROXIMATE_RECEIVE_COUNT,
    SENT_TIMESTAMP,
    SEQUENCE_NUMBER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Delayed,
    Available,
    InFlight,
}

impl MessageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delayed => "DELAYED",
            Self::Available => "AVAILABLE",
            Self::InFlight => "IN_FLIGHT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub message_id: String,
    pub body: String,
    pub md5_of_body: String,
    pub message_attributes: MessageAttributes,
    pub md5_of_message_attributes: Option<String>,
    pub sent_timestamp: DateTime<Utc>,
    pub sequence_number: u64,
    pub delay_until: Option<DateTime<Utc>>,
    pub state: MessageState,
    pub receive_count: u32,
    pub first_receive_timestamp: Option<DateTime<Utc>>,
    pub receipt_handle: Option<String>,
    pub visibility_deadline: Option<DateTime<Utc>>,
    pub last_nak_reason: Option<String>,
}

impl StoredMessage {
    pub fn new(
        body: String,
        message_attributes: MessageAttributes,
        delay_seconds: u32,
        sequence_number: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let (state, delay_until) = if delay_seconds > 0 {
            (
                MessageState::Delayed,
                Some(now + Duration::seconds(i64::from(delay_seconds))),
            )
        } else {
            (MessageState::Available, None)
        };
        Self {
            message_id: Uuid::new_v4().to_string(),
            md5_of_body: md5_of_body(body.as_bytes()),
            md5_of_message_attributes: md5_of_attributes(&message_attributes),
            body,
            message_attributes,
            sent_timestamp: now,
            sequence_number,
            delay_until,
            state,
            receive_count: 0,
            first_receive_timestamp: None,
            receipt_handle: None,
            visibility_deadline: None,
            last_nak_reason: None,
        }
    }

    /// Applies time-driven transitions. Returns true if the message became
    /// available. Never touches the receive count.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            MessageState::Delayed => {
                if self.delay_until.map_or(true, |until| now >= until) {
                    self.delay_until = None;
                    self.state = MessageState::Available;
                    return true;
                }
            }
            MessageState::InFlight => {
                if self.visibility_deadline.map_or(true, |deadline| now >= deadline) {
                    self.make_available();
                    return true;
                }
            }
            MessageState::Available => {}
        }
        false
    }

    /// Moves the message in flight and mints a fresh receipt handle.
    pub fn mark_received(&mut self, now: DateTime<Utc>, visibility_timeout: u32) -> String {
        let handle = Uuid::new_v4().to_string();
        self.receive_count += 1;
        if self.first_receive_timestamp.is_none() {
            self.first_receive_timestamp = Some(now);
        }
        self.state = MessageState::InFlight;
        self.receipt_handle = Some(handle.clone());
        self.visibility_deadline = Some(now + Duration::seconds(i64::from(visibility_timeout)));
        handle
    }

    pub fn make_available(&mut self) {
        self.state = MessageState::Available;
        self.receipt_handle = None;
        self.visibility_deadline = None;
    }

    /// Returns an in-flight message to the queue ahead of its deadline.
    pub fn nak(&mut self, reason: Option<String>) {
        self.make_available();
        self.last_nak_reason = reason;
    }

    /// Clears delivery history for a message entering a new queue.
    pub fn reset_for_transfer(&mut self, sequence_number: u64) {
        self.make_available();
        self.delay_until = None;
        self.receive_count = 0;
        self.first_receive_timestamp = None;
        self.sequence_number = sequence_number;
    }

    pub fn is_retention_expired(&self, now: DateTime<Utc>, retention_period: u32) -> bool {
        now >= self.sent_timestamp + Duration::seconds(i64::from(retention_period))
    }

    /// When this message will next become visible, if it is hidden.
    pub fn visible_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            MessageState::Delayed => self.delay_until,
            MessageState::InFlight => self.visibility_deadline,
            MessageState::Available => None,
        }
    }

    pub fn system_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert(
            SENT_TIMESTAMP.to_string(),
            self.sent_timestamp.timestamp_millis().to_string(),
        );
        attrs.insert(
            APPROXIMATE_RECEIVE_COUNT.to_string(),
            self.receive_count.to_string(),
        );
        if let Some(first) = self.first_receive_timestamp {
            attrs.insert(
                APPROXIMATE_FIRST_RECEIVE_TIMESTAMP.to_string(),
                first.timestamp_millis().to_string(),
            );
        }
        attrs.insert(
            SEQUENCE_NUMBER.to_string(),
            format_sequence_number(self.sequence_number),
        );
        attrs
    }
}

pub fn format_sequence_number(sequence_number: u64) -> String {
    format!("{sequence_number:020}")
}

/// Result of a successful send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageResult {
    pub message_id: String,
    pub md5_of_message_body: String,
    pub md5_of_message_attributes: Option<String>,
    pub sequence_number: String,
}

/// A message handed to a receiver
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub md5_of_body: String,
    pub md5_of_message_attributes: Option<String>,
    pub attributes: HashMap<String, String>,
    pub message_attributes: MessageAttributes,
}

/// Read-only snapshot returned by peek
#[derive(Debug, Clone)]
pub struct MessageView {
    pub message_id: String,
    pub body: String,
    pub state: MessageState,
    pub receive_count: u32,
    pub sent_timestamp: DateTime<Utc>,
    pub sequence_number: String,
    pub message_attributes: MessageAttributes,
    pub last_nak_reason: Option<String>,
}

impl From<&StoredMessage> for MessageView {
    fn from(msg: &StoredMessage) -> Self {
        Self {
            message_id: msg.message_id.clone(),
            body: msg.body.clone(),
            state: msg.state,
            receive_count: msg.receive_count,
            sent_timestamp: msg.sent_timestamp,
            sequence_number: format_sequence_number(msg.sequence_number),
            message_attributes: msg.message_attributes.clone(),
            last_nak_reason: msg.last_nak_reason.clone(),
        }
    }
}
