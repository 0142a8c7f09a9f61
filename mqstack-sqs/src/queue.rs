//! Per-queue message storage

use chrono::{DateTime, Duration, Utc};
use mqstack_core::{validate_message_attributes, AccountContext, MessageAttributes};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::attributes::{
    QueueAttributes, APPROXIMATE_NUMBER_OF_MESSAGES, APPROXIMATE_NUMBER_OF_MESSAGES_DELAYED,
    APPROXIMATE_NUMBER_OF_MESSAGES_NOT_VISIBLE, COMPUTED_ATTRIBUTES, CREATED_TIMESTAMP,
    LAST_MODIFIED_TIMESTAMP, QUEUE_ARN, SETTABLE_ATTRIBUTES,
};
use crate::error::SqsError;
use crate::message::{
    format_sequence_number, MessageState, MessageView, ReceivedMessage, SendMessageResult,
    StoredMessage,
};

pub const MAX_DELAY_SECONDS: u32 = 900;

/// Approximate message counts by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounts {
    pub available: usize,
    pub delayed: usize,
    pub in_flight: usize,
}

/// Which attributes a receiver asked for
#[derive(Debug, Clone, Default)]
pub struct AttributeFilter {
    pub attribute_names: Vec<String>,
    pub message_attribute_names: Vec<String>,
}

impl AttributeFilter {
    fn wants_system(&self, name: &str) -> bool {
        self.attribute_names.iter().any(|n| n == "All" || n == name)
    }

    fn wants_message_attribute(&self, name: &str) -> bool {
        self.message_attribute_names.iter().any(|n| {
            n == "All"
                || n == name
                || n.strip_suffix(".*")
                    .is_some_and(|prefix| name.starts_with(prefix))
        })
    }
}

pub struct Queue {
    pub name: String,
    pub arn: String,
    pub url: String,
    pub attributes: QueueAttributes,
    pub tags: HashMap<String, String>,
    pub created_timestamp: DateTime<Utc>,
    pub last_modified_timestamp: DateTime<Utc>,
    /// Set once the queue has been removed from the registry
    pub(crate) deleted: bool,
    /// Receives return nothing while set
    pub paused: bool,
    /// Keyed by sequence number, which is queue order
    messages: BTreeMap<u64, StoredMessage>,
    receipt_index: HashMap<String, u64>,
    next_sequence: u64,
}

impl Queue {
    pub fn new(
        name: String,
        arn: String,
        url: String,
        attributes: QueueAttributes,
        tags: HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Self {
        Queue {
            name,
            arn,
            url,
            attributes,
            tags,
            created_timestamp: now,
            last_modified_timestamp: now,
            deleted: false,
            paused: false,
            messages: BTreeMap::new(),
            receipt_index: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Name of the dead-letter queue named by the redrive policy, if any.
    pub fn redrive_policy_target<'a>(&'a self, context: &AccountContext) -> Option<&'a str> {
        self.attributes
            .redrive_policy
            .as_ref()
            .map(|p| context.resolve_queue_name(&p.dead_letter_target_arn))
    }

    pub fn dead_letter_target_arn(&self) -> Option<String> {
        self.attributes
            .redrive_policy
            .as_ref()
            .map(|p| p.dead_letter_target_arn.clone())
    }

    fn next_sequence_number(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    /// Lazy reaping: retention expiry, delay promotion and visibility expiry.
    /// Returns the number of messages that became available.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> usize {
        let retention = self.attributes.message_retention_period;
        let expired: Vec<u64> = self
            .messages
            .iter()
            .filter(|(_, m)| m.is_retention_expired(now, retention))
            .map(|(seq, _)| *seq)
            .collect();
        for seq in expired {
            if let Some(msg) = self.take(seq) {
                debug!(queue = %self.name, message_id = %msg.message_id, "Message exceeded retention period");
            }
        }

        let mut became_available = 0;
        for msg in self.messages.values_mut() {
            let handle = msg.receipt_handle.clone();
            if msg.reconcile(now) {
                became_available += 1;
                if let Some(handle) = handle {
                    self.receipt_index.remove(&handle);
                }
            }
        }
        became_available
    }

    pub fn enqueue(
        &mut self,
        body: String,
        message_attributes: MessageAttributes,
        delay_seconds: u32,
        now: DateTime<Utc>,
    ) -> Result<SendMessageResult, SqsError> {
        if body.is_empty() {
            return Err(SqsError::InvalidParameterValue(
                "The request must contain the parameter MessageBody.".into(),
            ));
        }
        if delay_seconds > MAX_DELAY_SECONDS {
            return Err(SqsError::InvalidParameterValue(format!(
                "DelaySeconds must be between 0 and {MAX_DELAY_SECONDS}"
            )));
        }
        validate_message_attributes(&message_attributes)?;
        if body.len() > self.attributes.maximum_message_size as usize {
            return Err(SqsError::InvalidParameterValue(format!(
                "One or more parameters are invalid. Reason: Message must be shorter than {} bytes.",
                self.attributes.maximum_message_size
            )));
        }
        let seq = self.next_sequence_number();
        let msg = StoredMessage::new(body, message_attributes, delay_seconds, seq, now);
        let result = SendMessageResult {
            message_id: msg.message_id.clone(),
            md5_of_message_body: msg.md5_of_body.clone(),
            md5_of_message_attributes: msg.md5_of_message_attributes.clone(),
            sequence_number: format_sequence_number(seq),
        };
        self.messages.insert(seq, msg);
        Ok(result)
    }

    /// Accepts a message moved out of another queue.
    pub fn enqueue_transferred(&mut self, mut msg: StoredMessage) {
        let seq = self.next_sequence_number();
        msg.reset_for_transfer(seq);
        self.messages.insert(seq, msg);
    }

    /// Removes a message outright, dropping its receipt handle.
    pub fn take(&mut self, seq: u64) -> Option<StoredMessage> {
        let msg = self.messages.remove(&seq)?;
        if let Some(ref handle) = msg.receipt_handle {
            self.receipt_index.remove(handle);
        }
        Some(msg)
    }

    pub fn message(&self, seq: u64) -> Option<&StoredMessage> {
        self.messages.get(&seq)
    }

    /// Sequence numbers of up to `max` available messages, oldest first.
    pub fn available_sequences(&self, max: usize) -> Vec<u64> {
        self.messages
            .iter()
            .filter(|(_, m)| m.state == MessageState::Available)
            .take(max)
            .map(|(seq, _)| *seq)
            .collect()
    }

    /// Available -> InFlight for one message.
    pub fn mark_in_flight(
        &mut self,
        seq: u64,
        now: DateTime<Utc>,
        visibility_timeout: u32,
    ) -> Option<String> {
        let msg = self.messages.get_mut(&seq)?;
        if msg.state != MessageState::Available {
            return None;
        }
        let handle = msg.mark_received(now, visibility_timeout);
        self.receipt_index.insert(handle.clone(), seq);
        Some(handle)
    }

    pub fn to_received(&self, seq: u64, filter: &AttributeFilter) -> Option<ReceivedMessage> {
        let msg = self.messages.get(&seq)?;
        let receipt_handle = msg.receipt_handle.clone()?;
        let attributes = msg
            .system_attributes()
            .into_iter()
            .filter(|(k, _)| filter.wants_system(k))
            .collect();
        let message_attributes = msg
            .message_attributes
            .iter()
            .filter(|(k, _)| filter.wants_message_attribute(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(ReceivedMessage {
            message_id: msg.message_id.clone(),
            receipt_handle,
            body: msg.body.clone(),
            md5_of_body: msg.md5_of_body.clone(),
            md5_of_message_attributes: msg.md5_of_message_attributes.clone(),
            attributes,
            message_attributes,
        })
    }

    fn in_flight_sequence(&self, receipt_handle: &str) -> Result<u64, SqsError> {
        let seq = self.receipt_index.get(receipt_handle).copied().ok_or_else(|| {
            SqsError::ReceiptHandleIsInvalid(format!(
                "The receipt handle \"{receipt_handle}\" is not valid for queue {}.",
                self.name
            ))
        })?;
        match self.messages.get(&seq) {
            Some(msg)
                if msg.state == MessageState::InFlight
                    && msg.receipt_handle.as_deref() == Some(receipt_handle) =>
            {
                Ok(seq)
            }
            _ => Err(SqsError::ReceiptHandleIsInvalid(format!(
                "The receipt handle \"{receipt_handle}\" is no longer current."
            ))),
        }
    }

    /// Deletes the message held under `receipt_handle`. Callers reconcile first
    /// so an expired handle is already unknown here.
    pub fn delete(&mut self, receipt_handle: &str) -> Result<StoredMessage, SqsError> {
        let seq = self.in_flight_sequence(receipt_handle)?;
        self.take(seq)
            .ok_or_else(|| SqsError::ReceiptHandleIsInvalid(receipt_handle.to_string()))
    }

    /// Resets the visibility window. Returns true if the message became
    /// available again (timeout of zero).
    pub fn change_visibility(
        &mut self,
        receipt_handle: &str,
        timeout: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, SqsError> {
        let seq = self.in_flight_sequence(receipt_handle)?;
        let Some(msg) = self.messages.get_mut(&seq) else {
            return Err(SqsError::ReceiptHandleIsInvalid(receipt_handle.to_string()));
        };
        if timeout == 0 {
            msg.make_available();
            self.receipt_index.remove(receipt_handle);
            return Ok(true);
        }
        msg.visibility_deadline = Some(now + Duration::seconds(i64::from(timeout)));
        Ok(false)
    }

    /// Hands an in-flight message back immediately, recording why.
    pub fn nak(&mut self, receipt_handle: &str, reason: Option<String>) -> Result<(), SqsError> {
        let seq = self.in_flight_sequence(receipt_handle)?;
        self.receipt_index.remove(receipt_handle);
        if let Some(msg) = self.messages.get_mut(&seq) {
            msg.nak(reason);
        }
        Ok(())
    }

    fn sequence_of(&self, message_id: &str) -> Result<u64, SqsError> {
        self.messages
            .iter()
            .find(|(_, m)| m.message_id == message_id)
            .map(|(seq, _)| *seq)
            .ok_or_else(|| SqsError::MessageNotFound(format!("{message_id} in queue {}", self.name)))
    }

    pub fn view(&self, message_id: &str) -> Result<MessageView, SqsError> {
        let seq = self.sequence_of(message_id)?;
        Ok(MessageView::from(&self.messages[&seq]))
    }

    /// Deletes by message id whatever the message's state. A given receipt
    /// handle must still be the message's current one.
    pub fn delete_by_id(
        &mut self,
        message_id: &str,
        receipt_handle: Option<&str>,
    ) -> Result<StoredMessage, SqsError> {
        let seq = self.sequence_of(message_id)?;
        if let Some(handle) = receipt_handle {
            if self.messages[&seq].receipt_handle.as_deref() != Some(handle) {
                return Err(SqsError::ReceiptHandleIsInvalid(format!(
                    "The receipt handle \"{handle}\" does not belong to message {message_id}."
                )));
            }
        }
        self.take(seq)
            .ok_or_else(|| SqsError::MessageNotFound(message_id.to_string()))
    }

    /// Drops every message. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let count = self.messages.len();
        self.messages.clear();
        self.receipt_index.clear();
        count
    }

    /// Removes every available message, oldest first.
    pub fn drain_available(&mut self) -> Vec<StoredMessage> {
        let seqs = self.available_sequences(usize::MAX);
        seqs.into_iter().filter_map(|seq| self.take(seq)).collect()
    }

    pub fn peek(&self, max: usize) -> Vec<MessageView> {
        self.messages.values().take(max).map(MessageView::from).collect()
    }

    pub fn counts(&self) -> MessageCounts {
        let mut counts = MessageCounts::default();
        for msg in self.messages.values() {
            match msg.state {
                MessageState::Available => counts.available += 1,
                MessageState::Delayed => counts.delayed += 1,
                MessageState::InFlight => counts.in_flight += 1,
            }
        }
        counts
    }

    /// Earliest moment a hidden message becomes visible.
    pub fn next_visible_at(&self) -> Option<DateTime<Utc>> {
        self.messages.values().filter_map(StoredMessage::visible_at).min()
    }

    pub fn get_attributes(&self, names: &[String]) -> Result<HashMap<String, String>, SqsError> {
        let all = names.is_empty() || names.iter().any(|n| n == "All");
        if !all {
            if let Some(unknown) = names.iter().find(|n| {
                !SETTABLE_ATTRIBUTES.contains(&n.as_str())
                    && !COMPUTED_ATTRIBUTES.contains(&n.as_str())
            }) {
                return Err(SqsError::InvalidAttributeName(format!(
                    "Unknown Attribute {unknown}."
                )));
            }
        }
        let include = |name: &str| all || names.iter().any(|n| n == name);

        let mut result: HashMap<String, String> = self
            .attributes
            .to_map()
            .into_iter()
            .filter(|(k, _)| include(k.as_str()))
            .collect();

        let counts = self.counts();
        let computed = [
            (QUEUE_ARN, self.arn.clone()),
            (
                CREATED_TIMESTAMP,
                self.created_timestamp.timestamp().to_string(),
            ),
            (
                LAST_MODIFIED_TIMESTAMP,
                self.last_modified_timestamp.timestamp().to_string(),
            ),
            (APPROXIMATE_NUMBER_OF_MESSAGES, counts.available.to_string()),
            (
                APPROXIMATE_NUMBER_OF_MESSAGES_DELAYED,
                counts.delayed.to_string(),
            ),
            (
                APPROXIMATE_NUMBER_OF_MESSAGES_NOT_VISIBLE,
                counts.in_flight.to_string(),
            ),
        ];
        for (name, value) in computed {
            if include(name) {
                result.insert(name.to_string(), value);
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn queue() -> Queue {
        Queue::new(
            "q".into(),
            "arn:aws:sqs:us-east-1:000000000000:q".into(),
            "http://localhost:4566/000000000000/q".into(),
            QueueAttributes::default(),
            HashMap::new(),
            now(),
        )
    }

    #[test]
    fn test_queue_order_is_send_order() {
        let mut q = queue();
        q.enqueue("a".into(), MessageAttributes::new(), 0, now()).unwrap();
        q.enqueue("b".into(), MessageAttributes::new(), 0, now()).unwrap();
        let seqs = q.available_sequences(10);
        assert_eq!(q.message(seqs[0]).unwrap().body, "a");
        assert_eq!(q.message(seqs[1]).unwrap().body, "b");
    }

    #[test]
    fn test_mark_in_flight_is_exclusive() {
        let mut q = queue();
        q.enqueue("a".into(), MessageAttributes::new(), 0, now()).unwrap();
        let seq = q.available_sequences(1)[0];
        assert!(q.mark_in_flight(seq, now(), 30).is_some());
        assert!(q.mark_in_flight(seq, now(), 30).is_none());
        assert!(q.available_sequences(10).is_empty());
    }

    #[test]
    fn test_reconcile_drops_expired_handles() {
        let mut q = queue();
        q.enqueue("a".into(), MessageAttributes::new(), 0, now()).unwrap();
        let seq = q.available_sequences(1)[0];
        let handle = q.mark_in_flight(seq, now(), 30).unwrap();
        assert_eq!(q.reconcile(now() + Duration::seconds(31)), 1);
        assert!(matches!(
            q.delete(&handle),
            Err(SqsError::ReceiptHandleIsInvalid(_))
        ));
        assert_eq!(q.counts().available, 1);
    }

    #[test]
    fn test_retention_expiry() {
        let mut q = queue();
        q.attributes.message_retention_period = 60;
        q.enqueue("a".into(), MessageAttributes::new(), 0, now()).unwrap();
        q.reconcile(now() + Duration::seconds(59));
        assert_eq!(q.counts().available, 1);
        q.reconcile(now() + Duration::seconds(60));
        assert_eq!(q.counts(), MessageCounts::default());
    }

    #[test]
    fn test_enqueue_validation() {
        let mut q = queue();
        q.attributes.maximum_message_size = 1024;
        let empty = q.enqueue(String::new(), MessageAttributes::new(), 0, now());
        assert!(matches!(empty, Err(SqsError::InvalidParameterValue(_))));
        let delayed = q.enqueue("a".into(), MessageAttributes::new(), 901, now());
        assert!(matches!(delayed, Err(SqsError::InvalidParameterValue(_))));
        let large = q.enqueue("x".repeat(1025), MessageAttributes::new(), 0, now());
        assert!(matches!(large, Err(SqsError::InvalidParameterValue(_))));
        assert!(q.enqueue("x".repeat(1024), MessageAttributes::new(), 0, now()).is_ok());
        assert_eq!(q.counts().available, 1);
    }

    #[test]
    fn test_attribute_filter() {
        let filter = AttributeFilter {
            attribute_names: vec!["SentTimestamp".into()],
            message_attribute_names: vec!["order.*".into(), "exact".into()],
        };
        assert!(filter.wants_system("SentTimestamp"));
        assert!(!filter.wants_system("SequenceNumber"));
        assert!(filter.wants_message_attribute("order.id"));
        assert!(filter.wants_message_attribute("exact"));
        assert!(!filter.wants_message_attribute("other"));
    }

    #[test]
    fn test_get_attributes_unknown_name() {
        let q = queue();
        let err = q.get_attributes(&["Nope".to_string()]).unwrap_err();
        assert!(matches!(err, SqsError::InvalidAttributeName(_)));
    }

    #[test]
    fn test_get_attributes_selected() {
        let q = queue();
        let attrs = q
            .get_attributes(&["QueueArn".to_string(), "VisibilityTimeout".to_string()])
            .unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["VisibilityTimeout"], "30");
        assert_eq!(attrs["QueueArn"], q.arn);
    }
}
