//! Dead-letter redrive
//!
//! Redrive runs under the source queue's lock (and the dead-letter queue's,
//! when it exists) immediately after a receive bumps a message's count, so
//! the increment and the threshold check form one step. A message that
//! crosses the threshold is moved, never delivered.

use tracing::warn;

use crate::attributes::RedrivePolicy;
use crate::error::SqsError;
use crate::queue::Queue;

/// Where a queue's dead-letter policy points at the moment of a receive.
pub enum DeadLetterTarget<'a> {
    /// The queue has no redrive policy
    Disabled,
    /// The policy names a queue that no longer exists
    Missing(String),
    Queue(&'a mut Queue),
}

/// True when a message at `receive_count` must leave its queue.
pub fn reaches_threshold(policy: Option<&RedrivePolicy>, receive_count: u32) -> bool {
    policy.is_some_and(|p| receive_count >= p.max_receive_count)
}

/// Moves the message at `seq` to the dead-letter queue if its receive count
/// has reached the policy threshold. Returns true when the message moved.
pub fn check_and_redrive(
    source: &mut Queue,
    target: &mut DeadLetterTarget<'_>,
    seq: u64,
) -> Result<bool, SqsError> {
    let Some(receive_count) = source.message(seq).map(|m| m.receive_count) else {
        return Ok(false);
    };
    if !reaches_threshold(source.attributes.redrive_policy.as_ref(), receive_count) {
        return Ok(false);
    }

    match target {
        DeadLetterTarget::Disabled => Ok(false),
        DeadLetterTarget::Missing(arn) => {
            warn!(queue = %source.name, dead_letter_target = %arn, "Dead-letter queue does not exist");
            Err(SqsError::TargetQueueDoesNotExist(arn.clone()))
        }
        DeadLetterTarget::Queue(dlq) => {
            let Some(msg) = source.take(seq) else {
                return Ok(false);
            };
            warn!(
                queue = %source.name,
                dead_letter_queue = %dlq.name,
                message_id = %msg.message_id,
                receive_count,
                "Redriving message to dead-letter queue"
            );
            dlq.enqueue_transferred(msg);
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::QueueAttributes;
    use crate::message::MessageState;
    use chrono::{DateTime, Utc};
    use mqstack_core::MessageAttributes;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn queue(name: &str, policy: Option<RedrivePolicy>) -> Queue {
        let attributes = QueueAttributes {
            redrive_policy: policy,
            ..QueueAttributes::default()
        };
        Queue::new(
            name.into(),
            format!("arn:aws:sqs:us-east-1:000000000000:{name}"),
            format!("http://localhost:4566/000000000000/{name}"),
            attributes,
            HashMap::new(),
            now(),
        )
    }

    fn policy(max_receive_count: u32) -> RedrivePolicy {
        RedrivePolicy {
            dead_letter_target_arn: "arn:aws:sqs:us-east-1:000000000000:dlq".into(),
            max_receive_count,
        }
    }

    #[test]
    fn test_threshold() {
        assert!(!reaches_threshold(None, 100));
        assert!(!reaches_threshold(Some(&policy(2)), 1));
        assert!(reaches_threshold(Some(&policy(2)), 2));
        assert!(reaches_threshold(Some(&policy(2)), 3));
    }

    #[test]
    fn test_redrive_moves_message() {
        let mut source = queue("src", Some(policy(1)));
        let mut dlq = queue("dlq", None);
        let sent = source
            .enqueue("poison".into(), MessageAttributes::new(), 0, now())
            .unwrap();
        let seq = source.available_sequences(1)[0];
        source.mark_in_flight(seq, now(), 30).unwrap();

        let mut target = DeadLetterTarget::Queue(&mut dlq);
        assert!(check_and_redrive(&mut source, &mut target, seq).unwrap());

        assert_eq!(source.counts().in_flight, 0);
        let views = dlq.peek(10);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].message_id, sent.message_id);
        assert_eq!(views[0].body, "poison");
        assert_eq!(views[0].receive_count, 0);
        assert_eq!(views[0].state, MessageState::Available);
    }

    #[test]
    fn test_below_threshold_stays() {
        let mut source = queue("src", Some(policy(3)));
        let mut dlq = queue("dlq", None);
        source
            .enqueue("a".into(), MessageAttributes::new(), 0, now())
            .unwrap();
        let seq = source.available_sequences(1)[0];
        source.mark_in_flight(seq, now(), 30).unwrap();

        let mut target = DeadLetterTarget::Queue(&mut dlq);
        assert!(!check_and_redrive(&mut source, &mut target, seq).unwrap());
        assert_eq!(source.counts().in_flight, 1);
        assert!(dlq.peek(10).is_empty());
    }

    #[test]
    fn test_missing_target_leaves_message() {
        let mut source = queue("src", Some(policy(1)));
        source
            .enqueue("a".into(), MessageAttributes::new(), 0, now())
            .unwrap();
        let seq = source.available_sequences(1)[0];
        source.mark_in_flight(seq, now(), 30).unwrap();

        let mut target = DeadLetterTarget::Missing(policy(1).dead_letter_target_arn);
        let err = check_and_redrive(&mut source, &mut target, seq).unwrap_err();
        assert!(matches!(err, SqsError::TargetQueueDoesNotExist(_)));
        assert_eq!(source.counts().in_flight, 1);
    }
}
