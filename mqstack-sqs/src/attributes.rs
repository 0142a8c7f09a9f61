//! Queue attribute schema and validation

use std::collections::HashMap;

use crate::error::SqsError;

pub const VISIBILITY_TIMEOUT: &str = "VisibilityTimeout";
pub const MESSAGE_RETENTION_PERIOD: &str = "MessageRetentionPeriod";
pub const MAXIMUM_MESSAGE_SIZE: &str = "MaximumMessageSize";
pub const REDRIVE_POLICY: &str = "RedrivePolicy";

pub const APPROXIMATE_NUMBER_OF_MESSAGES: &str = "ApproximateNumberOfMessages";
pub const APPROXIMATE_NUMBER_OF_MESSAGES_DELAYED: &str = "ApproximateNumberOfMessagesDelayed";
pub const APPROXIMATE_NUMBER_OF_MESSAGES_NOT_VISIBLE: &str =
    "ApproximateNumberOfMessagesNotVisible";
pub const CREATED_TIMESTAMP: &str = "CreatedTimestamp";
pub const LAST_MODIFIED_TIMESTAMP: &str = "LastModifiedTimestamp";
pub const QUEUE_ARN: &str = "QueueArn";

/// Names accepted on create/update
pub const SETTABLE_ATTRIBUTES: &[&str] = &[
    MESSAGE_RETENTION_PERIOD,
    VISIBILITY_TIMEOUT,
    REDRIVE_POLICY,
    MAXIMUM_MESSAGE_SIZE,
];

/// Names computed by the store, readable only
pub const COMPUTED_ATTRIBUTES: &[&str] = &[
    APPROXIMATE_NUMBER_OF_MESSAGES,
    APPROXIMATE_NUMBER_OF_MESSAGES_DELAYED,
    APPROXIMATE_NUMBER_OF_MESSAGES_NOT_VISIBLE,
    CREATED_TIMESTAMP,
    LAST_MODIFIED_TIMESTAMP,
    QUEUE_ARN,
];

pub const DEFAULT_VISIBILITY_TIMEOUT: u32 = 30;
pub const DEFAULT_MESSAGE_RETENTION_PERIOD: u32 = 345_600; // 4 days
pub const DEFAULT_MAXIMUM_MESSAGE_SIZE: u32 = 262_144; // 256KB
pub const MAX_VISIBILITY_TIMEOUT: u32 = 43_200;
pub const MAX_RECEIVE_COUNT_LIMIT: u32 = 1000;

/// Dead-letter rule for a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedrivePolicy {
    pub dead_letter_target_arn: String,
    pub max_receive_count: u32,
}

impl RedrivePolicy {
    pub fn from_json(s: &str) -> Result<Self, SqsError> {
        let v: serde_json::Value = serde_json::from_str(s).map_err(|e| {
            SqsError::InvalidAttributeValue(format!("Invalid RedrivePolicy JSON: {e}"))
        })?;
        let arn = v
            .get("deadLetterTargetArn")
            .and_then(|v| v.as_str())
            .filter(|arn| !arn.is_empty())
            .ok_or_else(|| {
                SqsError::InvalidAttributeValue(
                    "RedrivePolicy must contain deadLetterTargetArn".into(),
                )
            })?
            .to_string();
        let max_count = v
            .get("maxReceiveCount")
            .and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            })
            .ok_or_else(|| {
                SqsError::InvalidAttributeValue(
                    "RedrivePolicy must contain an integer maxReceiveCount".into(),
                )
            })?;
        let max_receive_count = u32::try_from(max_count)
            .ok()
            .filter(|c| (1..=MAX_RECEIVE_COUNT_LIMIT).contains(c))
            .ok_or_else(|| {
                SqsError::InvalidAttributeValue(format!(
                    "maxReceiveCount must be between 1 and {MAX_RECEIVE_COUNT_LIMIT}"
                ))
            })?;
        Ok(RedrivePolicy {
            dead_letter_target_arn: arn,
            max_receive_count,
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "deadLetterTargetArn": self.dead_letter_target_arn,
            "maxReceiveCount": self.max_receive_count,
        })
        .to_string()
    }
}

/// Configurable queue attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAttributes {
    pub visibility_timeout: u32,
    pub message_retention_period: u32,
    pub maximum_message_size: u32,
    pub redrive_policy: Option<RedrivePolicy>,
}

impl Default for QueueAttributes {
    fn default() -> Self {
        QueueAttributes {
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
            message_retention_period: DEFAULT_MESSAGE_RETENTION_PERIOD,
            maximum_message_size: DEFAULT_MAXIMUM_MESSAGE_SIZE,
            redrive_policy: None,
        }
    }
}

fn parse_ranged(key: &str, value: &str, min: u32, max: u32) -> Result<u32, SqsError> {
    let v: u32 = value
        .trim()
        .parse()
        .map_err(|_| SqsError::InvalidAttributeValue(format!("Invalid {key}: {value}")))?;
    if !(min..=max).contains(&v) {
        return Err(SqsError::InvalidAttributeValue(format!(
            "{key} must be between {min} and {max}"
        )));
    }
    Ok(v)
}

impl QueueAttributes {
    pub fn from_map(attrs: &HashMap<String, String>) -> Result<Self, SqsError> {
        let mut attributes = Self::default();
        attributes.apply(attrs)?;
        Ok(attributes)
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert(VISIBILITY_TIMEOUT.into(), self.visibility_timeout.to_string());
        m.insert(
            MESSAGE_RETENTION_PERIOD.into(),
            self.message_retention_period.to_string(),
        );
        m.insert(
            MAXIMUM_MESSAGE_SIZE.into(),
            self.maximum_message_size.to_string(),
        );
        if let Some(ref rp) = self.redrive_policy {
            m.insert(REDRIVE_POLICY.into(), rp.to_json());
        }
        m
    }

    /// Validates and applies every entry, or none of them.
    pub fn apply(&mut self, attrs: &HashMap<String, String>) -> Result<(), SqsError> {
        let mut updated = self.clone();
        for (key, value) in attrs {
            match key.as_str() {
                VISIBILITY_TIMEOUT => {
                    updated.visibility_timeout =
                        parse_ranged(key, value, 0, MAX_VISIBILITY_TIMEOUT)?;
                }
                MESSAGE_RETENTION_PERIOD => {
                    updated.message_retention_period = parse_ranged(key, value, 60, 1_209_600)?;
                }
                MAXIMUM_MESSAGE_SIZE => {
                    updated.maximum_message_size =
                        parse_ranged(key, value, 1024, DEFAULT_MAXIMUM_MESSAGE_SIZE)?;
                }
                REDRIVE_POLICY => {
                    updated.redrive_policy = if value.trim().is_empty() {
                        None
                    } else {
                        Some(RedrivePolicy::from_json(value)?)
                    };
                }
                _ => {
                    return Err(SqsError::InvalidAttributeName(format!(
                        "Unknown attribute: {key}"
                    )));
                }
            }
        }
        *self = updated;
        Ok(())
    }

    /// True when every supplied attribute normalises to the value already set.
    pub fn is_compatible_with(&self, attrs: &HashMap<String, String>) -> Result<bool, SqsError> {
        let requested = Self::from_map(attrs)?.to_map();
        let existing = self.to_map();
        Ok(attrs
            .keys()
            .all(|key| requested.get(key) == existing.get(key)))
    }
}
