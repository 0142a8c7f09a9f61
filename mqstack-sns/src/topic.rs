//! Topics and their subscriptions

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use mqstack_sqs::{SendMessageResult, SqsError};

/// Delivery protocols accepted by Subscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Sqs,
}

impl Protocol {
    pub fn parse(protocol: &str) -> Option<Self> {
        if protocol.eq_ignore_ascii_case("sqs") {
            Some(Self::Sqs)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqs => "sqs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub subscription_arn: String,
    pub topic_arn: String,
    pub protocol: Protocol,
    /// Queue ARN
    pub endpoint: String,
    pub queue_name: String,
    pub deliveries: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Topic {
    pub name: String,
    pub arn: String,
    pub tags: HashMap<String, String>,
    pub created_timestamp: DateTime<Utc>,
    pub subscriptions: Vec<Subscription>,
    pub deliveries_failed: u64,
}

impl Topic {
    pub fn new(name: String, arn: String, tags: HashMap<String, String>, now: DateTime<Utc>) -> Self {
        Self {
            name,
            arn,
            tags,
            created_timestamp: now,
            subscriptions: Vec::new(),
            deliveries_failed: 0,
        }
    }

    pub fn subscription_for_queue(&self, queue_arn: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.endpoint == queue_arn)
    }

    /// Folds one publish's outcomes into the per-subscription counters.
    /// Subscriptions removed while the publish was in progress are skipped.
    pub fn record(&mut self, outcomes: &[DeliveryOutcome]) {
        for outcome in outcomes {
            let Some(sub) = self
                .subscriptions
                .iter_mut()
                .find(|s| s.subscription_arn == outcome.subscription_arn)
            else {
                continue;
            };
            match outcome.result {
                Ok(_) => sub.deliveries += 1,
                Err(ref e) => {
                    sub.failures += 1;
                    sub.last_error = Some(e.to_string());
                    self.deliveries_failed += 1;
                }
            }
        }
    }

    pub fn attributes(&self, owner: &str) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert("TopicArn".to_string(), self.arn.clone());
        attrs.insert("Owner".to_string(), owner.to_string());
        attrs.insert(
            "SubscriptionsConfirmed".to_string(),
            self.subscriptions.len().to_string(),
        );
        attrs.insert("SubscriptionsPending".to_string(), "0".to_string());
        attrs.insert(
            "CreatedTimestamp".to_string(),
            self.created_timestamp.timestamp().to_string(),
        );
        attrs.insert(
            "DeliveriesFailed".to_string(),
            self.deliveries_failed.to_string(),
        );
        attrs
    }
}

/// What happened to one subscriber during a publish
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub subscription_arn: String,
    pub endpoint: String,
    pub result: Result<SendMessageResult, SqsError>,
}

#[derive(Debug, Clone)]
pub struct PublishResult {
    pub message_id: String,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl PublishResult {
    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.delivered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!(Protocol::parse("sqs"), Some(Protocol::Sqs));
        assert_eq!(Protocol::parse("SQS"), Some(Protocol::Sqs));
        assert_eq!(Protocol::parse("http"), None);
        assert_eq!(Protocol::Sqs.as_str(), "sqs");
    }

    #[test]
    fn test_record_outcomes() {
        let arn = "arn:aws:sns:us-east-1:000000000000:t".to_string();
        let mut topic = Topic::new("t".into(), arn.clone(), HashMap::new(), Utc::now());
        topic.subscriptions.push(Subscription {
            subscription_arn: format!("{arn}:1"),
            topic_arn: arn.clone(),
            protocol: Protocol::Sqs,
            endpoint: "arn:aws:sqs:us-east-1:000000000000:q".into(),
            queue_name: "q".into(),
            deliveries: 0,
            failures: 0,
            last_error: None,
        });

        topic.record(&[
            DeliveryOutcome {
                subscription_arn: format!("{arn}:1"),
                endpoint: "arn:aws:sqs:us-east-1:000000000000:q".into(),
                result: Err(SqsError::QueueDoesNotExist("q".into())),
            },
            DeliveryOutcome {
                subscription_arn: format!("{arn}:gone"),
                endpoint: String::new(),
                result: Err(SqsError::QueueDoesNotExist("x".into())),
            },
        ]);

        let sub = &topic.subscriptions[0];
        assert_eq!(sub.failures, 1);
        assert_eq!(sub.deliveries, 0);
        assert!(sub.last_error.is_some());
        assert_eq!(topic.attributes("000000000000")["DeliveriesFailed"], "1");
    }
}
