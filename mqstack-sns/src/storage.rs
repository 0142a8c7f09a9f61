//! SNS in-memory storage
//!
//! Topics are kept in their own `DashMap`. Publishing snapshots the topic's
//! subscriptions, releases the map guard, then sends into each queue through
//! the shared queue store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mqstack_core::{validate_message_attributes, AccountContext, MessageAttributes, SharedClock};
use mqstack_sqs::{SqsError, SqsStorage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SnsError;
use crate::topic::{DeliveryOutcome, Protocol, PublishResult, Subscription, Topic};

pub const MAX_TOPIC_NAME_LENGTH: usize = 256;

pub struct SnsStorage {
    context: AccountContext,
    clock: SharedClock,
    queues: Arc<SqsStorage>,
    topics: DashMap<String, Topic>,
}

impl SnsStorage {
    pub fn new(queues: Arc<SqsStorage>, clock: SharedClock) -> Self {
        Self {
            context: queues.context().clone(),
            clock,
            queues,
            topics: DashMap::new(),
        }
    }

    fn topic_name<'a>(&self, topic: &'a str) -> &'a str {
        self.context.resolve_topic_name(topic)
    }

    fn validate_topic_name(name: &str) -> Result<(), SnsError> {
        let valid = !name.is_empty()
            && name.len() <= MAX_TOPIC_NAME_LENGTH
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(SnsError::InvalidParameterValue(format!(
                "Topic names must be made up of only uppercase and lowercase ASCII letters, numbers, underscores, and hyphens, and must be between 1 and {MAX_TOPIC_NAME_LENGTH} characters long: {name}"
            )))
        }
    }

    pub fn create_topic(
        &self,
        name: &str,
        tags: HashMap<String, String>,
    ) -> Result<Topic, SnsError> {
        Self::validate_topic_name(name)?;
        match self.topics.entry(name.to_string()) {
            Entry::Occupied(e) => {
                let topic = e.get();
                if !tags.is_empty() && topic.tags != tags {
                    return Err(SnsError::TopicAlreadyExists(name.to_string()));
                }
                Ok(topic.clone())
            }
            Entry::Vacant(e) => {
                let topic = Topic::new(
                    name.to_string(),
                    self.context.topic_arn(name),
                    tags,
                    self.clock.now(),
                );
                info!(name = %name, arn = %topic.arn, "Creating topic");
                Ok(e.insert(topic).clone())
            }
        }
    }

    /// Removes the topic and all of its subscriptions. Subscribed queues are
    /// left alone.
    pub fn delete_topic(&self, topic: &str) -> Result<(), SnsError> {
        let name = self.topic_name(topic);
        let (_, removed) = self
            .topics
            .remove(name)
            .ok_or_else(|| SnsError::TopicNotFound(name.to_string()))?;
        info!(name = %name, subscriptions = removed.subscriptions.len(), "Deleting topic");
        Ok(())
    }

    pub fn get_topic(&self, topic: &str) -> Result<Topic, SnsError> {
        let name = self.topic_name(topic);
        self.topics
            .get(name)
            .map(|t| t.clone())
            .ok_or_else(|| SnsError::TopicNotFound(name.to_string()))
    }

    pub fn list_topics(&self) -> Vec<Topic> {
        self.topics.iter().map(|t| t.value().clone()).collect()
    }

    pub fn get_topic_attributes(&self, topic: &str) -> Result<HashMap<String, String>, SnsError> {
        let name = self.topic_name(topic);
        self.topics
            .get(name)
            .map(|t| t.attributes(&self.context.account_id))
            .ok_or_else(|| SnsError::TopicNotFound(name.to_string()))
    }

    /// Subscribes a queue (by ARN, URL or name) to a topic and returns the
    /// subscription ARN. Subscribing the same queue again returns the
    /// existing ARN.
    pub fn subscribe(
        &self,
        topic: &str,
        protocol: &str,
        endpoint: &str,
    ) -> Result<String, SnsError> {
        let protocol = Protocol::parse(protocol).ok_or_else(|| {
            SnsError::InvalidParameterValue(format!("Unsupported protocol: {protocol}"))
        })?;
        let queue = self.queues.get_queue(endpoint).map_err(|e| match e {
            SqsError::QueueDoesNotExist(_) => {
                SnsError::TargetQueueDoesNotExist(endpoint.to_string())
            }
            other => SnsError::Sqs(other),
        })?;

        let name = self.topic_name(topic);
        let mut entry = self
            .topics
            .get_mut(name)
            .ok_or_else(|| SnsError::TopicNotFound(name.to_string()))?;

        if let Some(existing) = entry.subscription_for_queue(&queue.arn) {
            debug!(topic = %name, queue = %queue.name, "Queue already subscribed");
            return Ok(existing.subscription_arn.clone());
        }

        let subscription_arn = self
            .context
            .subscription_arn(name, &Uuid::new_v4().to_string());
        let topic_arn = entry.arn.clone();
        entry.subscriptions.push(Subscription {
            subscription_arn: subscription_arn.clone(),
            topic_arn,
            protocol,
            endpoint: queue.arn,
            queue_name: queue.name.clone(),
            deliveries: 0,
            failures: 0,
            last_error: None,
        });
        info!(topic = %name, protocol = %protocol.as_str(), queue = %queue.name, "Subscribed");
        Ok(subscription_arn)
    }

    pub fn unsubscribe(&self, subscription_arn: &str) -> Result<(), SnsError> {
        let name = self.topic_name(subscription_arn);
        if let Some(mut topic) = self.topics.get_mut(name) {
            let before = topic.subscriptions.len();
            topic
                .subscriptions
                .retain(|s| s.subscription_arn != subscription_arn);
            if topic.subscriptions.len() != before {
                info!(arn = %subscription_arn, "Unsubscribed");
                return Ok(());
            }
        }
        Err(SnsError::SubscriptionNotFound(subscription_arn.to_string()))
    }

    pub fn list_subscriptions(&self) -> Vec<Subscription> {
        self.topics
            .iter()
            .flat_map(|t| t.value().subscriptions.clone())
            .collect()
    }

    pub fn list_subscriptions_by_topic(&self, topic: &str) -> Result<Vec<Subscription>, SnsError> {
        Ok(self.get_topic(topic)?.subscriptions)
    }

    /// Delivers an independent copy of the message to every subscribed queue.
    /// A failed delivery is recorded against its subscription and does not
    /// stop delivery to the others.
    pub fn publish(
        &self,
        topic: &str,
        message: &str,
        message_attributes: MessageAttributes,
    ) -> Result<PublishResult, SnsError> {
        if message.is_empty() {
            return Err(SnsError::InvalidParameterValue("Empty message".into()));
        }
        validate_message_attributes(&message_attributes)?;

        let name = self.topic_name(topic);
        let subscriptions = self
            .topics
            .get(name)
            .map(|t| t.subscriptions.clone())
            .ok_or_else(|| SnsError::TopicNotFound(name.to_string()))?;

        let message_id = Uuid::new_v4().to_string();
        let deliveries: Vec<DeliveryOutcome> = subscriptions
            .into_iter()
            .map(|sub| {
                let result = self.queues.send_message(
                    &sub.queue_name,
                    message.to_string(),
                    message_attributes.clone(),
                    None,
                );
                if let Err(ref e) = result {
                    warn!(
                        topic = %name,
                        subscription = %sub.subscription_arn,
                        error = %e,
                        "Fanout delivery failed"
                    );
                }
                DeliveryOutcome {
                    subscription_arn: sub.subscription_arn,
                    endpoint: sub.endpoint,
                    result,
                }
            })
            .collect();

        if let Some(mut t) = self.topics.get_mut(name) {
            t.record(&deliveries);
        }

        let result = PublishResult {
            message_id,
            deliveries,
        };
        info!(
            topic = %name,
            message_id = %result.message_id,
            delivered = result.delivered(),
            failed = result.failed(),
            "Published message"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqstack_core::{ManualClock, MessageAttributeValue};
    use mqstack_sqs::ReceiveMessageRequest;

    fn storage() -> (Arc<SqsStorage>, SnsStorage) {
        let clock: SharedClock = Arc::new(ManualClock::default());
        let queues = Arc::new(SqsStorage::new(AccountContext::default(), clock.clone()));
        let topics = SnsStorage::new(Arc::clone(&queues), clock);
        (queues, topics)
    }

    fn queue(sqs: &SqsStorage, name: &str) -> String {
        sqs.create_queue(name, &HashMap::new(), HashMap::new())
            .unwrap()
            .arn
    }

    #[test]
    fn test_create_topic() {
        let (_, sns) = storage();
        let topic = sns.create_topic("events", HashMap::new()).unwrap();
        assert_eq!(topic.arn, "arn:aws:sns:us-east-1:000000000000:events");
        assert_eq!(sns.get_topic(&topic.arn).unwrap().name, "events");
        assert_eq!(sns.list_topics().len(), 1);
    }

    #[test]
    fn test_create_topic_idempotent() {
        let (_, sns) = storage();
        let mut tags = HashMap::new();
        tags.insert("env".to_string(), "dev".to_string());
        let first = sns.create_topic("events", tags.clone()).unwrap();
        let second = sns.create_topic("events", tags).unwrap();
        assert_eq!(first.arn, second.arn);

        let mut other = HashMap::new();
        other.insert("env".to_string(), "prod".to_string());
        assert!(matches!(
            sns.create_topic("events", other).unwrap_err(),
            SnsError::TopicAlreadyExists(_)
        ));
    }

    #[test]
    fn test_create_topic_invalid_name() {
        let (_, sns) = storage();
        assert!(matches!(
            sns.create_topic("bad name", HashMap::new()).unwrap_err(),
            SnsError::InvalidParameterValue(_)
        ));
    }

    #[test]
    fn test_subscribe() {
        let (sqs, sns) = storage();
        let topic = sns.create_topic("events", HashMap::new()).unwrap();
        let queue_arn = queue(&sqs, "a");

        let arn = sns.subscribe(&topic.arn, "sqs", &queue_arn).unwrap();
        assert!(arn.starts_with(&format!("{}:", topic.arn)));
        assert_eq!(sns.subscribe("events", "SQS", "a").unwrap(), arn);

        let subs = sns.list_subscriptions_by_topic("events").unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].endpoint, queue_arn);
        assert_eq!(sns.get_topic_attributes("events").unwrap()["SubscriptionsConfirmed"], "1");
    }

    #[test]
    fn test_subscribe_validation() {
        let (sqs, sns) = storage();
        sns.create_topic("events", HashMap::new()).unwrap();
        queue(&sqs, "a");

        assert!(matches!(
            sns.subscribe("events", "http", "a").unwrap_err(),
            SnsError::InvalidParameterValue(_)
        ));
        assert!(matches!(
            sns.subscribe("events", "sqs", "missing").unwrap_err(),
            SnsError::TargetQueueDoesNotExist(_)
        ));
        assert!(matches!(
            sns.subscribe("nope", "sqs", "a").unwrap_err(),
            SnsError::TopicNotFound(_)
        ));
    }

    #[test]
    fn test_unsubscribe() {
        let (sqs, sns) = storage();
        sns.create_topic("events", HashMap::new()).unwrap();
        queue(&sqs, "a");
        let arn = sns.subscribe("events", "sqs", "a").unwrap();

        sns.unsubscribe(&arn).unwrap();
        assert!(sns.list_subscriptions().is_empty());
        assert!(matches!(
            sns.unsubscribe(&arn).unwrap_err(),
            SnsError::SubscriptionNotFound(_)
        ));
    }

    #[test]
    fn test_delete_topic_cascades() {
        let (sqs, sns) = storage();
        sns.create_topic("events", HashMap::new()).unwrap();
        queue(&sqs, "a");
        sns.subscribe("events", "sqs", "a").unwrap();

        sns.delete_topic("events").unwrap();
        assert!(sns.list_subscriptions().is_empty());
        assert!(sqs.get_queue("a").is_ok());
        assert!(matches!(
            sns.delete_topic("events").unwrap_err(),
            SnsError::TopicNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_publish_fanout() {
        let (sqs, sns) = storage();
        sns.create_topic("events", HashMap::new()).unwrap();
        queue(&sqs, "a");
        queue(&sqs, "b");
        sns.subscribe("events", "sqs", "a").unwrap();
        sns.subscribe("events", "sqs", "b").unwrap();

        let mut attrs = MessageAttributes::new();
        attrs.insert("k".into(), MessageAttributeValue::string("v"));
        let result = sns.publish("events", "hello", attrs).unwrap();
        assert_eq!(result.delivered(), 2);
        assert_eq!(result.failed(), 0);

        let req = ReceiveMessageRequest::new(10).with_message_attribute_names(&["All"]);
        let a = sqs.receive_message("a", &req).await.unwrap();
        let b = sqs.receive_message("b", &req).await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].body, "hello");
        assert_eq!(
            b[0].message_attributes["k"].string_value.as_deref(),
            Some("v")
        );
        assert_ne!(a[0].message_id, b[0].message_id);
    }

    #[test]
    fn test_publish_partial_failure() {
        let (sqs, sns) = storage();
        sns.create_topic("events", HashMap::new()).unwrap();
        queue(&sqs, "a");
        queue(&sqs, "b");
        let gone = sns.subscribe("events", "sqs", "a").unwrap();
        sns.subscribe("events", "sqs", "b").unwrap();
        sqs.delete_queue("a").unwrap();

        let result = sns.publish("events", "hello", MessageAttributes::new()).unwrap();
        assert_eq!(result.delivered(), 1);
        assert_eq!(result.failed(), 1);
        let failed = result.deliveries.iter().find(|d| d.result.is_err()).unwrap();
        assert_eq!(failed.subscription_arn, gone);

        let subs = sns.list_subscriptions_by_topic("events").unwrap();
        let sub = subs.iter().find(|s| s.subscription_arn == gone).unwrap();
        assert_eq!(sub.failures, 1);
        assert!(sub.last_error.is_some());
        assert_eq!(sns.get_topic_attributes("events").unwrap()["DeliveriesFailed"], "1");
    }

    #[test]
    fn test_publish_validation() {
        let (_, sns) = storage();
        assert!(matches!(
            sns.publish("missing", "x", MessageAttributes::new()).unwrap_err(),
            SnsError::TopicNotFound(_)
        ));
        sns.create_topic("events", HashMap::new()).unwrap();
        assert!(matches!(
            sns.publish("events", "", MessageAttributes::new()).unwrap_err(),
            SnsError::InvalidParameterValue(_)
        ));
        let mut attrs = MessageAttributes::new();
        attrs.insert("n".into(), MessageAttributeValue::number("abc"));
        assert!(matches!(
            sns.publish("events", "x", attrs).unwrap_err(),
            SnsError::InvalidParameterValue(_)
        ));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let (_, sns) = storage();
        sns.create_topic("events", HashMap::new()).unwrap();
        let result = sns.publish("events", "x", MessageAttributes::new()).unwrap();
        assert!(result.deliveries.is_empty());
        assert!(!result.message_id.is_empty());
    }
}
