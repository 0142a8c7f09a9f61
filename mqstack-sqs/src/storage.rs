//! SQS in-memory storage
//!
//! Queues live in a `DashMap` keyed by name; each entry owns its own mutex
//! and a `Notify` used to wake long-polling receivers. No queue lock is held
//! across an await point or while touching the registry map. When two queues
//! must be locked together (redrive, move) they are locked in name order.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mqstack_core::{AccountContext, MessageAttributes, SharedClock, SystemClock};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::attributes::{QueueAttributes, MAX_VISIBILITY_TIMEOUT, REDRIVE_POLICY};
use crate::error::SqsError;
use crate::message::{MessageView, ReceivedMessage, SendMessageResult, SYSTEM_ATTRIBUTES};
use crate::queue::{AttributeFilter, Queue};
use crate::redrive::{self, DeadLetterTarget};

pub const MAX_QUEUE_NAME_LENGTH: usize = 80;
pub const MAX_RECEIVE_BATCH: u32 = 10;
pub const MAX_WAIT_TIME_SECONDS: u32 = 20;

/// Identity of a queue as returned by create/get/list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSummary {
    pub name: String,
    pub url: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveMessageRequest {
    pub max_number_of_messages: u32,
    /// Falls back to the queue's VisibilityTimeout
    pub visibility_timeout: Option<u32>,
    pub wait_time_seconds: u32,
    pub attribute_names: Vec<String>,
    pub message_attribute_names: Vec<String>,
}

impl Default for ReceiveMessageRequest {
    fn default() -> Self {
        Self {
            max_number_of_messages: 1,
            visibility_timeout: None,
            wait_time_seconds: 0,
            attribute_names: Vec::new(),
            message_attribute_names: Vec::new(),
        }
    }
}

impl ReceiveMessageRequest {
    pub fn new(max_number_of_messages: u32) -> Self {
        Self {
            max_number_of_messages,
            ..Self::default()
        }
    }

    pub fn with_visibility_timeout(mut self, seconds: u32) -> Self {
        self.visibility_timeout = Some(seconds);
        self
    }

    pub fn with_wait_time(mut self, seconds: u32) -> Self {
        self.wait_time_seconds = seconds;
        self
    }

    pub fn with_attribute_names(mut self, names: &[&str]) -> Self {
        self.attribute_names = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    pub fn with_message_attribute_names(mut self, names: &[&str]) -> Self {
        self.message_attribute_names = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    fn validate(&self) -> Result<(), SqsError> {
        if !(1..=MAX_RECEIVE_BATCH).contains(&self.max_number_of_messages) {
            return Err(SqsError::InvalidParameterValue(format!(
                "MaxNumberOfMessages must be between 1 and {MAX_RECEIVE_BATCH}"
            )));
        }
        if self
            .visibility_timeout
            .is_some_and(|v| v > MAX_VISIBILITY_TIMEOUT)
        {
            return Err(SqsError::InvalidParameterValue(format!(
                "VisibilityTimeout must be between 0 and {MAX_VISIBILITY_TIMEOUT}"
            )));
        }
        if self.wait_time_seconds > MAX_WAIT_TIME_SECONDS {
            return Err(SqsError::InvalidParameterValue(format!(
                "WaitTimeSeconds must be between 0 and {MAX_WAIT_TIME_SECONDS}"
            )));
        }
        if let Some(unknown) = self
            .attribute_names
            .iter()
            .find(|n| n.as_str() != "All" && !SYSTEM_ATTRIBUTES.contains(&n.as_str()))
        {
            return Err(SqsError::InvalidAttributeName(format!(
                "Unknown Attribute {unknown}."
            )));
        }
        Ok(())
    }

    fn filter(&self) -> AttributeFilter {
        AttributeFilter {
            attribute_names: self.attribute_names.clone(),
            message_attribute_names: self.message_attribute_names.clone(),
        }
    }
}

pub(crate) struct QueueEntry {
    name: String,
    queue: Mutex<Queue>,
    notify: Notify,
}

impl QueueEntry {
    fn lock_live(&self) -> Result<MutexGuard<'_, Queue>, SqsError> {
        let queue = self.queue.lock();
        if queue.deleted {
            return Err(SqsError::QueueDoesNotExist(self.name.clone()));
        }
        Ok(queue)
    }

    fn summary(&self) -> QueueSummary {
        let queue = self.queue.lock();
        QueueSummary {
            name: queue.name.clone(),
            url: queue.url.clone(),
            arn: queue.arn.clone(),
        }
    }
}

/// Locks two distinct queues in name order, returning the guards as `(a, b)`.
fn lock_pair<'a>(
    a: &'a QueueEntry,
    b: &'a QueueEntry,
) -> (MutexGuard<'a, Queue>, MutexGuard<'a, Queue>) {
    if a.name <= b.name {
        let first = a.queue.lock();
        let second = b.queue.lock();
        (first, second)
    } else {
        let second = b.queue.lock();
        let first = a.queue.lock();
        (first, second)
    }
}

#[derive(Default)]
struct ReceiveBatch {
    messages: Vec<ReceivedMessage>,
    redriven: usize,
    next_visible_at: Option<DateTime<Utc>>,
}

/// Selects and delivers up to the requested number of available messages,
/// redriving any that reach the dead-letter threshold.
fn deliver(
    queue: &mut Queue,
    mut target: DeadLetterTarget<'_>,
    request: &ReceiveMessageRequest,
    now: DateTime<Utc>,
) -> Result<ReceiveBatch, SqsError> {
    queue.reconcile(now);
    if queue.paused {
        return Ok(ReceiveBatch::default());
    }
    let visibility_timeout = request
        .visibility_timeout
        .unwrap_or(queue.attributes.visibility_timeout);
    let candidates = queue.available_sequences(request.max_number_of_messages as usize);

    // A missing dead-letter queue fails the whole receive, but only the
    // messages that would have been redriven are consumed by the attempt.
    if let DeadLetterTarget::Missing(arn) = &target {
        let policy = queue.attributes.redrive_policy.clone();
        let blocked: Vec<u64> = candidates
            .iter()
            .copied()
            .filter(|seq| {
                queue.message(*seq).is_some_and(|m| {
                    redrive::reaches_threshold(policy.as_ref(), m.receive_count + 1)
                })
            })
            .collect();
        if !blocked.is_empty() {
            for seq in &blocked {
                queue.mark_in_flight(*seq, now, visibility_timeout);
            }
            warn!(
                queue = %queue.name,
                dead_letter_target = %arn,
                count = blocked.len(),
                "Cannot redrive messages, dead-letter queue does not exist"
            );
            return Err(SqsError::TargetQueueDoesNotExist(arn.clone()));
        }
    }

    let filter = request.filter();
    let mut batch = ReceiveBatch::default();
    for seq in candidates {
        if queue.mark_in_flight(seq, now, visibility_timeout).is_none() {
            continue;
        }
        if redrive::check_and_redrive(queue, &mut target, seq)? {
            batch.redriven += 1;
            continue;
        }
        if let Some(msg) = queue.to_received(seq, &filter) {
            batch.messages.push(msg);
        }
    }
    batch.next_visible_at = queue.next_visible_at();
    Ok(batch)
}

pub struct SqsStorage {
    context: AccountContext,
    clock: SharedClock,
    queues: DashMap<String, Arc<QueueEntry>>,
}

impl Default for SqsStorage {
    fn default() -> Self {
        Self::new(AccountContext::default(), Arc::new(SystemClock))
    }
}

impl SqsStorage {
    pub fn new(context: AccountContext, clock: SharedClock) -> Self {
        Self {
            context,
            clock,
            queues: DashMap::new(),
        }
    }

    pub fn context(&self) -> &AccountContext {
        &self.context
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Looks up a queue by name, URL or ARN.
    fn entry(&self, queue: &str) -> Result<Arc<QueueEntry>, SqsError> {
        let name = self.context.resolve_queue_name(queue);
        self.queues
            .get(name)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| SqsError::QueueDoesNotExist(name.to_string()))
    }

    pub fn queue_exists(&self, queue: &str) -> bool {
        self.entry(queue).is_ok()
    }

    fn validate_queue_name(name: &str) -> Result<(), SqsError> {
        let valid = !name.is_empty()
            && name.len() <= MAX_QUEUE_NAME_LENGTH
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(SqsError::InvalidParameterValue(format!(
                "Can only include alphanumeric characters, hyphens, or underscores. 1 to {MAX_QUEUE_NAME_LENGTH} in length: {name}"
            )))
        }
    }

    /// The dead-letter target must be another queue that exists right now.
    fn validate_redrive_target(
        &self,
        queue_name: &str,
        attributes: &QueueAttributes,
    ) -> Result<(), SqsError> {
        let Some(ref policy) = attributes.redrive_policy else {
            return Ok(());
        };
        let target = self
            .context
            .resolve_queue_name(&policy.dead_letter_target_arn);
        if target == queue_name {
            return Err(SqsError::InvalidAttributeValue(
                "A queue cannot be its own dead-letter queue".into(),
            ));
        }
        if !self.queues.contains_key(target) {
            return Err(SqsError::InvalidAttributeValue(format!(
                "Dead-letter target does not exist: {}",
                policy.dead_letter_target_arn
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Queue registry
    // =========================================================================

    pub fn create_queue(
        &self,
        name: &str,
        attributes: &HashMap<String, String>,
        tags: HashMap<String, String>,
    ) -> Result<QueueSummary, SqsError> {
        Self::validate_queue_name(name)?;
        let parsed = QueueAttributes::from_map(attributes)?;
        if let Some(existing) = self.queues.get(name).map(|e| Arc::clone(e.value())) {
            return Self::existing_compatible(&existing, attributes);
        }
        // Checked before taking the map entry; contains_key on the same shard
        // would deadlock.
        self.validate_redrive_target(name, &parsed)?;

        let existing = match self.queues.entry(name.to_string()) {
            Entry::Occupied(e) => Arc::clone(e.get()),
            Entry::Vacant(e) => {
                let queue = Queue::new(
                    name.to_string(),
                    self.context.queue_arn(name),
                    self.context.queue_url(name),
                    parsed,
                    tags,
                    self.now(),
                );
                info!(name = %name, url = %queue.url, "Creating queue");
                let entry = Arc::new(QueueEntry {
                    name: name.to_string(),
                    queue: Mutex::new(queue),
                    notify: Notify::new(),
                });
                let summary = entry.summary();
                e.insert(entry);
                return Ok(summary);
            }
        };

        Self::existing_compatible(&existing, attributes)
    }

    fn existing_compatible(
        existing: &QueueEntry,
        attributes: &HashMap<String, String>,
    ) -> Result<QueueSummary, SqsError> {
        let compatible = existing.lock_live()?.attributes.is_compatible_with(attributes)?;
        if !compatible {
            return Err(SqsError::QueueNameExists(existing.name.clone()));
        }
        debug!(name = %existing.name, "Queue already exists with compatible attributes");
        Ok(existing.summary())
    }

    pub fn get_queue(&self, queue: &str) -> Result<QueueSummary, SqsError> {
        let entry = self.entry(queue)?;
        drop(entry.lock_live()?);
        Ok(entry.summary())
    }

    /// All live queues, optionally filtered by name prefix. Order is unspecified.
    pub fn list_queues(&self, prefix: Option<&str>) -> Vec<QueueSummary> {
        let entries: Vec<Arc<QueueEntry>> = self
            .queues
            .iter()
            .filter(|e| prefix.map_or(true, |p| e.key().starts_with(p)))
            .map(|e| Arc::clone(e.value()))
            .collect();
        entries.iter().map(|e| e.summary()).collect()
    }

    pub fn delete_queue(&self, queue: &str) -> Result<(), SqsError> {
        let name = self.context.resolve_queue_name(queue);
        let (_, entry) = self
            .queues
            .remove(name)
            .ok_or_else(|| SqsError::QueueDoesNotExist(name.to_string()))?;

        let discarded = {
            let mut q = entry.queue.lock();
            q.deleted = true;
            q.purge()
        };
        entry.notify.notify_waiters();
        info!(name = %name, discarded, "Deleting queue");
        Ok(())
    }

    pub fn purge_queue(&self, queue: &str) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        let purged = entry.lock_live()?.purge();
        info!(name = %entry.name, purged, "Purged queue");
        Ok(())
    }

    pub fn get_queue_attributes(
        &self,
        queue: &str,
        names: &[String],
    ) -> Result<HashMap<String, String>, SqsError> {
        let entry = self.entry(queue)?;
        let (attributes, woke) = {
            let mut q = entry.lock_live()?;
            let woke = q.reconcile(self.now());
            (q.get_attributes(names), woke)
        };
        if woke > 0 {
            entry.notify.notify_waiters();
        }
        attributes
    }

    pub fn set_queue_attributes(
        &self,
        queue: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        let mut updated = entry.lock_live()?.attributes.clone();
        updated.apply(attributes)?;
        // A dangling policy already in place only fails when a receive uses it.
        if attributes
            .get(REDRIVE_POLICY)
            .is_some_and(|policy| !policy.is_empty())
        {
            self.validate_redrive_target(&entry.name, &updated)?;
        }

        let mut q = entry.lock_live()?;
        q.attributes.apply(attributes)?;
        q.last_modified_timestamp = self.now();
        info!(name = %q.name, updated = attributes.len(), "Set queue attributes");
        Ok(())
    }

    pub fn tag_queue(&self, queue: &str, tags: HashMap<String, String>) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        entry.lock_live()?.tags.extend(tags);
        Ok(())
    }

    pub fn untag_queue(&self, queue: &str, keys: &[String]) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        let mut q = entry.lock_live()?;
        for key in keys {
            q.tags.remove(key);
        }
        Ok(())
    }

    pub fn list_queue_tags(&self, queue: &str) -> Result<HashMap<String, String>, SqsError> {
        let entry = self.entry(queue)?;
        let tags = entry.lock_live()?.tags.clone();
        Ok(tags)
    }

    /// Queues whose redrive policy points at `queue`.
    pub fn list_dead_letter_source_queues(
        &self,
        queue: &str,
    ) -> Result<Vec<QueueSummary>, SqsError> {
        let target = self.entry(queue)?;
        let entries: Vec<Arc<QueueEntry>> =
            self.queues.iter().map(|e| Arc::clone(e.value())).collect();

        let mut sources = Vec::new();
        for entry in entries {
            let q = entry.queue.lock();
            let points_here = q.redrive_policy_target(&self.context) == Some(target.name.as_str());
            if !q.deleted && points_here {
                sources.push(QueueSummary {
                    name: q.name.clone(),
                    url: q.url.clone(),
                    arn: q.arn.clone(),
                });
            }
        }
        Ok(sources)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    pub fn send_message(
        &self,
        queue: &str,
        body: String,
        message_attributes: MessageAttributes,
        delay_seconds: Option<u32>,
    ) -> Result<SendMessageResult, SqsError> {
        let entry = self.entry(queue)?;
        let delay = delay_seconds.unwrap_or(0);
        let result = {
            let mut q = entry.lock_live()?;
            let now = self.now();
            q.reconcile(now);
            q.enqueue(body, message_attributes, delay, now)?
        };
        // Waiters recompute their wake time, so delayed sends notify too.
        entry.notify.notify_waiters();
        debug!(queue = %entry.name, message_id = %result.message_id, delay, "Sent message");
        Ok(result)
    }

    /// Receives up to `max_number_of_messages` messages. With a positive
    /// wait time, suspends until a message is available or the wait elapses.
    pub async fn receive_message(
        &self,
        queue: &str,
        request: &ReceiveMessageRequest,
    ) -> Result<Vec<ReceivedMessage>, SqsError> {
        request.validate()?;
        let entry = self.entry(queue)?;
        let deadline =
            Instant::now() + std::time::Duration::from_secs(u64::from(request.wait_time_seconds));

        loop {
            // Registered before the attempt so a send between the attempt and
            // the await still wakes this receiver.
            let notified = entry.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let batch = self.try_receive(&entry, request)?;
            let now = Instant::now();
            if !batch.messages.is_empty() || now >= deadline {
                debug!(
                    queue = %entry.name,
                    count = batch.messages.len(),
                    redriven = batch.redriven,
                    "Received messages"
                );
                return Ok(batch.messages);
            }

            let wake_at = batch
                .next_visible_at
                .map(|at| (at - self.now()).to_std().unwrap_or_default())
                .map_or(deadline, |until| deadline.min(now + until));
            let _ = tokio::time::timeout_at(wake_at, notified).await;
        }
    }

    fn try_receive(
        &self,
        entry: &QueueEntry,
        request: &ReceiveMessageRequest,
    ) -> Result<ReceiveBatch, SqsError> {
        let now = self.now();
        loop {
            let target_name = {
                let mut q = entry.lock_live()?;
                let target = q.redrive_policy_target(&self.context).map(str::to_string);
                match target {
                    Some(name) => name,
                    None => return deliver(&mut q, DeadLetterTarget::Disabled, request, now),
                }
            };

            let dead_letter = self
                .queues
                .get(&target_name)
                .map(|e| Arc::clone(e.value()))
                .filter(|dlq| dlq.name != entry.name);

            let Some(dlq) = dead_letter else {
                let mut q = entry.lock_live()?;
                // Policy changed while unlocked; start over.
                if q.redrive_policy_target(&self.context) != Some(target_name.as_str()) {
                    continue;
                }
                let arn = q.dead_letter_target_arn().unwrap_or_default();
                return deliver(&mut q, DeadLetterTarget::Missing(arn), request, now);
            };

            let batch = {
                let (mut q, mut dead) = lock_pair(entry, &dlq);
                if q.deleted {
                    return Err(SqsError::QueueDoesNotExist(entry.name.clone()));
                }
                if q.redrive_policy_target(&self.context) != Some(target_name.as_str()) {
                    continue;
                }
                if dead.deleted {
                    let arn = q.dead_letter_target_arn().unwrap_or_default();
                    deliver(&mut q, DeadLetterTarget::Missing(arn), request, now)
                } else {
                    deliver(&mut q, DeadLetterTarget::Queue(&mut *dead), request, now)
                }
            }?;
            if batch.redriven > 0 {
                dlq.notify.notify_waiters();
            }
            return Ok(batch);
        }
    }

    pub fn delete_message(&self, queue: &str, receipt_handle: &str) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        let (result, woke) = {
            let mut q = entry.lock_live()?;
            let woke = q.reconcile(self.now());
            (q.delete(receipt_handle), woke)
        };
        if woke > 0 {
            entry.notify.notify_waiters();
        }
        let msg = result?;
        debug!(queue = %entry.name, message_id = %msg.message_id, "Deleted message");
        Ok(())
    }

    pub fn change_message_visibility(
        &self,
        queue: &str,
        receipt_handle: &str,
        visibility_timeout: u32,
    ) -> Result<(), SqsError> {
        if visibility_timeout > MAX_VISIBILITY_TIMEOUT {
            return Err(SqsError::InvalidParameterValue(format!(
                "VisibilityTimeout must be between 0 and {MAX_VISIBILITY_TIMEOUT}"
            )));
        }
        let entry = self.entry(queue)?;
        {
            let mut q = entry.lock_live()?;
            let now = self.now();
            q.reconcile(now);
            q.change_visibility(receipt_handle, visibility_timeout, now)?;
        }
        // Any change can move the earliest visibility deadline forward.
        entry.notify.notify_waiters();
        debug!(queue = %entry.name, visibility_timeout, "Changed message visibility");
        Ok(())
    }

    /// Returns an in-flight message to the queue right away.
    pub fn nak_message(
        &self,
        queue: &str,
        receipt_handle: &str,
        reason: Option<String>,
    ) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        {
            let mut q = entry.lock_live()?;
            q.reconcile(self.now());
            q.nak(receipt_handle, reason)?;
        }
        entry.notify.notify_waiters();
        debug!(queue = %entry.name, "Nacked message");
        Ok(())
    }

    pub fn get_message(&self, queue: &str, message_id: &str) -> Result<MessageView, SqsError> {
        let entry = self.entry(queue)?;
        let mut q = entry.lock_live()?;
        q.reconcile(self.now());
        q.view(message_id)
    }

    /// Deletes a message by id in any state. With `receipt_handle`, the
    /// handle must be the message's current one.
    pub fn delete_message_by_id(
        &self,
        queue: &str,
        message_id: &str,
        receipt_handle: Option<&str>,
    ) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        {
            let mut q = entry.lock_live()?;
            q.reconcile(self.now());
            q.delete_by_id(message_id, receipt_handle)?;
        }
        debug!(queue = %entry.name, message_id = %message_id, "Deleted message by id");
        Ok(())
    }

    /// Stops deliveries from a queue. Sends and other operations still work.
    pub fn pause_queue(&self, queue: &str) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        entry.lock_live()?.paused = true;
        info!(name = %entry.name, "Paused queue");
        Ok(())
    }

    pub fn resume_queue(&self, queue: &str) -> Result<(), SqsError> {
        let entry = self.entry(queue)?;
        entry.lock_live()?.paused = false;
        entry.notify.notify_waiters();
        info!(name = %entry.name, "Resumed queue");
        Ok(())
    }

    pub fn is_paused(&self, queue: &str) -> Result<bool, SqsError> {
        let entry = self.entry(queue)?;
        let paused = entry.lock_live()?.paused;
        Ok(paused)
    }

    /// Read-only view of up to `max` messages in queue order.
    pub fn peek_messages(&self, queue: &str, max: usize) -> Result<Vec<MessageView>, SqsError> {
        let entry = self.entry(queue)?;
        let mut q = entry.lock_live()?;
        q.reconcile(self.now());
        Ok(q.peek(max))
    }

    /// Moves every available message from `source` to `destination`.
    pub fn move_messages(&self, source: &str, destination: &str) -> Result<usize, SqsError> {
        let from = self.entry(source)?;
        let to = self.entry(destination)?;
        if Arc::ptr_eq(&from, &to) {
            return Err(SqsError::InvalidParameterValue(
                "Source and destination queues must differ".into(),
            ));
        }

        let moved = {
            let (mut src, mut dst) = lock_pair(&from, &to);
            if src.deleted {
                return Err(SqsError::QueueDoesNotExist(from.name.clone()));
            }
            if dst.deleted {
                return Err(SqsError::QueueDoesNotExist(to.name.clone()));
            }
            src.reconcile(self.now());
            let messages = src.drain_available();
            let moved = messages.len();
            for msg in messages {
                dst.enqueue_transferred(msg);
            }
            moved
        };
        if moved > 0 {
            to.notify.notify_waiters();
        }
        info!(source = %from.name, destination = %to.name, moved, "Moved messages");
        Ok(moved)
    }

    /// Reconciles every queue and wakes receivers on queues that gained
    /// visible messages. Returns the number of messages made available.
    pub fn sweep(&self) -> usize {
        let entries: Vec<Arc<QueueEntry>> =
            self.queues.iter().map(|e| Arc::clone(e.value())).collect();
        let now = self.now();
        let mut total = 0;
        for entry in entries {
            let woke = {
                let mut q = entry.queue.lock();
                if q.deleted {
                    continue;
                }
                q.reconcile(now)
            };
            if woke > 0 {
                entry.notify.notify_waiters();
                total += woke;
            }
        }
        if total > 0 {
            debug!(messages = total, "Sweep released messages");
        }
        total
    }
}
