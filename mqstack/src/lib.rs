//! mqstack - local message queue and topic broker
//!
//! A [`Broker`] owns one queue store and one topic store that share an
//! account context and a clock. Brokers are plain values, so tests can run
//! several side by side.

pub mod config;

use mqstack_core::{AccountContext, SharedClock, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub use config::{BrokerConfig, Config};
pub use mqstack_core::{ErrorCode, ManualClock, MessageAttributeValue, MessageAttributes, ServiceError};
pub use mqstack_sns::{PublishResult, SnsError, SnsStorage};
pub use mqstack_sqs::{QueueSummary, ReceiveMessageRequest, ReceivedMessage, SqsError, SqsStorage};

pub struct Broker {
    sqs: Arc<SqsStorage>,
    sns: SnsStorage,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(&BrokerConfig::default())
    }
}

impl Broker {
    pub fn new(config: &BrokerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &BrokerConfig, clock: SharedClock) -> Self {
        let context = AccountContext::new(
            config.account_id.clone(),
            config.region.clone(),
            config.base_url.clone(),
        );
        let sqs = Arc::new(SqsStorage::new(context, Arc::clone(&clock)));
        let sns = SnsStorage::new(Arc::clone(&sqs), clock);
        Self { sqs, sns }
    }

    pub fn sqs(&self) -> &SqsStorage {
        &self.sqs
    }

    pub fn sns(&self) -> &SnsStorage {
        &self.sns
    }

    pub fn context(&self) -> &AccountContext {
        self.sqs.context()
    }

    /// Runs one maintenance pass over every queue.
    pub fn sweep(&self) -> usize {
        self.sqs.sweep()
    }

    /// Sweeps on a fixed interval until the returned task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let broker = Arc::clone(self);
        info!(interval = ?interval, "Starting sweeper");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let released = broker.sweep();
                if released > 0 {
                    debug!(released, "Sweeper pass");
                }
            }
        })
    }
}
