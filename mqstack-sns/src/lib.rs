//! Topic service for mqstack
//!
//! Topics fan published messages out to subscribed queues.

pub mod error;
mod storage;
pub mod topic;

pub use error::SnsError;
pub use storage::SnsStorage;
pub use topic::{DeliveryOutcome, Protocol, PublishResult, Subscription, Topic};
