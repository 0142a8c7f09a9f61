//! Queue service for mqstack
//!
//! Provides in-memory queues with support for:
//! - CreateQueue, GetQueue, ListQueues, DeleteQueue, PurgeQueue
//! - Queue attributes and tags
//! - SendMessage, ReceiveMessage (with long polling), DeleteMessage,
//!   ChangeMessageVisibility
//! - Dead-letter redrive, PeekMessages and MoveMessages

pub mod attributes;
pub mod error;
pub mod message;
pub mod queue;
pub mod redrive;
mod storage;


pub use attributes::{QueueAttributes, RedrivePolicy};
pub use error::SqsError;
pub use message::{MessageState, MessageView, ReceivedMessage, SendMessageResult};
pub use queue::MessageCounts;
pub use storage::{QueueSummary, ReceiveMessageRequest, SqsStorage};
