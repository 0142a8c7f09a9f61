//! Core types and traits for mqstack
//!
//! This crate provides the types shared by the queue and topic services:
//! error codes, resource naming, time, message attributes and digests.

pub mod account;
pub mod attributes;
pub mod checksum;
pub mod clock;
pub mod error;

pub use account::AccountContext;
pub use attributes::{validate_message_attributes, MessageAttributeValue, MessageAttributes};
pub use checksum::{md5_of_attributes, md5_of_body};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{ErrorCode, ServiceError};
