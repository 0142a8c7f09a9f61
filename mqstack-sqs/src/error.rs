//! SQS error type

use mqstack_core::attributes::InvalidMessageAttribute;
use mqstack_core::{ErrorCode, ServiceError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqsError {
    #[error("Queue does not exist: {0}")]
    QueueDoesNotExist(String),
    #[error("Queue already exists with different attributes: {0}")]
    QueueNameExists(String),
    #[error("Invalid attribute name: {0}")]
    InvalidAttributeName(String),
    #[error("Invalid attribute value: {0}")]
    InvalidAttributeValue(String),
    #[error("Invalid parameter value: {0}")]
    InvalidParameterValue(String),
    #[error("Receipt handle is invalid: {0}")]
    ReceiptHandleIsInvalid(String),
    #[error("Message does not exist: {0}")]
    MessageNotFound(String),
    #[error("Dead-letter target queue does not exist: {0}")]
    TargetQueueDoesNotExist(String),
}

impl SqsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::QueueDoesNotExist(_) => ErrorCode::QueueDoesNotExist,
            Self::QueueNameExists(_) => ErrorCode::QueueNameExists,
            Self::InvalidAttributeName(_) => ErrorCode::InvalidAttributeName,
            Self::InvalidAttributeValue(_) => ErrorCode::InvalidAttributeValue,
            Self::InvalidParameterValue(_) => ErrorCode::InvalidParameterValue,
            Self::ReceiptHandleIsInvalid(_) => ErrorCode::ReceiptHandleIsInvalid,
            Self::MessageNotFound(_) => ErrorCode::MessageNotFound,
            Self::TargetQueueDoesNotExist(_) => ErrorCode::TargetQueueDoesNotExist,
        }
    }
}

impl From<InvalidMessageAttribute> for SqsError {
    fn from(err: InvalidMessageAttribute) -> Self {
        Self::InvalidParameterValue(err.0)
    }
}

impl From<SqsError> for ServiceError {
    fn from(err: SqsError) -> Self {
        ServiceError::new(err.code(), err.to_string())
    }
}
