//! SNS error type

use mqstack_core::attributes::InvalidMessageAttribute;
use mqstack_core::{ErrorCode, ServiceError};
use mqstack_sqs::SqsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnsError {
    #[error("Topic does not exist: {0}")]
    TopicNotFound(String),
    #[error("Topic already exists with different tags: {0}")]
    TopicAlreadyExists(String),
    #[error("Subscription does not exist: {0}")]
    SubscriptionNotFound(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameterValue(String),
    #[error("Subscription endpoint does not exist: {0}")]
    TargetQueueDoesNotExist(String),
    #[error(transparent)]
    Sqs(#[from] SqsError),
}

impl SnsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TopicNotFound(_) => ErrorCode::TopicNotFound,
            Self::TopicAlreadyExists(_) => ErrorCode::TopicAlreadyExists,
            Self::SubscriptionNotFound(_) => ErrorCode::SubscriptionNotFound,
            Self::InvalidParameterValue(_) => ErrorCode::InvalidParameterValue,
            Self::TargetQueueDoesNotExist(_) => ErrorCode::TargetQueueDoesNotExist,
            Self::Sqs(e) => e.code(),
        }
    }
}

impl From<InvalidMessageAttribute> for SnsError {
    fn from(err: InvalidMessageAttribute) -> Self {
        Self::InvalidParameterValue(err.0)
    }
}

impl From<SnsError> for ServiceError {
    fn from(err: SnsError) -> Self {
        ServiceError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_queue_error_keeps_code() {
        let err: SnsError = SqsError::QueueDoesNotExist("q".into()).into();
        assert_eq!(err.code(), ErrorCode::QueueDoesNotExist);
        assert_eq!(err.to_string(), "Queue does not exist: q");
    }

    #[test]
    fn test_service_error_conversion() {
        let err: ServiceError = SnsError::TopicNotFound("t".into()).into();
        assert_eq!(err.code, ErrorCode::TopicNotFound);
        assert_eq!(err.code.http_status(), 404);
    }
}
