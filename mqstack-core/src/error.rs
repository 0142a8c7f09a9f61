//! Service error codes and the boundary-facing error type

use thiserror::Error;

/// Error codes surfaced by the queue and topic services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lookup
    QueueDoesNotExist,
    MessageNotFound,
    TopicNotFound,
    SubscriptionNotFound,

    // Creation conflicts
    QueueNameExists,
    TopicAlreadyExists,

    // Validation
    InvalidAttributeName,
    InvalidAttributeValue,
    InvalidParameterValue,

    // Message lifecycle
    ReceiptHandleIsInvalid,
    TargetQueueDoesNotExist,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueueDoesNotExist => "AWS.SimpleQueueService.NonExistentQueue",
            Self::MessageNotFound => "MessageNotFound",
            Self::TopicNotFound => "NotFound",
            Self::SubscriptionNotFound => "NotFound",
            Self::QueueNameExists => "QueueAlreadyExists",
            Self::TopicAlreadyExists => "InvalidParameter",
            Self::InvalidAttributeName => "InvalidAttributeName",
            Self::InvalidAttributeValue => "InvalidAttributeValue",
            Self::InvalidParameterValue => "InvalidParameterValue",
            Self::ReceiptHandleIsInvalid => "ReceiptHandleIsInvalid",
            Self::TargetQueueDoesNotExist => "AWS.SimpleQueueService.NonExistentQueue",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::MessageNotFound | Self::TopicNotFound | Self::SubscriptionNotFound => 404,
            Self::QueueDoesNotExist
            | Self::TargetQueueDoesNotExist
            | Self::QueueNameExists
            | Self::TopicAlreadyExists
            | Self::InvalidAttributeName
            | Self::InvalidAttributeValue
            | Self::InvalidParameterValue
            | Self::ReceiptHandleIsInvalid => 400,
        }
    }

    /// True for the "resource is absent" class of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::QueueDoesNotExist
                | Self::MessageNotFound
                | Self::TopicNotFound
                | Self::SubscriptionNotFound
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error handed to the protocol translation layer
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    pub resource: Option<String>,
    pub request_id: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource: None,
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ServiceError::new(ErrorCode::ReceiptHandleIsInvalid, "stale handle")
            .with_resource("orders")
            .with_request_id("test-request-id");

        assert_eq!(error.to_string(), "ReceiptHandleIsInvalid: stale handle");
        assert_eq!(error.resource.as_deref(), Some("orders"));
        assert_eq!(error.request_id, "test-request-id");
    }

    #[test]
    fn test_not_found_class() {
        assert!(ErrorCode::QueueDoesNotExist.is_not_found());
        assert!(ErrorCode::SubscriptionNotFound.is_not_found());
        assert!(ErrorCode::MessageNotFound.is_not_found());
        assert!(!ErrorCode::TargetQueueDoesNotExist.is_not_found());
        assert_eq!(ErrorCode::TopicNotFound.http_status(), 404);
        assert_eq!(ErrorCode::InvalidParameterValue.http_status(), 400);
    }
}
