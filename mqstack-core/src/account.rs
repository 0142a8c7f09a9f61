//! Account and region scoped resource naming
//!
//! Queue and topic identifiers are pure functions of the resource name and
//! the account context, so the same name always maps to the same ARN/URL.

/// Account, region and endpoint used to derive resource identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountContext {
    pub account_id: String,
    pub region: String,
    pub base_url: String,
}

impl Default for AccountContext {
    fn default() -> Self {
        Self::new("000000000000", "us-east-1", "http://localhost:4566")
    }
}

impl AccountContext {
    pub fn new(
        account_id: impl Into<String>,
        region: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            account_id: account_id.into(),
            region: region.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn queue_arn(&self, name: &str) -> String {
        format!("arn:aws:sqs:{}:{}:{}", self.region, self.account_id, name)
    }

    pub fn queue_url(&self, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.account_id, name)
    }

    pub fn topic_arn(&self, name: &str) -> String {
        format!("arn:aws:sns:{}:{}:{}", self.region, self.account_id, name)
    }

    pub fn subscription_arn(&self, topic_name: &str, id: &str) -> String {
        format!("{}:{}", self.topic_arn(topic_name), id)
    }

    /// Accepts a queue ARN, a queue URL or a bare queue name.
    pub fn resolve_queue_name<'a>(&self, identifier: &'a str) -> &'a str {
        if identifier.starts_with("arn:") {
            return identifier.rsplit(':').next().unwrap_or(identifier);
        }
        if identifier.contains('/') {
            return identifier
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(identifier);
        }
        identifier
    }

    /// Accepts a topic ARN or a bare topic name.
    pub fn resolve_topic_name<'a>(&self, identifier: &'a str) -> &'a str {
        if identifier.starts_with("arn:") {
            // arn:aws:sns:region:account:name
            return identifier.split(':').nth(5).unwrap_or(identifier);
        }
        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_are_deterministic() {
        let ctx = AccountContext::default();
        assert_eq!(
            ctx.queue_arn("orders"),
            "arn:aws:sqs:us-east-1:000000000000:orders"
        );
        assert_eq!(ctx.queue_arn("orders"), ctx.queue_arn("orders"));
        assert_eq!(
            ctx.queue_url("orders"),
            "http://localhost:4566/000000000000/orders"
        );
        assert_eq!(
            ctx.topic_arn("events"),
            "arn:aws:sns:us-east-1:000000000000:events"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let ctx = AccountContext::new("123456789012", "eu-west-1", "http://127.0.0.1:9324/");
        assert_eq!(
            ctx.queue_url("jobs"),
            "http://127.0.0.1:9324/123456789012/jobs"
        );
    }

    #[test]
    fn test_resolve_queue_name() {
        let ctx = AccountContext::default();
        let arn = ctx.queue_arn("orders");
        let url = ctx.queue_url("orders");
        assert_eq!(ctx.resolve_queue_name(&arn), "orders");
        assert_eq!(ctx.resolve_queue_name(&url), "orders");
        assert_eq!(ctx.resolve_queue_name("orders"), "orders");
    }

    #[test]
    fn test_resolve_topic_name() {
        let ctx = AccountContext::default();
        let sub = ctx.subscription_arn("events", "abc");
        assert_eq!(ctx.resolve_topic_name(&ctx.topic_arn("events")), "events");
        assert_eq!(ctx.resolve_topic_name(&sub), "events");
        assert_eq!(ctx.resolve_topic_name("events"), "events");
    }
}
