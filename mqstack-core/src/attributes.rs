//! User-defined message attributes

use std::collections::HashMap;
use thiserror::Error;

pub const MAX_MESSAGE_ATTRIBUTES: usize = 10;
const MAX_ATTRIBUTE_NAME_LEN: usize = 256;

/// Typed attribute value attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttributeValue {
    pub data_type: String,
    pub string_value: Option<String>,
    pub binary_value: Option<Vec<u8>>,
}

impl MessageAttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self {
            data_type: "Number".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self {
            data_type: "Binary".to_string(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }

    /// Base type with any custom suffix (`Number.int`) stripped
    pub fn base_type(&self) -> &str {
        self.data_type
            .split_once('.')
            .map_or(self.data_type.as_str(), |(base, _)| base)
    }

    pub fn is_binary(&self) -> bool {
        self.base_type() == "Binary"
    }
}

pub type MessageAttributes = HashMap<String, MessageAttributeValue>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidMessageAttribute(pub String);

fn invalid(message: impl Into<String>) -> InvalidMessageAttribute {
    InvalidMessageAttribute(message.into())
}

pub fn validate_message_attributes(
    attributes: &MessageAttributes,
) -> Result<(), InvalidMessageAttribute> {
    if attributes.len() > MAX_MESSAGE_ATTRIBUTES {
        return Err(invalid(format!(
            "Number of message attributes [{}] exceeds the allowed maximum [{}].",
            attributes.len(),
            MAX_MESSAGE_ATTRIBUTES
        )));
    }
    for (name, value) in attributes {
        validate_attribute_name(name)?;
        validate_attribute_value(name, value)?;
    }
    Ok(())
}

fn validate_attribute_name(name: &str) -> Result<(), InvalidMessageAttribute> {
    if name.is_empty() || name.len() > MAX_ATTRIBUTE_NAME_LEN {
        return Err(invalid(format!(
            "Message attribute name '{name}' must be 1 to {MAX_ATTRIBUTE_NAME_LEN} characters."
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid(format!(
            "Message attribute name '{name}' contains invalid characters."
        )));
    }
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("aws.") || lower.starts_with("amazon.") {
        return Err(invalid(format!(
            "Message attribute name '{name}' uses a reserved prefix."
        )));
    }
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return Err(invalid(format!(
            "Message attribute name '{name}' has misplaced periods."
        )));
    }
    Ok(())
}

fn validate_attribute_value(
    name: &str,
    value: &MessageAttributeValue,
) -> Result<(), InvalidMessageAttribute> {
    match value.base_type() {
        "String" => {
            if value.string_value.is_none() {
                return Err(invalid(format!(
                    "Message attribute '{name}' must contain a string value."
                )));
            }
        }
        "Number" => {
            let raw = value.string_value.as_deref().ok_or_else(|| {
                invalid(format!(
                    "Message attribute '{name}' must contain a number value."
                ))
            })?;
            if raw.trim().parse::<f64>().is_err() {
                return Err(invalid(format!(
                    "Can't cast the value of message attribute '{name}' to a number."
                )));
            }
        }
        "Binary" => {
            if value.binary_value.is_none() {
                return Err(invalid(format!(
                    "Message attribute '{name}' must contain a binary value."
                )));
            }
        }
        other => {
            return Err(invalid(format!(
                "The type of message attribute '{name}' is invalid: {other}."
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(entries: Vec<(&str, MessageAttributeValue)>) -> MessageAttributes {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_valid_attributes() {
        let a = attrs(vec![
            ("k", MessageAttributeValue::string("v")),
            ("count", MessageAttributeValue::number("42.5")),
            ("blob", MessageAttributeValue::binary(vec![1, 2, 3])),
            ("custom.type", MessageAttributeValue {
                data_type: "Number.int".to_string(),
                string_value: Some("7".to_string()),
                binary_value: None,
            }),
        ]);
        assert!(validate_message_attributes(&a).is_ok());
    }

    #[test]
    fn test_reserved_and_malformed_names() {
        for name in ["AWS.trace", "amazon.x", ".lead", "trail.", "a..b", "sp ace", ""] {
            let a = attrs(vec![(name, MessageAttributeValue::string("v"))]);
            assert!(validate_message_attributes(&a).is_err(), "{name} accepted");
        }
    }

    #[test]
    fn test_number_must_parse() {
        let a = attrs(vec![("n", MessageAttributeValue::number("twelve"))]);
        assert!(validate_message_attributes(&a).is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let a = attrs(vec![(
            "n",
            MessageAttributeValue {
                data_type: "Blob".to_string(),
                string_value: Some("x".to_string()),
                binary_value: None,
            },
        )]);
        assert!(validate_message_attributes(&a).is_err());
    }

    #[test]
    fn test_too_many_attributes() {
        let a: MessageAttributes = (0..11)
            .map(|i| (format!("a{i}"), MessageAttributeValue::string("v")))
            .collect();
        assert!(validate_message_attributes(&a).is_err());
    }
}
