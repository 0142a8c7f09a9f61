//! Content digests for message bodies and attributes

use md5::{Digest, Md5};

use crate::attributes::MessageAttributes;

/// Hex MD5 of the raw body bytes
pub fn md5_of_body(body: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// MD5 over the length-prefixed encoding of the attributes, names sorted.
///
/// Returns `None` when there are no attributes.
pub fn md5_of_attributes(attributes: &MessageAttributes) -> Option<String> {
    if attributes.is_empty() {
        return None;
    }
    let mut names: Vec<&String> = attributes.keys().collect();
    names.sort();

    let mut buf: Vec<u8> = Vec::new();
    for name in names {
        let value = &attributes[name];
        push_length_prefixed(&mut buf, name.as_bytes());
        push_length_prefixed(&mut buf, value.data_type.as_bytes());
        // Transport type: 1 for String/Number, 2 for Binary
        if value.is_binary() {
            buf.push(2);
            push_length_prefixed(&mut buf, value.binary_value.as_deref().unwrap_or_default());
        } else {
            buf.push(1);
            push_length_prefixed(
                &mut buf,
                value.string_value.as_deref().unwrap_or_default().as_bytes(),
            );
        }
    }

    let mut hasher = Md5::new();
    hasher.update(&buf);
    Some(hex::encode(hasher.finalize()))
}

fn push_length_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::MessageAttributeValue;

    #[test]
    fn test_md5_of_body_known_value() {
        assert_eq!(md5_of_body(b"hello"), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(md5_of_body(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_md5_of_attributes_empty() {
        assert_eq!(md5_of_attributes(&MessageAttributes::new()), None);
    }

    #[test]
    fn test_md5_of_attributes_order_independent() {
        let mut a = MessageAttributes::new();
        a.insert("b".to_string(), MessageAttributeValue::string("2"));
        a.insert("a".to_string(), MessageAttributeValue::number("1"));
        let mut b = MessageAttributes::new();
        b.insert("a".to_string(), MessageAttributeValue::number("1"));
        b.insert("b".to_string(), MessageAttributeValue::string("2"));
        assert_eq!(md5_of_attributes(&a), md5_of_attributes(&b));
    }

    #[test]
    fn test_md5_of_attributes_changes_with_value() {
        let mut a = MessageAttributes::new();
        a.insert("k".to_string(), MessageAttributeValue::string("v"));
        let mut b = MessageAttributes::new();
        b.insert("k".to_string(), MessageAttributeValue::string("w"));
        assert_ne!(md5_of_attributes(&a), md5_of_attributes(&b));
    }
}
