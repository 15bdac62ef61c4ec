//! Composite keys: deterministic keys derived from an ordered tuple of parts.
//!
//! Layout: `\u{0}` object type `\u{0}` then each attribute followed by
//! `\u{0}`. The leading marker keeps composite keys out of plain range scans.

use crate::StoreError;

/// Marker byte that starts, and separates the parts of, a composite key.
pub const COMPOSITE_KEY_MARKER: char = '\u{0}';

/// Build a composite key from an object type and its attribute values.
pub fn composite_key(object_type: &str, attributes: &[&str]) -> Result<String, StoreError> {
    if object_type.is_empty() {
        return Err(StoreError::InvalidKey(
            "composite key object type must not be empty".into(),
        ));
    }
    validate_part(object_type)?;
    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(COMPOSITE_KEY_MARKER);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_MARKER);
    for attribute in attributes {
        validate_part(attribute)?;
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_MARKER);
    }
    Ok(key)
}

/// Split a composite key back into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), StoreError> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_MARKER)
        .and_then(|rest| rest.strip_suffix(COMPOSITE_KEY_MARKER))
        .ok_or_else(|| StoreError::InvalidKey(format!("{key:?} is not a composite key")))?;
    let mut parts = body.split(COMPOSITE_KEY_MARKER).map(str::to_string);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StoreError::InvalidKey(format!("{key:?} has no object type")))?;
    Ok((object_type, parts.collect()))
}

/// Whether `key` lives in the composite-key namespace.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_MARKER)
}

fn validate_part(part: &str) -> Result<(), StoreError> {
    if part.contains(COMPOSITE_KEY_MARKER) {
        return Err(StoreError::InvalidKey(format!(
            "composite key part {part:?} contains the reserved marker"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_layout() {
        let key = composite_key("searchkey", &["acmid", "Public"]).unwrap();
        assert_eq!(key, "\u{0}searchkey\u{0}acmid\u{0}Public\u{0}");
        assert!(is_composite_key(&key));
    }

    #[test]
    fn composite_key_splits_back() {
        let key = composite_key("searchkey", &["acmid", ""]).unwrap();
        let (object_type, attributes) = split_composite_key(&key).unwrap();
        assert_eq!(object_type, "searchkey");
        assert_eq!(attributes, vec!["acmid".to_string(), String::new()]);
    }

    #[test]
    fn composite_key_without_attributes() {
        let key = composite_key("searchkey", &[]).unwrap();
        let (object_type, attributes) = split_composite_key(&key).unwrap();
        assert_eq!(object_type, "searchkey");
        assert!(attributes.is_empty());
    }

    #[test]
    fn composite_key_rejects_marker_in_parts() {
        assert!(matches!(
            composite_key("searchkey", &["a\u{0}b"]),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            composite_key("", &["a"]),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn plain_key_is_not_composite() {
        assert!(!is_composite_key("bill:POA10000998"));
        assert!(split_composite_key("bill:POA10000998").is_err());
    }
}
