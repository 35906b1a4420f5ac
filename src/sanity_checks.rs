// src/sanity_checks.rs

use mongodb::bson::oid::ObjectId;

/// A usable string value: present and not just whitespace.
pub fn is_valid_string(value: &str) -> bool {
    !value.trim().is_empty()
}

/// A usable list: at least one entry.
pub fn is_valid_array<T>(value: &[T]) -> bool {
    !value.is_empty()
}

/// Checks that a string is a well-formed MongoDB ObjectId (24 hex chars).
pub fn is_valid_object_id(value: &str) -> bool {
    ObjectId::parse_str(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_invalid() {
        assert!(!is_valid_string(""));
        assert!(!is_valid_string("   "));
        assert!(is_valid_string("u1"));
    }

    #[test]
    fn empty_arrays_are_invalid() {
        assert!(!is_valid_array::<String>(&[]));
        assert!(is_valid_array(&["work".to_string()]));
    }

    #[test]
    fn object_id_must_be_24_hex_chars() {
        assert!(is_valid_object_id("507f1f77bcf86cd799439011"));
        assert!(!is_valid_object_id("507f1f77bcf86cd79943901")); // 23 chars
        assert!(!is_valid_object_id("not-an-object-id-at-all!"));
        assert!(!is_valid_object_id(""));
    }
}
