//! Sequential record identifiers
//!
//! An id is the store prefix followed by the insert counter, zero padded to
//! [`ID_WIDTH`] digits (`ART000001`). Fixed width keeps ids of one store in
//! lexicographic creation order.

/// Digits used for the numeric part of an id
pub const ID_WIDTH: usize = 6;

/// Build the id for counter value `n`
pub fn make_id(prefix: &str, n: u64) -> String {
    format!("{}{:0width$}", prefix, n, width = ID_WIDTH)
}

/// Recover the counter value from an id issued under `prefix`
pub fn id_number(prefix: &str, id: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lookup key accepted by `retrieve`/`holds`: a full id or a bare counter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey<'a> {
    Id(&'a str),
    Number(u64),
}

impl RecordKey<'_> {
    /// Resolve to a full id using the store's prefix
    pub fn to_id(self, prefix: &str) -> String {
        match self {
            RecordKey::Id(id) => id.to_string(),
            RecordKey::Number(n) => make_id(prefix, n),
        }
    }
}

impl From<u64> for RecordKey<'_> {
    fn from(n: u64) -> Self {
        RecordKey::Number(n)
    }
}

impl<'a> From<&'a str> for RecordKey<'a> {
    fn from(id: &'a str) -> Self {
        RecordKey::Id(id)
    }
}

impl<'a> From<&'a String> for RecordKey<'a> {
    fn from(id: &'a String) -> Self {
        RecordKey::Id(id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id_pads_to_six_digits() {
        assert_eq!(make_id("ART", 1), "ART000001");
        assert_eq!(make_id("SALE", 42), "SALE000042");
        assert_eq!(make_id("RCH", 0), "RCH000000");
    }

    #[test]
    fn test_make_id_wider_numbers_are_not_truncated() {
        assert_eq!(make_id("ART", 1_234_567), "ART1234567");
    }

    #[test]
    fn test_ids_sort_in_creation_order() {
        let mut ids: Vec<String> = [10, 2, 100, 1].iter().map(|n| make_id("ART", *n)).collect();
        ids.sort();
        assert_eq!(ids, vec!["ART000001", "ART000002", "ART000010", "ART000100"]);
    }

    #[test]
    fn test_id_number_round_trip() {
        assert_eq!(id_number("ART", &make_id("ART", 17)), Some(17));
    }

    #[test]
    fn test_id_number_rejects_foreign_ids() {
        assert_eq!(id_number("ART", "RCH000001"), None);
        assert_eq!(id_number("ART", "ART"), None);
        assert_eq!(id_number("ART", "ART00x001"), None);
    }

    #[test]
    fn test_record_key_resolution() {
        assert_eq!(RecordKey::from(3).to_id("RCH"), "RCH000003");
        assert_eq!(RecordKey::from("RCH000009").to_id("RCH"), "RCH000009");
    }
}
