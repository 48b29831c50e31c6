//! Template data and the reserved capture namespace.
//!
//! Wildcard captures are exposed to address templates as `capture_1`,
//! `capture_2`, ... Every key starting with [`RESERVED_PREFIX`] belongs to that
//! namespace; auxiliary data produced by a [`Translate`] hook must stay out of it.
//!
//! [`Translate`]: crate::Translate

use std::collections::BTreeMap;

/// Prefix shared by all reserved capture keys.
pub const RESERVED_PREFIX: &str = "capture_";

/// Auxiliary key/value pairs produced by a translate hook.
pub type AuxData = BTreeMap<String, String>;

/// Reserved key under which the `index`-th (1-based) wildcard capture is exposed.
pub fn capture_key(index: usize) -> String {
    format!("{RESERVED_PREFIX}{index}")
}

/// Whether `key` falls into the reserved capture namespace.
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// Merged per-event data an address template is rendered against.
///
/// Built fresh for every event: auxiliary data first, captures last, so a
/// capture always wins over an auxiliary value with the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    values: BTreeMap<String, String>,
}

impl TemplateData {
    /// Create empty template data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge auxiliary data with ordered wildcard captures.
    pub fn merge<'c>(aux: AuxData, captures: impl IntoIterator<Item = &'c str>) -> Self {
        let mut values = aux;
        for (i, capture) in captures.into_iter().enumerate() {
            values.insert(capture_key(i + 1), capture.to_owned());
        }
        Self { values }
    }

    /// Insert a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_key_shape() {
        assert_eq!(capture_key(1), "capture_1");
        assert!(is_reserved_key(&capture_key(12)));
        assert!(is_reserved_key("capture_room"));
        assert!(!is_reserved_key("room"));
        assert!(!is_reserved_key("my_capture_1"));
    }

    #[test]
    fn test_merge_captures_win() {
        let mut aux = AuxData::new();
        aux.insert("room".into(), "kitchen".into());
        aux.insert("capture_1".into(), "spoofed".into());

        let data = TemplateData::merge(aux, ["37", "on"]);
        assert_eq!(data.get("capture_1"), Some("37"));
        assert_eq!(data.get("capture_2"), Some("on"));
        assert_eq!(data.get("room"), Some("kitchen"));
        assert_eq!(data.len(), 3);
    }
}
