/// Label for placemarks whose description carries no recognizable heading.
pub const NO_FORM: &str = "__NO_FORM__";

/// Ordered string-to-string mapping for description table fields.
///
/// Insertion order is the order keys first appeared in the source table;
/// overwriting an existing key keeps its original position. Description
/// tables hold a handful of fields, so lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field. Empty keys are rejected.
    pub fn insert(&mut self, key: String, value: String) {
        if key.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One extracted placemark. Coordinates stay textual so the original
/// precision and formatting survive the round trip to CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacemarkRecord {
    pub name: String,
    pub longitude: String,
    pub latitude: String,
    pub altitude: String,
    pub extra: FieldMap,
}

/// Records sharing one form label, in source document order.
#[derive(Debug, Clone)]
pub struct FormGroup {
    pub label: String,
    pub records: Vec<PlacemarkRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_seen_order() {
        let mut map = FieldMap::new();
        map.insert("b".into(), "1".into());
        map.insert("a".into(), "2".into());
        map.insert("c".into(), "3".into());
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut map = FieldMap::new();
        map.insert("a".into(), "1".into());
        map.insert("b".into(), "2".into());
        map.insert("a".into(), "3".into());
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
    }

    #[test]
    fn empty_key_rejected() {
        let mut map = FieldMap::new();
        map.insert(String::new(), "1".into());
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn missing_key_is_none() {
        let map = FieldMap::new();
        assert_eq!(map.get("nope"), None);
    }
}
