use std::collections::HashMap;

/// Name of the field every stored record carries its identity in.
pub const ID_FIELD: &str = "id";

/// A single record: an unordered mapping from field name to string value.
///
/// Values are untyped. A field that was never set reads as the empty
/// string, so absence is never an error at this level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, overwriting any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Gets a field value, or `""` if the field is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Returns the record's id, if it has a well-formed one.
    pub fn id(&self) -> Option<u64> {
        self.fields.get(ID_FIELD)?.parse().ok()
    }

    /// Whether the `id` field holds exactly the decimal form of `id`.
    pub(crate) fn has_id(&self, id: u64) -> bool {
        self.get(ID_FIELD) == id.to_string()
    }

    /// Iterates over all fields, including `id`, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields set on this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.set(field, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_field_is_empty() {
        let record = Record::new();
        assert_eq!(record.get("name"), "");
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let mut record = Record::new();
        record.set("name", "Ann");
        record.set("name", "Bo");
        assert_eq!(record.get("name"), "Bo");
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_id_parsing() {
        let record: Record = [("id", "12"), ("name", "Ann")].into_iter().collect();
        assert_eq!(record.id(), Some(12));
        assert!(record.has_id(12));
        assert!(!record.has_id(1));

        let bad: Record = [("id", "x1")].into_iter().collect();
        assert_eq!(bad.id(), None);
    }
}
