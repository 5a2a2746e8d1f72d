//! Aggregated query results.

use serde_json::{Map, Value};
use uuid::Uuid;

/// All rows returned for one request, with the final status attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    request_id: Uuid,
    status_code: u16,
    rows: Vec<Value>,
    status_attributes: Map<String, Value>,
}

impl ResultSet {
    /// Creates a result set.
    #[must_use]
    pub fn new(
        request_id: Uuid,
        status_code: u16,
        rows: Vec<Value>,
        status_attributes: Map<String, Value>,
    ) -> Self {
        Self {
            request_id,
            status_code,
            rows,
            status_attributes,
        }
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the terminal status code (200 or 204).
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns the rows in arrival order.
    #[must_use]
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Returns the status attributes of the terminal response.
    #[must_use]
    pub fn status_attributes(&self) -> &Map<String, Value> {
        &self.status_attributes
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.rows.iter()
    }

    /// Consumes the set and returns the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Value> {
        self.rows
    }
}

impl IntoIterator for ResultSet {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_set() {
        let mut attributes = Map::new();
        attributes.insert("host".to_string(), json!("/10.0.0.1:8182"));
        let set = ResultSet::new(Uuid::nil(), 200, vec![json!(1), json!("two")], attributes);

        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.status_code(), 200);
        assert_eq!(set.status_attributes()["host"], "/10.0.0.1:8182");
        assert_eq!((&set).into_iter().count(), 2);
        assert_eq!(set.into_rows(), vec![json!(1), json!("two")]);
    }

    #[test]
    fn test_empty_result_set() {
        let set = ResultSet::new(Uuid::nil(), 204, Vec::new(), Map::new());
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
