//! Query parameter types
//!
//! Query values are always sent in string form. Values supplied as JSON are
//! coerced: strings verbatim, numbers and booleans through their canonical
//! text (`30` becomes `"30"`), `null` as the empty string, arrays as one
//! repeated key per element. Objects have no query-string form and are
//! rejected.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// A query parameter key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    pub key: String,
    /// The parameter value, already in string form
    pub value: String,
}

impl QueryParam {
    /// Creates a new query parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Coerces a JSON value into one or more query parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQueryValue` for objects and nested arrays.
    pub fn from_json(key: impl Into<String>, value: &Value) -> DomainResult<Vec<Self>> {
        let key = key.into();
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    coerce_scalar(item)
                        .map(|v| Self::new(key.clone(), v))
                        .ok_or_else(|| DomainError::InvalidQueryValue {
                            key: key.clone(),
                            reason: "array elements must be scalars".to_string(),
                        })
                })
                .collect(),
            other => coerce_scalar(other)
                .map(|v| vec![Self::new(key.clone(), v)])
                .ok_or_else(|| DomainError::InvalidQueryValue {
                    key,
                    reason: "objects cannot be encoded in a query string".to_string(),
                }),
        }
    }
}

/// Returns the string form of a scalar JSON value, or `None` for arrays and
/// objects.
#[must_use]
pub fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// An ordered collection of query parameters. Keys may repeat.
///
/// Serializes as a mapping; a repeated key is written as an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Value>",
    into = "IndexMap<String, Value>"
)]
pub struct QueryParams {
    items: Vec<QueryParam>,
}

impl QueryParams {
    /// Creates an empty query parameter collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a query parameter to the collection.
    pub fn add(&mut self, param: QueryParam) {
        self.items.push(param);
    }

    /// Adds the parameters produced by coercing a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQueryValue` if the value has no string form.
    pub fn add_json(&mut self, key: impl Into<String>, value: &Value) -> DomainResult<()> {
        self.items.extend(QueryParam::from_json(key, value)?);
        Ok(())
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Returns an iterator over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &QueryParam> {
        self.items.iter()
    }

    /// Returns the number of parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<QueryParam> for QueryParams {
    fn from_iter<T: IntoIterator<Item = QueryParam>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<IndexMap<String, Value>> for QueryParams {
    type Error = DomainError;

    fn try_from(map: IndexMap<String, Value>) -> DomainResult<Self> {
        let mut params = Self::new();
        for (key, value) in &map {
            params.add_json(key.clone(), value)?;
        }
        Ok(params)
    }
}

impl From<QueryParams> for IndexMap<String, Value> {
    fn from(params: QueryParams) -> Self {
        let mut map: Self = Self::new();
        for QueryParam { key, value } in params.items {
            match map.get_mut(&key) {
                Some(Value::Array(values)) => values.push(Value::String(value)),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value)]);
                }
                None => {
                    map.insert(key, Value::String(value));
                }
            }
        }
        map
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_query_param_creation() {
        let param = QueryParam::new("name", "John Doe");
        assert_eq!(param.key, "name");
        assert_eq!(param.value, "John Doe");
    }

    #[test]
    fn test_numbers_become_their_string_form() {
        let params = QueryParam::from_json("age", &json!(30)).unwrap();
        assert_eq!(params, vec![QueryParam::new("age", "30")]);

        let params = QueryParam::from_json("ratio", &json!(0.5)).unwrap();
        assert_eq!(params[0].value, "0.5");
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(coerce_scalar(&json!(true)), Some("true".to_string()));
        assert_eq!(coerce_scalar(&json!(null)), Some(String::new()));
        assert_eq!(coerce_scalar(&json!("x")), Some("x".to_string()));
        assert_eq!(coerce_scalar(&json!({"a": 1})), None);
    }

    #[test]
    fn test_arrays_repeat_the_key() {
        let params = QueryParam::from_json("tag", &json!(["a", 2])).unwrap();
        assert_eq!(
            params,
            vec![QueryParam::new("tag", "a"), QueryParam::new("tag", "2")]
        );
    }

    #[test]
    fn test_objects_are_rejected() {
        let result = QueryParam::from_json("filter", &json!({"a": 1}));
        assert!(matches!(
            result,
            Err(DomainError::InvalidQueryValue { key, .. }) if key == "filter"
        ));

        let result = QueryParam::from_json("nested", &json!([[1]]));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_from_mapping() {
        let params: QueryParams =
            serde_json::from_value(json!({"name": "John Doe", "age": 30})).unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("name"), Some("John Doe"));
        assert_eq!(params.get("age"), Some("30"));
    }

    #[test]
    fn test_serialize_groups_repeated_keys() {
        let params: QueryParams = [
            QueryParam::new("tag", "a"),
            QueryParam::new("page", "1"),
            QueryParam::new("tag", "b"),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"tag": ["a", "b"], "page": "1"}));
    }
}
