//! Read-only wrapper over decoded JSON response data.
//!
//! [`ResponseValue`] mirrors the JSON shape but makes field access explicit:
//! reading a key the object does not have fails with
//! [`Error::MissingField`], while a key that is present with `null` yields
//! [`ResponseValue::Null`].
//!
//! ```
//! use horizon_gql::ResponseValue;
//! use serde_json::json;
//!
//! let data = ResponseValue::from(json!({
//!     "catCollection": {"items": [{"name": "Nyan", "likes": 3}]}
//! }));
//!
//! let first = data.path("catCollection.items.0").unwrap();
//! assert_eq!(first.get("name").unwrap().as_str(), Some("Nyan"));
//! assert_eq!(first.get("likes").unwrap().as_i64(), Some(3));
//! assert!(first.get("color").is_err());
//! ```

use indexmap::IndexMap;
use serde_json::Number;

use crate::error::{Error, Result};

/// A wrapped JSON value with checked field access.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseValue {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array, element-wise wrapped.
    List(Vec<ResponseValue>),
    /// JSON object, each key wrapped, in response order.
    Fields(IndexMap<String, ResponseValue>),
}

impl ResponseValue {
    /// Read a field of an object.
    ///
    /// Fails with [`Error::MissingField`] if the key is absent or this value
    /// is not an object.
    pub fn get(&self, field: &str) -> Result<&ResponseValue> {
        match self {
            Self::Fields(fields) => fields
                .get(field)
                .ok_or_else(|| Error::missing_field(field, field)),
            _ => Err(Error::missing_field(field, field)),
        }
    }

    /// Read a list element.
    ///
    /// Fails with [`Error::IndexOutOfBounds`] past the end, or
    /// [`Error::MissingField`] if this value is not a list.
    pub fn at(&self, index: usize) -> Result<&ResponseValue> {
        match self {
            Self::List(items) => items.get(index).ok_or(Error::IndexOutOfBounds {
                index,
                len: items.len(),
                path: index.to_string(),
            }),
            _ => Err(Error::missing_field(index.to_string(), index.to_string())),
        }
    }

    /// Follow a dotted path such as `catCollection.items.0.name`.
    ///
    /// Numeric segments index into lists; other segments read object fields.
    /// Errors report the path walked so far.
    pub fn path(&self, path: &str) -> Result<&ResponseValue> {
        let mut current = self;
        let mut walked = String::new();
        for segment in path.split('.') {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);

            current = match current {
                Self::List(items) => {
                    let index: usize = segment
                        .parse()
                        .map_err(|_| Error::missing_field(segment, walked.clone()))?;
                    items.get(index).ok_or_else(|| Error::IndexOutOfBounds {
                        index,
                        len: items.len(),
                        path: walked.clone(),
                    })?
                }
                Self::Fields(fields) => fields
                    .get(segment)
                    .ok_or_else(|| Error::missing_field(segment, walked.clone()))?,
                _ => return Err(Error::missing_field(segment, walked)),
            };
        }
        Ok(current)
    }

    /// Check if a field is present on an object (even if its value is null).
    pub fn has_field(&self, field: &str) -> bool {
        matches!(self, Self::Fields(fields) if fields.contains_key(field))
    }

    /// Object keys in response order. Empty for non-objects.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let fields = match self {
            Self::Fields(fields) => Some(fields),
            _ => None,
        };
        fields.into_iter().flat_map(|f| f.keys().map(String::as_str))
    }

    /// Number of list elements or object fields; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Fields(fields) => fields.len(),
            _ => 0,
        }
    }

    /// Check if this value has no elements or fields.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate list elements. Yields nothing for non-lists.
    pub fn iter(&self) -> std::slice::Iter<'_, ResponseValue> {
        match self {
            Self::List(items) => items.iter(),
            _ => {
                let empty: &[ResponseValue] = &[];
                empty.iter()
            }
        }
    }

    /// Get list elements as a slice.
    pub fn as_list(&self) -> Option<&[ResponseValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the field map of an object.
    pub fn as_fields(&self) -> Option<&IndexMap<String, ResponseValue>> {
        match self {
            Self::Fields(fields) => Some(fields),
            _ => None,
        }
    }

    /// Check if this is JSON null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get a number as `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Get a number as `u64`, if it fits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Get a number as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Convert back into a plain JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Fields(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for ResponseValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Fields(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'a> IntoIterator for &'a ResponseValue {
    type Item = &'a ResponseValue;
    type IntoIter = std::slice::Iter<'a, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
