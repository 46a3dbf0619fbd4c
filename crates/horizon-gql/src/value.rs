//! Argument literal values.

use indexmap::IndexMap;

/// A GraphQL input literal used as a field or directive argument.
///
/// Conversions exist from the common Rust scalars, strings, vectors, arrays,
/// options and [`serde_json::Value`], so most call sites pass plain values:
///
/// ```
/// use horizon_gql::Value;
///
/// let limit: Value = 10.into();
/// let order = Value::enum_value("DESC");
/// let ids: Value = vec!["a", "b"].into();
/// assert_eq!(limit, Value::Int(10));
/// assert!(matches!(order, Value::Enum(_)));
/// assert!(matches!(ids, Value::List(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// An integer literal.
    Int(i64),
    /// A float literal.
    Float(f64),
    /// A quoted string literal.
    String(String),
    /// A bare enum identifier such as `DESC`.
    Enum(String),
    /// A bracketed list.
    List(Vec<Value>),
    /// A brace-delimited input object, in insertion order.
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Create an enum literal, rendered without quotes.
    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Create an input object literal from key/value pairs.
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Create a list literal.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Check if this is the null literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

macro_rules! int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Self::Int)
            .unwrap_or(Self::Float(value as f64))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::list(value)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Self::list(value)
    }
}

impl<V: Into<Value>> From<IndexMap<String, V>> for Value {
    fn from(value: IndexMap<String, V>) -> Self {
        Self::object(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::from(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::list(items),
            serde_json::Value::Object(map) => Self::object(map),
        }
    }
}
