//! Runtime values carried by condition leaves and mutation records.

use serde::{Deserialize, Serialize};

use crate::error::{CageError, CageResult};

/// A value in a condition leaf or mutation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean, rendered as 1 / 0
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Text, always quoted
    Text(String),
    /// List of values (IN lists, FIELD ordering)
    List(Vec<Value>),
    /// Ordered pair (BETWEEN ranges)
    Pair(Box<Value>, Box<Value>),
    /// Pre-rendered SQL fragment, emitted verbatim
    Raw(String),
    /// Structured payload for mutation records
    Document(serde_json::Value),
}

impl Value {
    /// Build a raw SQL fragment.
    pub fn raw(sql: impl Into<String>) -> Self {
        Value::Raw(sql.into())
    }

    /// Build a range pair.
    pub fn pair(a: impl Into<Value>, b: impl Into<Value>) -> Self {
        Value::Pair(Box::new(a.into()), Box::new(b.into()))
    }

    /// Numeric form of this value, if it has one.
    ///
    /// Text counts as numeric only when it is a plain decimal literal, so the
    /// returned string is always safe to splice unquoted.
    pub fn as_numeral(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) if f.is_finite() => Some(f.to_string()),
            Value::Text(s) => numeric_text(s).map(str::to_string),
            _ => None,
        }
    }

    /// Both elements of a two element range operand.
    pub fn as_range(&self) -> Option<(&Value, &Value)> {
        match self {
            Value::Pair(a, b) => Some((a, b)),
            Value::List(items) if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Pair(..) => "pair",
            Value::Raw(_) => "raw",
            Value::Document(_) => "document",
        }
    }

    /// JSON view of the value, used when a record field is serialized.
    ///
    /// Non-finite floats have no JSON form and are rejected, as in
    /// [`crate::quote::encode`].
    pub fn to_json(&self) -> CageResult<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    CageError::InvalidValue(format!("non-finite float {} has no JSON form", f))
                })?,
            Value::Text(s) | Value::Raw(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<CageResult<Vec<_>>>()?,
            ),
            Value::Pair(a, b) => serde_json::Value::Array(vec![a.to_json()?, b.to_json()?]),
            Value::Document(doc) => doc.clone(),
        })
    }
}

/// Returns the trimmed text when it is a plain decimal number.
pub(crate) fn numeric_text(s: &str) -> Option<&str> {
    let t = s.trim();
    let body = t.strip_prefix(['-', '+']).unwrap_or(t);
    if body.is_empty()
        || !body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
    {
        return None;
    }
    match t.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(t),
        _ => None,
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::pair(a, b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(doc: serde_json::Value) -> Self {
        Value::Document(doc)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Raw(s) => write!(f, "{{{}}}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Pair(a, b) => write!(f, "({}, {})", a, b),
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text() {
        assert_eq!(numeric_text("18"), Some("18"));
        assert_eq!(numeric_text(" -2.5 "), Some("-2.5"));
        assert_eq!(numeric_text("1e3"), Some("1e3"));
        assert_eq!(numeric_text("inf"), None);
        assert_eq!(numeric_text("NaN"), None);
        assert_eq!(numeric_text("12abc"), None);
        assert_eq!(numeric_text("1; DROP TABLE x"), None);
        assert_eq!(numeric_text(""), None);
    }

    #[test]
    fn test_as_range() {
        let pair = Value::pair(1, 2);
        assert!(pair.as_range().is_some());
        assert!(Value::from(vec![1, 2]).as_range().is_some());
        assert!(Value::from(vec![1, 2, 3]).as_range().is_none());
        assert!(Value::Int(1).as_range().is_none());
    }

    #[test]
    fn test_to_json_rejects_non_finite() {
        assert_eq!(
            Value::from(vec![1.5, 2.0]).to_json().unwrap(),
            serde_json::json!([1.5, 2.0])
        );
        assert!(matches!(
            Value::from(vec![1.0, f64::NAN]).to_json(),
            Err(CageError::InvalidValue(_))
        ));
        assert!(Value::pair(f64::INFINITY, 1).to_json().is_err());
    }

    #[test]
    fn test_from_option() {
        let v: Value = None::<i64>.into();
        assert_eq!(v, Value::Null);
        let v: Value = Some("x").into();
        assert_eq!(v, Value::Text("x".into()));
    }
}
