//! Identifier quoting and literal encoding.
//!
//! Identifiers use ANSI double quotes, string literals use single quotes with
//! embedded quotes doubled. Every piece of caller text that reaches SQL goes
//! through one of these functions.

use crate::ast::Value;
use crate::error::{CageError, CageResult};

/// Quote a dotted identifier path, one segment at a time.
///
/// ```
/// use sqlcage::quote::quote_identifier;
///
/// assert_eq!(quote_identifier("users.id").unwrap(), r#""users"."id""#);
/// ```
pub fn quote_identifier(path: &str) -> CageResult<String> {
    let mut out = String::with_capacity(path.len() + 4);
    for (i, segment) in path.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        if segment == "*" {
            out.push('*');
            continue;
        }
        if segment.is_empty() || segment.contains('"') {
            return Err(CageError::InvalidIdentifier(path.to_string()));
        }
        out.push('"');
        out.push_str(segment);
        out.push('"');
    }
    Ok(out)
}

/// Quote a string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Encode a scalar value as a SQL literal.
pub fn encode(value: &Value) -> CageResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Int(n) => Ok(n.to_string()),
        Value::Float(f) if f.is_finite() => Ok(f.to_string()),
        Value::Float(f) => Err(CageError::InvalidValue(format!(
            "non-finite float {} has no SQL literal",
            f
        ))),
        Value::Text(s) => Ok(quote_literal(s)),
        Value::Raw(sql) => Ok(sql.clone()),
        Value::List(_) | Value::Pair(..) | Value::Document(_) => Err(CageError::InvalidValue(
            format!("a {} cannot be encoded as a single literal", value.kind()),
        )),
    }
}

/// Encode list elements, comma separated.
pub fn encode_list(items: &[Value]) -> CageResult<String> {
    let encoded = items.iter().map(encode).collect::<CageResult<Vec<_>>>()?;
    Ok(encoded.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("age").unwrap(), r#""age""#);
        assert_eq!(
            quote_identifier("db.users.id").unwrap(),
            r#""db"."users"."id""#
        );
        assert_eq!(quote_identifier("posts.*").unwrap(), r#""posts".*"#);
    }

    #[test]
    fn test_quote_identifier_rejects_quotes() {
        assert!(matches!(
            quote_identifier(r#"us"ers"#),
            Err(CageError::InvalidIdentifier(_))
        ));
        assert!(quote_identifier("a..b").is_err());
        assert!(quote_identifier("").is_err());
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Null).unwrap(), "NULL");
        assert_eq!(encode(&Value::Bool(true)).unwrap(), "1");
        assert_eq!(encode(&Value::Bool(false)).unwrap(), "0");
        assert_eq!(encode(&Value::Int(-7)).unwrap(), "-7");
        assert_eq!(encode(&Value::Float(2.5)).unwrap(), "2.5");
        assert_eq!(encode(&Value::from("O'Brien")).unwrap(), "'O''Brien'");
        assert_eq!(encode(&Value::raw("NOW()")).unwrap(), "NOW()");
    }

    #[test]
    fn test_encode_rejects_collections() {
        assert!(encode(&Value::from(vec![1, 2])).is_err());
        assert!(encode(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_encode_list() {
        let items = vec![Value::Int(1), Value::from("a"), Value::Null];
        assert_eq!(encode_list(&items).unwrap(), "1,'a',NULL");
    }
}
