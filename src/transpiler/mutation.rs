//! Mutation value encoder for INSERT and UPDATE payloads.

use crate::ast::{Record, Value};
use crate::error::{CageError, CageResult};
use crate::parser::{FieldKey, field_key};
use crate::quote::{encode, quote_identifier, quote_literal};

/// Encode a record for INSERT: quoted column names and their literals.
pub fn encode_insert(table: &str, record: &Record) -> CageResult<(Vec<String>, Vec<String>)> {
    if record.is_empty() {
        return Err(CageError::EmptyMutationRecord(table.to_string()));
    }
    let mut columns = Vec::with_capacity(record.fields.len());
    let mut values = Vec::with_capacity(record.fields.len());

    for (key, value) in &record.fields {
        let (column, literal) = match field_key(key)? {
            FieldKey::Plain(column) => (column, encode_field(value)?),
            FieldKey::Json(column) => (column, encode_json(value)?),
            FieldKey::Arith(_, op) => {
                return Err(CageError::InvalidOperatorSuffix {
                    key: key.clone(),
                    suffix: op.symbol().to_string(),
                });
            }
        };
        columns.push(quote_identifier(column)?);
        values.push(literal);
    }

    Ok((columns, values))
}

/// Encode a record for UPDATE: `"col" = value` assignments.
pub fn encode_update(table: &str, record: &Record) -> CageResult<Vec<String>> {
    if record.is_empty() {
        return Err(CageError::EmptyMutationRecord(table.to_string()));
    }

    record
        .fields
        .iter()
        .map(|(key, value)| match field_key(key)? {
            FieldKey::Plain(column) => Ok(format!(
                "{} = {}",
                quote_identifier(column)?,
                encode_field(value)?
            )),
            FieldKey::Json(column) => Ok(format!(
                "{} = {}",
                quote_identifier(column)?,
                encode_json(value)?
            )),
            FieldKey::Arith(column, op) => {
                let operand =
                    value
                        .as_numeral()
                        .ok_or_else(|| CageError::InvalidArithmeticValue {
                            column: column.to_string(),
                            op: op.symbol(),
                            value: value.to_string(),
                        })?;
                let col = quote_identifier(column)?;
                Ok(format!("{} = {} {} {}", col, col, op.symbol(), operand))
            }
        })
        .collect()
}

/// Encode an unannotated field by its type.
fn encode_field(value: &Value) -> CageResult<String> {
    match value {
        Value::List(_) | Value::Pair(..) | Value::Document(_) => encode_json(value),
        scalar => encode(scalar),
    }
}

/// Serialize a field as JSON text; NULL stays NULL.
fn encode_json(value: &Value) -> CageResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        other => Ok(quote_literal(&serde_json::to_string(&other.to_json()?)?)),
    }
}
