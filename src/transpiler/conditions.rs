//! Condition tree compiler.
//!
//! Renders a [`Conditions`] expression into a SQL boolean expression, without
//! the `WHERE` keyword. Entries keep their order and are joined with the
//! conjunction passed in; combinator groups recurse.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::ast::{Conditions, Key, LogicalOp, Node, Operator, Value};
use crate::error::{CageError, CageResult};
use crate::parser::{column_key, combinator};
use crate::quote::{encode, encode_list, quote_identifier, quote_literal};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Compile a condition expression, joining entries with `conjunction`.
///
/// ```
/// use sqlcage::ast::{Conditions, LogicalOp};
/// use sqlcage::transpiler::conditions::compile;
///
/// let cond = Conditions::new().with("age[>]", 18).with("name", "Bob");
/// assert_eq!(
///     compile(&cond, LogicalOp::Or).unwrap(),
///     r#""age" > 18 OR "name" = 'Bob'"#
/// );
/// ```
pub fn compile(conditions: &Conditions, conjunction: LogicalOp) -> CageResult<String> {
    let fragments = conditions
        .iter()
        .map(|(key, node)| compile_entry(key, node, conjunction))
        .collect::<CageResult<Vec<_>>>()?;
    Ok(fragments.join(conjunction.joiner()))
}

/// Compile a single entry. `outer` is the conjunction of the enclosing level.
pub(crate) fn compile_entry(key: &Key, node: &Node, outer: LogicalOp) -> CageResult<String> {
    match (key, node) {
        (Key::Positional(_), Node::Leaf(Value::Raw(sql) | Value::Text(sql))) => Ok(sql.clone()),
        (Key::Positional(n), Node::Leaf(other)) => Err(CageError::InvalidValue(format!(
            "positional entry #{} must be a raw SQL fragment, got {}",
            n,
            other.kind()
        ))),
        (Key::Positional(n), _) => Err(CageError::InvalidValue(format!(
            "positional entry #{} cannot hold a group",
            n
        ))),
        (Key::Named(name), Node::Group(group)) => {
            let op = group_operator(name)?;
            if group.is_empty() {
                return Err(CageError::InvalidValue(format!("group '{}' is empty", name)));
            }
            Ok(format!("({})", compile(group, op)?))
        }
        (Key::Named(name), Node::Groups(groups)) => {
            let op = group_operator(name)?;
            if groups.is_empty() || groups.iter().any(Conditions::is_empty) {
                return Err(CageError::InvalidValue(format!(
                    "group list '{}' has empty members",
                    name
                )));
            }
            let parts = groups
                .iter()
                .map(|group| compile(group, outer).map(|sql| format!("({})", sql)))
                .collect::<CageResult<Vec<_>>>()?;
            Ok(format!("({})", parts.join(op.joiner())))
        }
        (Key::Named(name), Node::Leaf(value)) => compile_leaf(name, value),
    }
}

fn group_operator(key: &str) -> CageResult<LogicalOp> {
    combinator(key).ok_or_else(|| {
        CageError::InvalidValue(format!("'{}' is not an AND/OR key but holds a group", key))
    })
}

/// Compile one `column[op] => value` comparison.
fn compile_leaf(key: &str, value: &Value) -> CageResult<String> {
    let (column, op) = column_key(key)?;
    let col = quote_identifier(column)?;

    match op {
        None => match value {
            Value::Null => Ok(format!("{} IS NULL", col)),
            Value::List(_) | Value::Pair(..) => {
                Ok(format!("{} IN ({})", col, in_list(column, value)?))
            }
            Value::Document(_) => Err(document_error(column)),
            scalar => Ok(format!("{} = {}", col, encode(scalar)?)),
        },
        Some(Operator::Not) => match value {
            Value::Null => Ok(format!("{} IS NOT NULL", col)),
            Value::List(_) | Value::Pair(..) => {
                Ok(format!("{} NOT IN ({})", col, in_list(column, value)?))
            }
            Value::Document(_) => Err(document_error(column)),
            scalar => Ok(format!("{} != {}", col, encode(scalar)?)),
        },
        Some(Operator::Between) => range(&col, column, false, value),
        Some(Operator::NotBetween) => range(&col, column, true, value),
        Some(op @ (Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte)) => Ok(format!(
            "{} {} {}",
            col,
            op.token(),
            comparison_operand(column, op, value)?
        )),
    }
}

fn document_error(column: &str) -> CageError {
    CageError::InvalidValue(format!(
        "structured document cannot be compared with {}",
        column
    ))
}

fn in_list(column: &str, value: &Value) -> CageResult<String> {
    let items: Vec<Value> = match value {
        Value::List(items) => items.clone(),
        Value::Pair(a, b) => vec![(**a).clone(), (**b).clone()],
        _ => vec![value.clone()],
    };
    if items.is_empty() {
        return Err(CageError::InvalidValue(format!(
            "empty IN list for {}",
            column
        )));
    }
    encode_list(&items)
}

/// Operand of `>`, `>=`, `<`, `<=`: a number, a date/time, or raw SQL.
fn comparison_operand(column: &str, op: Operator, value: &Value) -> CageResult<String> {
    if let Some(numeral) = value.as_numeral() {
        return Ok(numeral);
    }
    match value {
        Value::Raw(sql) => Ok(sql.clone()),
        Value::Text(text) => normalize_datetime(text)
            .map(|dt| quote_literal(&dt))
            .ok_or_else(|| comparison_error(column, op, value)),
        _ => Err(comparison_error(column, op, value)),
    }
}

fn comparison_error(column: &str, op: Operator, value: &Value) -> CageError {
    CageError::InvalidComparisonValue {
        column: column.to_string(),
        op: op.token(),
        value: value.to_string(),
    }
}

fn range(col: &str, column: &str, negate: bool, value: &Value) -> CageResult<String> {
    let invalid = || CageError::InvalidRangeValue {
        column: column.to_string(),
        value: value.to_string(),
    };
    let (a, b) = value.as_range().ok_or_else(invalid)?;
    let (low, high) = match (a.as_numeral(), b.as_numeral()) {
        (Some(low), Some(high)) => (low, high),
        _ => (
            encode(a).map_err(|_| invalid())?,
            encode(b).map_err(|_| invalid())?,
        ),
    };
    let not = if negate { " NOT" } else { "" };
    Ok(format!("({}{} BETWEEN {} AND {})", col, not, low, high))
}

/// Normalize a date/time string to `YYYY-MM-DD HH:MM:SS`.
///
/// RFC 3339 timestamps are converted to UTC; bare dates mean midnight.
pub fn normalize_datetime(text: &str) -> Option<String> {
    let text = text.trim();
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(parsed.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(cond: Conditions) -> String {
        compile(&cond, LogicalOp::And).unwrap()
    }

    #[test]
    fn test_equality_by_type() {
        assert_eq!(sql(Conditions::new().with("age", 18)), r#""age" = 18"#);
        assert_eq!(sql(Conditions::new().with("score", 2.5)), r#""score" = 2.5"#);
        assert_eq!(sql(Conditions::new().with("name", "Bob")), r#""name" = 'Bob'"#);
        assert_eq!(sql(Conditions::new().with("active", true)), r#""active" = 1"#);
        assert_eq!(
            sql(Conditions::new().with("deleted_at", Value::Null)),
            r#""deleted_at" IS NULL"#
        );
        assert_eq!(
            sql(Conditions::new().with("created", Value::raw("NOW()"))),
            r#""created" = NOW()"#
        );
    }

    #[test]
    fn test_in_list() {
        assert_eq!(
            sql(Conditions::new().with("id", vec![1, 2, 3])),
            r#""id" IN (1,2,3)"#
        );
        assert_eq!(
            sql(Conditions::new().with("role", vec!["admin", "mod"])),
            r#""role" IN ('admin','mod')"#
        );
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            sql(Conditions::new().with("email[!]", Value::Null)),
            r#""email" IS NOT NULL"#
        );
        assert_eq!(
            sql(Conditions::new().with("id[!]", vec![1, 2])),
            r#""id" NOT IN (1,2)"#
        );
        assert_eq!(sql(Conditions::new().with("age[!]", 3)), r#""age" != 3"#);
        assert_eq!(
            sql(Conditions::new().with("name[!]", "x")),
            r#""name" != 'x'"#
        );
    }

    #[test]
    fn test_relational() {
        assert_eq!(sql(Conditions::new().with("age[>]", 18)), r#""age" > 18"#);
        assert_eq!(sql(Conditions::new().with("age[>=]", "18")), r#""age" >= 18"#);
        assert_eq!(sql(Conditions::new().with("age[<]", 1.5)), r#""age" < 1.5"#);
        assert_eq!(
            sql(Conditions::new().with("created_at[<=]", "2024-03-01")),
            r#""created_at" <= '2024-03-01 00:00:00'"#
        );
        assert_eq!(
            sql(Conditions::new().with("created_at[>]", "2024-03-01T10:00:00+02:00")),
            r#""created_at" > '2024-03-01 08:00:00'"#
        );
    }

    #[test]
    fn test_relational_rejects_garbage() {
        let err = compile(&Conditions::new().with("age[>]", "soon"), LogicalOp::And).unwrap_err();
        assert!(matches!(err, CageError::InvalidComparisonValue { op: ">", .. }));
        let err = compile(&Conditions::new().with("age[<]", true), LogicalOp::And).unwrap_err();
        assert!(matches!(err, CageError::InvalidComparisonValue { .. }));
        let err = compile(&Conditions::new().with("age[<]", Value::Null), LogicalOp::And)
            .unwrap_err();
        assert!(matches!(err, CageError::InvalidComparisonValue { .. }));
    }

    #[test]
    fn test_ranges() {
        assert_eq!(
            sql(Conditions::new().with("age[<>]", vec![18, 25])),
            r#"("age" BETWEEN 18 AND 25)"#
        );
        assert_eq!(
            sql(Conditions::new().with("age[><]", vec![18, 25])),
            r#"("age" NOT BETWEEN 18 AND 25)"#
        );
        assert_eq!(
            sql(Conditions::new().with("day[<>]", ("2024-01-01", "2024-01-31"))),
            r#"("day" BETWEEN '2024-01-01' AND '2024-01-31')"#
        );
    }

    #[test]
    fn test_range_requires_pair() {
        let err = compile(&Conditions::new().with("age[<>]", 18), LogicalOp::And).unwrap_err();
        assert!(matches!(err, CageError::InvalidRangeValue { .. }));
        let err = compile(&Conditions::new().with("age[<>]", vec![1, 2, 3]), LogicalOp::And)
            .unwrap_err();
        assert!(matches!(err, CageError::InvalidRangeValue { .. }));
    }

    #[test]
    fn test_nested_group() {
        let cond = Conditions::new()
            .with("active", true)
            .group("OR", Conditions::new().with("age[>]", 18).with("name", "Bob"));
        assert_eq!(
            sql(cond),
            r#""active" = 1 AND ("age" > 18 OR "name" = 'Bob')"#
        );
    }

    #[test]
    fn test_discriminated_groups() {
        let cond = Conditions::new()
            .group("OR #1", Conditions::new().with("a", 1).with("b", 2))
            .group("OR #2", Conditions::new().with("c", 3).with("d", 4));
        assert_eq!(
            sql(cond),
            r#"("a" = 1 OR "b" = 2) AND ("c" = 3 OR "d" = 4)"#
        );
    }

    #[test]
    fn test_group_list_uses_outer_conjunction_inside() {
        let cond = Conditions::new().groups(
            "OR",
            vec![
                Conditions::new().with("a", 1).with("b", 2),
                Conditions::new().with("c", 3),
            ],
        );
        assert_eq!(sql(cond), r#"(("a" = 1 AND "b" = 2) OR ("c" = 3))"#);
    }

    #[test]
    fn test_raw_positional() {
        let cond = Conditions::new().raw(r#""a" = "b""#).with("c", 1);
        assert_eq!(sql(cond), r#""a" = "b" AND "c" = 1"#);
    }

    #[test]
    fn test_refeeding_compiled_group_is_stable() {
        let cond = Conditions::new().with("a", 1).with("b[<]", 5).with("c", "x");
        let once = sql(cond);
        let again = sql(Conditions::new().raw(once.clone()));
        assert_eq!(once, again);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            sql(Conditions::new().with("name", "O'Brien'; --")),
            r#""name" = 'O''Brien''; --'"#
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            compile(&Conditions::new().with("a[~]", 1), LogicalOp::And),
            Err(CageError::InvalidOperatorSuffix { .. })
        ));
        assert!(matches!(
            compile(&Conditions::new().group("items", Conditions::new()), LogicalOp::And),
            Err(CageError::InvalidValue(_))
        ));
        assert!(matches!(
            compile(&Conditions::new().group("AND", Conditions::new()), LogicalOp::And),
            Err(CageError::InvalidValue(_))
        ));
        assert!(matches!(
            compile(&Conditions::new().with("id", Vec::<i64>::new()), LogicalOp::And),
            Err(CageError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_normalize_datetime() {
        assert_eq!(
            normalize_datetime("2024-05-06 07:08:09").as_deref(),
            Some("2024-05-06 07:08:09")
        );
        assert_eq!(
            normalize_datetime("2024/05/06").as_deref(),
            Some("2024-05-06 00:00:00")
        );
        assert_eq!(normalize_datetime("tomorrow"), None);
    }
}
