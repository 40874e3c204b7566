//! Key grammar parsers using nom.
//!
//! Condition, join, column and mutation keys carry their meaning inline:
//!
//! ```text
//! created_at[>=]     [>]posts      COUNT_ID(total)    (JSON) tags    hits[+]
//! ─────┬──── ─┬─     ─┬─ ──┬──     ───┬──── ──┬──     ───┬── ──┬─    ──┬─ ─┬─
//!      │      │       │    │          │       │          │     │       │   │
//!      │      │       │    └ table    │       └ alias    │     └ col   │   └ arithmetic
//!      │      └ op    └ relation      └ column           └ encoding    └ column
//!      └ column
//! ```
//!
//! Combinator keys (`AND`, `or #2`) are recognised separately by [`combinator`]
//! and, for the top-level override, [`bare_combinator`].

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, value},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::ast::{ArithOp, JoinKind, LogicalOp, Operator, SortOrder};
use crate::error::{CageError, CageResult};

/// A mutation key after annotation parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
    /// `name`
    Plain(&'a str),
    /// `(JSON) name`
    Json(&'a str),
    /// `name[+]`
    Arith(&'a str, ArithOp),
}

/// Recognise a combinator key: `AND`/`OR` (any case), optionally followed by
/// whitespace or `#` and a discriminator.
///
/// ```
/// use sqlcage::ast::LogicalOp;
/// use sqlcage::parser::combinator;
///
/// assert_eq!(combinator("OR #1"), Some(LogicalOp::Or));
/// assert_eq!(combinator("order_id"), None);
/// ```
pub fn combinator(key: &str) -> Option<LogicalOp> {
    let (rest, op) = logical_word(key.trim_start()).ok()?;
    if rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '#') {
        Some(op)
    } else {
        None
    }
}

/// Recognise a bare combinator key, the only kind that replaces sibling
/// conditions at the top level: `AND`/`OR`, optional whitespace, an optional
/// `#`, and nothing else. `OR #2` is an ordinary nested group.
///
/// ```
/// use sqlcage::ast::LogicalOp;
/// use sqlcage::parser::bare_combinator;
///
/// assert_eq!(bare_combinator("or #"), Some(LogicalOp::Or));
/// assert_eq!(bare_combinator("OR #visible"), None);
/// ```
pub fn bare_combinator(key: &str) -> Option<LogicalOp> {
    all_consuming(terminated(
        logical_word,
        pair(multispace0, opt(char('#'))),
    ))(key.trim())
    .ok()
    .map(|(_, op)| op)
}

/// Parse `column` or `column[op]`.
pub fn column_key(key: &str) -> CageResult<(&str, Option<Operator>)> {
    let trimmed = key.trim();
    let (rest, column) = path(trimmed).map_err(|_| CageError::InvalidIdentifier(key.to_string()))?;
    if rest.is_empty() {
        return Ok((column, None));
    }
    match all_consuming(preceded(multispace0, operator_suffix))(rest) {
        Ok((_, op)) => Ok((column, Some(op))),
        Err(_) => Err(suffix_error(key, rest)),
    }
}

/// Parse a `[rel]table` join key.
pub fn join_key(key: &str) -> CageResult<(JoinKind, &str)> {
    all_consuming(pair(join_kind, preceded(multispace0, table_name)))(key.trim())
        .map(|(_, parsed)| parsed)
        .map_err(|_| CageError::InvalidJoinSpec(format!("cannot parse join key '{}'", key)))
}

/// Split `expr(alias)`; `None` for a plain column.
pub fn column_alias(entry: &str) -> Option<(&str, &str)> {
    all_consuming(aliased)(entry.trim())
        .ok()
        .map(|(_, parsed)| parsed)
}

/// Parse an ORDER term: `column`, `column DESC`, `column asc`.
pub fn order_term(term: &str) -> CageResult<(&str, Option<SortOrder>)> {
    all_consuming(pair(path, opt(preceded(multispace1, sort_order))))(term.trim())
        .map(|(_, parsed)| parsed)
        .map_err(|_| CageError::modifier("ORDER", format!("cannot parse order term '{}'", term)))
}

/// Parse a mutation key: `name`, `(JSON) name` or `name[+|-|*|/]`.
pub fn field_key(key: &str) -> CageResult<FieldKey<'_>> {
    let trimmed = key.trim();
    if let Ok((_, column)) = all_consuming(json_annotation)(trimmed) {
        return Ok(FieldKey::Json(column));
    }
    let (rest, column) = path(trimmed).map_err(|_| CageError::InvalidIdentifier(key.to_string()))?;
    if rest.is_empty() {
        return Ok(FieldKey::Plain(column));
    }
    match all_consuming(preceded(multispace0, arith_suffix))(rest) {
        Ok((_, op)) => Ok(FieldKey::Arith(column, op)),
        Err(_) => Err(suffix_error(key, rest)),
    }
}

fn suffix_error(key: &str, rest: &str) -> CageError {
    match rest.trim_start().strip_prefix('[') {
        Some(inner) => CageError::InvalidOperatorSuffix {
            key: key.to_string(),
            suffix: inner.strip_suffix(']').unwrap_or(inner).to_string(),
        },
        None => CageError::InvalidIdentifier(key.to_string()),
    }
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Dotted identifier path.
fn path(input: &str) -> IResult<&str, &str> {
    take_while1(is_path_char)(input)
}

fn table_name(input: &str) -> IResult<&str, &str> {
    take_while1(is_name_char)(input)
}

fn logical_word(input: &str) -> IResult<&str, LogicalOp> {
    alt((
        value(LogicalOp::And, tag_no_case("AND")),
        value(LogicalOp::Or, tag_no_case("OR")),
    ))(input)
}

fn operator_suffix(input: &str) -> IResult<&str, Operator> {
    delimited(
        char('['),
        alt((
            value(Operator::Gte, tag(">=")),
            value(Operator::Lte, tag("<=")),
            value(Operator::Between, tag("<>")),
            value(Operator::NotBetween, tag("><")),
            value(Operator::Gt, tag(">")),
            value(Operator::Lt, tag("<")),
            value(Operator::Not, tag("!")),
        )),
        char(']'),
    )(input)
}

fn join_kind(input: &str) -> IResult<&str, JoinKind> {
    delimited(
        char('['),
        alt((
            value(JoinKind::Full, tag("<>")),
            value(JoinKind::Inner, tag("><")),
            value(JoinKind::Left, tag(">")),
            value(JoinKind::Right, tag("<")),
        )),
        char(']'),
    )(input)
}

fn aliased(input: &str) -> IResult<&str, (&str, &str)> {
    map(
        tuple((
            path,
            multispace0,
            delimited(char('('), table_name, char(')')),
        )),
        |(column, _, alias)| (column, alias),
    )(input)
}

fn sort_order(input: &str) -> IResult<&str, SortOrder> {
    alt((
        value(SortOrder::Desc, tag_no_case("DESC")),
        value(SortOrder::Asc, tag_no_case("ASC")),
    ))(input)
}

fn json_annotation(input: &str) -> IResult<&str, &str> {
    preceded(pair(tag_no_case("(JSON)"), multispace0), table_name)(input)
}

fn arith_suffix(input: &str) -> IResult<&str, ArithOp> {
    delimited(
        char('['),
        alt((
            value(ArithOp::Add, char('+')),
            value(ArithOp::Sub, char('-')),
            value(ArithOp::Mul, char('*')),
            value(ArithOp::Div, char('/')),
        )),
        char(']'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinator_keys() {
        assert_eq!(combinator("AND"), Some(LogicalOp::And));
        assert_eq!(combinator("and #2"), Some(LogicalOp::And));
        assert_eq!(combinator("OR#nested"), Some(LogicalOp::Or));
        assert_eq!(combinator("OR 1"), Some(LogicalOp::Or));
        assert_eq!(combinator("ORDER"), None);
        assert_eq!(combinator("android"), None);
        assert_eq!(combinator("age"), None);
    }

    #[test]
    fn test_bare_combinator_keys() {
        assert_eq!(bare_combinator("AND"), Some(LogicalOp::And));
        assert_eq!(bare_combinator(" or "), Some(LogicalOp::Or));
        assert_eq!(bare_combinator("AND #"), Some(LogicalOp::And));
        assert_eq!(bare_combinator("OR#"), Some(LogicalOp::Or));
        assert_eq!(bare_combinator("AND #1"), None);
        assert_eq!(bare_combinator("OR #visible"), None);
        assert_eq!(bare_combinator("ORDER"), None);
    }

    #[test]
    fn test_column_key_plain() {
        assert_eq!(column_key("age").unwrap(), ("age", None));
        assert_eq!(column_key("users.age").unwrap(), ("users.age", None));
    }

    #[test]
    fn test_column_key_operators() {
        assert_eq!(column_key("age[>]").unwrap(), ("age", Some(Operator::Gt)));
        assert_eq!(column_key("age[>=]").unwrap(), ("age", Some(Operator::Gte)));
        assert_eq!(column_key("age[<]").unwrap(), ("age", Some(Operator::Lt)));
        assert_eq!(column_key("age[<=]").unwrap(), ("age", Some(Operator::Lte)));
        assert_eq!(column_key("age[!]").unwrap(), ("age", Some(Operator::Not)));
        assert_eq!(column_key("age[<>]").unwrap(), ("age", Some(Operator::Between)));
        assert_eq!(column_key("age[><]").unwrap(), ("age", Some(Operator::NotBetween)));
        assert_eq!(column_key("age [>]").unwrap(), ("age", Some(Operator::Gt)));
    }

    #[test]
    fn test_column_key_unknown_suffix() {
        match column_key("name[~]") {
            Err(CageError::InvalidOperatorSuffix { suffix, .. }) => assert_eq!(suffix, "~"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            column_key("na me"),
            Err(CageError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            column_key("\"x\""),
            Err(CageError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_join_keys() {
        assert_eq!(join_key("[>]posts").unwrap(), (JoinKind::Left, "posts"));
        assert_eq!(join_key("[<]posts").unwrap(), (JoinKind::Right, "posts"));
        assert_eq!(join_key("[<>]posts").unwrap(), (JoinKind::Full, "posts"));
        assert_eq!(join_key("[><]user-posts").unwrap(), (JoinKind::Inner, "user-posts"));
        assert!(join_key("posts").is_err());
        assert!(join_key("[>]").is_err());
        assert!(join_key("[=]posts").is_err());
    }

    #[test]
    fn test_column_alias() {
        assert_eq!(column_alias("id(total)"), Some(("id", "total")));
        assert_eq!(column_alias("users.id (user_id)"), Some(("users.id", "user_id")));
        assert_eq!(column_alias("id"), None);
    }

    #[test]
    fn test_order_term() {
        assert_eq!(order_term("created_at").unwrap(), ("created_at", None));
        assert_eq!(
            order_term("created_at DESC").unwrap(),
            ("created_at", Some(SortOrder::Desc))
        );
        assert_eq!(order_term("id asc").unwrap(), ("id", Some(SortOrder::Asc)));
        assert!(order_term("id; DROP").is_err());
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(field_key("name").unwrap(), FieldKey::Plain("name"));
        assert_eq!(field_key("(JSON) tags").unwrap(), FieldKey::Json("tags"));
        assert_eq!(field_key("(json)tags").unwrap(), FieldKey::Json("tags"));
        assert_eq!(field_key("hits[+]").unwrap(), FieldKey::Arith("hits", ArithOp::Add));
        assert_eq!(field_key("score[/]").unwrap(), FieldKey::Arith("score", ArithOp::Div));
        assert!(matches!(
            field_key("hits[%]"),
            Err(CageError::InvalidOperatorSuffix { .. })
        ));
    }
}
