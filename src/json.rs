//! Loading loosely typed JSON documents into the AST.
//!
//! Object order is significant (serde_json is built with `preserve_order`).
//! Keys made only of digits are positional, and their values are raw SQL.

use serde_json::{Map, Value as Json};

use crate::ast::{
    AggregateFunc, Cage, Columns, Conditions, JoinSpec, Key, Like, Limit, LogicalOp, Match, Node,
    Order, Record, Relation, Select, Value,
};
use crate::error::{CageError, CageResult};
use crate::parser::{combinator, order_term};

/// Convert a JSON scalar or array into a leaf value.
pub fn value_from_json(json: &Json) -> CageResult<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => Ok(number(n)),
        Json::String(s) => Ok(Value::Text(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(value_from_json)
            .collect::<CageResult<Vec<_>>>()
            .map(Value::List),
        Json::Object(_) => Err(CageError::InvalidValue(format!(
            "an object is not a comparison operand: {}",
            json
        ))),
    }
}

fn number(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if n.is_u64() {
        Value::Raw(n.to_string())
    } else {
        n.as_f64().map(Value::Float).unwrap_or(Value::Null)
    }
}

fn expect_object<'a>(json: &'a Json, what: &str) -> CageResult<&'a Map<String, Json>> {
    json.as_object()
        .ok_or_else(|| CageError::InvalidValue(format!("{} must be an object, got {}", what, json)))
}

fn expect_str<'a>(json: &'a Json, what: &str) -> CageResult<&'a str> {
    json.as_str()
        .ok_or_else(|| CageError::InvalidValue(format!("{} must be a string, got {}", what, json)))
}

/// Load a condition expression.
pub fn conditions_from_json(json: &Json) -> CageResult<Conditions> {
    let map = expect_object(json, "condition expression")?;
    let mut conditions = Conditions::new();
    for (key, value) in map {
        let (key, node) = entry_from_json(key, value)?;
        conditions.push(key, node);
    }
    Ok(conditions)
}

fn entry_from_json(key: &str, value: &Json) -> CageResult<(Key, Node)> {
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        let index = key
            .parse::<usize>()
            .map_err(|_| CageError::InvalidValue(format!("positional key {} is too large", key)))?;
        let sql = expect_str(value, "positional entry")?;
        return Ok((Key::Positional(index), Node::Leaf(Value::Raw(sql.to_string()))));
    }

    let name = Key::Named(key.to_string());
    if combinator(key).is_some() {
        match value {
            Json::Object(_) => return Ok((name, Node::Group(conditions_from_json(value)?))),
            Json::Array(items) if !items.is_empty() && items.iter().all(Json::is_object) => {
                let groups = items
                    .iter()
                    .map(conditions_from_json)
                    .collect::<CageResult<Vec<_>>>()?;
                return Ok((name, Node::Groups(groups)));
            }
            _ => {}
        }
    }
    Ok((name, Node::Leaf(value_from_json(value)?)))
}

/// Load a filter object: conditions plus the uppercase modifier keys
/// `GROUP ORDER HAVING LIMIT LIKE MATCH`. `null` is an empty cage.
pub fn cage_from_json(json: &Json) -> CageResult<Cage> {
    if json.is_null() {
        return Ok(Cage::default());
    }
    let map = expect_object(json, "filter")?;
    let mut cage = Cage::default();

    for (key, value) in map {
        match key.as_str() {
            "GROUP" => cage.group = Some(expect_str(value, "GROUP")?.to_string()),
            "ORDER" => cage.order = Some(order_from_json(value)?),
            "HAVING" => cage.having = Some(conditions_from_json(value)?),
            "LIMIT" => cage.limit = Some(limit_from_json(value)?),
            "LIKE" => cage.like = Some(like_from_json(value)?),
            "MATCH" => cage.matching = Some(match_from_json(value)?),
            _ => {
                let (key, node) = entry_from_json(key, value)?;
                cage.conditions.push(key, node);
            }
        }
    }
    Ok(cage)
}

fn order_from_json(json: &Json) -> CageResult<Order> {
    match json {
        Json::String(term) => {
            let (column, dir) = order_term(term)?;
            Ok(Order::Columns(vec![(column.to_string(), dir)]))
        }
        Json::Array(items) => match items.as_slice() {
            [Json::String(column), Json::Array(values)] => Ok(Order::Field {
                column: column.clone(),
                values: values
                    .iter()
                    .map(value_from_json)
                    .collect::<CageResult<Vec<_>>>()?,
            }),
            terms => terms
                .iter()
                .map(|term| {
                    let term = expect_str(term, "ORDER term")?;
                    let (column, dir) = order_term(term)?;
                    Ok((column.to_string(), dir))
                })
                .collect::<CageResult<Vec<_>>>()
                .map(Order::Columns),
        },
        _ => Err(CageError::modifier("ORDER", format!("unsupported value {}", json))),
    }
}

fn limit_from_json(json: &Json) -> CageResult<Limit> {
    let count = |v: &Json| -> CageResult<u64> {
        let parsed = match v {
            Json::Number(n) => n.as_u64(),
            Json::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| CageError::modifier("LIMIT", format!("not a row count: {}", v)))
    };
    match json {
        Json::Array(items) if items.len() == 2 => Ok(Limit::Window {
            offset: count(&items[0])?,
            count: count(&items[1])?,
        }),
        Json::Array(_) => Err(CageError::modifier("LIMIT", "expected [offset, count]")),
        other => Ok(Limit::Count(count(other)?)),
    }
}

fn like_from_json(json: &Json) -> CageResult<Like> {
    let map = json
        .as_object()
        .ok_or_else(|| CageError::modifier("LIKE", "expected an object"))?;
    let (connector, terms) = match (map.get("OR"), map.get("AND")) {
        (Some(terms), _) => (LogicalOp::Or, terms),
        (None, Some(terms)) => (LogicalOp::And, terms),
        (None, None) => (LogicalOp::And, json),
    };
    let terms = terms
        .as_object()
        .ok_or_else(|| CageError::modifier("LIKE", "expected column/keyword pairs"))?;

    let mut like = Like {
        connector,
        terms: Vec::with_capacity(terms.len()),
    };
    for (column, keywords) in terms {
        let keywords = match keywords {
            Json::Array(items) => items.iter().map(like_keyword).collect::<CageResult<Vec<_>>>()?,
            single => vec![like_keyword(single)?],
        };
        like.terms.push((column.clone(), keywords));
    }
    Ok(like)
}

fn like_keyword(json: &Json) -> CageResult<String> {
    match json {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        _ => Err(CageError::modifier("LIKE", format!("not a keyword: {}", json))),
    }
}

fn match_from_json(json: &Json) -> CageResult<Match> {
    let columns = json
        .get("columns")
        .ok_or_else(|| CageError::modifier("MATCH", "missing \"columns\""))?;
    let keyword = json
        .get("keyword")
        .and_then(Json::as_str)
        .ok_or_else(|| CageError::modifier("MATCH", "missing \"keyword\""))?;
    let columns = match columns {
        Json::String(c) => vec![c.clone()],
        Json::Array(items) => items
            .iter()
            .map(|c| expect_str(c, "MATCH column").map(str::to_string))
            .collect::<CageResult<Vec<_>>>()?,
        _ => return Err(CageError::modifier("MATCH", "columns must be a list")),
    };
    Ok(Match {
        columns,
        keyword: keyword.to_string(),
    })
}

/// Load a join specification.
pub fn join_from_json(json: &Json) -> CageResult<JoinSpec> {
    let map = json
        .as_object()
        .ok_or_else(|| CageError::InvalidJoinSpec(format!("expected an object, got {}", json)))?;
    let mut join = JoinSpec::new();
    for (key, descriptor) in map {
        let relation = match descriptor {
            Json::String(column) => Relation::Using(vec![column.clone()]),
            Json::Array(columns) => Relation::Using(
                columns
                    .iter()
                    .map(|c| {
                        c.as_str().map(str::to_string).ok_or_else(|| {
                            CageError::InvalidJoinSpec(format!("USING column for '{}' must be a string", key))
                        })
                    })
                    .collect::<CageResult<Vec<_>>>()?,
            ),
            Json::Object(pair) if pair.len() == 1 => {
                let (left, right) = pair.iter().next().ok_or_else(|| {
                    CageError::InvalidJoinSpec(format!("empty ON mapping for '{}'", key))
                })?;
                let right = right.as_str().ok_or_else(|| {
                    CageError::InvalidJoinSpec(format!("ON column for '{}' must be a string", key))
                })?;
                Relation::on(left.clone(), right)
            }
            _ => {
                return Err(CageError::InvalidJoinSpec(format!(
                    "unsupported relation for '{}': {}",
                    key, descriptor
                )));
            }
        };
        join.entries.push((key.clone(), relation));
    }
    Ok(join)
}

/// Load a column specification: `"*"`, a column, or a list of columns.
pub fn columns_from_json(json: &Json) -> CageResult<Columns> {
    match json {
        Json::Null => Ok(Columns::All),
        Json::String(column) => Ok(Columns::from(column.as_str())),
        Json::Array(items) => items
            .iter()
            .map(|c| expect_str(c, "column").map(str::to_string))
            .collect::<CageResult<Vec<_>>>()
            .map(Columns::List),
        _ => Err(CageError::InvalidValue(format!("unsupported column list {}", json))),
    }
}

/// Load a mutation record. Arrays and objects are kept as documents.
pub fn record_from_json(json: &Json) -> CageResult<Record> {
    let map = expect_object(json, "record")?;
    let mut record = Record::new();
    for (key, value) in map {
        let value = match value {
            Json::Array(_) | Json::Object(_) => Value::Document(value.clone()),
            scalar => value_from_json(scalar)?,
        };
        record.fields.push((key.clone(), value));
    }
    Ok(record)
}

/// Load one record or a list of records.
pub fn records_from_json(json: &Json) -> CageResult<Vec<Record>> {
    match json {
        Json::Array(items) => items.iter().map(record_from_json).collect(),
        single => Ok(vec![record_from_json(single)?]),
    }
}

/// Positional select arguments, in the order `(join, columns, where)`, any of
/// which may be missing. [`SelectArgs::resolve`] works out which argument is
/// which from their shapes.
#[derive(Debug, Clone, Default)]
pub struct SelectArgs {
    pub table: String,
    pub join: Option<Json>,
    pub columns: Option<Json>,
    pub filter: Option<Json>,
    pub aggregate: Option<AggregateFunc>,
}

impl SelectArgs {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Build from a positional list `[join?, columns?, where?]`.
    pub fn positional(table: impl Into<String>, args: Vec<Json>) -> CageResult<Self> {
        if args.len() > 3 {
            return Err(CageError::InvalidValue(format!(
                "at most 3 positional select arguments, got {}",
                args.len()
            )));
        }
        let mut args = args.into_iter().map(|a| Some(a).filter(|a| !a.is_null()));
        Ok(Self {
            table: table.into(),
            join: args.next().flatten(),
            columns: args.next().flatten(),
            filter: args.next().flatten(),
            aggregate: None,
        })
    }

    pub fn aggregate(mut self, func: AggregateFunc) -> Self {
        self.aggregate = Some(func);
        self
    }

    /// True when the first argument is a join specification.
    fn has_join(&self) -> bool {
        matches!(
            &self.join,
            Some(Json::Object(map)) if map.keys().next().is_some_and(|k| k.starts_with('['))
        )
    }

    /// Resolve into an explicit [`Select`].
    pub fn resolve(&self) -> CageResult<Select> {
        let (join, mut columns, mut filter) = if self.has_join() {
            (self.join.as_ref(), self.columns.as_ref(), self.filter.as_ref())
        } else {
            match (&self.columns, &self.filter) {
                (None, None) => {
                    if self.aggregate.is_some() && matches!(self.join, Some(Json::Object(_))) {
                        (None, None, self.join.as_ref())
                    } else {
                        (None, self.join.as_ref(), None)
                    }
                }
                (None, Some(filter)) => (None, self.join.as_ref(), Some(filter)),
                (Some(shifted), None) => (None, self.join.as_ref(), Some(shifted)),
                (Some(_), Some(_)) => {
                    return Err(CageError::InvalidJoinSpec(
                        "three arguments given but the first is not a join specification".into(),
                    ));
                }
            }
        };

        if self.aggregate == Some(AggregateFunc::Exists) && filter.is_none() {
            filter = columns.take();
        }

        let mut select = Select::from(self.table.clone());
        if let Some(join) = join {
            select = select.join(join_from_json(join)?);
        }
        if let Some(columns) = columns {
            select = select.columns(columns_from_json(columns)?);
        }
        if let Some(filter) = filter {
            select = select.filter(cage_from_json(filter)?);
        }
        if let Some(func) = self.aggregate {
            select = select.aggregate(func);
        }
        Ok(select)
    }
}
