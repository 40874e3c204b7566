//! Request documents: one JSON object describing one statement.
//!
//! ```json
//! {"action": "select", "table": "users", "columns": ["id"], "where": {"id[>]": 3}}
//! {"action": "count", "table": "users", "args": [{"active": true}]}
//! {"action": "insert", "table": "users", "rows": [{"name": "a"}, {"name": "b"}]}
//! {"action": "replace", "table": "posts", "columns": {"body": {"http:": "https:"}}}
//! ```
//!
//! `args` is the positional `[join, columns, where]` form, resolved by shape.

use serde::Deserialize;
use serde_json::error::Category;
use serde_json::{Map, Value as Json};

use crate::ast::{AggregateFunc, Delete, Insert, Replace, Select, Update};
use crate::error::{CageError, CageResult};
use crate::json::{
    SelectArgs, cage_from_json, columns_from_json, join_from_json, record_from_json,
    records_from_json,
};
use crate::transpiler::ToSql;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    Select(Query),
    Get(Query),
    Has(Query),
    Count(Query),
    Max(Query),
    Min(Query),
    Avg(Query),
    Sum(Query),
    Insert {
        table: String,
        rows: Json,
    },
    Update {
        table: String,
        data: Json,
        #[serde(default, rename = "where")]
        filter: Json,
    },
    Delete {
        table: String,
        #[serde(default, rename = "where")]
        filter: Json,
    },
    Replace {
        table: String,
        columns: Map<String, Json>,
        #[serde(default, rename = "where")]
        filter: Json,
    },
}

/// Arguments shared by the reading actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Query {
    pub table: String,
    #[serde(default)]
    pub join: Option<Json>,
    #[serde(default)]
    pub columns: Option<Json>,
    #[serde(default, rename = "where")]
    pub filter: Option<Json>,
    #[serde(default)]
    pub args: Option<Vec<Json>>,
}

impl Query {
    fn select(&self, aggregate: Option<AggregateFunc>) -> CageResult<Select> {
        if let Some(args) = &self.args {
            if self.join.is_some() || self.columns.is_some() || self.filter.is_some() {
                return Err(CageError::InvalidValue(
                    "\"args\" cannot be combined with join/columns/where".into(),
                ));
            }
            let mut args = SelectArgs::positional(self.table.clone(), args.clone())?;
            args.aggregate = aggregate;
            return args.resolve();
        }

        let mut select = Select::from(self.table.clone());
        if let Some(join) = &self.join {
            select = select.join(join_from_json(join)?);
        }
        if let Some(columns) = &self.columns {
            select = select.columns(columns_from_json(columns)?);
        }
        if let Some(filter) = &self.filter {
            select = select.filter(cage_from_json(filter)?);
        }
        if let Some(func) = aggregate {
            select = select.aggregate(func);
        }
        Ok(select)
    }
}

/// A typed statement, ready to render or execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Get(Select),
    Has(Select),
    Aggregate(Select),
    Insert(Vec<Insert>),
    Update(Update),
    Delete(Delete),
    Replace(Replace),
}

impl Statement {
    /// Rendered SQL; inserts produce one statement per record.
    pub fn sql(&self) -> CageResult<Vec<String>> {
        match self {
            Statement::Select(s) | Statement::Get(s) | Statement::Aggregate(s) => {
                Ok(vec![s.to_sql()?])
            }
            Statement::Has(s) => Ok(vec![s.exists_sql()?]),
            Statement::Insert(rows) => rows.iter().map(ToSql::to_sql).collect(),
            Statement::Update(u) => Ok(vec![u.to_sql()?]),
            Statement::Delete(d) => Ok(vec![d.to_sql()?]),
            Statement::Replace(r) => Ok(vec![r.to_sql()?]),
        }
    }
}

impl Request {
    /// Parse a request document. Malformed JSON is a [`CageError::Parse`]
    /// at the byte offset of the failure; a well-formed document of the
    /// wrong shape is a [`CageError::Json`].
    pub fn from_json_str(text: &str) -> CageResult<Self> {
        serde_json::from_str(text).map_err(|e| match e.classify() {
            Category::Syntax | Category::Eof => {
                let offset = text
                    .lines()
                    .take(e.line().saturating_sub(1))
                    .map(|l| l.len() + 1)
                    .sum::<usize>()
                    + e.column().saturating_sub(1);
                CageError::parse(offset, e.to_string())
            }
            _ => CageError::Json(e),
        })
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::Select(_) => "select",
            Request::Get(_) => "get",
            Request::Has(_) => "has",
            Request::Count(_) => "count",
            Request::Max(_) => "max",
            Request::Min(_) => "min",
            Request::Avg(_) => "avg",
            Request::Sum(_) => "sum",
            Request::Insert { .. } => "insert",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::Replace { .. } => "replace",
        }
    }

    /// Load the request into a typed statement.
    pub fn statement(&self) -> CageResult<Statement> {
        let aggregate = |q: &Query, func| q.select(Some(func)).map(Statement::Aggregate);
        match self {
            Request::Select(q) => q.select(None).map(Statement::Select),
            Request::Get(q) => q.select(None).map(|s| Statement::Get(s.get())),
            Request::Has(q) => q.select(Some(AggregateFunc::Exists)).map(Statement::Has),
            Request::Count(q) => aggregate(q, AggregateFunc::Count),
            Request::Max(q) => aggregate(q, AggregateFunc::Max),
            Request::Min(q) => aggregate(q, AggregateFunc::Min),
            Request::Avg(q) => aggregate(q, AggregateFunc::Avg),
            Request::Sum(q) => aggregate(q, AggregateFunc::Sum),
            Request::Insert { table, rows } => {
                let records = records_from_json(rows)?;
                if records.is_empty() {
                    return Err(CageError::EmptyMutationRecord(table.clone()));
                }
                Ok(Statement::Insert(
                    records
                        .into_iter()
                        .map(|record| Insert::table(table.clone()).record(record))
                        .collect(),
                ))
            }
            Request::Update {
                table,
                data,
                filter,
            } => Ok(Statement::Update(
                Update::table(table.clone())
                    .record(record_from_json(data)?)
                    .filter(cage_from_json(filter)?),
            )),
            Request::Delete { table, filter } => Ok(Statement::Delete(
                Delete::from(table.clone()).filter(cage_from_json(filter)?),
            )),
            Request::Replace {
                table,
                columns,
                filter,
            } => {
                let mut replace = Replace::table(table.clone());
                for (column, pairs) in columns {
                    let pairs = pairs.as_object().ok_or_else(|| {
                        CageError::InvalidValue(format!(
                            "replacements for {} must map search text to replacement",
                            column
                        ))
                    })?;
                    for (search, replacement) in pairs {
                        let replacement = replacement.as_str().ok_or_else(|| {
                            CageError::InvalidValue(format!(
                                "replacement for {} must be a string",
                                column
                            ))
                        })?;
                        replace = replace.replace(column.clone(), search.clone(), replacement);
                    }
                }
                Ok(Statement::Replace(replace.filter(cage_from_json(filter)?)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(doc: &str) -> Vec<String> {
        Request::from_json_str(doc)
            .unwrap()
            .statement()
            .unwrap()
            .sql()
            .unwrap()
    }

    #[test]
    fn test_select_request() {
        assert_eq!(
            sql(r#"{"action": "select", "table": "users", "columns": ["id"], "where": {"id[>]": 3}}"#),
            vec![r#"SELECT "id" FROM "users" WHERE "id" > 3"#]
        );
    }

    #[test]
    fn test_get_and_has() {
        assert_eq!(
            sql(r#"{"action": "get", "table": "users", "where": {"id": 1}}"#),
            vec![r#"SELECT * FROM "users" WHERE "id" = 1 LIMIT 1"#]
        );
        assert_eq!(
            sql(r#"{"action": "has", "table": "users", "where": {"id": 1}}"#),
            vec![r#"SELECT EXISTS(SELECT 1 FROM "users" WHERE "id" = 1)"#]
        );
    }

    #[test]
    fn test_positional_args() {
        assert_eq!(
            sql(r#"{"action": "count", "table": "users", "args": [{"active": true}]}"#),
            vec![r#"SELECT COUNT(*) FROM "users" WHERE "active" = 1"#]
        );
        let mixed = Request::from_json_str(
            r#"{"action": "select", "table": "t", "args": [], "where": {"a": 1}}"#,
        )
        .unwrap();
        assert!(mixed.statement().is_err());
    }

    #[test]
    fn test_insert_many() {
        assert_eq!(
            sql(r#"{"action": "insert", "table": "tags", "rows": [{"name": "a"}, {"name": "b"}]}"#),
            vec![
                r#"INSERT INTO "tags" ("name") VALUES ('a')"#,
                r#"INSERT INTO "tags" ("name") VALUES ('b')"#,
            ]
        );
        let empty = Request::from_json_str(r#"{"action": "insert", "table": "tags", "rows": []}"#)
            .unwrap();
        assert!(matches!(
            empty.statement(),
            Err(CageError::EmptyMutationRecord(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        assert_eq!(
            sql(r#"{"action": "update", "table": "users", "data": {"logins[+]": 1}, "where": {"id": 2}}"#),
            vec![r#"UPDATE "users" SET "logins" = "logins" + 1 WHERE "id" = 2"#]
        );
        assert_eq!(
            sql(r#"{"action": "delete", "table": "users", "where": {"id": [1, 2]}}"#),
            vec![r#"DELETE FROM "users" WHERE "id" IN (1,2)"#]
        );
    }

    #[test]
    fn test_replace() {
        assert_eq!(
            sql(r#"{"action": "replace", "table": "posts", "columns": {"body": {"http:": "https:"}}}"#),
            vec![r#"UPDATE "posts" SET "body" = REPLACE("body", 'http:', 'https:')"#]
        );
    }

    #[test]
    fn test_malformed_document() {
        let err = Request::from_json_str("{\"action\": \"select\",\n \"table\" 1}").unwrap_err();
        assert!(matches!(err, CageError::Parse { position, .. } if position > 20));
    }

    #[test]
    fn test_unknown_action() {
        assert!(matches!(
            Request::from_json_str(r#"{"action": "truncate", "table": "users"}"#),
            Err(CageError::Json(_))
        ));
    }
}
