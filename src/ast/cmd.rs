//! Statement descriptions. Rendering lives in [`crate::transpiler`].

use serde::{Deserialize, Serialize};

use crate::ast::{AggregateFunc, Cage, JoinSpec, Value};

/// Requested column list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Columns {
    /// `*`
    #[default]
    All,
    /// Named columns, each optionally `expr(alias)`
    List(Vec<String>),
}

impl From<&str> for Columns {
    fn from(column: &str) -> Self {
        if column == "*" {
            Columns::All
        } else {
            Columns::List(vec![column.to_string()])
        }
    }
}

impl From<Vec<&str>> for Columns {
    fn from(columns: Vec<&str>) -> Self {
        Columns::List(columns.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Columns {
    fn from(columns: &[&str]) -> Self {
        Columns::List(columns.iter().map(|c| c.to_string()).collect())
    }
}

impl From<Vec<String>> for Columns {
    fn from(columns: Vec<String>) -> Self {
        Columns::List(columns)
    }
}

/// Insert/update payload: annotated column keys mapped to values, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field; the key may carry `(JSON)` or `[+]` style annotations.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// SELECT statement.
///
/// ```
/// use sqlcage::prelude::*;
///
/// let sql = Select::from("users")
///     .columns(vec!["id", "email"])
///     .filter(Cage::new().with("active", true).limit(10))
///     .to_sql()
///     .unwrap();
/// assert_eq!(sql, r#"SELECT "id", "email" FROM "users" WHERE "active" = 1 LIMIT 10"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub table: String,
    pub join: Option<JoinSpec>,
    pub columns: Columns,
    pub cage: Cage,
    pub aggregate: Option<AggregateFunc>,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            join: None,
            columns: Columns::All,
            cage: Cage::default(),
            aggregate: None,
        }
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.join = Some(join);
        self
    }

    pub fn columns(mut self, columns: impl Into<Columns>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, cage: impl Into<Cage>) -> Self {
        self.cage = cage.into();
        self
    }

    pub fn aggregate(mut self, func: AggregateFunc) -> Self {
        self.aggregate = Some(func);
        self
    }

    /// Single-row fetch: forces `LIMIT 1`.
    pub fn get(mut self) -> Self {
        self.cage = self.cage.limit(1);
        self
    }
}

/// INSERT of a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table: String,
    pub record: Record,
}

impl Insert {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            record: Record::default(),
        }
    }

    pub fn record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record = self.record.set(key, value);
        self
    }
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: String,
    pub record: Record,
    pub cage: Cage,
}

impl Update {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            record: Record::default(),
            cage: Cage::default(),
        }
    }

    pub fn record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record = self.record.set(key, value);
        self
    }

    pub fn filter(mut self, cage: impl Into<Cage>) -> Self {
        self.cage = cage.into();
        self
    }
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table: String,
    pub cage: Cage,
}

impl Delete {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            cage: Cage::default(),
        }
    }

    pub fn filter(mut self, cage: impl Into<Cage>) -> Self {
        self.cage = cage.into();
        self
    }
}

/// In-place text substitution: `SET "c" = REPLACE("c", 'from', 'to')`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replace {
    pub table: String,
    /// (column, search, replacement)
    pub replacements: Vec<(String, String, String)>,
    pub cage: Cage,
}

impl Replace {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            replacements: Vec::new(),
            cage: Cage::default(),
        }
    }

    pub fn replace(
        mut self,
        column: impl Into<String>,
        search: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.replacements
            .push((column.into(), search.into(), replacement.into()));
        self
    }

    pub fn filter(mut self, cage: impl Into<Cage>) -> Self {
        self.cage = cage.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_from_star() {
        assert_eq!(Columns::from("*"), Columns::All);
        assert_eq!(Columns::from("id"), Columns::List(vec!["id".into()]));
    }

    #[test]
    fn test_get_forces_limit() {
        let select = Select::from("users").get();
        assert_eq!(select.cage.limit, Some(crate::ast::Limit::Count(1)));
    }
}
