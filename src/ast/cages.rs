use serde::{Deserialize, Serialize};

use crate::ast::{Conditions, LogicalOp, SortOrder, Value};

/// A cage: the condition expression of a statement together with its
/// GROUP / ORDER / HAVING / LIMIT / LIKE / MATCH modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cage {
    /// WHERE conditions (top-level `AND`/`OR` groups override leaves)
    pub conditions: Conditions,
    pub like: Option<Like>,
    pub matching: Option<Match>,
    pub group: Option<String>,
    pub having: Option<Conditions>,
    pub order: Option<Order>,
    pub limit: Option<Limit>,
}

/// `LIKE` modifier: `"col" LIKE '%keyword%'` for every column/keyword pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub connector: LogicalOp,
    pub terms: Vec<(String, Vec<String>)>,
}

/// `MATCH (...) AGAINST (...)` full-text modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub columns: Vec<String>,
    pub keyword: String,
}

/// `ORDER` modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Order {
    /// `ORDER BY "a" DESC, "b"`
    Columns(Vec<(String, Option<SortOrder>)>),
    /// `ORDER BY FIELD("col", v1,v2)`
    Field { column: String, values: Vec<Value> },
}

/// `LIMIT` modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    Count(u64),
    Window { offset: u64, count: u64 },
}

impl Cage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing condition expression.
    pub fn from_conditions(conditions: Conditions) -> Self {
        Self {
            conditions,
            ..Self::default()
        }
    }

    /// Add a leaf comparison.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions = self.conditions.with(key, value);
        self
    }

    /// Add a combinator group.
    pub fn group_by_key(mut self, key: impl Into<String>, group: Conditions) -> Self {
        self.conditions = self.conditions.group(key, group);
        self
    }

    /// Add a raw fragment.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.conditions = self.conditions.raw(sql);
        self
    }

    /// `LIKE '%keyword%'` on one column, ANDed with any previous term.
    pub fn like(mut self, column: impl Into<String>, keyword: impl Into<String>) -> Self {
        let like = self.like.get_or_insert_with(|| Like {
            connector: LogicalOp::And,
            terms: Vec::new(),
        });
        like.terms.push((column.into(), vec![keyword.into()]));
        self
    }

    /// Join LIKE terms with the given operator instead of AND.
    pub fn like_connector(mut self, connector: LogicalOp) -> Self {
        if let Some(like) = self.like.as_mut() {
            like.connector = connector;
        }
        self
    }

    pub fn matching(mut self, columns: &[&str], keyword: impl Into<String>) -> Self {
        self.matching = Some(Match {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            keyword: keyword.into(),
        });
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group = Some(column.into());
        self
    }

    pub fn having(mut self, conditions: Conditions) -> Self {
        self.having = Some(conditions);
        self
    }

    pub fn order_asc(self, column: impl Into<String>) -> Self {
        self.push_order(column.into(), Some(SortOrder::Asc))
    }

    pub fn order_desc(self, column: impl Into<String>) -> Self {
        self.push_order(column.into(), Some(SortOrder::Desc))
    }

    /// Order by column with the database's default direction.
    pub fn order_by(self, column: impl Into<String>) -> Self {
        self.push_order(column.into(), None)
    }

    /// Order rows by the position of `column` in `values`.
    pub fn order_by_field(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.order = Some(Order::Field {
            column: column.into(),
            values,
        });
        self
    }

    fn push_order(mut self, column: String, dir: Option<SortOrder>) -> Self {
        match self.order.as_mut() {
            Some(Order::Columns(terms)) => terms.push((column, dir)),
            _ => self.order = Some(Order::Columns(vec![(column, dir)])),
        }
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(Limit::Count(n));
        self
    }

    pub fn limit_offset(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(Limit::Window { offset, count });
        self
    }

    /// True when nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.like.is_none()
            && self.matching.is_none()
            && self.group.is_none()
            && self.having.is_none()
            && self.order.is_none()
            && self.limit.is_none()
    }
}

impl From<Conditions> for Cage {
    fn from(conditions: Conditions) -> Self {
        Self::from_conditions(conditions)
    }
}
