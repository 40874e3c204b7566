use serde::{Deserialize, Serialize};

/// How a joined table relates to the base table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Relation {
    /// `USING ("c1", "c2")`
    Using(Vec<String>),
    /// `ON "base"."left" = "joined"."right"`
    On { left: String, right: String },
}

impl Relation {
    pub fn on(left: impl Into<String>, right: impl Into<String>) -> Self {
        Relation::On {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl From<&str> for Relation {
    fn from(column: &str) -> Self {
        Relation::Using(vec![column.to_string()])
    }
}

impl From<String> for Relation {
    fn from(column: String) -> Self {
        Relation::Using(vec![column])
    }
}

impl From<Vec<&str>> for Relation {
    fn from(columns: Vec<&str>) -> Self {
        Relation::Using(columns.into_iter().map(str::to_string).collect())
    }
}

impl From<(&str, &str)> for Relation {
    fn from((left, right): (&str, &str)) -> Self {
        Relation::on(left, right)
    }
}

/// Join specification: `[>]posts` style keys mapped to relations, in order.
///
/// ```
/// use sqlcage::ast::{JoinSpec, Relation};
///
/// let join = JoinSpec::new()
///     .with("[>]posts", "user_id")
///     .with("[><]accounts", Relation::on("account_id", "id"));
/// assert_eq!(join.entries.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub entries: Vec<(String, Relation)>,
}

impl JoinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, relation: impl Into<Relation>) -> Self {
        self.entries.push((key.into(), relation.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
