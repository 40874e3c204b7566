//! Abstract Syntax Tree for sqlcage statements.
//!
//! Everything here is a plain value built per call and consumed by the
//! transpiler. Nothing is rendered until [`crate::transpiler::ToSql`] runs.

pub mod cages;
pub mod cmd;
pub mod conditions;
pub mod joins;
pub mod operators;
pub mod values;

pub use self::cages::{Cage, Like, Limit, Match, Order};
pub use self::cmd::{Columns, Delete, Insert, Record, Replace, Select, Update};
pub use self::conditions::{Conditions, Key, Node};
pub use self::joins::{JoinSpec, Relation};
pub use self::operators::{AggregateFunc, ArithOp, JoinKind, LogicalOp, Operator, SortOrder};
pub use self::values::Value;
