//! SQL transpiler for sqlcage statements.
//!
//! Converts AST values into SQL strings. Rendering is pure: the same input
//! always produces the same text, and any malformed piece fails the whole
//! statement before text is returned.

pub mod clauses;
pub mod columns;
pub mod conditions;
pub mod dml;
pub mod joins;
pub mod mutation;
pub mod select;

use crate::ast::{Cage, Conditions, LogicalOp};
use crate::error::CageResult;

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> CageResult<String>;
}

impl ToSql for Conditions {
    /// The bare boolean expression, entries joined with AND.
    fn to_sql(&self) -> CageResult<String> {
        conditions::compile(self, LogicalOp::And)
    }
}

impl ToSql for Cage {
    /// The clause tail (` WHERE ... LIMIT n`).
    fn to_sql(&self) -> CageResult<String> {
        clauses::render_clauses(self)
    }
}
