//! # sqlcage
//!
//! Declarative filters in, SQL text out.
//!
//! sqlcage compiles nested condition expressions, join specifications and
//! mutation records into SQL with ANSI double-quoted identifiers and escaped
//! literals.
//!
//! ## Quick Example
//!
//! ```
//! use sqlcage::prelude::*;
//!
//! let sql = Select::from("users")
//!     .columns(vec!["id", "email"])
//!     .filter(Cage::new().with("active", true).limit(10))
//!     .to_sql()
//!     .unwrap();
//! assert_eq!(sql, r#"SELECT "id", "email" FROM "users" WHERE "active" = 1 LIMIT 10"#);
//! ```
//!
//! ## Key syntax
//!
//! | Key              | Meaning                          |
//! |------------------|----------------------------------|
//! | `col`            | `=`, `IS NULL`, or `IN (...)`    |
//! | `col[!]`         | `!=`, `IS NOT NULL`, `NOT IN`    |
//! | `col[>]` `[>=]` `[<]` `[<=]` | relational comparison |
//! | `col[<>]` `[><]` | `BETWEEN` / `NOT BETWEEN`        |
//! | `AND` `OR #tag`  | nested group                     |
//! | `[>]t` `[<]t` `[<>]t` `[><]t` | LEFT/RIGHT/FULL/INNER join |
//! | `(JSON) col`     | store value as JSON text         |
//! | `col[+]` `[-]` `[*]` `[/]` | arithmetic update      |

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod json;
pub mod parser;
pub mod quote;
pub mod request;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::engine::{Database, Outcome};
    pub use crate::error::*;
    pub use crate::request::{Request, Statement};
    pub use crate::transpiler::ToSql;
}

/// Compile a JSON filter document into its clause tail.
///
/// # Example
///
/// ```
/// let sql = sqlcage::compile_filter(&serde_json::json!({
///     "OR": {"age[>]": 18, "name": "Bob"},
///     "LIMIT": 5
/// }))
/// .unwrap();
/// assert_eq!(sql, r#" WHERE ("age" > 18 OR "name" = 'Bob') LIMIT 5"#);
/// ```
pub fn compile_filter(filter: &serde_json::Value) -> error::CageResult<String> {
    use transpiler::ToSql;
    json::cage_from_json(filter)?.to_sql()
}
