//! Column list builder.

use crate::ast::Columns;
use crate::error::CageResult;
use crate::parser::column_alias;
use crate::quote::quote_identifier;

/// Render a SELECT column list. `expr(alias)` entries become `"expr" AS "alias"`.
pub fn render_columns(columns: &Columns) -> CageResult<String> {
    match columns {
        Columns::All => Ok("*".to_string()),
        Columns::List(list) if list.is_empty() => Ok("*".to_string()),
        Columns::List(list) => {
            let rendered = list
                .iter()
                .map(|entry| render_column(entry))
                .collect::<CageResult<Vec<_>>>()?;
            Ok(rendered.join(", "))
        }
    }
}

fn render_column(entry: &str) -> CageResult<String> {
    let entry = entry.trim();
    if entry == "*" {
        return Ok("*".to_string());
    }
    match column_alias(entry) {
        Some((expr, alias)) => Ok(format!(
            "{} AS {}",
            quote_identifier(expr)?,
            quote_identifier(alias)?
        )),
        None => quote_identifier(entry),
    }
}
