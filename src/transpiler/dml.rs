//! INSERT, UPDATE, DELETE and REPLACE statements.

use crate::ast::{Delete, Insert, Replace, Update};
use crate::error::{CageError, CageResult};
use crate::quote::{quote_identifier, quote_literal};
use crate::transpiler::ToSql;
use crate::transpiler::clauses::render_clauses;
use crate::transpiler::mutation::{encode_insert, encode_update};

impl ToSql for Insert {
    fn to_sql(&self) -> CageResult<String> {
        let (columns, values) = encode_insert(&self.table, &self.record)?;
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table)?,
            columns.join(", "),
            values.join(", ")
        ))
    }
}

impl ToSql for Update {
    fn to_sql(&self) -> CageResult<String> {
        let fields = encode_update(&self.table, &self.record)?;
        Ok(format!(
            "UPDATE {} SET {}{}",
            quote_identifier(&self.table)?,
            fields.join(", "),
            render_clauses(&self.cage)?
        ))
    }
}

impl ToSql for Delete {
    fn to_sql(&self) -> CageResult<String> {
        Ok(format!(
            "DELETE FROM {}{}",
            quote_identifier(&self.table)?,
            render_clauses(&self.cage)?
        ))
    }
}

impl ToSql for Replace {
    fn to_sql(&self) -> CageResult<String> {
        if self.replacements.is_empty() {
            return Err(CageError::EmptyMutationRecord(self.table.clone()));
        }
        let fields = self
            .replacements
            .iter()
            .map(|(column, search, replacement)| {
                let col = quote_identifier(column)?;
                Ok(format!(
                    "{} = REPLACE({}, {}, {})",
                    col,
                    col,
                    quote_literal(search),
                    quote_literal(replacement)
                ))
            })
            .collect::<CageResult<Vec<_>>>()?;
        Ok(format!(
            "UPDATE {} SET {}{}",
            quote_identifier(&self.table)?,
            fields.join(", "),
            render_clauses(&self.cage)?
        ))
    }
}
