//! Statement assembler for SELECT.

use crate::ast::{AggregateFunc, Select};
use crate::error::CageResult;
use crate::quote::quote_identifier;
use crate::transpiler::ToSql;
use crate::transpiler::clauses::render_clauses;
use crate::transpiler::columns::render_columns;
use crate::transpiler::joins::render_joins;

impl ToSql for Select {
    fn to_sql(&self) -> CageResult<String> {
        let columns = match self.aggregate {
            Some(AggregateFunc::Exists) => "1".to_string(),
            Some(func) => format!("{}({})", func, render_columns(&self.columns)?),
            None => render_columns(&self.columns)?,
        };

        let mut sql = format!("SELECT {} FROM {}", columns, quote_identifier(&self.table)?);

        if let Some(join) = self.join.as_ref().filter(|j| !j.is_empty()) {
            sql.push(' ');
            sql.push_str(&render_joins(&self.table, join)?);
        }

        sql.push_str(&render_clauses(&self.cage)?);
        Ok(sql)
    }
}

impl Select {
    /// `SELECT EXISTS(SELECT 1 FROM ...)`.
    pub fn exists_sql(&self) -> CageResult<String> {
        let probe = Select {
            aggregate: Some(AggregateFunc::Exists),
            ..self.clone()
        };
        Ok(format!("SELECT EXISTS({})", probe.to_sql()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Cage, JoinSpec};

    #[test]
    fn test_simple_select() {
        let sql = Select::from("users").to_sql().unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users""#);
    }

    #[test]
    fn test_select_complex() {
        let sql = Select::from("users")
            .columns(vec!["id", "email"])
            .filter(Cage::new().with("active", true).order_desc("created_at").limit(10))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "id", "email" FROM "users" WHERE "active" = 1 ORDER BY "created_at" DESC LIMIT 10"#
        );
    }

    #[test]
    fn test_select_with_join() {
        let sql = Select::from("users")
            .join(JoinSpec::new().with("[>]posts", "user_id"))
            .columns(vec!["users.id", "posts.title"])
            .filter(Cage::new().with("users.id", 1))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."id", "posts"."title" FROM "users" LEFT JOIN "posts" USING ("user_id") WHERE "users"."id" = 1"#
        );
    }

    #[test]
    fn test_aggregates() {
        let count = Select::from("users").aggregate(AggregateFunc::Count);
        assert_eq!(count.to_sql().unwrap(), r#"SELECT COUNT(*) FROM "users""#);

        let max = Select::from("orders")
            .columns("total")
            .aggregate(AggregateFunc::Max)
            .filter(Cage::new().with("paid", true));
        assert_eq!(
            max.to_sql().unwrap(),
            r#"SELECT MAX("total") FROM "orders" WHERE "paid" = 1"#
        );
    }

    #[test]
    fn test_exists() {
        let has = Select::from("users").filter(Cage::new().with("email", "a@b.c"));
        assert_eq!(
            has.exists_sql().unwrap(),
            r#"SELECT EXISTS(SELECT 1 FROM "users" WHERE "email" = 'a@b.c')"#
        );
    }

    #[test]
    fn test_get_adds_limit() {
        let sql = Select::from("users")
            .filter(Cage::new().with("id", 7))
            .get()
            .to_sql()
            .unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users" WHERE "id" = 7 LIMIT 1"#);
    }
}
