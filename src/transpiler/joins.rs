//! Join resolver.

use crate::ast::{JoinSpec, Relation};
use crate::error::{CageError, CageResult};
use crate::parser::join_key;
use crate::quote::quote_identifier;

/// Render every join in `join` against the base table.
///
/// A dotted `ON` left column (`"accounts.owner_id"`) is taken as-is, which
/// lets later joins refer to tables joined earlier.
pub fn render_joins(base_table: &str, join: &JoinSpec) -> CageResult<String> {
    let base = quote_identifier(base_table)?;
    let mut parts = Vec::with_capacity(join.entries.len());

    for (key, relation) in &join.entries {
        let (kind, table) = join_key(key)?;
        let table = quote_identifier(table)?;

        let descriptor = match relation {
            Relation::Using(columns) if columns.is_empty() => {
                return Err(CageError::InvalidJoinSpec(format!(
                    "join '{}' has an empty USING list",
                    key
                )));
            }
            Relation::Using(columns) => {
                let columns = columns
                    .iter()
                    .map(|c| quote_identifier(c))
                    .collect::<CageResult<Vec<_>>>()?;
                format!("USING ({})", columns.join(", "))
            }
            Relation::On { left, right } => {
                let left = if left.contains('.') {
                    quote_identifier(left)?
                } else {
                    format!("{}.{}", base, quote_identifier(left)?)
                };
                format!("ON {} = {}.{}", left, table, quote_identifier(right)?)
            }
        };

        parts.push(format!("{} JOIN {} {}", kind, table, descriptor));
    }

    Ok(parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_using_single() {
        let join = JoinSpec::new().with("[><]posts", "user_id");
        assert_eq!(
            render_joins("users", &join).unwrap(),
            r#"INNER JOIN "posts" USING ("user_id")"#
        );
    }

    #[test]
    fn test_using_many_and_on() {
        let join = JoinSpec::new()
            .with("[>]posts", vec!["user_id", "org_id"])
            .with("[<>]accounts", ("account_id", "id"));
        assert_eq!(
            render_joins("users", &join).unwrap(),
            r#"LEFT JOIN "posts" USING ("user_id", "org_id") FULL JOIN "accounts" ON "users"."account_id" = "accounts"."id""#
        );
    }

    #[test]
    fn test_chained_on() {
        let join = JoinSpec::new()
            .with("[<]posts", ("id", "author_id"))
            .with("[>]comments", ("posts.id", "post_id"));
        assert_eq!(
            render_joins("users", &join).unwrap(),
            r#"RIGHT JOIN "posts" ON "users"."id" = "posts"."author_id" LEFT JOIN "comments" ON "posts"."id" = "comments"."post_id""#
        );
    }

    #[test]
    fn test_bad_keys_fail() {
        let join = JoinSpec::new().with("posts", "user_id");
        assert!(matches!(
            render_joins("users", &join),
            Err(CageError::InvalidJoinSpec(_))
        ));
        let join = JoinSpec::new().with("[>]posts", Relation::Using(vec![]));
        assert!(matches!(
            render_joins("users", &join),
            Err(CageError::InvalidJoinSpec(_))
        ));
    }
}
