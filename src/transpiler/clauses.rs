//! Clause assembler: WHERE, LIKE/MATCH, GROUP BY, HAVING, ORDER BY, LIMIT.
//!
//! Every fragment starts with a space so the result can be appended directly
//! after a table reference.

use crate::ast::{Cage, Conditions, Key, Like, Limit, LogicalOp, Match, Node, Order};
use crate::error::{CageError, CageResult};
use crate::parser::bare_combinator;
use crate::quote::{encode_list, quote_identifier, quote_literal};
use crate::transpiler::conditions::{compile, compile_entry};

/// Render all clauses of a cage.
///
/// ```
/// use sqlcage::ast::Cage;
/// use sqlcage::transpiler::clauses::render_clauses;
///
/// let cage = Cage::new().with("age[>]", 18).order_desc("age").limit(5);
/// assert_eq!(
///     render_clauses(&cage).unwrap(),
///     r#" WHERE "age" > 18 ORDER BY "age" DESC LIMIT 5"#
/// );
/// ```
pub fn render_clauses(cage: &Cage) -> CageResult<String> {
    let mut sql = String::new();

    if let Some(body) = where_body(&cage.conditions)? {
        sql.push_str(" WHERE ");
        sql.push_str(&body);
    }

    if let Some(like) = &cage.like {
        let fragment = render_like(like)?;
        append_condition(&mut sql, &fragment);
    }

    if let Some(matching) = &cage.matching {
        let fragment = render_match(matching)?;
        append_condition(&mut sql, &fragment);
    }

    if let Some(group) = &cage.group {
        sql.push_str(" GROUP BY ");
        sql.push_str(&quote_identifier(group)?);
    }

    if let Some(having) = &cage.having {
        if having.is_empty() {
            return Err(CageError::modifier("HAVING", "no conditions"));
        }
        sql.push_str(" HAVING ");
        sql.push_str(&compile(having, LogicalOp::And)?);
    }

    if let Some(order) = &cage.order {
        sql.push_str(" ORDER BY ");
        sql.push_str(&render_order(order)?);
    }

    if let Some(limit) = &cage.limit {
        match limit {
            Limit::Count(n) => sql.push_str(&format!(" LIMIT {}", n)),
            Limit::Window { offset, count } => {
                sql.push_str(&format!(" LIMIT {},{}", offset, count))
            }
        }
    }

    Ok(sql)
}

/// WHERE body for the top-level entries.
///
/// A bare top-level `AND`/`OR` group replaces its siblings: the first `AND`
/// group is taken, and the first `OR` group wins over it. Discriminated keys
/// (`OR #2`) are ordinary entries and always render.
fn where_body(conditions: &Conditions) -> CageResult<Option<String>> {
    let mut and_group: Option<(&Key, &Node)> = None;
    let mut or_group: Option<(&Key, &Node)> = None;
    let mut leaves: Vec<(&Key, &Node)> = Vec::new();
    let mut shadowed = 0usize;

    for (key, node) in conditions.iter() {
        if let (Key::Named(name), Node::Group(_) | Node::Groups(_)) = (key, node) {
            let slot = match bare_combinator(name) {
                Some(LogicalOp::And) => Some(&mut and_group),
                Some(LogicalOp::Or) => Some(&mut or_group),
                None => None,
            };
            if let Some(slot) = slot {
                if slot.is_none() {
                    *slot = Some((key, node));
                } else {
                    shadowed += 1;
                }
                continue;
            }
        }
        leaves.push((key, node));
    }

    let chosen = match (and_group, or_group) {
        (Some(_), Some(or)) => {
            shadowed += 1;
            Some(or)
        }
        (and, or) => or.or(and),
    };

    match chosen {
        Some((key, node)) => {
            if !leaves.is_empty() || shadowed > 0 {
                tracing::warn!(
                    group = %key,
                    leaves = leaves.len(),
                    groups = shadowed,
                    "top-level combinator overrides sibling conditions"
                );
            }
            compile_entry(key, node, LogicalOp::And).map(Some)
        }
        None if leaves.is_empty() => Ok(None),
        None => {
            let fragments = leaves
                .into_iter()
                .map(|(key, node)| compile_entry(key, node, LogicalOp::And))
                .collect::<CageResult<Vec<_>>>()?;
            Ok(Some(fragments.join(LogicalOp::And.joiner())))
        }
    }
}

fn append_condition(sql: &mut String, fragment: &str) {
    sql.push_str(if sql.is_empty() { " WHERE " } else { " AND " });
    sql.push_str(fragment);
}

fn render_like(like: &Like) -> CageResult<String> {
    let mut terms = Vec::new();
    for (column, keywords) in &like.terms {
        let col = quote_identifier(column)?;
        for keyword in keywords {
            terms.push(format!(
                "{} LIKE {}",
                col,
                quote_literal(&format!("%{}%", keyword))
            ));
        }
    }
    if terms.is_empty() {
        return Err(CageError::modifier("LIKE", "no column/keyword pairs"));
    }
    Ok(format!("({})", terms.join(like.connector.joiner())))
}

fn render_match(matching: &Match) -> CageResult<String> {
    if matching.columns.is_empty() {
        return Err(CageError::modifier("MATCH", "no columns"));
    }
    let columns = matching
        .columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<CageResult<Vec<_>>>()?;
    Ok(format!(
        "MATCH ({}) AGAINST ({})",
        columns.join(", "),
        quote_literal(&matching.keyword)
    ))
}

fn render_order(order: &Order) -> CageResult<String> {
    match order {
        Order::Columns(terms) => {
            if terms.is_empty() {
                return Err(CageError::modifier("ORDER", "no columns"));
            }
            let parts = terms
                .iter()
                .map(|(column, dir)| {
                    let col = quote_identifier(column)?;
                    Ok(match dir {
                        Some(dir) => format!("{} {}", col, dir),
                        None => col,
                    })
                })
                .collect::<CageResult<Vec<_>>>()?;
            Ok(parts.join(", "))
        }
        Order::Field { column, values } => {
            if values.is_empty() {
                return Err(CageError::modifier("ORDER", "FIELD ordering needs values"));
            }
            Ok(format!(
                "FIELD({}, {})",
                quote_identifier(column)?,
                encode_list(values)?
            ))
        }
    }
}
