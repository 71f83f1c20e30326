//! Composable SQL filter predicates
//!
//! A [`Filter`] collects `AND` clauses with their bind values. Both the
//! `COUNT(*)` query and the `LIMIT/OFFSET` data query of a list endpoint
//! consume the same instance, so their predicates are identical by
//! construction.

use sqlx::query::{QueryAs, QueryScalar};
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// A single bind value
#[derive(Debug, Clone)]
pub enum Arg {
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Real(v)
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Text(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Text(v.to_owned())
    }
}

/// An ordered list of `AND` clauses plus their bind values
#[derive(Debug, Default)]
pub struct Filter {
    clauses: Vec<String>,
    args: Vec<Arg>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one clause containing exactly one `?` placeholder
    pub fn push(&mut self, clause: impl Into<String>, arg: impl Into<Arg>) {
        self.clauses.push(clause.into());
        self.args.push(arg.into());
    }

    /// Substring match of `keyword` against any of `columns`
    pub fn keyword(&mut self, columns: &[&str], keyword: &str) {
        let clause = columns
            .iter()
            .map(|c| format!("{c} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.clauses.push(format!("({clause})"));
        let pattern = format!("%{keyword}%");
        for _ in columns {
            self.args.push(Arg::Text(pattern.clone()));
        }
    }

    /// Rendered clauses, ready to append after `WHERE 1=1`
    pub fn sql(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!(" AND {c}"))
            .collect::<String>()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
        for arg in &self.args {
            query = match arg {
                Arg::Int(v) => query.bind(*v),
                Arg::Real(v) => query.bind(*v),
                Arg::Text(v) => query.bind(v.clone()),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
        for arg in &self.args {
            query = match arg {
                Arg::Int(v) => query.bind(*v),
                Arg::Real(v) => query.bind(*v),
                Arg::Text(v) => query.bind(v.clone()),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_renders_nothing() {
        let f = Filter::new();
        assert!(f.is_empty());
        assert_eq!(f.sql(), "");
    }

    #[test]
    fn clauses_join_with_and() {
        let mut f = Filter::new();
        f.push("order_date >= ?", "2026-01-01");
        f.push("customer_id = ?", 7i64);
        assert_eq!(f.sql(), " AND order_date >= ? AND customer_id = ?");
    }

    #[test]
    fn keyword_expands_to_one_like_per_column() {
        let mut f = Filter::new();
        f.keyword(&["name", "spec", "description"], "rope");
        assert_eq!(
            f.sql(),
            " AND (name LIKE ? OR spec LIKE ? OR description LIKE ?)"
        );
        assert_eq!(f.args.len(), 3);
        assert!(matches!(&f.args[0], Arg::Text(p) if p == "%rope%"));
    }
}
