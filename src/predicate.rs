//! Predicate normalization.
//!
//! Callers filter rows in one of three shapes: a plain equality mapping,
//! a pre-built sea-query condition, or a filter closure. All three
//! normalize into a [`sea_query::Condition`] before statement building.

use crate::gateway::GatewayError;
use sea_query::{Alias, Cond, Condition, Expr, ExprTrait, Value};

/// A row filter in one of the three caller-supplied shapes.
///
/// # Example
///
/// ```
/// use gatehouse::Predicate;
/// use sea_query::{Expr, ExprTrait};
///
/// // equality pairs, ANDed together
/// let by_pair = Predicate::from(("status", "active".into()));
///
/// // a pre-built expression
/// let by_expr = Predicate::from(Expr::col(sea_query::Alias::new("age")).gt(18));
///
/// // a filter closure over the condition tree
/// let by_closure = Predicate::with(|cond| {
///     cond.add(Expr::col(sea_query::Alias::new("deleted_at")).is_null())
/// });
/// ```
pub enum Predicate {
    /// Column equality pairs, combined with logical AND
    Equals(Vec<(String, Value)>),
    /// A structured condition built by the caller
    Cond(Condition),
    /// A filter closure applied to an empty AND condition
    With(Box<dyn Fn(Condition) -> Condition>),
}

impl Predicate {
    /// Equality predicate over column/value pairs
    pub fn equals<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Predicate::Equals(pairs.into_iter().map(|(c, v)| (c.into(), v)).collect())
    }

    /// Closure predicate; receives an empty AND condition to extend
    pub fn with<F>(filter: F) -> Self
    where
        F: Fn(Condition) -> Condition + 'static,
    {
        Predicate::With(Box::new(filter))
    }

    /// Normalize into the condition tree used by statement builders
    pub(crate) fn into_condition(self) -> Condition {
        match self {
            Predicate::Equals(pairs) => pairs.into_iter().fold(Cond::all(), |cond, (c, v)| {
                cond.add(Expr::col(Alias::new(c.as_str())).eq(v))
            }),
            Predicate::Cond(condition) => condition,
            Predicate::With(filter) => filter(Cond::all()),
        }
    }

    /// Validate equality pairs destined for an existence check.
    ///
    /// The pairs must be a non-empty associative mapping: every key a real
    /// column name, none of them empty or a bare integer index. Violations
    /// surface before any statement reaches the executor.
    pub(crate) fn ensure_associative(pairs: &[(String, Value)]) -> Result<(), GatewayError> {
        if pairs.is_empty() {
            return Err(GatewayError::InvalidPredicate(
                "predicate must be a non-empty set of column/value pairs".to_string(),
            ));
        }
        for (column, _) in pairs {
            if column.is_empty() || column.chars().all(|c| c.is_ascii_digit()) {
                return Err(GatewayError::InvalidPredicate(format!(
                    "predicate keys must be column names, got: `{column}`"
                )));
            }
        }
        Ok(())
    }
}

impl From<(&str, Value)> for Predicate {
    fn from((column, value): (&str, Value)) -> Self {
        Predicate::Equals(vec![(column.to_string(), value)])
    }
}

impl From<Vec<(String, Value)>> for Predicate {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Predicate::Equals(pairs)
    }
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self {
        Predicate::Cond(condition)
    }
}

impl From<Expr> for Predicate {
    fn from(expr: Expr) -> Self {
        Predicate::Cond(Cond::all().add(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::{Asterisk, PostgresQueryBuilder, SelectStatement};

    fn render(predicate: Predicate) -> String {
        let mut stmt = SelectStatement::default();
        stmt.column(Asterisk)
            .from(Alias::new("t"))
            .cond_where(predicate.into_condition());
        stmt.build(PostgresQueryBuilder).0
    }

    #[test]
    fn test_equals_pairs_are_anded() {
        let sql = render(Predicate::equals([
            ("status", Value::from("active")),
            ("role", Value::from("admin")),
        ]));
        assert!(sql.contains("\"status\" = $1"));
        assert!(sql.contains("AND"));
        assert!(sql.contains("\"role\" = $2"));
    }

    #[test]
    fn test_expression_shape() {
        let sql = render(Predicate::from(
            Expr::col(Alias::new("age")).gt(18),
        ));
        assert!(sql.contains("\"age\" > $1"));
    }

    #[test]
    fn test_closure_shape() {
        let sql = render(Predicate::with(|cond| {
            cond.add(Expr::col(Alias::new("deleted_at")).is_null())
        }));
        assert!(sql.contains("\"deleted_at\" IS NULL"));
    }

    #[test]
    fn test_empty_pairs_are_rejected() {
        let err = Predicate::ensure_associative(&[]).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn test_integer_keys_are_rejected() {
        let pairs = vec![("0".to_string(), Value::from("x"))];
        let err = Predicate::ensure_associative(&pairs).unwrap_err();
        assert!(err.to_string().contains("column names"));
    }

    #[test]
    fn test_valid_pairs_pass() {
        let pairs = vec![("email".to_string(), Value::from("a@b.c"))];
        assert!(Predicate::ensure_associative(&pairs).is_ok());
    }
}
