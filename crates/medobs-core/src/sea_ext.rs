use sea_orm::{
    Condition, DbErr, SqlErr, TransactionError,
    sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr},
};

/// Case-insensitive substring match of `term` against `column`.
///
/// LIKE wildcards in `term` are escaped and match literally.
pub fn icontains<C>(column: C, term: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(contains_pattern(term)).escape('\\'))
}

fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Combine per-term conditions so that every term must match.
///
/// `per_term` usually returns a `Condition::any()` over the searchable
/// fields. No terms yields an always-true condition.
pub fn all_terms<F>(terms: &[String], per_term: F) -> Condition
where
    F: Fn(&str) -> Condition,
{
    terms
        .iter()
        .fold(Condition::all(), |cond, term| cond.add(per_term(term)))
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// Unwrap the database error raised inside or around a transaction.
pub fn flatten_transaction_err(err: TransactionError<DbErr>) -> DbErr {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => e,
    }
}
