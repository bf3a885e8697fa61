/// Database layer for Cofound
///
/// - `pool`: connection pool lifecycle and health checks
/// - `migrations`: embedded schema migrations
///
/// Row types and queries live in the crate-level `models` module.

pub mod migrations;
pub mod pool;

/// PostgreSQL SQLSTATE for `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

/// Returns the violated constraint name when `err` is a unique violation
///
/// Data-access functions hand back raw `sqlx::Error`s; callers use this to
/// tell "duplicate email" or "already a team member" apart from other
/// failures.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db_err.constraint().unwrap_or(""))
        }
        _ => None,
    }
}
