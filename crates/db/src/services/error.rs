use thiserror::Error;

// SQLSTATE class 23: integrity constraint violation.
const CONSTRAINT_VIOLATION_CLASS: &str = "23";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if is_constraint_violation(&e) {
            StoreError::Constraint(e.to_string())
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }
}

/// Checks if an sqlx::Error is a constraint violation reported by PostgreSQL.
fn is_constraint_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        if let Some(code) = db_err.code() {
            return code.starts_with(CONSTRAINT_VIOLATION_CLASS);
        }
    }
    false
}
