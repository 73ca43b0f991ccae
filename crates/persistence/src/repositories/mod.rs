//! Repository implementations for database operations.
//!
//! Each repository implements one of the domain gateway traits on top of a
//! shared `PgPool`.

pub mod event;
pub mod payment;
pub mod rsvp;

pub use event::EventRepository;
pub use payment::PaymentRepository;
pub use rsvp::RsvpRepository;

use domain::services::StoreError;

/// PostgreSQL unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx error onto the gateway error type.
pub(crate) fn store_error(query: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unique").to_string();
            tracing::debug!(query, constraint = %constraint, "Unique constraint violated");
            return StoreError::Conflict(constraint);
        }
    }
    tracing::error!(query, error = %err, "Database query failed");
    StoreError::Backend(err.to_string())
}
