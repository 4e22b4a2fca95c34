//! Shared error mapping for Diesel repository implementations.
//!
//! Every repository port in this crate distinguishes connection failures from
//! query failures. [`RepositoryErrorKind`] lets the pool and Diesel mappers
//! below serve all of them.

use tracing::debug;

use crate::domain::ports::{LabRecordsRepositoryError, StudentRepositoryError};

use super::pool::PoolError;

/// Port error enums with connection and query variants.
pub(crate) trait RepositoryErrorKind {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
}

impl RepositoryErrorKind for StudentRepositoryError {
    fn connection(message: String) -> Self {
        Self::Connection { message }
    }

    fn query(message: String) -> Self {
        Self::Query { message }
    }
}

impl RepositoryErrorKind for LabRecordsRepositoryError {
    fn connection(message: String) -> Self {
        Self::Connection { message }
    }

    fn query(message: String) -> Self {
        Self::Query { message }
    }
}

/// Map pool errors to a repository connection error.
pub(crate) fn map_pool_error<E: RepositoryErrorKind>(error: PoolError) -> E {
    match error {
        PoolError::Checkout(message) | PoolError::Build(message) => E::connection(message),
    }
}

/// Map Diesel errors to repository errors without leaking SQL details.
pub(crate) fn map_diesel_error<E: RepositoryErrorKind>(error: diesel::result::Error) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection("database connection error".to_owned())
        }
        _ => E::query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err: StudentRepositoryError = map_pool_error(PoolError::Checkout("timed out".to_owned()));
        assert_eq!(err, StudentRepositoryError::connection("timed out"));
    }

    #[rstest]
    fn not_found_becomes_query_error() {
        let err: LabRecordsRepositoryError = map_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(err, LabRecordsRepositoryError::query("record not found"));
    }
}
