//! Classification of PostgreSQL failures that services translate into
//! domain errors instead of reporting them as internal failures.

/// SQLSTATE raised when a serializable transaction cannot be committed.
pub const SERIALIZATION_FAILURE: &str = "40001";
pub const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFailure {
    UniqueViolation { constraint: Option<String> },
    ForeignKeyViolation { constraint: Option<String> },
    /// The transaction lost a race and may succeed if run again.
    Retryable,
    Other,
}

impl StoreFailure {
    pub fn is_unique(&self, name: &str) -> bool {
        matches!(self, StoreFailure::UniqueViolation { constraint: Some(c) } if c == name)
    }

    pub fn is_foreign_key(&self, name: &str) -> bool {
        matches!(self, StoreFailure::ForeignKeyViolation { constraint: Some(c) } if c == name)
    }
}

pub fn classify_sqlx(err: &sqlx::Error) -> StoreFailure {
    let sqlx::Error::Database(db_err) = err else {
        return StoreFailure::Other;
    };

    let constraint = db_err.constraint().map(str::to_string);
    if db_err.is_unique_violation() {
        return StoreFailure::UniqueViolation { constraint };
    }
    if db_err.is_foreign_key_violation() {
        return StoreFailure::ForeignKeyViolation { constraint };
    }
    match db_err.code().as_deref() {
        Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => StoreFailure::Retryable,
        _ => StoreFailure::Other,
    }
}

/// Classifies a repository error, looking through the `eyre` wrapper for the
/// underlying `sqlx::Error`.
pub fn classify(report: &eyre::Report) -> StoreFailure {
    report
        .downcast_ref::<sqlx::Error>()
        .map(classify_sqlx)
        .unwrap_or(StoreFailure::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_other() {
        assert_eq!(classify_sqlx(&sqlx::Error::RowNotFound), StoreFailure::Other);
        assert_eq!(classify(&eyre::eyre!("plain failure")), StoreFailure::Other);
    }

    #[test]
    fn wrapped_sqlx_errors_are_found() {
        let report = eyre::Report::new(sqlx::Error::PoolTimedOut);
        assert_eq!(classify(&report), StoreFailure::Other);
        assert!(report.downcast_ref::<sqlx::Error>().is_some());
    }

    #[test]
    fn constraint_matching() {
        let failure = StoreFailure::UniqueViolation {
            constraint: Some("units_code_key".to_string()),
        };
        assert!(failure.is_unique("units_code_key"));
        assert!(!failure.is_unique("slots_day_start_time_end_time_key"));
        assert!(!failure.is_foreign_key("units_code_key"));
    }
}
