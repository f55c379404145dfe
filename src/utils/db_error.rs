/// Name of the partial unique index on live `full_url` values.
pub const LIVE_URL_CONSTRAINT: &str = "storage_full_url_live_key";

/// Returns `true` if `e` is a unique violation of `constraint`.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}
