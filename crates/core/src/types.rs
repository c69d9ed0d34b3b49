/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A calendar date in the user's local time zone, resolved when the entry
/// was created.
pub type LocalDate = chrono::NaiveDate;
