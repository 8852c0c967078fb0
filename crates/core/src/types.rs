/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar date used for parameter-value effective dates and as-of dates.
pub type EffectiveDate = chrono::NaiveDate;
