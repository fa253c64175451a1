/// Primary keys are PostgreSQL BIGINT / BIGSERIAL.
pub type DbId = i64;

/// All instants are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Wallet balances and tariffs, in whole currency units.
pub type Credits = i64;
