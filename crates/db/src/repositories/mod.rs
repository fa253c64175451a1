//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement writes run in a
//! single transaction.

pub mod attendance_repo;
pub mod batch_repo;
pub mod enrollment_repo;
pub mod session_repo;
pub mod student_repo;
pub mod wallet_repo;

pub use attendance_repo::AttendanceRepo;
pub use batch_repo::BatchRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use session_repo::SessionRepo;
pub use student_repo::StudentRepo;
pub use wallet_repo::WalletRepo;

/// Surface a stored value that fails domain parsing as a decode error.
pub(crate) fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}
