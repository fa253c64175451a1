//! Well-known role names carried in the principal's `role` claim.
//!
//! Must match the roles issued by the identity service.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_PARENT: &str = "parent";

/// Roles allowed to operate on schedules and attendance.
pub fn is_staff(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_TEACHER
}
