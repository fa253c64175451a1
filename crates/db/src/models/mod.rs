//! Domain model structs and DTOs.
//!
//! Each submodule holds the `FromRow` + `Serialize` row structs for its
//! tables plus the `Deserialize` DTOs used to write them.

pub mod attendance;
pub mod batch;
pub mod enrollment;
pub mod session;
pub mod student;
pub mod wallet;
