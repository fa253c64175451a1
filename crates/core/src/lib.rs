//! Domain logic for the batch attendance and credit ledger service.
//!
//! This crate has no internal dependencies and performs no I/O so the rules
//! it encodes can be shared by the persistence layer, the HTTP layer and
//! their tests.
//!
//! - [`batch`] -- batch modes, lifecycle statuses, generated batch codes.
//! - [`schedule`] -- 12-hour time parsing and the connection-info gate.
//! - [`ledger`] -- attendance transitions and dual-bucket wallet arithmetic.
//! - [`facts`] -- payloads consumed from onboarding and payment collaborators.

pub mod batch;
pub mod error;
pub mod facts;
pub mod ledger;
pub mod roles;
pub mod schedule;
pub mod types;
