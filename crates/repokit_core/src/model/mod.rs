//! Record contracts shared by every repository binding.
//!
//! # Responsibility
//! - Define what a bound record type must expose to the repository.
//! - Provide the field map used for mass assignment and persistence.
//! - Declare optional record capabilities (sorting, generated keys).
//!
//! # Invariants
//! - A record is identified by exactly one `RecordKey` once persisted.
//! - Only columns listed in `Record::FILLABLE` are ever written.

pub mod capability;
pub mod field;
pub mod record;
