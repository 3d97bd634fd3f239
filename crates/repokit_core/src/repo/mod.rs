//! Repository layer: the generic model repository and its inputs/outputs.
//!
//! # Responsibility
//! - Define the get/index/save/delete contract over one bound record type.
//! - Isolate SQLite query details from application code.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`InvalidModel`,
//!   `InvalidPayload`) in addition to DB transport errors.

pub mod error;
pub mod model_repo;
pub mod page;
pub mod payload;
pub mod target;
