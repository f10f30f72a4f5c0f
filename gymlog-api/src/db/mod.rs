//! SQL query layer
//!
//! Single-statement functions accept any executor (pool or transaction).
//! Functions issuing several statements take `&mut SqliteConnection` and are
//! called with a transaction that the handler commits.

pub mod calendar;
pub mod exercises;
pub mod import;
pub mod ordering;
pub mod plans;
pub mod sessions;
pub mod templates;
