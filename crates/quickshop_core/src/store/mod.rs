//! Store layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-store contract consumed by membership services.
//! - Isolate SQLite query and transaction details from business
//!   orchestration.
//!
//! # Invariants
//! - List documents are mutated only through transactional read-modify-write;
//!   there is no unguarded read-then-write path.
//! - Reads must reject invalid persisted state instead of masking it.

pub mod membership_store;
