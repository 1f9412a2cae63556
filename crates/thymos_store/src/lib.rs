//! In-memory store backing the Thymos engines.
//!
//! `MemoryStore` implements every collaborator contract from
//! `thymos_core`. Timeline mutations serialize through one owned mutex:
//! [`thymos_core::TimelineStore::begin`] hands the caller the guard, so a
//! whole read–check–write sequence runs against state no concurrent
//! mutation can move. That lock IS the transaction boundary the
//! consistency engine's contract asks for; engines validate before their
//! single write, so no rollback path is needed here.
//!
//! Persistence technology proper is outside this workspace — a production
//! deployment would put a database behind the same traits.

pub mod memory;

pub use memory::MemoryStore;
