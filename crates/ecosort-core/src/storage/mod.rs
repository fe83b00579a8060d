//! # Storage Module
//!
//! Persistent impact ledger using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions (a recorded item is either fully written or absent)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (the API can read reports while the CLI appends)

mod redb_ledger;

pub use redb_ledger::{ImpactLedger, LedgerError};
