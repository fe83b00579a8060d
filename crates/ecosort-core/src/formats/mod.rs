//! # Formats Module
//!
//! Binary encoding for impact ledger records.
//!
//! This module only converts between [`RecycledItem`](crate::RecycledItem)
//! values and bytes (postcard + header). Reading and writing the ledger file
//! is done in [`storage`](crate::storage).

mod record;

pub use record::*;
