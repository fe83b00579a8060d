//! redb-backed impact ledger.
//!
//! One table, `recycled_items`, maps a monotonically increasing `u64` id to a
//! record encoded by [`formats::encode_record`](crate::formats::encode_record).

use crate::classification::Category;
use crate::formats::{FormatError, decode_record, encode_record};
use crate::impact::{ImpactReport, RecycledItem};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const ITEMS: TableDefinition<u64, &[u8]> = TableDefinition::new("recycled_items");

/// Ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger database: {0}")]
    Database(#[from] redb::Error),

    #[error("ledger record {id}: {source}")]
    Record { id: u64, source: FormatError },

    #[error("encoding record: {0}")]
    Encode(#[from] FormatError),
}

macro_rules! redb_error_into_ledger {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for LedgerError {
                fn from(e: $ty) -> Self {
                    LedgerError::Database(redb::Error::from(e))
                }
            }
        )*
    };
}

redb_error_into_ledger!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Append-only log of recycled items.
pub struct ImpactLedger {
    db: Database,
}

impl std::fmt::Debug for ImpactLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactLedger").finish_non_exhaustive()
    }
}

impl ImpactLedger {
    /// Open the ledger at `path`, creating the file and table if needed.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _table = txn.open_table(ITEMS)?;
        }
        txn.commit()?;

        Ok(Self { db })
    }

    /// Append an item. Returns its id.
    pub fn record(&self, item: &RecycledItem) -> Result<u64, LedgerError> {
        let bytes = encode_record(item)?;

        let txn = self.db.begin_write()?;
        let id = {
            let mut table = txn.open_table(ITEMS)?;
            let next = match table.last()? {
                Some((key, _)) => key.value().saturating_add(1),
                None => 0,
            };
            table.insert(next, bytes.as_slice())?;
            next
        };
        txn.commit()?;

        Ok(id)
    }

    /// Number of recorded items.
    pub fn count(&self) -> Result<u64, LedgerError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ITEMS)?;
        Ok(table.len()?)
    }

    /// All items in recording order.
    pub fn items(&self) -> Result<Vec<(u64, RecycledItem)>, LedgerError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ITEMS)?;

        let mut items = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let id = key.value();
            let item = decode_record(value.value())
                .map_err(|source| LedgerError::Record { id, source })?;
            items.push((id, item));
        }
        Ok(items)
    }

    /// Recorded items per category.
    pub fn category_counts(&self) -> Result<BTreeMap<Category, u64>, LedgerError> {
        let mut counts = BTreeMap::new();
        for (_, item) in self.items()? {
            *counts.entry(item.category).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// The impact report for everything recorded so far.
    pub fn report(&self) -> Result<ImpactReport, LedgerError> {
        Ok(ImpactReport::from_counts(self.category_counts()?))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use tempfile::TempDir;

    fn ledger() -> (TempDir, ImpactLedger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ImpactLedger::open(&dir.path().join("impact.redb")).unwrap();
        (dir, ledger)
    }

    #[test]
    fn empty_ledger_reports_zero() {
        let (_dir, ledger) = ledger();
        assert_eq!(ledger.count().unwrap(), 0);
        assert!(ledger.items().unwrap().is_empty());
        assert_eq!(ledger.report().unwrap().stats.items_recycled, 0);
    }

    #[test]
    fn ids_increase_from_zero() {
        let (_dir, ledger) = ledger();
        let a = ledger
            .record(&RecycledItem::new(Category::Batteries, "AA cell", 1))
            .unwrap();
        let b = ledger
            .record(&RecycledItem::new(Category::Metals, "Copper wire", 2))
            .unwrap();
        assert_eq!((a, b), (0, 1));

        let items = ledger.items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].1.item, "Copper wire");
    }

    #[test]
    fn counts_by_category() {
        let (_dir, ledger) = ledger();
        for name in ["AA", "AAA", "9V"] {
            ledger
                .record(&RecycledItem::new(Category::Batteries, name, 0))
                .unwrap();
        }
        ledger
            .record(&RecycledItem::new(Category::Displays, "CRT", 0))
            .unwrap();

        let counts = ledger.category_counts().unwrap();
        assert_eq!(counts.get(&Category::Batteries), Some(&3));
        assert_eq!(counts.get(&Category::Displays), Some(&1));
        assert_eq!(ledger.report().unwrap().stats.items_recycled, 4);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impact.redb");
        {
            let ledger = ImpactLedger::open(&path).unwrap();
            ledger
                .record(&RecycledItem::new(Category::Plastics, "Casing", 5))
                .unwrap();
        }
        let ledger = ImpactLedger::open(&path).unwrap();
        assert_eq!(ledger.count().unwrap(), 1);
        let next = ledger
            .record(&RecycledItem::new(Category::Plastics, "Cable", 6))
            .unwrap();
        assert_eq!(next, 1);
    }
}
