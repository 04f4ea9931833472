//! Snapshot storage trait.

use crate::StoreError;

/// Key-value storage for serialized ledger state.
///
/// Values are opaque bytes: the ledger encodes its own snapshot, so a
/// backend never depends on the ledger crate.
pub trait LedgerStore {
    /// Retrieve a value, or `None` if the key was never written.
    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store a value, replacing any previous one.
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn delete_meta(&self, key: &[u8]) -> Result<(), StoreError>;
}
