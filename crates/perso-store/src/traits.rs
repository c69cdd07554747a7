//! Record store trait definitions.

use serde_json::{json, Value};

use crate::{PersonRecord, Status, StoreError, StoreResult};

/// Maximum number of records one owner may hold.
pub const MAX_RECORDS_PER_OWNER: usize = 2;

/// Keyed CRUD over person records grouped by owner id.
pub trait RecordStore: Send + Sync {
    /// Append a record for `owner_id` and return its uuid.
    fn add_record(&self, owner_id: &str, record: PersonRecord) -> StoreResult<String>;

    /// Remove a record. Returns whether something was removed.
    fn delete_record(&self, owner_id: &str, id: &str) -> StoreResult<bool>;

    /// Shallow-merge a JSON object into a stored record.
    /// Returns false if the record does not exist.
    fn update_record(&self, owner_id: &str, id: &str, patch: &Value) -> StoreResult<bool>;

    /// Look a record up by uuid across all owners.
    fn find_by_id(&self, id: &str) -> StoreResult<Option<PersonRecord>>;

    /// All records of an owner, in insertion order.
    fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<PersonRecord>>;

    fn count_by_owner(&self, owner_id: &str) -> StoreResult<usize> {
        Ok(self.find_by_owner(owner_id)?.len())
    }

    fn set_status(&self, owner_id: &str, id: &str, status: Status) -> StoreResult<bool> {
        self.update_record(owner_id, id, &json!({ "status": status }))
    }
}

/// Fail with [`StoreError::CapacityExceeded`] when the owner is at the limit.
pub fn ensure_capacity<S: RecordStore + ?Sized>(store: &S, owner_id: &str) -> StoreResult<()> {
    if store.count_by_owner(owner_id)? >= MAX_RECORDS_PER_OWNER {
        return Err(StoreError::CapacityExceeded {
            owner_id: owner_id.to_string(),
            max: MAX_RECORDS_PER_OWNER,
        });
    }
    Ok(())
}
