//! JSON file and in-memory record stores.
//!
//! On disk the document maps owner ids to arrays of record objects:
//!
//! ```json
//! { "123": [ { "uuid": "...", "status": "ausstehend", ... } ] }
//! ```

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::fs::write_json;
use crate::{PersonRecord, RecordStore, StoreError, StoreResult};

/// Owner id -> array of record objects, in file order.
#[derive(Debug, Clone, Default)]
struct RecordTable {
    owners: Map<String, Value>,
}

fn uuid_of(value: &Value) -> Option<&str> {
    value.get("uuid").and_then(Value::as_str)
}

/// Parse the on-disk document; every owner must map to an array.
fn parse_owners(path: &Path, content: &[u8]) -> StoreResult<Map<String, Value>> {
    let corrupt = |reason: String| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };
    let owners: Map<String, Value> =
        serde_json::from_slice(content).map_err(|e| corrupt(e.to_string()))?;
    if let Some((owner_id, _)) = owners.iter().find(|(_, records)| !records.is_array()) {
        return Err(corrupt(format!("records of owner {} are not an array", owner_id)));
    }
    Ok(owners)
}

/// Give records without a uuid a stable one so they can be addressed.
fn assign_missing_ids(owners: &mut Map<String, Value>) -> usize {
    let mut assigned = 0;
    for record in owners.values_mut().filter_map(Value::as_array_mut).flatten() {
        let Some(object) = record.as_object_mut() else {
            continue;
        };
        let has_id = object
            .get("uuid")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            let id = uuid::Uuid::new_v4().to_string();
            object
                .entry("nick")
                .or_insert_with(|| Value::String(id.clone()));
            object.insert("uuid".into(), Value::String(id));
            assigned += 1;
        }
    }
    assigned
}

impl RecordTable {
    fn records(&self, owner_id: &str) -> Option<&Vec<Value>> {
        self.owners.get(owner_id).and_then(Value::as_array)
    }

    fn records_mut(&mut self, owner_id: &str) -> Option<&mut Vec<Value>> {
        self.owners.get_mut(owner_id).and_then(Value::as_array_mut)
    }

    fn add(&mut self, owner_id: &str, record: &PersonRecord) -> StoreResult<String> {
        let value = record.to_value()?;
        let slot = self
            .owners
            .entry(owner_id)
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(records) => records.push(value),
            other => *other = Value::Array(vec![value]),
        }
        Ok(record.uuid.clone())
    }

    fn delete(&mut self, owner_id: &str, id: &str) -> bool {
        let Some(records) = self.records_mut(owner_id) else {
            return false;
        };
        let before = records.len();
        records.retain(|r| uuid_of(r) != Some(id));
        records.len() != before
    }

    fn update(&mut self, owner_id: &str, id: &str, patch: &Value) -> StoreResult<bool> {
        let patch = patch.as_object().ok_or(StoreError::InvalidPatch)?;
        let Some(slot) = self
            .records_mut(owner_id)
            .and_then(|records| records.iter_mut().find(|r| uuid_of(r) == Some(id)))
        else {
            return Ok(false);
        };

        let mut merged = slot.clone();
        if let Some(object) = merged.as_object_mut() {
            for (key, value) in patch {
                object.insert(key.clone(), value.clone());
            }
        }
        // Reject patches that would leave an unreadable record behind.
        serde_json::from_value::<PersonRecord>(merged.clone())?;

        *slot = merged;
        Ok(true)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<PersonRecord>> {
        self.owners
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .find(|r| uuid_of(r) == Some(id))
            .map(|r| PersonRecord::from_value(r.clone()))
            .transpose()
    }

    fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<PersonRecord>> {
        self.records(owner_id)
            .map(|records| {
                records
                    .iter()
                    .map(|r| PersonRecord::from_value(r.clone()))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn count(&self, owner_id: &str) -> usize {
        self.records(owner_id).map_or(0, Vec::len)
    }
}

/// Record store persisted to a single JSON document.
///
/// Every mutation rewrites the whole file atomically. A failed write leaves
/// both the file and the in-memory state unchanged.
#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
    table: Mutex<RecordTable>,
}

impl JsonRecordStore {
    /// Open the store at `path`, creating an empty `{}` document if missing.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let table = if path.exists() {
            let content = std::fs::read(&path)?;
            let mut owners = if content.iter().all(u8::is_ascii_whitespace) {
                Map::new()
            } else {
                parse_owners(&path, &content)?
            };
            let assigned = assign_missing_ids(&mut owners);
            if assigned > 0 {
                write_json(&path, &owners)?;
                info!(path = %path.display(), assigned, "Assigned ids to records without one");
            }
            RecordTable { owners }
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let table = RecordTable::default();
            write_json(&path, &table.owners)?;
            info!(path = %path.display(), "Created empty record store");
            table
        };

        debug!(
            path = %path.display(),
            owners = table.owners.len(),
            "Record store opened"
        );

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut RecordTable) -> StoreResult<(T, bool)>,
    ) -> StoreResult<T> {
        let mut table = self.table.lock();
        let mut next = table.clone();
        let (out, changed) = op(&mut next)?;
        if changed {
            write_json(&self.path, &next.owners)?;
            *table = next;
        }
        Ok(out)
    }
}

impl RecordStore for JsonRecordStore {
    fn add_record(&self, owner_id: &str, record: PersonRecord) -> StoreResult<String> {
        let id = self.mutate(|t| Ok((t.add(owner_id, &record)?, true)))?;
        debug!(owner_id, id = %id, "Record added");
        Ok(id)
    }

    fn delete_record(&self, owner_id: &str, id: &str) -> StoreResult<bool> {
        let removed = self.mutate(|t| {
            let removed = t.delete(owner_id, id);
            Ok((removed, removed))
        })?;
        debug!(owner_id, id, removed, "Record delete");
        Ok(removed)
    }

    fn update_record(&self, owner_id: &str, id: &str, patch: &Value) -> StoreResult<bool> {
        self.mutate(|t| {
            let updated = t.update(owner_id, id, patch)?;
            Ok((updated, updated))
        })
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<PersonRecord>> {
        self.table.lock().find_by_id(id)
    }

    fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<PersonRecord>> {
        self.table.lock().find_by_owner(owner_id)
    }

    fn count_by_owner(&self, owner_id: &str) -> StoreResult<usize> {
        Ok(self.table.lock().count(owner_id))
    }
}

/// Record store without a backing file.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    table: Mutex<RecordTable>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn add_record(&self, owner_id: &str, record: PersonRecord) -> StoreResult<String> {
        self.table.lock().add(owner_id, &record)
    }

    fn delete_record(&self, owner_id: &str, id: &str) -> StoreResult<bool> {
        Ok(self.table.lock().delete(owner_id, id))
    }

    fn update_record(&self, owner_id: &str, id: &str, patch: &Value) -> StoreResult<bool> {
        self.table.lock().update(owner_id, id, patch)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<PersonRecord>> {
        self.table.lock().find_by_id(id)
    }

    fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<PersonRecord>> {
        self.table.lock().find_by_owner(owner_id)
    }

    fn count_by_owner(&self, owner_id: &str) -> StoreResult<usize> {
        Ok(self.table.lock().count(owner_id))
    }
}
