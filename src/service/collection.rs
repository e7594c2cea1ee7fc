//! Typed access to whole-collection blobs.

use crate::auth::Credential;
use crate::error::{StorageError, StorageResult};
use crate::storage::{keys, KeyValueStore};
use crate::types::{
    Project, ProjectId, ScanId, ScanResult, User, UserId, Vulnerability, VulnerabilityId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record type persisted as one JSON array under a fixed key.
pub(crate) trait Record: Serialize + DeserializeOwned + Clone {
    type Id: PartialEq + std::fmt::Display;

    /// Key the collection is stored under.
    const KEY: &'static str;

    fn id(&self) -> &Self::Id;
}

impl Record for User {
    type Id = UserId;
    const KEY: &'static str = keys::USERS;

    fn id(&self) -> &UserId {
        &self.id
    }
}

impl Record for Project {
    type Id = ProjectId;
    const KEY: &'static str = keys::PROJECTS;

    fn id(&self) -> &ProjectId {
        &self.id
    }
}

impl Record for Vulnerability {
    type Id = VulnerabilityId;
    const KEY: &'static str = keys::VULNERABILITIES;

    fn id(&self) -> &VulnerabilityId {
        &self.id
    }
}

impl Record for ScanResult {
    type Id = ScanId;
    const KEY: &'static str = keys::SCANS;

    fn id(&self) -> &ScanId {
        &self.id
    }
}

impl Record for Credential {
    type Id = UserId;
    const KEY: &'static str = keys::CREDENTIALS;

    fn id(&self) -> &UserId {
        &self.user_id
    }
}

/// Load a whole collection. A missing key reads as empty.
pub(crate) fn load<T: Record>(store: &dyn KeyValueStore) -> StorageResult<Vec<T>> {
    match store.get(T::KEY)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: T::KEY.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

/// Replace a whole collection.
pub(crate) fn save<T: Record>(store: &dyn KeyValueStore, records: &[T]) -> StorageResult<()> {
    let raw = serde_json::to_string(records)?;
    store.set(T::KEY, &raw)
}

/// Append one record and write the collection back.
pub(crate) fn append<T: Record>(store: &dyn KeyValueStore, record: T) -> StorageResult<T> {
    let mut records = load::<T>(store)?;
    records.push(record.clone());
    save(store, &records)?;
    Ok(record)
}

/// Find one record by id.
pub(crate) fn find<T: Record>(store: &dyn KeyValueStore, id: &T::Id) -> StorageResult<Option<T>> {
    Ok(load::<T>(store)?.into_iter().find(|r| r.id() == id))
}

/// Apply `change` to the record with `id`. Returns `None` and writes
/// nothing if no such record exists.
pub(crate) fn modify<T, F>(store: &dyn KeyValueStore, id: &T::Id, change: F) -> StorageResult<Option<T>>
where
    T: Record,
    F: FnOnce(&mut T),
{
    let mut records = load::<T>(store)?;
    let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
        return Ok(None);
    };

    change(record);
    let updated = record.clone();
    save(store, &records)?;
    Ok(Some(updated))
}

/// Drop every record with `id` and write the collection back.
pub(crate) fn remove<T: Record>(store: &dyn KeyValueStore, id: &T::Id) -> StorageResult<usize> {
    let mut records = load::<T>(store)?;
    let before = records.len();
    records.retain(|r| r.id() != id);
    save(store, &records)?;
    Ok(before - records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::NewProject;

    #[test]
    fn test_missing_key_loads_empty() {
        let store = MemoryStore::new();
        assert!(load::<Project>(&store).unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = MemoryStore::new();
        let a = append(&store, NewProject::named("a").into_project()).unwrap();
        let b = append(&store, NewProject::named("b").into_project()).unwrap();

        let ids: Vec<_> = load::<Project>(&store).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_modify_missing_writes_nothing() {
        let store = MemoryStore::new();
        let result = modify::<Project, _>(&store, &ProjectId::from("nope"), |p| p.name.clear());
        assert!(result.unwrap().is_none());
        assert!(store.get(keys::PROJECTS).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_collection_is_reported() {
        let store = MemoryStore::new();
        store.set(keys::SCANS, "{not json").unwrap();
        assert!(matches!(
            load::<ScanResult>(&store),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
