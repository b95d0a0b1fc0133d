//! Account registry over the durable key-value store
//!
//! The registry reads and writes the whole account collection as one JSON
//! array. It does not enforce email uniqueness on `append`; callers check
//! `exists_by_email` first. Two contexts sharing a store can both pass that
//! check before either writes.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError, USERS_KEY};

use super::model::Account;

/// Raw contents of the account key
enum StoredRecords {
    Absent,
    /// The value is not a JSON array
    Corrupt,
    Records(Vec<Value>),
}

pub struct AccountRegistry {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, USERS_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read every stored account in stored order.
    ///
    /// An absent or unparsable value yields an empty collection, and a
    /// single unparsable record is skipped; only a failing store is
    /// reported as an error.
    pub fn load_all(&self) -> Result<Vec<Account>, StorageError> {
        let records = match self.load_records()? {
            StoredRecords::Absent | StoredRecords::Corrupt => return Ok(Vec::new()),
            StoredRecords::Records(records) => records,
        };

        Ok(records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Account>(record) {
                Ok(account) => Some(account),
                Err(e) => {
                    warn!(
                        "Skipping unparsable account record {} under key {}: {}",
                        index, self.key, e
                    );
                    None
                }
            })
            .collect())
    }

    /// Overwrite the stored collection in a single write
    pub fn save_all(&self, accounts: &[Account]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(accounts)?;
        self.store.set(&self.key, &raw)?;
        debug!("Saved {} accounts", accounts.len());
        Ok(())
    }

    /// First account matching both email and password exactly
    pub fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, StorageError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|account| account.matches_credentials(email, password)))
    }

    /// True if any stored record carries this email, including records that
    /// are otherwise unparsable
    pub fn exists_by_email(&self, email: &str) -> Result<bool, StorageError> {
        let StoredRecords::Records(records) = self.load_records()? else {
            return Ok(false);
        };
        Ok(records
            .iter()
            .any(|record| record.get("email").and_then(Value::as_str) == Some(email)))
    }

    /// Read all, push `account`, write all back.
    ///
    /// Records that do not parse as accounts are written back untouched. A
    /// stored value that is not a JSON array is never overwritten.
    pub fn append(&self, account: Account) -> Result<(), StorageError> {
        let mut records = match self.load_records()? {
            StoredRecords::Absent => Vec::new(),
            StoredRecords::Records(records) => records,
            StoredRecords::Corrupt => return Err(StorageError::Corrupt(self.key.clone())),
        };
        records.push(serde_json::to_value(account)?);
        self.save_records(&records)
    }

    /// Remove the account with `id`, leaving every other record untouched.
    /// Used to undo an `append` whose registration could not complete.
    pub(crate) fn retract(&self, id: &str) -> Result<(), StorageError> {
        let StoredRecords::Records(mut records) = self.load_records()? else {
            return Ok(());
        };
        let before = records.len();
        records.retain(|record| record.get("id").and_then(Value::as_str) != Some(id));
        if records.len() != before {
            self.save_records(&records)?;
        }
        Ok(())
    }

    fn load_records(&self) -> Result<StoredRecords, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(StoredRecords::Absent);
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(StoredRecords::Records(records)),
            Err(e) => {
                warn!(
                    "Ignoring unparsable account collection under key {}: {}",
                    self.key, e
                );
                Ok(StoredRecords::Corrupt)
            }
        }
    }

    fn save_records(&self, records: &[Value]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        self.store.set(&self.key, &raw)?;
        debug!("Saved {} account records", records.len());
        Ok(())
    }

    /// Number of stored accounts
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.load_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn registry() -> (AccountRegistry, MemoryStore) {
        let store = MemoryStore::new();
        (AccountRegistry::new(Arc::new(store.clone())), store)
    }

    #[test]
    fn test_load_all_absent_is_empty() {
        let (registry, _) = registry();
        assert!(registry.load_all().unwrap().is_empty());
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn test_load_all_corrupt_is_empty() {
        let (registry, store) = registry();
        store.set(USERS_KEY, "{not json").unwrap();
        assert!(registry.load_all().unwrap().is_empty());

        store.set(USERS_KEY, r#"{"id":"1"}"#).unwrap();
        assert!(registry.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let (registry, store) = registry();
        registry
            .append(Account::new("A", "a@x.com", "pw1"))
            .unwrap();
        registry
            .append(Account::new("B", "b@x.com", "pw2"))
            .unwrap();

        let accounts = registry.load_all().unwrap();
        let emails: Vec<_> = accounts.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, ["a@x.com", "b@x.com"]);

        // Stored as a JSON array under the users key
        let raw = store.get(USERS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_exists_by_email_is_case_sensitive() {
        let (registry, _) = registry();
        registry
            .append(Account::new("A", "a@x.com", "pw"))
            .unwrap();

        assert!(registry.exists_by_email("a@x.com").unwrap());
        assert!(!registry.exists_by_email("A@x.com").unwrap());
        assert!(!registry.exists_by_email("b@x.com").unwrap());
    }

    #[test]
    fn test_find_by_credentials_returns_first_match() {
        let (registry, _) = registry();
        let first = Account::new("First", "dup@x.com", "pw");
        let second = Account::new("Second", "dup@x.com", "pw");
        // append does not enforce uniqueness
        registry
            .save_all(&[first.clone(), second])
            .unwrap();

        let found = registry.find_by_credentials("dup@x.com", "pw").unwrap();
        assert_eq!(found, Some(first));
        assert_eq!(registry.len().unwrap(), 2);
    }

    #[test]
    fn test_find_by_credentials_requires_both_fields() {
        let (registry, _) = registry();
        registry
            .append(Account::new("A", "a@x.com", "pw"))
            .unwrap();

        assert!(registry.find_by_credentials("a@x.com", "pw").unwrap().is_some());
        assert!(registry.find_by_credentials("a@x.com", "nope").unwrap().is_none());
        assert!(registry.find_by_credentials("b@x.com", "pw").unwrap().is_none());
    }

    #[test]
    fn test_save_all_overwrites() {
        let (registry, _) = registry();
        registry
            .append(Account::new("A", "a@x.com", "pw"))
            .unwrap();
        registry.save_all(&[]).unwrap();
        assert!(registry.is_empty().unwrap());
    }

    #[test]
    fn test_mixed_validity_records_are_preserved() {
        let (registry, store) = registry();
        store
            .set(
                USERS_KEY,
                r#"[
                    {"id":"1","name":"Bob","email":"bob@pet.com","password":"pw","createdAt":"2024-06-10T08:00:00.000Z"},
                    {"id":"2","name":"Cat","email":"cat@pet.com","password":"pw","createdAt":"2024-06-10"},
                    {"id":"3","email":"dog@pet.com"}
                ]"#,
            )
            .unwrap();

        let accounts = registry.load_all().unwrap();
        let names: Vec<_> = accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Cat"]);

        assert!(registry.find_by_credentials("bob@pet.com", "pw").unwrap().is_some());
        assert!(registry.exists_by_email("cat@pet.com").unwrap());
        // The incomplete record still reserves its email
        assert!(registry.exists_by_email("dog@pet.com").unwrap());

        registry
            .append(Account::new("New", "new@pet.com", "pw"))
            .unwrap();

        let raw = store.get(USERS_KEY).unwrap().unwrap();
        let records: Vec<Value> = serde_json::from_str(&raw).unwrap();
        let emails: Vec<_> = records
            .iter()
            .map(|r| r["email"].as_str().unwrap())
            .collect();
        assert_eq!(
            emails,
            ["bob@pet.com", "cat@pet.com", "dog@pet.com", "new@pet.com"]
        );
        assert_eq!(records[1]["createdAt"], "2024-06-10");
    }

    #[test]
    fn test_append_never_overwrites_corrupt_value() {
        let (registry, store) = registry();
        store.set(USERS_KEY, "{not json").unwrap();

        let result = registry.append(Account::new("A", "a@x.com", "pw"));
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
        assert_eq!(
            store.get(USERS_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_retract_removes_only_matching_id() {
        let (registry, _) = registry();
        let keep = Account::new("Keep", "keep@x.com", "pw");
        let gone = Account::new("Gone", "gone@x.com", "pw");
        registry.append(keep.clone()).unwrap();
        registry.append(gone.clone()).unwrap();

        registry.retract(&gone.id).unwrap();
        assert_eq!(registry.load_all().unwrap(), vec![keep]);

        // Unknown ids and absent collections are no-ops
        registry.retract("missing").unwrap();
        registry.save_all(&[]).unwrap();
        registry.retract(&gone.id).unwrap();
    }

    #[test]
    fn test_custom_key() {
        let store = MemoryStore::new();
        let registry = AccountRegistry::with_key(Arc::new(store.clone()), "clinic_users");
        registry
            .append(Account::new("A", "a@x.com", "pw"))
            .unwrap();

        assert!(store.get("clinic_users").unwrap().is_some());
        assert!(store.get(USERS_KEY).unwrap().is_none());
    }
}
