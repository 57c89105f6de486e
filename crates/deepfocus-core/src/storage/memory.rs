use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{Store, UpdateFn};
use crate::error::StoreError;

/// In-process store. Used by tests and by embedders that bring their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>, StoreError> {
        self.values.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StoreError> {
        let mut values = self.lock()?;
        for (key, value) in entries {
            values.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut values = self.lock()?;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Value, StoreError> {
        let mut values = self.lock()?;
        let next = f(values.get(key).cloned())?;
        values.insert(key.to_string(), next.clone());
        Ok(next)
    }
}
