//! Persistent key-value storage.
//!
//! Every execution context treats the store as the single source of truth and
//! its own copy of any value as a cache. Values are JSON documents addressed
//! by the key names in [`keys`].

mod config;
pub mod database;
pub mod keys;
mod memory;

pub use config::{BlockingConfig, Config, LoggingConfig, TimerConfig, TrackingConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, StoreError};

/// Returns the data directory.
///
/// `DEEPFOCUS_DATA_DIR` wins when set. Otherwise `~/.config/deepfocus[-dev]/`
/// based on `DEEPFOCUS_ENV` (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DEEPFOCUS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DEEPFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("deepfocus-dev")
            } else {
                base_dir.join("deepfocus")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Read-modify-write callback handed to [`Store::update`].
pub type UpdateFn<'a> = dyn FnMut(Option<Value>) -> Result<Value, StoreError> + 'a;

/// Asynchronous-in-spirit key-value store shared by all contexts.
///
/// Implementations must make `set_many` and `update` atomic with respect to
/// other callers of the same store.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set_many(&self, entries: &[(&str, Value)]) -> Result<(), StoreError>;

    fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Transactional read-modify-write of a single key.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<Value, StoreError>;

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }
}

/// Typed helpers over [`Store`].
pub trait StoreExt: Store {
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| corrupt(key, e)),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value).map_err(|e| corrupt(key, e))?;
        self.set(key, json)
    }

    /// Atomically load `key` (or `init()` when absent), apply `f`, store the
    /// result and return it.
    fn modify_with<T, I, F>(&self, key: &str, init: I, f: F) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned,
        I: FnOnce() -> T,
        F: FnOnce(&mut T),
    {
        let mut init = Some(init);
        let mut f = Some(f);
        let mut out: Option<T> = None;

        self.update(key, &mut |current| {
            let mut value: T = match current {
                Some(Value::Null) | None => match init.take() {
                    Some(init) => init(),
                    None => return Err(corrupt_msg(key, "update callback re-entered")),
                },
                Some(json) => serde_json::from_value(json).map_err(|e| corrupt(key, e))?,
            };
            if let Some(f) = f.take() {
                f(&mut value);
            }
            let json = serde_json::to_value(&value).map_err(|e| corrupt(key, e))?;
            out = Some(value);
            Ok(json)
        })?;

        out.ok_or_else(|| corrupt_msg(key, "update callback never ran"))
    }

    fn modify<T, F>(&self, key: &str, f: F) -> Result<T, StoreError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T),
    {
        self.modify_with(key, T::default, f)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn corrupt(key: &str, err: serde_json::Error) -> StoreError {
    corrupt_msg(key, &err.to_string())
}

fn corrupt_msg(key: &str, message: &str) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        message: message.to_string(),
    }
}
