//! Storage Module
//!
//! Key-value persistence for session state. The dashboard used to keep
//! favorites, the comparison set and notifications in browser local
//! storage; here that medium sits behind the [`KeyValueStore`] trait.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;

// == Key Value Store ==
/// A string-keyed store of JSON documents. Writes are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Reads `key` as a `T`, falling back to `default` when the key is absent
/// or the stored document no longer matches the expected shape.
pub fn load<T, S>(store: &S, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|error| {
            warn!(key, %error, "stored value has unexpected shape, using default");
            default
        }),
        Ok(None) => default,
        Err(error) => {
            warn!(key, %error, "failed to read from store, using default");
            default
        }
    }
}

/// Serializes `value` and writes it under `key`.
pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    store.set(key, serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        email: bool,
    }

    #[test]
    fn test_load_missing_returns_default() {
        let store = MemoryStore::new();
        let prefs = load(&store, "prefs", Prefs { email: true });
        assert_eq!(prefs, Prefs { email: true });
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        save(&mut store, "prefs", &Prefs { email: false }).unwrap();

        assert_eq!(load(&store, "prefs", Prefs { email: true }), Prefs { email: false });
    }

    #[test]
    fn test_load_wrong_shape_returns_default() {
        let mut store = MemoryStore::new();
        store.set("prefs", Value::from("not an object")).unwrap();

        assert_eq!(load(&store, "prefs", Prefs { email: true }), Prefs { email: true });
    }

    #[test]
    fn test_trait_object_usage() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        save(&mut *store, "ids", &[1, 2, 3]).unwrap();

        let ids: Vec<u32> = load(&*store, "ids", Vec::new());
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
