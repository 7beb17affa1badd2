use hashbrown::HashMap;

use crate::*;

/// String key-value storage provided by the host, such as browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError>;
}

pub trait StorageKey {
    const KEY: &'static str;
}

impl StorageKey for HighScore {
    const KEY: &'static str = "prime-path:high-score";
}

impl HighScore {
    /// Reads the persisted best score, `None` when it is absent or unreadable.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Option<Self> {
        let raw = match store.get(Self::KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("Could not read high score: {}", err);
                return None;
            }
        };

        match raw.trim().parse::<Score>() {
            Ok(best) => Some(Self::new(best)),
            Err(_) => {
                let err = StoreError::Malformed {
                    key: Self::KEY.into(),
                    value: raw,
                };
                log::warn!("Ignoring stored high score: {}", err);
                None
            }
        }
    }

    /// Persists the best score, failures are logged and reported as `false`.
    pub fn save<S: KeyValueStore + ?Sized>(self, store: &mut S) -> bool {
        match store.set(Self::KEY, &self.get().to_string()) {
            Ok(()) => true,
            Err(err) => {
                log::error!("Could not save high score: {:?}", err);
                false
            }
        }
    }
}

/// In-memory store, handy for tests and hosts without persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    available: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            available: true,
        }
    }

    /// A store that fails every read and write.
    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            available: false,
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    fn check_available(&self) -> core::result::Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disabled".into()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError> {
        self.check_available()?;
        self.entries.insert(key.into(), value.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_is_none() {
        assert_eq!(HighScore::load(&MemoryStore::new()), None);
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();

        assert!(HighScore::new(742).save(&mut store));
        assert_eq!(store.get(HighScore::KEY), Ok(Some("742".into())));
        assert_eq!(HighScore::load(&store), Some(HighScore::new(742)));
    }

    #[test]
    fn malformed_value_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(HighScore::KEY, "lots").unwrap();

        assert_eq!(HighScore::load(&store), None);
    }

    #[test]
    fn unavailable_store_degrades() {
        let mut store = MemoryStore::unavailable();

        assert_eq!(HighScore::load(&store), None);
        assert!(!HighScore::new(10).save(&mut store));

        store.set_available(true);
        assert!(HighScore::new(10).save(&mut store));
        assert_eq!(HighScore::load(&store), Some(HighScore::new(10)));
    }
}
