use std::sync::{Arc, Mutex};

use super::{
    errors::{CrmError, Result},
    store::CrmStore,
};

/// Cloneable handle that serializes every access to one [`CrmStore`].
///
/// One writer at a time for the whole store: two edits of the same
/// subscription can never interleave.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<CrmStore>>,
}

impl SharedStore {
    pub fn new(store: CrmStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&CrmStore) -> R) -> Result<R> {
        let guard = self.inner.lock().map_err(|_| CrmError::LockPoisoned)?;
        Ok(f(&guard))
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut CrmStore) -> Result<R>) -> Result<R> {
        let mut guard = self.inner.lock().map_err(|_| CrmError::LockPoisoned)?;
        f(&mut guard)
    }

    /// Copy of the current state, e.g. for persisting without holding the lock.
    pub fn snapshot(&self) -> Result<CrmStore> {
        self.read(CrmStore::clone)
    }

    pub fn replace(&self, store: CrmStore) -> Result<CrmStore> {
        self.write(|current| Ok(std::mem::replace(current, store)))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::Utc;

    use super::*;
    use crate::locale::LocaleConfig;

    #[test]
    fn concurrent_writers_are_serialized() {
        let shared = SharedStore::new(CrmStore::new("shared", LocaleConfig::default(), Utc::now()));
        let handles: Vec<_> = (0..8)
            .map(|idx| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared
                        .write(|store| {
                            store.name.push_str(&idx.to_string());
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let name = shared.read(|store| store.name.clone()).unwrap();
        assert_eq!(name.len(), "shared".len() + 8);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let shared = SharedStore::new(CrmStore::new("p", LocaleConfig::default(), Utc::now()));
        let clone = shared.clone();
        let _ = thread::spawn(move || {
            let _ = clone.write(|_| -> Result<()> { panic!("writer crashed") });
        })
        .join();
        assert!(matches!(shared.snapshot(), Err(CrmError::LockPoisoned)));
    }
}
