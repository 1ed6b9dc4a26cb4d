//! A handle to the current index that can be swapped on reload.
//!
//! Readers take an `Arc` snapshot and keep using it for the whole request;
//! a reload builds a complete new index first and then replaces the pointer,
//! so nobody ever sees a half-built table.

use std::sync::{Arc, PoisonError, RwLock};

use crate::index::SelectorIndex;

#[derive(Debug, Clone)]
pub struct SharedIndex {
    current: Arc<RwLock<Arc<SelectorIndex>>>,
}

impl SharedIndex {
    pub fn new(index: SelectorIndex) -> Self {
        Self::from_arc(Arc::new(index))
    }

    pub fn from_arc(index: Arc<SelectorIndex>) -> Self {
        Self {
            current: Arc::new(RwLock::new(index)),
        }
    }

    /// Snapshot of the current index.
    pub fn load(&self) -> Arc<SelectorIndex> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current index; returns the previous one.
    pub fn swap(&self, index: SelectorIndex) -> Arc<SelectorIndex> {
        let next = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new(SelectorIndex::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IndexBuilder, SelectorTable};

    const TABLE: &str = r#"{
        "8456cb59": {"name": "Pausable", "abi": [
            {"type":"function","name":"pause","inputs":[],"outputs":[],"stateMutability":"nonpayable"}
        ]}
    }"#;

    #[test]
    fn snapshot_survives_swap() {
        let shared = SharedIndex::default();
        let before = shared.load();
        assert!(before.is_empty());

        let table = SelectorTable::from_json_str(TABLE).unwrap();
        let old = shared.swap(IndexBuilder::new().build(&table).unwrap());

        assert!(Arc::ptr_eq(&before, &old));
        assert!(before.is_empty());
        assert_eq!(shared.load().lookup("8456cb59".parse().unwrap()).len(), 1);
    }

    #[test]
    fn concurrent_readers_see_whole_indexes() {
        let table = SelectorTable::from_json_str(TABLE).unwrap();
        let shared = SharedIndex::default();
        let selector = "8456cb59".parse().unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let reader = shared.clone();
                scope.spawn(move || {
                    for _ in 0..200 {
                        let found = reader.load().lookup(selector).len();
                        assert!(found == 0 || found == 1);
                    }
                });
            }
            for _ in 0..20 {
                shared.swap(IndexBuilder::new().build(&table).unwrap());
                shared.swap(SelectorIndex::empty());
            }
        });
    }
}
