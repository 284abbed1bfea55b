use crate::core::models::spectrum::Dataset;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Owner of the session's current dataset.
///
/// The dataset is never edited in place: the loader and the shift corrector build a
/// complete replacement and swap it in with [`DatasetStore::replace`]. Readers get a
/// shared [`Arc`] snapshot, so a reader holding an older snapshot keeps a consistent
/// view while a replacement is published.
#[derive(Debug, Default)]
pub struct DatasetStore {
    current: RwLock<Arc<Dataset>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current dataset snapshot.
    pub fn snapshot(&self) -> Arc<Dataset> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Publishes `dataset` as the new current dataset and returns the shared handle.
    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let next = Arc::new(dataset);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debug!(
            previous = guard.len(),
            next = next.len(),
            "Replacing dataset."
        );
        *guard = Arc::clone(&next);
        next
    }

    pub fn clear(&self) {
        self.replace(Dataset::default());
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::spectrum::Spectrum;

    fn one_spectrum(tag: &str) -> Dataset {
        Dataset::new(vec![Spectrum::new(tag, vec![1.0, 2.0], vec![3.0, 4.0]).unwrap()])
    }

    #[test]
    fn new_store_is_empty() {
        let store = DatasetStore::new();
        assert!(store.is_empty());
        assert_eq!(store.snapshot().len(), 0);
    }

    #[test]
    fn replace_swaps_wholesale_and_old_snapshots_stay_intact() {
        let store = DatasetStore::new();
        store.replace(one_spectrum("C1s"));
        let before = store.snapshot();

        store.replace(one_spectrum("O1s"));
        let after = store.snapshot();

        assert_eq!(before.tags(), vec!["C1s"]);
        assert_eq!(after.tags(), vec!["O1s"]);
    }

    #[test]
    fn clear_empties_the_store() {
        let store = DatasetStore::new();
        store.replace(one_spectrum("C1s"));
        store.clear();
        assert!(store.is_empty());
    }
}
