// cache.rs - Keyed last-value cache.
//
// Holds the single most recently used expensive object (a matcher, a
// searcher) together with the key it was built for. A hit returns the
// object after re-attaching per-call state; a miss rebuilds it, handing
// the previous object to the builder so it can be recycled.

/// Single-slot cache keyed by a vectorized slot index.
#[derive(Debug)]
pub struct KeyedCache<T> {
    entry: Option<(usize, T)>,
    rebuilds: usize,
}

impl<T> Default for KeyedCache<T> {
    fn default() -> Self {
        KeyedCache {
            entry: None,
            rebuilds: 0,
        }
    }
}

impl<T> KeyedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the cached object, if any.
    pub fn key(&self) -> Option<usize> {
        self.entry.as_ref().map(|(k, _)| *k)
    }

    /// Number of times `rebuild` has been invoked.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Return the object for `key`, rebuilding it on a key change.
    ///
    /// `rebuild` receives the evicted object, if any. `reattach` runs on
    /// every call, hit or miss. If either fails the cache is left empty.
    pub fn get_or_rebuild<E>(
        &mut self,
        key: usize,
        rebuild: impl FnOnce(Option<T>) -> Result<T, E>,
        reattach: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Result<&mut T, E> {
        let mut obj = match self.entry.take() {
            Some((k, obj)) if k == key => obj,
            previous => {
                self.rebuilds += 1;
                rebuild(previous.map(|(_, obj)| obj))?
            }
        };
        reattach(&mut obj)?;
        let (_, obj) = self.entry.insert((key, obj));
        Ok(obj)
    }
}
