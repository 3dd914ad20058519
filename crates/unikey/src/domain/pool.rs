//! # Engine Pool
//!
//! RSA engines (key material plus a private RNG) are used as non-reentrant
//! units. Each key owns one pool:
//!
//! - the primary engine sits behind a mutex whose `try_lock` is the in-use
//!   flag; acquiring it never blocks and the guard releases it on every exit
//!   path, unwinding included
//! - when the primary is busy the caller takes an idle spare, or builds one,
//!   and returns it to the free list afterwards
//!
//! The free list only grows: its length is the highest overflow concurrency
//! seen so far. No caller ever waits on another caller's operation; the spare
//! list lock is held only to pop or push.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// One non-reentrant engine: a copy of the key and its own RNG.
pub(crate) struct Engine<K> {
    pub(crate) key: K,
    pub(crate) rng: StdRng,
}

impl<K> Engine<K> {
    fn new(key: K) -> Self {
        Self {
            key,
            rng: StdRng::from_entropy(),
        }
    }
}

/// On-demand duplication pool around a key primitive.
pub(crate) struct EnginePool<K> {
    template: K,
    primary: Mutex<Engine<K>>,
    spares: Mutex<Vec<Engine<K>>>,
    created: AtomicUsize,
}

impl<K: Clone> EnginePool<K> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            primary: Mutex::new(Engine::new(key.clone())),
            template: key,
            spares: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
        }
    }

    /// Key the pool duplicates engines from.
    pub(crate) fn key(&self) -> &K {
        &self.template
    }

    /// Run `op` on an engine nobody else is using.
    pub(crate) fn run<R>(&self, op: impl FnOnce(&mut Engine<K>) -> R) -> R {
        if let Some(mut primary) = self.primary.try_lock() {
            return op(&mut primary);
        }

        let mut spare = self.checkout();
        let result = op(&mut spare);
        self.spares.lock().push(spare);
        result
    }

    /// Number of spare engines ever created.
    pub(crate) fn spare_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    fn checkout(&self) -> Engine<K> {
        if let Some(engine) = self.spares.lock().pop() {
            return engine;
        }
        let total = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(spares = total, "creating spare engine");
        Engine::new(self.template.clone())
    }
}
