use {
    super::{HashRing, KeyHasher, RingResult, ScratchCrc32Hasher},
    parking_lot::{Mutex, RwLock},
    std::sync::Arc,
};

/// Hash ring shared between threads.
///
/// Readers work on an immutable snapshot of the ring, so lookups never wait
/// for a membership change to finish. Membership changes are serialized:
/// each one copies the current ring, applies the change and publishes the
/// result as the new snapshot.
pub struct SharedRing<H = ScratchCrc32Hasher> {
    /// Currently published ring.
    current: RwLock<Arc<HashRing<H>>>,

    /// Serializes writers.
    writer: Mutex<()>,
}

impl Default for SharedRing {
    fn default() -> Self {
        Self::new(HashRing::new())
    }
}

impl<H> From<HashRing<H>> for SharedRing<H> {
    fn from(ring: HashRing<H>) -> Self {
        Self::new(ring)
    }
}

impl<H> SharedRing<H> {
    /// Publishes the given ring as the initial snapshot.
    pub fn new(ring: HashRing<H>) -> Self {
        Self {
            current: RwLock::new(Arc::new(ring)),
            writer: Mutex::new(()),
        }
    }

    /// Returns the currently published ring.
    ///
    /// The snapshot is not affected by later membership changes.
    pub fn snapshot(&self) -> Arc<HashRing<H>> {
        Arc::clone(&self.current.read())
    }
}

impl<H: KeyHasher + Clone> SharedRing<H> {
    /// Add a node to the ring. See [`HashRing::add`].
    pub fn add(&self, node: &str) -> bool {
        self.update(|ring| !ring.contains(node), |ring| ring.add(node))
    }

    /// Remove a node from the ring. See [`HashRing::remove`].
    pub fn remove(&self, node: &str) -> bool {
        self.update(|ring| ring.contains(node), |ring| ring.remove(node))
    }

    /// Returns the node responsible for the given key.
    pub fn get(&self, key: &str) -> RingResult<String> {
        self.snapshot().get(key).map(str::to_owned)
    }

    /// Returns names of all member nodes, in unspecified order.
    pub fn list_nodes(&self) -> Vec<String> {
        self.snapshot().nodes().map(str::to_owned).collect()
    }

    /// Checks whether the node is a member of the ring.
    pub fn contains(&self, node: &str) -> bool {
        self.snapshot().contains(node)
    }

    /// Number of member nodes.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Checks whether the ring has no members.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Applies `change` to a copy of the current ring and publishes it.
    ///
    /// Nothing is copied or published unless `applies` holds for the current
    /// ring.
    fn update(
        &self,
        applies: impl FnOnce(&HashRing<H>) -> bool,
        change: impl FnOnce(&mut HashRing<H>) -> bool,
    ) -> bool {
        let _writer = self.writer.lock();
        let current = self.snapshot();
        if !applies(&current) {
            return false;
        }

        let mut next = HashRing::clone(&current);
        if !change(&mut next) {
            return false;
        }
        *self.current.write() = Arc::new(next);
        true
    }
}
