
use {
    crate::{
        error::{RingError, RingResult},
        hash::{KeyHasher, Position, ScratchCrc32Hasher, virtual_identity},
        interval::KeyRange,
    },
    rapidhash::RapidBuildHasher,
    std::{
        collections::{HashMap, HashSet},
        num::NonZeroUsize,
        sync::Arc,
    },
    tracing::{debug, trace},
};

/// Default number of virtual nodes per real node.
pub const DEFAULT_VIRTUAL_NODES: NonZeroUsize = NonZeroUsize::new(20).unwrap();

/// Selects which ring positions take part in successor lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchIndex {
    /// Only the real position of every member is searched.
    ///
    /// Virtual positions are kept in the position map, so a virtual position
    /// that lands on top of a real one takes it over, but they are not
    /// searched on their own.
    #[default]
    RealNodes,

    /// Every occupied position, real and virtual, is searched.
    AllPositions,
}

/// Consistent hashing ring.
///
/// Every member node occupies one real position (the hash of its name) and a
/// fixed number of virtual positions (the hashes of `"{index}-{name}"`). A key
/// is routed to the owner of the first indexed position at or after the
/// key's own position, wrapping around to the lowest position.
///
/// Adding or removing a node only moves the keys between the affected
/// positions and their predecessors; the rest of the keys stay put.
#[derive(Debug, Clone)]
pub struct HashRing<H = ScratchCrc32Hasher> {
    /// Hasher for node identities and keys.
    hasher: H,

    /// Number of virtual positions per member.
    virtual_nodes: usize,

    /// Which positions feed the sorted index.
    search_index: SearchIndex,

    /// Ring position to owning node, for real and virtual positions.
    positions: HashMap<Position, Arc<str>, RapidBuildHasher>,

    /// Distinct searchable positions, sorted in ascending order.
    sorted: Vec<Position>,

    /// Member (real) nodes.
    members: HashSet<Arc<str>, RapidBuildHasher>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRing {
    /// Creates an empty ring with [`DEFAULT_VIRTUAL_NODES`] virtual nodes per
    /// member.
    pub fn new() -> Self {
        Self::with_virtual_nodes(DEFAULT_VIRTUAL_NODES)
    }

    /// Creates an empty ring with the given number of virtual nodes per
    /// member.
    pub fn with_virtual_nodes(virtual_nodes: NonZeroUsize) -> Self {
        Self::with_hasher(ScratchCrc32Hasher, virtual_nodes)
    }
}

impl<H: KeyHasher> HashRing<H> {
    /// Creates an empty ring which uses a custom hasher.
    pub fn with_hasher(hasher: H, virtual_nodes: NonZeroUsize) -> Self {
        Self::from_parts(hasher, virtual_nodes, SearchIndex::default())
    }

    pub(crate) fn from_parts(
        hasher: H,
        virtual_nodes: NonZeroUsize,
        search_index: SearchIndex,
    ) -> Self {
        Self {
            hasher,
            virtual_nodes: virtual_nodes.get(),
            search_index,
            positions: HashMap::default(),
            sorted: Vec::new(),
            members: HashSet::default(),
        }
    }

    /// Number of virtual positions each member occupies.
    pub fn virtual_nodes(&self) -> usize {
        self.virtual_nodes
    }

    /// Which positions are searched on lookup.
    pub fn search_index(&self) -> SearchIndex {
        self.search_index
    }

    /// Hasher used for nodes and keys.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns ring position of a given key (or node name).
    pub fn position(&self, key: &str) -> Position {
        self.hasher.hash_key(key)
    }

    /// Returns ring position of the `index`-th virtual node of `node`.
    pub fn virtual_position(&self, index: usize, node: &str) -> Position {
        self.hasher.hash_key(&virtual_identity(index, node))
    }

    /// Add a node to the ring.
    ///
    /// The node claims its real position and all of its virtual positions,
    /// taking over any position already held by another node.
    ///
    /// Returns `false` (and changes nothing) if the node is already a member.
    pub fn add(&mut self, node: &str) -> bool {
        if !self.insert_positions(node) {
            return false;
        }
        self.update_sorted_index();
        debug!(
            node,
            positions = self.virtual_nodes + 1,
            members = self.members.len(),
            "added node to ring"
        );
        true
    }

    /// Add several nodes, rebuilding the sorted index once.
    ///
    /// Returns the number of nodes that were not members before.
    pub fn extend<I, S>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = nodes
            .into_iter()
            .filter(|node| self.insert_positions(node.as_ref()))
            .count();
        if added > 0 {
            self.update_sorted_index();
            debug!(added, members = self.members.len(), "added nodes to ring");
        }
        added
    }

    /// Remove a node from the ring.
    ///
    /// Positions of the node that have since been taken over by another
    /// node are left alone. Released positions that a remaining member also
    /// hashes onto go back to that member.
    ///
    /// Returns `false` (and changes nothing) if the node is not a member.
    pub fn remove(&mut self, node: &str) -> bool {
        let Some(node) = self.members.take(node) else {
            return false;
        };

        let owned: Vec<Position> = self
            .node_positions(&node)
            .filter(|position| {
                self.positions
                    .get(position)
                    .is_some_and(|owner| **owner == *node)
            })
            .collect();
        for position in &owned {
            self.positions.remove(position);
        }
        let reclaimed = self.reclaim(&owned);

        self.update_sorted_index();
        debug!(
            node = &*node,
            positions = owned.len(),
            reclaimed,
            members = self.members.len(),
            "removed node from ring"
        );
        true
    }

    /// Returns the node responsible for the given key.
    ///
    /// Fails with [`RingError::EmptyRing`] if the ring has no members.
    pub fn get(&self, key: &str) -> RingResult<&str> {
        if self.members.is_empty() {
            return Err(RingError::EmptyRing);
        }
        self.successor(self.position(key))
            .map(|(_, owner)| owner)
            .ok_or(RingError::EmptyRing)
    }

    /// Returns `[start..=end]` ranges of ring positions routed to the given
    /// node.
    ///
    /// Ranges of all members together cover the whole ring. Whenever the node
    /// is not a member, `None` is returned.
    pub fn intervals(&self, node: &str) -> Option<Vec<KeyRange>> {
        if !self.members.contains(node) {
            return None;
        }
        let Some(&last) = self.sorted.last() else {
            return Some(Vec::new());
        };

        let ranges = self
            .sorted
            .iter()
            .enumerate()
            .filter(|(_, position)| self.owner(**position) == Some(node))
            .map(|(idx, &position)| match idx {
                0 => KeyRange::wrapping(last, position),
                _ => KeyRange::after(self.sorted[idx - 1], position),
            })
            .collect();
        Some(ranges)
    }

    /// Returns names of all member nodes.
    ///
    /// The order is unspecified and may differ between calls.
    pub fn list_nodes(&self) -> Vec<&str> {
        self.nodes().collect()
    }

    /// Iterator over the member nodes, in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|node| &**node)
    }

    /// Checks whether the node is a member of the ring.
    pub fn contains(&self, node: &str) -> bool {
        self.members.contains(node)
    }

    /// Number of member nodes.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Checks whether the ring has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Claims all positions of a new member, without touching the index.
    fn insert_positions(&mut self, node: &str) -> bool {
        if self.members.contains(node) {
            return false;
        }

        let node: Arc<str> = Arc::from(node);
        self.members.insert(Arc::clone(&node));
        let claimed: Vec<Position> = self.node_positions(&node).collect();
        for position in claimed {
            self.positions.insert(position, Arc::clone(&node));
        }
        true
    }

    /// Hands released positions back to the remaining members that hash onto
    /// them. When several members share a position, the lowest name wins.
    ///
    /// Returns the number of positions handed back.
    fn reclaim(&mut self, released: &[Position]) -> usize {
        if released.is_empty() {
            return 0;
        }
        let released: HashSet<Position, RapidBuildHasher> = released.iter().copied().collect();

        let mut members: Vec<&Arc<str>> = self.members.iter().collect();
        members.sort();
        let mut claims = Vec::new();
        for member in members {
            for position in self.node_positions(member) {
                if released.contains(&position) {
                    claims.push((position, Arc::clone(member)));
                }
            }
        }

        let mut reclaimed = 0;
        for (position, member) in claims {
            if !self.positions.contains_key(&position) {
                self.positions.insert(position, member);
                reclaimed += 1;
            }
        }
        reclaimed
    }

    /// Real position of the node followed by all of its virtual positions.
    fn node_positions<'a>(&'a self, node: &'a str) -> impl Iterator<Item = Position> + 'a {
        std::iter::once(self.position(node))
            .chain((0..self.virtual_nodes).map(move |idx| self.virtual_position(idx, node)))
    }

    /// Owner of an occupied position.
    fn owner(&self, position: Position) -> Option<&str> {
        self.positions.get(&position).map(|node| &**node)
    }

    /// First indexed position at or after `target`, wrapping around to the
    /// lowest one, together with its owner.
    fn successor(&self, target: Position) -> Option<(Position, &str)> {
        if self.sorted.is_empty() {
            return None;
        }
        let idx = match self.sorted.partition_point(|position| *position < target) {
            idx if idx == self.sorted.len() => 0,
            idx => idx,
        };
        let position = self.sorted[idx];
        self.owner(position).map(|owner| (position, owner))
    }

    /// Re-derives the sorted index from the current state.
    ///
    /// Every indexed position is present in the position map, and appears
    /// only once.
    fn update_sorted_index(&mut self) {
        let mut sorted: Vec<Position> = match self.search_index {
            SearchIndex::RealNodes => self
                .members
                .iter()
                .map(|node| self.position(node))
                .filter(|position| self.positions.contains_key(position))
                .collect(),
            SearchIndex::AllPositions => self.positions.keys().copied().collect(),
        };
        sorted.sort_unstable();
        sorted.dedup();

        trace!(positions = sorted.len(), "rebuilt ring index");
        self.sorted = sorted;
    }
}
