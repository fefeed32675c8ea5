use {
    super::{
        DEFAULT_VIRTUAL_NODES,
        HashRing,
        KeyHasher,
        RingError,
        RingResult,
        ScratchCrc32Hasher,
        SearchIndex,
    },
    std::num::NonZeroUsize,
};

/// Hash ring builder.
///
/// ```
/// use consistent_ring::{RapidHasher, RingBuilder, SearchIndex};
///
/// let ring = RingBuilder::new(["node1", "node2", "node3"])
///     .with_virtual_nodes(64)
///     .with_search_index(SearchIndex::AllPositions)
///     .with_hasher(RapidHasher)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(ring.len(), 3);
/// ```
pub struct RingBuilder<H = ScratchCrc32Hasher> {
    nodes: Vec<String>,
    hasher: H,
    virtual_nodes: usize,
    search_index: SearchIndex,
}

impl RingBuilder {
    /// Create new ring builder.
    pub fn new<I, S>(init_nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: init_nodes.into_iter().map(Into::into).collect(),
            hasher: ScratchCrc32Hasher,
            virtual_nodes: DEFAULT_VIRTUAL_NODES.get(),
            search_index: SearchIndex::default(),
        }
    }
}

impl<H: KeyHasher> RingBuilder<H> {
    /// Transform the builder into one with a different hasher.
    pub fn with_hasher<CustomH: KeyHasher>(self, hasher: CustomH) -> RingBuilder<CustomH> {
        RingBuilder {
            nodes: self.nodes,
            hasher,
            virtual_nodes: self.virtual_nodes,
            search_index: self.search_index,
        }
    }

    /// Set the number of virtual nodes per member.
    pub fn with_virtual_nodes(mut self, virtual_nodes: usize) -> Self {
        self.virtual_nodes = virtual_nodes;
        self
    }

    /// Set which positions are searched on lookup.
    pub fn with_search_index(mut self, search_index: SearchIndex) -> Self {
        self.search_index = search_index;
        self
    }

    /// Build the ring, with all initial nodes added.
    pub fn build(self) -> RingResult<HashRing<H>> {
        let virtual_nodes =
            NonZeroUsize::new(self.virtual_nodes).ok_or(RingError::ZeroVirtualNodes)?;
        let mut ring = HashRing::from_parts(self.hasher, virtual_nodes, self.search_index);
        ring.extend(self.nodes);
        Ok(ring)
    }
}
