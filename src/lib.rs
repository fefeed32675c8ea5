//! Consistent hashing ring.
//!
//! Maps arbitrary string keys to a dynamic set of named nodes. Each node is
//! placed on a circular `u32` space at its own position and at a number of
//! virtual positions; a key is owned by the first searched position at or
//! after the key's position, wrapping around the ring.
//!
//! Adding or removing a node only remaps the keys of the positions it
//! claims or releases, which makes the ring suitable for sharding data or
//! requests across a changing pool of servers.
//!
//! ```
//! use consistent_ring::{HashRing, RingError};
//!
//! let mut ring = HashRing::new();
//! assert_eq!(ring.get("key1"), Err(RingError::EmptyRing));
//!
//! ring.add("NodeA");
//! ring.add("NodeB");
//! ring.add("NodeC");
//!
//! let owner = ring.get("key1").unwrap().to_owned();
//! assert!(ring.contains(&owner));
//!
//! ring.remove("NodeB");
//! assert_ne!(ring.get("key1"), Ok("NodeB"));
//! ```
//!
//! For rings shared between threads, see [`SharedRing`].

mod builder;
mod error;
mod hash;
mod interval;
mod migration;
mod ring;
mod shared;

pub use {
    builder::RingBuilder,
    error::{RingError, RingResult},
    hash::{KeyHasher, Position, RapidHasher, SCRATCH_LEN, ScratchCrc32Hasher},
    interval::KeyRange,
    migration::{Reassignment, reassignments},
    ring::{DEFAULT_VIRTUAL_NODES, HashRing, SearchIndex},
    shared::SharedRing,
};
