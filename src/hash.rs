use auto_impl::auto_impl;

/// Position on the ring.
///
/// The ring is the circular space of all `u32` values: the successor of
/// `u32::MAX` is `0`.
pub type Position = u32;

/// Size of the scratch buffer identities are copied into before hashing.
pub const SCRATCH_LEN: usize = 64;

/// Maps identities (node names, virtual node names, keys) to ring positions.
///
/// The same hasher is used for nodes and keys, so that both land in the same
/// position space.
#[auto_impl(&, Box, Arc)]
pub trait KeyHasher {
    /// Returns the ring position of the given identity.
    fn hash_key(&self, identity: &str) -> Position;
}

/// Default hasher of the ring.
///
/// Computes CRC-32 (IEEE) over a 64-byte zero-filled scratch buffer. The
/// identity is copied into the buffer left-aligned only when it is shorter
/// than the buffer; otherwise the buffer stays zeroed. The checksum covers as
/// many bytes as the identity is long, so any identity of 64 bytes or more
/// hashes as a run of zero bytes of the same length.
///
/// Positions produced by this hasher are bit-compatible with rings that use
/// the same scratch-buffer scheme. Use [`RapidHasher`] when long identities
/// must be told apart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScratchCrc32Hasher;

impl KeyHasher for ScratchCrc32Hasher {
    fn hash_key(&self, identity: &str) -> Position {
        let mut scratch = [0u8; SCRATCH_LEN];
        let bytes = identity.as_bytes();
        if bytes.len() < SCRATCH_LEN {
            scratch[..bytes.len()].copy_from_slice(bytes);
            return crc32fast::hash(&scratch[..bytes.len()]);
        }

        let mut hasher = crc32fast::Hasher::new();
        let mut remaining = bytes.len();
        while remaining > 0 {
            let n = remaining.min(SCRATCH_LEN);
            hasher.update(&scratch[..n]);
            remaining -= n;
        }
        hasher.finalize()
    }
}

/// Hasher over the full identity.
///
/// Uses rapidhash and folds the 64-bit digest into a ring position. Not
/// compatible with [`ScratchCrc32Hasher`] positions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RapidHasher;

impl KeyHasher for RapidHasher {
    fn hash_key(&self, identity: &str) -> Position {
        let hash = rapidhash::rapidhash(identity.as_bytes());
        (hash ^ (hash >> 32)) as Position
    }
}

/// Identity of the `index`-th virtual node of `node`.
pub(crate) fn virtual_identity(index: usize, node: &str) -> String {
    format!("{index}-{node}")
}
