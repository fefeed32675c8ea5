use super::{HashRing, KeyHasher};

/// A key whose owner differs between two ring states.
///
/// An owner is `None` when the corresponding ring has no members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment<'a> {
    /// The key that must move.
    pub key: &'a str,
    /// The node that owns it in the old ring.
    pub from: Option<&'a str>,
    /// The node that owns it in the new ring.
    pub to: Option<&'a str>,
}

/// Compute which of the given keys change owner between two ring states.
///
/// Keys that keep their owner are skipped. The order of `keys` is preserved.
pub fn reassignments<'a, H1, H2, I>(
    old: &'a HashRing<H1>,
    new: &'a HashRing<H2>,
    keys: I,
) -> Vec<Reassignment<'a>>
where
    H1: KeyHasher,
    H2: KeyHasher,
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter_map(|key| {
            let from = old.get(key).ok();
            let to = new.get(key).ok();
            (from != to).then_some(Reassignment { key, from, to })
        })
        .collect()
}
