use crate::hash::Position;

/// Range of ring positions routed to a single ring position.
///
/// A key is owned by the first ring position at or after the key's own
/// position, so every ring position owns the positions between its
/// predecessor (exclusive) and itself (inclusive). The lowest ring position
/// also owns everything above the highest one, wrapping through zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRange {
    /// Positions `start..=end`.
    Span(Position, Position),
    /// Positions `start..=Position::MAX` and `0..=end`.
    Wrapping(Position, Position),
}

impl KeyRange {
    /// Range owned by `end`, given the preceding ring position `prev`.
    ///
    /// Positions are expected to be strictly increasing.
    pub(crate) fn after(prev: Position, end: Position) -> Self {
        KeyRange::Span(prev + 1, end)
    }

    /// Range owned by the lowest ring position `first`, given the highest
    /// ring position `last`.
    pub(crate) fn wrapping(last: Position, first: Position) -> Self {
        match last.checked_add(1) {
            Some(start) => KeyRange::Wrapping(start, first),
            None => KeyRange::Span(0, first),
        }
    }

    /// Check if the given position is in the range.
    ///
    /// Note not the key itself, but the hash of the key provides the position
    /// on the ring.
    pub fn contains(&self, position: Position) -> bool {
        match *self {
            KeyRange::Span(start, end) => position >= start && position <= end,
            KeyRange::Wrapping(start, end) => position >= start || position <= end,
        }
    }

    /// Number of positions in the range.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        match *self {
            KeyRange::Span(start, end) => u64::from(end) - u64::from(start) + 1,
            KeyRange::Wrapping(start, end) => {
                (u64::from(Position::MAX) - u64::from(start) + 1) + (u64::from(end) + 1)
            }
        }
    }
}
