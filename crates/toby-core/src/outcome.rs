//! Non-error results of store operations.

/// What a store operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    /// The mutation was applied
    Applied(T),
    /// Nothing changed, for the given reason
    Skipped(SkipReason),
}

/// Why an operation left the store untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    CollectionNotFound,
    ItemNotFound,
    /// The user answered no to a confirmation
    Declined,
    /// The requested value equals the current one
    Unchanged,
    /// The target collection already holds the URL
    DuplicateInCollection,
    /// The item is already first or last
    AtBoundary,
    /// A collection order that is not a permutation of the current ids
    OrderMismatch,
    /// Source and target collection are the same
    SameCollection,
    /// No item is selected
    NoSelection,
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Skipped(reason) => Some(*reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(value) => Outcome::Applied(f(value)),
            Outcome::Skipped(reason) => Outcome::Skipped(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let applied: Outcome<u32> = Outcome::Applied(3);
        assert!(applied.is_applied());
        assert_eq!(applied.clone().map(|n| n * 2), Outcome::Applied(6));
        assert_eq!(applied.applied(), Some(3));

        let skipped: Outcome<u32> = Outcome::Skipped(SkipReason::Declined);
        assert_eq!(skipped.skip_reason(), Some(SkipReason::Declined));
        assert_eq!(skipped.applied(), None);
    }
}
