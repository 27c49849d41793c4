//! Identifier generation

/// Mint a fresh opaque identifier.
///
/// Identifiers are random v4 UUIDs, so an id freed by a delete is never
/// handed out again.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
