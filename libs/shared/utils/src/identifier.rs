use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

const DEFAULT_WIDTH: usize = 4;

/// Issues `prefix + zero-padded sequence` identifiers, e.g. `A0007`.
///
/// The counter is seeded from identifiers that already exist so a restarted
/// process never reissues one. Issuance is lock-free and safe to share.
#[derive(Debug)]
pub struct IdentifierAllocator {
    prefix: String,
    width: usize,
    next: AtomicU64,
}

impl IdentifierAllocator {
    /// Seed from previously issued identifiers. Entries that do not carry
    /// `prefix` followed by digits are skipped.
    pub fn seeded<I, S>(prefix: impl Into<String>, existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = prefix.into();
        let mut highest = 0u64;
        let mut skipped = 0usize;

        for id in existing {
            // A suffix with no successor cannot seed the counter
            match sequence_number(&prefix, id.as_ref()).filter(|n| n.checked_add(1).is_some()) {
                Some(n) => highest = highest.max(n),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {} malformed identifiers while seeding '{}' counter", skipped, prefix);
        }
        debug!("Identifier counter for '{}' seeded at {}", prefix, highest + 1);

        Self {
            prefix,
            width: DEFAULT_WIDTH,
            next: AtomicU64::new(highest + 1),
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// `None` once the sequence is exhausted; the counter never wraps.
    pub fn next_id(&self) -> Option<String> {
        let n = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()?;
        Some(format!("{}{:0width$}", self.prefix, n, width = self.width))
    }

    /// The sequence number the next call to `next_id` will use.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

fn sequence_number(prefix: &str, id: &str) -> Option<u64> {
    let head = id.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }

    let digits = &id[prefix.len()..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one_without_history() {
        let ids = IdentifierAllocator::seeded("A", Vec::<String>::new());
        assert_eq!(ids.next_id().unwrap(), "A0001");
        assert_eq!(ids.next_id().unwrap(), "A0002");
    }

    #[test]
    fn test_seeds_after_highest_existing() {
        let ids = IdentifierAllocator::seeded("A", ["A0001", "A0005", "A0003"]);
        assert_eq!(ids.next_id().unwrap(), "A0006");
    }

    #[test]
    fn test_malformed_ids_are_skipped() {
        let ids = IdentifierAllocator::seeded("A", ["A00x2", "", "B0009", "A", "A0002", "Ä12"]);
        assert_eq!(ids.peek(), 3);
        assert_eq!(ids.next_id().unwrap(), "A0003");
    }

    #[test]
    fn test_suffix_without_successor_is_skipped() {
        let ids = IdentifierAllocator::seeded("A", ["A18446744073709551615", "A0002"]);
        assert_eq!(ids.next_id().unwrap(), "A0003");

        let overflowing = IdentifierAllocator::seeded("A", ["A99999999999999999999999"]);
        assert_eq!(overflowing.next_id().unwrap(), "A0001");
    }

    #[test]
    fn test_exhausted_sequence_stops_instead_of_wrapping() {
        let ids = IdentifierAllocator::seeded("A", [format!("A{}", u64::MAX - 2)]);
        assert_eq!(ids.next_id().unwrap(), format!("A{}", u64::MAX - 1));
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.next_id(), None);
        assert_eq!(ids.peek(), u64::MAX);
    }

    #[test]
    fn test_all_malformed_starts_at_one() {
        let ids = IdentifierAllocator::seeded("A", ["oops", "A-1", "A 7"]);
        assert_eq!(ids.next_id().unwrap(), "A0001");
    }

    #[test]
    fn test_custom_width_and_growth_past_padding() {
        let ids = IdentifierAllocator::seeded("D", ["D999"]).with_width(3);
        assert_eq!(ids.next_id().unwrap(), "D1000");
        assert_eq!(ids.next_id().unwrap(), "D1001");
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        let ids = IdentifierAllocator::seeded("A", ["a0010"]);
        assert_eq!(ids.next_id().unwrap(), "A0011");
    }

    #[test]
    fn test_concurrent_issuance_is_unique() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdentifierAllocator::seeded("A", Vec::<String>::new()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..50).map(|_| ids.next_id().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 400);
    }
}
