//! Generation tokens for discarding superseded responses
//!
//! Every logical slot (a roster list, an action list, a prediction) has a
//! monotonically increasing generation. A request takes a token when it is
//! issued; its response may only be applied while that token is still the
//! slot's current generation. Superseded requests are not aborted, their
//! results are dropped when they arrive.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Generation a request was issued under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationToken(u64);

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Arena of per-slot generation counters
#[derive(Debug, Clone)]
pub struct RaceGuard<K> {
    generations: HashMap<K, u64>,
}

impl<K> Default for RaceGuard<K> {
    fn default() -> Self {
        Self {
            generations: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy> RaceGuard<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the slot and hand out the new generation
    pub fn begin_request(&mut self, slot: K) -> GenerationToken {
        let generation = self.generations.entry(slot).or_insert(0);
        *generation += 1;
        GenerationToken(*generation)
    }

    /// Advance the slot without issuing a request, making every
    /// outstanding token for it stale
    pub fn invalidate(&mut self, slot: K) {
        *self.generations.entry(slot).or_insert(0) += 1;
    }

    pub fn is_current(&self, slot: K, token: GenerationToken) -> bool {
        self.current(slot) == token.0
    }

    /// Current generation (0 before the first request)
    pub fn current(&self, slot: K) -> u64 {
        self.generations.get(&slot).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Slot {
        Roster,
        Actions,
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut guard = RaceGuard::new();
        let first = guard.begin_request(Slot::Roster);
        let second = guard.begin_request(Slot::Roster);

        assert!(!guard.is_current(Slot::Roster, first));
        assert!(guard.is_current(Slot::Roster, second));
        assert!(second > first);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut guard = RaceGuard::new();
        let roster = guard.begin_request(Slot::Roster);
        let actions = guard.begin_request(Slot::Actions);
        guard.begin_request(Slot::Actions);

        assert!(guard.is_current(Slot::Roster, roster));
        assert!(!guard.is_current(Slot::Actions, actions));
    }

    #[test]
    fn test_invalidate_makes_outstanding_token_stale() {
        let mut guard = RaceGuard::new();
        let token = guard.begin_request(Slot::Actions);
        guard.invalidate(Slot::Actions);

        assert!(!guard.is_current(Slot::Actions, token));
        assert_eq!(guard.current(Slot::Actions), 2);
    }

    #[test]
    fn test_untouched_slot_starts_at_zero() {
        let guard: RaceGuard<Slot> = RaceGuard::new();
        assert_eq!(guard.current(Slot::Roster), 0);
    }
}
