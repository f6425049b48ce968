//! Allocation ledger: live participant counts per condition.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::condition::Condition;

/// Caps enforced by the allocation routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCaps {
    /// Maximum participants in a single condition.
    pub per_condition: u32,
    /// Maximum participants across all conditions.
    pub global: u32,
}

impl Default for AllocationCaps {
    fn default() -> Self {
        Self {
            per_condition: 18,
            global: 72,
        }
    }
}

/// One ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub condition: Condition,
    pub count: u32,
}

/// The full ledger as read at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub rows: Vec<LedgerRow>,
}

impl LedgerSnapshot {
    pub fn new(rows: Vec<LedgerRow>) -> Self {
        Self { rows }
    }

    /// Build a snapshot from counts given in letter order (A, B, C, D).
    pub fn from_counts(counts: [u32; 4]) -> Self {
        Self::new(
            Condition::ALL
                .into_iter()
                .zip(counts)
                .map(|(condition, count)| LedgerRow { condition, count })
                .collect(),
        )
    }

    pub fn total(&self) -> u32 {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn count_for(&self, condition: Condition) -> Option<u32> {
        self.rows
            .iter()
            .find(|r| r.condition == condition)
            .map(|r| r.count)
    }

    /// Rows still below the per-condition cap. Empty once the global cap is reached.
    pub fn eligible(&self, caps: &AllocationCaps) -> Vec<Condition> {
        if self.total() >= caps.global {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.count < caps.per_condition)
            .map(|r| r.condition)
            .collect()
    }

    pub fn is_exhausted(&self, caps: &AllocationCaps) -> bool {
        self.eligible(caps).is_empty()
    }

    /// Uniform pick among eligible rows, not weighted by remaining capacity.
    pub fn pick<R: Rng + ?Sized>(&self, caps: &AllocationCaps, rng: &mut R) -> Option<Condition> {
        self.eligible(caps).choose(rng).copied()
    }

    pub fn remaining(&self, caps: &AllocationCaps) -> u32 {
        caps.global.saturating_sub(self.total())
    }
}

/// Result of one allocation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationOutcome {
    Assigned(Condition),
    Exhausted,
}

impl AllocationOutcome {
    pub fn condition(&self) -> Option<Condition> {
        match self {
            Self::Assigned(c) => Some(*c),
            Self::Exhausted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_single_open_cell_is_always_picked() {
        let snapshot = LedgerSnapshot::from_counts([18, 5, 18, 18]);
        let caps = AllocationCaps::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let picked = snapshot.pick(&caps, &mut rng).unwrap();
            assert_eq!(picked.letter(), 'B');
        }
    }

    #[test]
    fn test_all_cells_full_is_exhausted_even_under_a_large_global_cap() {
        let snapshot = LedgerSnapshot::from_counts([18, 18, 18, 18]);
        let caps = AllocationCaps {
            per_condition: 18,
            global: 1000,
        };
        assert!(snapshot.is_exhausted(&caps));
    }

    #[test]
    fn test_global_cap_exhausts_before_cells_fill() {
        let snapshot = LedgerSnapshot::from_counts([10, 10, 0, 0]);
        let caps = AllocationCaps {
            per_condition: 18,
            global: 20,
        };
        assert_eq!(snapshot.total(), 20);
        assert!(snapshot.is_exhausted(&caps));
        assert_eq!(snapshot.remaining(&caps), 0);
    }

    #[test]
    fn test_eligible_filters_full_cells() {
        let snapshot = LedgerSnapshot::from_counts([17, 18, 0, 18]);
        let eligible: String = snapshot
            .eligible(&AllocationCaps::default())
            .iter()
            .map(Condition::letter)
            .collect();
        assert_eq!(eligible, "AC");
    }

    #[test]
    fn test_pick_reaches_every_open_cell() {
        let snapshot = LedgerSnapshot::from_counts([0, 0, 0, 0]);
        let caps = AllocationCaps::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(snapshot.pick(&caps, &mut rng).unwrap().letter());
        }
        assert_eq!(seen.len(), 4);
    }
}
