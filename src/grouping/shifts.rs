//! Shift grouping.
//!
//! # Algorithm
//! `TimeOfDay`: bucket every working shift by the hour of its start time
//! (morning [4,12), afternoon [12,18), night otherwise). Non-empty buckets
//! become groups 1..N in morning/afternoon/night order.
//!
//! `PerShift`: one group per working shift, ordered by start time.
//!
//! Rest shifts never join a group.

use std::collections::BTreeMap;

use crate::config::GroupingStrategy;
use crate::models::{Shift, ShiftGroups, ShiftId, TimeBucket};

/// Partitions working shifts into rotation groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftGrouper {
    strategy: GroupingStrategy,
}

impl ShiftGrouper {
    /// Creates a grouper with the given strategy.
    pub fn new(strategy: GroupingStrategy) -> Self {
        Self { strategy }
    }

    /// Groups the working shifts of `shifts`.
    ///
    /// Returns an empty mapping when there are no working shifts.
    pub fn group(&self, shifts: &[Shift]) -> ShiftGroups {
        let mut work: Vec<&Shift> = shifts.iter().filter(|s| s.is_work()).collect();
        work.sort_by_key(|s| (s.start_time, s.id));

        let mut groups = ShiftGroups::new();
        match self.strategy {
            GroupingStrategy::TimeOfDay => {
                let mut buckets: BTreeMap<TimeBucket, Vec<ShiftId>> = BTreeMap::new();
                for s in &work {
                    buckets.entry(s.bucket()).or_default().push(s.id);
                }
                for ids in buckets.into_values() {
                    groups.push(ids);
                }
                // Fallback: everything in group 1.
                if groups.is_empty() && !work.is_empty() {
                    groups.push(work.iter().map(|s| s.id).collect());
                }
            }
            GroupingStrategy::PerShift => {
                for s in &work {
                    groups.push(vec![s.id]);
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shifts() -> Vec<Shift> {
        vec![
            Shift::hours(1, "Malam", 20, 8),
            Shift::hours(2, "Pagi", 8, 16),
            Shift::hours(3, "Siang", 14, 22),
            Shift::hours(4, "Pagi Awal", 6, 14),
            Shift::rest(5, "Off Day"),
            Shift::hours(6, "Dini Hari", 2, 10),
        ]
    }

    #[test]
    fn test_time_of_day_buckets() {
        let g = ShiftGrouper::new(GroupingStrategy::TimeOfDay).group(&shifts());
        assert_eq!(g.len(), 3);
        assert_eq!(g.shifts(1), &[4, 2]); // morning, by start time
        assert_eq!(g.shifts(2), &[3]); // afternoon
        assert_eq!(g.shifts(3), &[6, 1]); // night: 02:00 sorts before 20:00
        assert_eq!(g.group_of(5), None); // rest shift excluded
    }

    #[test]
    fn test_missing_bucket_keeps_ids_contiguous() {
        let s = vec![Shift::hours(1, "Pagi", 8, 16), Shift::hours(2, "Malam", 20, 8)];
        let g = ShiftGrouper::new(GroupingStrategy::TimeOfDay).group(&s);
        assert_eq!(g.ids(), vec![1, 2]);
        assert_eq!(g.shifts(1), &[1]);
        assert_eq!(g.shifts(2), &[2]);
    }

    #[test]
    fn test_per_shift_groups() {
        let g = ShiftGrouper::new(GroupingStrategy::PerShift).group(&shifts());
        assert_eq!(g.len(), 5);
        assert_eq!(g.shifts(1), &[6]);
        assert_eq!(g.shifts(5), &[1]);
    }

    #[test]
    fn test_no_working_shifts() {
        let g = ShiftGrouper::default().group(&[Shift::rest(1, "Libur")]);
        assert!(g.is_empty());
    }
}
