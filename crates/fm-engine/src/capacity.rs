//! Capacity ("puits") accounting.

use fm_core::{Item, StatMap, StatWeightTable};
use tracing::trace;

/// Capacity consumed by pushing `targets` past the item's natural maximums.
///
/// Per stat: overflow = min(target - max, overflow cap), charged at the stat's
/// base weight. Targets at or below the maximum cost nothing.
pub fn capacity_required(weights: &StatWeightTable, item: &Item, targets: &StatMap) -> u64 {
    targets.iter().fold(0u64, |acc, (stat, target)| {
        let max = item.max_stats.value_or_zero(stat.as_str());
        if target <= max {
            return acc;
        }
        let overflow = target.saturating_sub(max).min(weights.max_overflow(stat.as_str()));
        let overflow = u64::try_from(overflow).unwrap_or(0);
        let cost = overflow.saturating_mul(weights.base_weight(stat.as_str()));
        trace!(%stat, target, max, overflow, cost, "overflow charge");
        acc.saturating_add(cost)
    })
}

/// Base capacity plus what removing `removals` frees.
///
/// A removal never frees more than the stat's current value, and never a
/// negative amount.
pub fn capacity_available(weights: &StatWeightTable, item: &Item, removals: &StatMap) -> u64 {
    removals
        .iter()
        .fold(item.capacity_total, |acc, (stat, requested)| {
            let present = item.base_stats.value_or_zero(stat.as_str());
            let removable = u64::try_from(requested.min(present)).unwrap_or(0);
            let freed = removable.saturating_mul(weights.base_weight(stat.as_str()));
            trace!(%stat, requested, present, freed, "removal credit");
            acc.saturating_add(freed)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn boots() -> Item {
        Item {
            id: 1,
            name: "Gelano Test".to_string(),
            category: "Bottes".to_string(),
            level: 100,
            base_stats: [("vitalite", 200), ("agilite", 30)].into_iter().collect(),
            max_stats: [("vitalite", 300), ("agilite", 50)].into_iter().collect(),
            capacity_total: 100,
            base_price: None,
        }
    }

    fn targets(pairs: &[(&str, i64)]) -> StatMap {
        pairs.iter().map(|&(s, v)| (s, v)).collect()
    }

    #[test]
    fn overflow_is_charged_at_base_weight() {
        let w = StatWeightTable::builtin().unwrap();
        assert_eq!(capacity_required(&w, &boots(), &targets(&[("vitalite", 320)])), 20);
        // agilite weighs 10 per point
        assert_eq!(
            capacity_required(&w, &boots(), &targets(&[("vitalite", 320), ("agilite", 60)])),
            120
        );
    }

    #[test]
    fn within_max_costs_nothing() {
        let w = StatWeightTable::builtin().unwrap();
        assert_eq!(capacity_required(&w, &boots(), &targets(&[("vitalite", 280)])), 0);
        assert_eq!(
            capacity_required(&w, &boots(), &targets(&[("vitalite", 300), ("agilite", 45)])),
            0
        );
    }

    #[test]
    fn overflow_is_capped() {
        let w = StatWeightTable::builtin().unwrap();
        // 100 over, capped at 40
        assert_eq!(capacity_required(&w, &boots(), &targets(&[("vitalite", 400)])), 40);
        // exotic pa: absent max defaults to 0, cap 1, weight 300
        assert_eq!(capacity_required(&w, &boots(), &targets(&[("pa", 2)])), 300);
        // unknown stat has a zero cap
        assert_eq!(capacity_required(&w, &boots(), &targets(&[("mystery", 50)])), 0);
    }

    #[test]
    fn removal_frees_capacity() {
        let w = StatWeightTable::builtin().unwrap();
        assert_eq!(capacity_available(&w, &boots(), &StatMap::new()), 100);
        assert_eq!(capacity_available(&w, &boots(), &targets(&[("vitalite", 50)])), 150);
        assert_eq!(capacity_available(&w, &boots(), &targets(&[("agilite", 5)])), 150);
    }

    #[test]
    fn removal_is_bounded_by_current_value() {
        let w = StatWeightTable::builtin().unwrap();
        assert_eq!(capacity_available(&w, &boots(), &targets(&[("vitalite", 500)])), 300);
        assert_eq!(capacity_available(&w, &boots(), &targets(&[("pa", 1)])), 100);
        assert_eq!(capacity_available(&w, &boots(), &targets(&[("vitalite", -10)])), 100);
    }

    #[test]
    fn extreme_values_saturate() {
        let w = StatWeightTable::builtin().unwrap();
        let mut item = boots();
        item.max_stats.insert("vitalite", i64::MIN);
        // i64::MAX - i64::MIN does not fit; the cap still applies
        assert_eq!(capacity_required(&w, &item, &targets(&[("vitalite", i64::MAX)])), 40);
        let empty = Item {
            base_stats: StatMap::new(),
            max_stats: StatMap::new(),
            ..boots()
        };
        assert_eq!(capacity_required(&w, &empty, &targets(&[("vitalite", i64::MAX)])), 40);
    }

    proptest! {
        #[test]
        fn targets_within_max_are_free(vit in 0i64..=300, agi in 0i64..=50) {
            let w = StatWeightTable::builtin().unwrap();
            let t = targets(&[("vitalite", vit), ("agilite", agi)]);
            prop_assert_eq!(capacity_required(&w, &boots(), &t), 0);
        }

        #[test]
        fn removal_never_over_credits(extra in 0i64..10_000) {
            let w = StatWeightTable::builtin().unwrap();
            let item = boots();
            let t = targets(&[("vitalite", 200 + extra)]);
            prop_assert_eq!(capacity_available(&w, &item, &t), item.capacity_total + 200);
        }
    }
}
