//! Greedy rune selection by density.

use fm_core::{Modifier, StatId, StatMap};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Pick rune units covering `targets` within `budget` capacity.
///
/// Stats are serviced in the map's insertion order. For each stat the residual
/// `target - base` (floored at 0) is covered with the densest affordable
/// compatible runes first; a rune is repeated until the residual is met or it
/// no longer fits. Stats without a compatible rune are left uncovered.
///
/// The cumulative `unit_weight` of the result never exceeds `budget`.
pub fn select<'c>(
    budget: u64,
    targets: &StatMap,
    base_stats: &StatMap,
    catalog: &'c [Modifier],
) -> Vec<&'c Modifier> {
    let ranked = rank_by_density(catalog, budget);
    let (picked, remaining) = targets.iter().fold(
        (Vec::new(), budget),
        |(mut picked, remaining), (stat, target)| {
            let residual = target
                .saturating_sub(base_stats.value_or_zero(stat.as_str()))
                .max(0);
            let (units, remaining) = cover_stat(&ranked, stat, residual, remaining);
            trace!(%stat, residual, units = units.len(), remaining, "stat covered");
            picked.extend(units);
            (picked, remaining)
        },
    );
    debug!(budget, remaining, units = picked.len(), "rune selection done");
    picked
}

/// Runes that fit `budget` and deliver something, densest first.
///
/// Equal densities prefer the cheaper rune; the sort is stable so catalog
/// order breaks any remaining tie.
fn rank_by_density(catalog: &[Modifier], budget: u64) -> Vec<&Modifier> {
    let mut ranked: Vec<&Modifier> = catalog
        .iter()
        .filter(|m| m.unit_weight > 0 && m.unit_value > 0 && m.unit_weight <= budget)
        .collect();
    ranked.sort_by(|a, b| by_density_then_price(a, b));
    ranked
}

fn by_density_then_price(a: &Modifier, b: &Modifier) -> Ordering {
    b.density()
        .total_cmp(&a.density())
        .then_with(|| a.price.cmp(&b.price))
}

fn cover_stat<'c>(
    ranked: &[&'c Modifier],
    stat: &StatId,
    residual: i64,
    remaining: u64,
) -> (Vec<&'c Modifier>, u64) {
    let (units, remaining, _covered) = ranked
        .iter()
        .filter(|m| m.target_stat == *stat)
        .fold(
            (Vec::new(), remaining, 0i64),
            |(mut units, remaining, covered), &m| {
                if covered >= residual || m.unit_weight > remaining {
                    return (units, remaining, covered);
                }
                let missing = residual - covered;
                // ceil(missing / unit_value), both positive
                let needed = missing / m.unit_value + i64::from(missing % m.unit_value != 0);
                let needed = u64::try_from(needed).unwrap_or(0);
                let affordable = remaining / m.unit_weight;
                let count = needed.min(affordable);
                units.extend(std::iter::repeat(m).take(count as usize));
                let delivered = i64::try_from(count)
                    .unwrap_or(i64::MAX)
                    .saturating_mul(m.unit_value);
                (
                    units,
                    remaining - count * m.unit_weight,
                    covered.saturating_add(delivered),
                )
            },
        );
    (units, remaining)
}

/// Plan runes for a single stat without ever overshooting `amount`.
///
/// In density order, each rune is used `min(floor(left / value),
/// floor(weight_left / weight))` times. Useful when over-delivering a stat is
/// itself a loss, e.g. near a hard cap.
pub fn combination_for<'c>(
    catalog: &'c [Modifier],
    stat: &str,
    amount: i64,
    weight_budget: u64,
) -> Vec<&'c Modifier> {
    let mut combination = Vec::new();
    let mut amount_left = amount.max(0);
    let mut weight_left = weight_budget;
    for m in rank_by_density(catalog, weight_budget)
        .into_iter()
        .filter(|m| m.target_stat.as_str() == stat)
    {
        if amount_left == 0 {
            break;
        }
        let by_amount = u64::try_from(amount_left / m.unit_value).unwrap_or(0);
        let by_weight = weight_left / m.unit_weight;
        let uses = by_amount.min(by_weight);
        combination.extend(std::iter::repeat(m).take(uses as usize));
        amount_left -= uses as i64 * m.unit_value;
        weight_left -= uses * m.unit_weight;
    }
    combination
}
