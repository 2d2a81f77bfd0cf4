//! Point-in-time inventory snapshots and the deltas between them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::plank::PlankGrade;

/// One occupied container slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: u32,
    pub quantity: u32,
}

impl ItemStack {
    #[must_use]
    pub const fn new(id: u32, quantity: u32) -> Self {
        Self { id, quantity }
    }
}

/// Immutable tracked-item counts captured at one instant.
///
/// Only plank grades are tracked; everything else in the container is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    counts: BTreeMap<u32, u32>,
}

impl InventorySnapshot {
    /// Capture tracked items. A missing container yields an empty snapshot.
    #[must_use]
    pub fn capture(container: Option<&[ItemStack]>) -> Self {
        container.map_or_else(Self::default, Self::from_items)
    }

    /// Capture tracked items from an available container.
    #[must_use]
    pub fn from_items(items: &[ItemStack]) -> Self {
        let mut counts = BTreeMap::new();
        for item in items.iter().filter(|item| PlankGrade::is_plank(item.id)) {
            let entry = counts.entry(item.id).or_insert(0u32);
            *entry = entry.saturating_add(item.quantity);
        }
        Self { counts }
    }

    #[must_use]
    pub fn count(&self, item_id: u32) -> u32 {
        self.counts.get(&item_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&qty| u64::from(qty)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&qty| qty == 0)
    }

    fn items(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.keys().copied()
    }
}

/// Signed net change from `before` to `after`: quantities gained minus
/// quantities lost, taken as a multiset difference in both directions.
#[must_use]
pub fn delta(before: &InventorySnapshot, after: &InventorySnapshot) -> i32 {
    let mut gained: i64 = 0;
    let mut lost: i64 = 0;
    let ids: std::collections::BTreeSet<u32> = before.items().chain(after.items()).collect();
    for id in ids {
        let was = i64::from(before.count(id));
        let now = i64::from(after.count(id));
        gained += (now - was).max(0);
        lost += (was - now).max(0);
    }
    saturate_i32(gained - lost)
}

/// Total quantity of `item_id` in a container, zero when the container is
/// unavailable.
#[must_use]
pub fn count_item(container: Option<&[ItemStack]>, item_id: u32) -> i32 {
    let total: i64 = container
        .unwrap_or_default()
        .iter()
        .filter(|item| item.id == item_id)
        .map(|item| i64::from(item.quantity))
        .sum();
    saturate_i32(total)
}

fn saturate_i32(value: i64) -> i32 {
    i32::try_from(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ITEM_OAK_PLANK, ITEM_PLANK, ITEM_STEEL_BAR, ITEM_TEAK_PLANK};

    fn stacks(items: &[(u32, u32)]) -> Vec<ItemStack> {
        items
            .iter()
            .map(|&(id, qty)| ItemStack::new(id, qty))
            .collect()
    }

    #[test]
    fn snapshot_counts_only_planks() {
        let items = stacks(&[(ITEM_PLANK, 1), (ITEM_PLANK, 1), (ITEM_STEEL_BAR, 4)]);
        let snap = InventorySnapshot::capture(Some(&items));
        assert_eq!(snap.count(ITEM_PLANK), 2);
        assert_eq!(snap.count(ITEM_STEEL_BAR), 0);
        assert_eq!(snap.total(), 2);
    }

    #[test]
    fn missing_container_is_empty() {
        let snap = InventorySnapshot::capture(None);
        assert!(snap.is_empty());
        assert_eq!(count_item(None, ITEM_STEEL_BAR), 0);
    }

    #[test]
    fn delta_is_gained_minus_lost() {
        let before = InventorySnapshot::from_items(&stacks(&[(ITEM_PLANK, 5), (ITEM_OAK_PLANK, 2)]));
        let after = InventorySnapshot::from_items(&stacks(&[(ITEM_OAK_PLANK, 3), (ITEM_TEAK_PLANK, 1)]));
        // lost 5 planks, gained 1 oak and 1 teak
        assert_eq!(delta(&before, &after), -3);
        assert_eq!(delta(&after, &before), 3);
        assert_eq!(delta(&before, &before), 0);
    }

    #[test]
    fn count_item_sums_stacks() {
        let items = stacks(&[(ITEM_STEEL_BAR, 1), (ITEM_PLANK, 3), (ITEM_STEEL_BAR, 1)]);
        assert_eq!(count_item(Some(&items), ITEM_STEEL_BAR), 2);
    }
}
