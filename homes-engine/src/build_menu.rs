//! Construction menu material tracking.
//!
//! The host reports each redrawn menu slot as it appears. Slots are only read
//! at the next tick boundary, once every redraw of that tick has landed.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::constants::{MATERIAL_LINE_BREAK, MATERIAL_SEPARATOR};
use crate::inventory::InventorySnapshot;
use crate::plank::PlankGrade;

/// One `name: count` line of a slot's material list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub grade: PlankGrade,
    pub count: i32,
}

/// Parsed state of one visible construction menu slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSlotState {
    pub slot: usize,
    pub materials: SmallVec<[MaterialRequirement; 4]>,
    pub buildable: bool,
}

impl BuildSlotState {
    /// Planks the build needs beyond what `inventory` holds, summed per grade.
    #[must_use]
    pub fn shortfall(&self, inventory: &InventorySnapshot) -> i32 {
        self.materials
            .iter()
            .map(|req| {
                let held = i32::try_from(inventory.count(req.grade.item_id())).unwrap_or(i32::MAX);
                req.count.saturating_sub(held).max(0)
            })
            .fold(0i32, i32::saturating_add)
    }
}

/// Raw widget contents reported for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotRedraw {
    materials_text: String,
    buildable: bool,
}

/// Parse a `<br>`-separated material list. Lines that are not a known plank
/// grade with an integer count are skipped.
#[must_use]
pub fn parse_materials(text: &str) -> SmallVec<[MaterialRequirement; 4]> {
    text.split(MATERIAL_LINE_BREAK)
        .filter_map(|line| {
            let (name, count) = line.split_once(MATERIAL_SEPARATOR)?;
            if count.contains(MATERIAL_SEPARATOR) {
                return None;
            }
            let count = count.parse::<i32>().ok()?;
            let grade = PlankGrade::from_material_name(name)?;
            Some(MaterialRequirement { grade, count })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct BuildMenuTracker {
    expected_slots: usize,
    redraws: BTreeMap<usize, SlotRedraw>,
    slots: Vec<BuildSlotState>,
}

impl BuildMenuTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A menu item was drawn this tick; one more slot must be inspected.
    pub fn note_trigger(&mut self) {
        self.expected_slots += 1;
    }

    /// Cache a slot's widget contents until the tick boundary.
    pub fn record_redraw(&mut self, slot: usize, materials_text: impl Into<String>, buildable: bool) {
        self.redraws.insert(
            slot,
            SlotRedraw {
                materials_text: materials_text.into(),
                buildable,
            },
        );
    }

    /// Tick boundary. When triggers accumulated, the slot list is replaced by
    /// the parsed contents of slots `0..count`; returns whether it was.
    /// Cached redraws never outlive the tick they were drawn in.
    pub fn on_tick(&mut self) -> bool {
        let redraws = std::mem::take(&mut self.redraws);
        let expected = std::mem::take(&mut self.expected_slots);
        if expected == 0 {
            return false;
        }
        self.slots = (0..expected)
            .filter_map(|slot| {
                let redraw = redraws.get(&slot)?;
                let materials = parse_materials(&redraw.materials_text);
                (!materials.is_empty()).then(|| BuildSlotState {
                    slot,
                    materials,
                    buildable: redraw.buildable,
                })
            })
            .collect();
        log::debug!("build menu refreshed: {} slot(s) with plank materials", self.slots.len());
        true
    }

    #[must_use]
    pub fn slots(&self) -> &[BuildSlotState] {
        &self.slots
    }

    /// A slot was confirmed. Returns its state and clears the list.
    pub fn take_confirmed(&mut self, slot: usize) -> Option<BuildSlotState> {
        let slots = std::mem::take(&mut self.slots);
        slots.into_iter().find(|state| state.slot == slot)
    }
}
