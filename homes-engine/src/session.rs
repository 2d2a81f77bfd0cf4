//! Single owner of all helper state.
//!
//! A [`HelperSession`] consumes [`HostEvent`]s one at a time. Every estimate
//! mutation is persisted and followed by a supply recompute before the next
//! event is looked at.
use serde::{Deserialize, Serialize};

use crate::ProfileStore;
use crate::chat::{self, TextEvent};
use crate::config::HelperConfig;
use crate::constants::{INVENTORY_CONTAINER_ID, ITEM_STEEL_BAR};
use crate::contract::{
    City, Contract, ContractState, SupplyLevels, SupplyStatus, SupplyThresholds, evaluate_supplies,
};
use crate::build_menu::{BuildMenuTracker, BuildSlotState};
use crate::events::{HostEvent, MenuActionEvent};
use crate::inventory::{self, InventorySnapshot, ItemStack};
use crate::marker_store::{LiveMarkers, MarkerStore, NoLiveMarkers};
use crate::markers::{MarkerRef, MarkerRole};
use crate::sack::{PlankEstimate, SackEstimator};
use crate::sync::MarkerSyncController;
use crate::tables;

/// What a single event changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    /// New estimate when the event mutated it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<PlankEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<Contract>,
    /// Supply status when a recompute ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplies: Option<SupplyStatus>,
}

/// Read-only view of the session, for status surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub estimate: PlankEstimate,
    pub contract: Option<Contract>,
    pub thresholds: SupplyThresholds,
    pub supplies: SupplyStatus,
    pub current_city_marker: Option<MarkerRef>,
    pub build_slots: Vec<BuildSlotState>,
}

pub struct HelperSession<P, M, L = NoLiveMarkers>
where
    P: ProfileStore,
    M: MarkerStore,
    L: LiveMarkers,
{
    config: HelperConfig,
    profile: P,
    sack: SackEstimator,
    contract: ContractState,
    build_menu: BuildMenuTracker,
    sync: MarkerSyncController<M, L>,
    inventory: Option<Vec<ItemStack>>,
    last_clicked_object: i32,
    supplies: SupplyStatus,
}

impl<P, M> HelperSession<P, M, NoLiveMarkers>
where
    P: ProfileStore,
    M: MarkerStore,
{
    pub fn new(config: HelperConfig, profile: P, store: M) -> Self {
        Self::with_live(config, profile, store, NoLiveMarkers)
    }
}

impl<P, M, L> HelperSession<P, M, L>
where
    P: ProfileStore,
    M: MarkerStore,
    L: LiveMarkers,
{
    /// Build a session, load the persisted estimate and bring the supply
    /// markers in line with it.
    pub fn with_live(config: HelperConfig, profile: P, store: M, live: L) -> Self {
        let bindings = config.bindings();
        let mut session = Self {
            config,
            profile,
            sack: SackEstimator::default(),
            contract: ContractState::default(),
            build_menu: BuildMenuTracker::new(),
            sync: MarkerSyncController::with_live(store, live, bindings),
            inventory: None,
            last_clicked_object: -1,
            supplies: SupplyStatus::default(),
        };
        session.reload_estimate();
        session.recompute_supplies();
        session
    }

    /// Load the persisted estimate, replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile store cannot be read; the estimate is
    /// left untouched in that case.
    pub fn restore_estimate(&mut self) -> Result<PlankEstimate, anyhow::Error>
    where
        P::Error: Into<anyhow::Error>,
    {
        let stored = self.profile.load_estimate().map_err(Into::into)?;
        let estimate = stored.map_or(PlankEstimate::Unknown, PlankEstimate::decode);
        self.sack.restore(estimate);
        Ok(estimate)
    }

    fn reload_estimate(&mut self) {
        match self.profile.load_estimate() {
            Ok(stored) => {
                let estimate = stored.map_or(PlankEstimate::Unknown, PlankEstimate::decode);
                log::debug!("restored sack estimate: {estimate}");
                self.sack.restore(estimate);
            }
            Err(err) => log::warn!("could not load sack estimate: {err}"),
        }
    }

    #[must_use]
    pub const fn estimate(&self) -> PlankEstimate {
        self.sack.estimate()
    }

    #[must_use]
    pub const fn contract(&self) -> Option<&Contract> {
        self.contract.contract()
    }

    #[must_use]
    pub const fn config(&self) -> &HelperConfig {
        &self.config
    }

    #[must_use]
    pub const fn supplies(&self) -> SupplyStatus {
        self.supplies
    }

    /// Thresholds currently in force, dynamic or configured.
    #[must_use]
    pub fn effective_thresholds(&self) -> SupplyThresholds {
        self.contract.thresholds(&self.config)
    }

    #[must_use]
    pub fn build_slots(&self) -> &[BuildSlotState] {
        self.build_menu.slots()
    }

    #[must_use]
    pub fn profile(&self) -> &P {
        &self.profile
    }

    #[must_use]
    pub fn marker_store(&self) -> &M {
        self.sync.store()
    }

    #[must_use]
    pub fn live_markers(&self) -> &L {
        self.sync.live()
    }

    #[must_use]
    pub fn available_markers(&self) -> Vec<MarkerRef> {
        self.sync.available_markers()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            estimate: self.estimate(),
            contract: self.contract().cloned(),
            thresholds: self.effective_thresholds(),
            supplies: self.supplies,
            current_city_marker: self.sync.current_city_marker().cloned(),
            build_slots: self.build_menu.slots().to_vec(),
        }
    }

    /// Apply one host event.
    pub fn handle(&mut self, event: HostEvent) -> EventOutcome {
        log::trace!("handling {}", event.kind());
        match event {
            HostEvent::ChatLine { channel, text } => self.on_text(chat::classify_line(channel, &text)),
            HostEvent::InventoryChanged { container_id, items } => {
                self.on_inventory_changed(container_id, items)
            }
            HostEvent::MenuAction(action) => self.on_menu_action(&action),
            HostEvent::BuildMenuTrigger => {
                self.build_menu.note_trigger();
                EventOutcome::default()
            }
            HostEvent::BuildMenuSlotRedraw {
                slot,
                materials_text,
                buildable,
            } => {
                self.build_menu.record_redraw(slot, materials_text, buildable);
                EventOutcome::default()
            }
            HostEvent::BuildSlotConfirmed { slot } => self.on_build_confirmed(slot),
            HostEvent::Tick => {
                self.build_menu.on_tick();
                EventOutcome::default()
            }
            HostEvent::LoggedIn => {
                self.reload_estimate();
                EventOutcome::default()
            }
            HostEvent::ConfigChanged(config) => self.apply_config(config),
        }
    }

    /// Apply a chat classification.
    pub fn on_text(&mut self, event: TextEvent) -> EventOutcome {
        if event.cancels_pending_comparison() {
            self.sack.cancel_comparison();
        }
        match event {
            TextEvent::ContractAssigned { npc, city } => self.assign_contract(city, npc),
            TextEvent::SackReport { total } => {
                let estimate = self.sack.set_authoritative(total);
                self.commit(estimate)
            }
            TextEvent::SackFull => {
                let estimate = self.sack.set_full();
                self.commit(estimate)
            }
            TextEvent::SackEmpty => {
                let estimate = self.sack.set_empty();
                self.commit(estimate)
            }
            TextEvent::SackNothingToFill | TextEvent::NoMatch => EventOutcome::default(),
        }
    }

    fn assign_contract(&mut self, city: City, npc: String) -> EventOutcome {
        let transition = self.contract.assign(Contract::new(city, npc));
        self.last_clicked_object = -1;
        log::info!(
            "new contract: {} in {} (previous city: {:?})",
            transition.current.npc,
            transition.current.city,
            transition.previous
        );
        self.sync.activate_city(city);
        EventOutcome {
            contract: Some(transition.current),
            supplies: Some(self.recompute_supplies()),
            ..EventOutcome::default()
        }
    }

    fn on_inventory_changed(&mut self, container_id: i32, items: Option<Vec<ItemStack>>) -> EventOutcome {
        if container_id != INVENTORY_CONTAINER_ID {
            return EventOutcome::default();
        }
        self.inventory = items;
        let mut outcome = EventOutcome::default();
        if self.sack.is_comparison_armed() {
            let after = self.inventory.as_deref().map(InventorySnapshot::from_items);
            if let Some(estimate) = self.sack.resolve_comparison(after.as_ref()) {
                self.persist(estimate);
                outcome.estimate = Some(estimate);
            }
        }
        outcome.supplies = Some(self.recompute_supplies());
        outcome
    }

    fn on_menu_action(&mut self, action: &MenuActionEvent) -> EventOutcome {
        if action.is_sack_interaction(self.inventory.as_deref()) {
            let before = self.inventory.as_deref().map(InventorySnapshot::from_items);
            log::debug!("sack interaction `{}`; awaiting inventory change", action.option);
            self.sack.arm_comparison(before);
            return EventOutcome::default();
        }
        if !action.is_furniture_action() {
            return EventOutcome::default();
        }

        let object_id = action.object_id;
        if object_id > 0 && object_id == self.last_clicked_object {
            log::debug!("ignoring repeated click on object {object_id}");
            return EventOutcome::default();
        }
        let outcome = self.deduct_for_furniture(object_id);
        if object_id > 0 {
            self.last_clicked_object = object_id;
        }
        outcome
    }

    fn deduct_for_furniture(&mut self, object_id: i32) -> EventOutcome {
        if object_id <= 0 {
            return EventOutcome::default();
        }
        let Some(contract) = self.contract.contract() else {
            return EventOutcome::default();
        };
        let Some(cost) = tables::furniture_for_object(object_id)
            .and_then(|name| tables::furniture_cost(contract.city, &contract.npc, name))
        else {
            return EventOutcome::default();
        };
        if cost.planks <= 0 || !self.sack.estimate().is_known() {
            return EventOutcome::default();
        }
        let held = inventory::count_item(self.inventory.as_deref(), self.config.plank_grade.item_id());
        let needed = (cost.planks - held).max(0);
        log::debug!("object {object_id} needs {} plank(s), {held} held", cost.planks);
        match self.sack.deduct_for_build(needed) {
            Some(estimate) => self.commit(estimate),
            None => EventOutcome::default(),
        }
    }

    fn on_build_confirmed(&mut self, slot: usize) -> EventOutcome {
        let Some(state) = self.build_menu.take_confirmed(slot) else {
            return EventOutcome::default();
        };
        if !state.buildable || !self.sack.estimate().is_known() {
            return EventOutcome::default();
        }
        let Some(items) = self.inventory.as_deref() else {
            return EventOutcome::default();
        };
        let needed = state.shortfall(&InventorySnapshot::from_items(items));
        match self.sack.deduct_for_build(needed) {
            Some(estimate) => self.commit(estimate),
            None => EventOutcome::default(),
        }
    }

    /// Replace the configuration and re-evaluate markers against it.
    ///
    /// An invalid configuration is rejected and the current one kept.
    pub fn apply_config(&mut self, config: HelperConfig) -> EventOutcome {
        if let Err(err) = config.validate() {
            log::warn!("ignoring invalid configuration: {err}");
            return EventOutcome::default();
        }
        self.config = config;
        self.sync.set_bindings(self.config.bindings());
        EventOutcome {
            supplies: Some(self.recompute_supplies()),
            ..EventOutcome::default()
        }
    }

    /// Bind `role` to `marker` (or clear it) and re-evaluate.
    pub fn set_marker(&mut self, role: MarkerRole, marker: Option<&MarkerRef>) -> EventOutcome {
        let mut config = self.config.clone();
        config.set_marker(role, marker);
        self.apply_config(config)
    }

    /// Hide every helper marker; used when the helper shuts down.
    pub fn disable_all_markers(&mut self) {
        self.sync.disable_all();
    }

    fn persist(&mut self, estimate: PlankEstimate) {
        if let Err(err) = self.profile.save_estimate(estimate.encode()) {
            log::warn!("could not persist sack estimate {estimate}: {err}");
        }
    }

    fn commit(&mut self, estimate: PlankEstimate) -> EventOutcome {
        self.persist(estimate);
        EventOutcome {
            estimate: Some(estimate),
            supplies: Some(self.recompute_supplies()),
            ..EventOutcome::default()
        }
    }

    fn recompute_supplies(&mut self) -> SupplyStatus {
        let items = self.inventory.as_deref();
        let levels = SupplyLevels {
            inventory_planks: inventory::count_item(items, self.config.plank_grade.item_id()),
            inventory_steel_bars: inventory::count_item(items, ITEM_STEEL_BAR),
        };
        let thresholds = self.effective_thresholds();
        let status = evaluate_supplies(levels, self.sack.estimate(), thresholds);
        log::debug!(
            "supplies: planks {}+{} / {}, bars {} / {} -> {status:?}",
            levels.inventory_planks,
            self.sack.estimate(),
            thresholds.min_planks,
            levels.inventory_steel_bars,
            thresholds.min_steel_bars
        );
        self.sync.apply_supply_status(status);
        self.supplies = status;
        status
    }
}
