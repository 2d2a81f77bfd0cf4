//! Drives marker visibility from contract and supply state.
use crate::contract::{City, SupplyStatus};
use crate::marker_store::{
    self, LiveMarkers, MarkerStore, NoLiveMarkers, VisibilityChange,
};
use crate::markers::{MarkerBindings, MarkerRef, MarkerRole};

/// Owns the marker store handle and the role bindings.
#[derive(Debug)]
pub struct MarkerSyncController<M, L = NoLiveMarkers>
where
    M: MarkerStore,
    L: LiveMarkers,
{
    store: M,
    live: L,
    bindings: MarkerBindings,
    current_city_marker: Option<MarkerRef>,
}

impl<M> MarkerSyncController<M, NoLiveMarkers>
where
    M: MarkerStore,
{
    pub fn new(store: M, bindings: MarkerBindings) -> Self {
        Self::with_live(store, NoLiveMarkers, bindings)
    }
}

impl<M, L> MarkerSyncController<M, L>
where
    M: MarkerStore,
    L: LiveMarkers,
{
    pub fn with_live(store: M, live: L, bindings: MarkerBindings) -> Self {
        Self {
            store,
            live,
            bindings,
            current_city_marker: None,
        }
    }

    pub fn store(&self) -> &M {
        &self.store
    }

    pub fn live(&self) -> &L {
        &self.live
    }

    pub fn set_bindings(&mut self, bindings: MarkerBindings) {
        self.bindings = bindings;
    }

    /// Marker enabled by the last contract transition, if any.
    pub fn current_city_marker(&self) -> Option<&MarkerRef> {
        self.current_city_marker.as_ref()
    }

    /// Markers offered for binding.
    pub fn available_markers(&self) -> Vec<MarkerRef> {
        marker_store::available_markers(&self.store)
    }

    /// Write `visible` for `marker` and mirror it onto the live view.
    ///
    /// Store failures are logged and reported as `None`; nothing is retried.
    pub fn set_visibility(&mut self, marker: &MarkerRef, visible: bool) -> Option<VisibilityChange> {
        if marker.id < 0 {
            return None;
        }
        let change = match marker_store::write_visibility(
            &mut self.store,
            marker.source,
            marker.id,
            marker.group.as_deref(),
            visible,
        ) {
            Ok(change) => change,
            Err(err) => {
                log::warn!("skipping marker {marker} visibility update: {err}");
                return None;
            }
        };
        if change == VisibilityChange::Updated {
            log::debug!("marker {marker} visible={visible}");
            if !self.live.set_visible(marker, visible) {
                log::debug!("no live copy of marker {marker} to update");
            }
        }
        Some(change)
    }

    fn set_role(&mut self, role: MarkerRole, visible: bool) {
        if let Some(marker) = self.bindings.get(role).cloned() {
            self.set_visibility(&marker, visible);
        }
    }

    /// Contract moved to `city`: hide every other city marker, then show this
    /// city's marker when one is bound.
    pub fn activate_city(&mut self, city: City) -> Option<&MarkerRef> {
        for other in City::ALL.into_iter().filter(|other| *other != city) {
            self.set_role(MarkerRole::for_city(other), false);
        }
        self.current_city_marker = self.bindings.get(MarkerRole::for_city(city)).cloned();
        if let Some(marker) = self.current_city_marker.clone() {
            self.set_visibility(&marker, true);
        }
        self.current_city_marker.as_ref()
    }

    /// Show or hide the two supply warnings.
    ///
    /// A warning bound to the active city marker is never hidden here.
    pub fn apply_supply_status(&mut self, status: SupplyStatus) {
        self.apply_supply_condition(MarkerRole::LowPlanks, status.low_planks);
        self.apply_supply_condition(MarkerRole::LowSteel, status.low_steel);
    }

    fn apply_supply_condition(&mut self, role: MarkerRole, low: bool) {
        let Some(marker) = self.bindings.get(role).cloned() else {
            return;
        };
        if low {
            self.set_visibility(&marker, true);
        } else if self.current_city_marker.as_ref() != Some(&marker) {
            self.set_visibility(&marker, false);
        }
    }

    /// Hide all six bound markers and forget the active city marker.
    pub fn disable_all(&mut self) {
        for role in MarkerRole::ALL {
            self.set_role(role, false);
        }
        self.current_city_marker = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker_store::{MemoryMarkerStore, read_markers};
    use crate::markers::MarkerSource;
    use serde_json::json;

    fn controller(bindings: MarkerBindings) -> MarkerSyncController<MemoryMarkerStore> {
        let store = MemoryMarkerStore::new().with_document(
            MarkerSource::Plain,
            json!([
                {"id": 1, "name": "Varrock", "visible": false},
                {"id": 2, "name": "Falador", "visible": true},
                {"id": 3, "name": "Planks", "visible": false},
            ])
            .to_string(),
        );
        MarkerSyncController::new(store, bindings)
    }

    fn visible(sync: &MarkerSyncController<MemoryMarkerStore>, id: i64) -> bool {
        read_markers(sync.store(), MarkerSource::Plain)
            .into_iter()
            .find(|marker| marker.id == id)
            .is_some_and(|marker| marker.visible)
    }

    #[test]
    fn city_switch_hides_other_cities() {
        let mut sync = controller(MarkerBindings::from_raw(|role| match role {
            MarkerRole::Varrock => "markers|null|1",
            MarkerRole::Falador => "markers|null|2",
            _ => "",
        }));
        assert_eq!(sync.activate_city(City::Varrock), Some(&MarkerRef::plain(1)));
        assert!(visible(&sync, 1));
        assert!(!visible(&sync, 2));

        sync.activate_city(City::Hosidius);
        assert!(!visible(&sync, 1));
        assert_eq!(sync.current_city_marker(), None);
    }

    #[test]
    fn supply_marker_shared_with_city_stays_visible() {
        let mut sync = controller(MarkerBindings::from_raw(|role| match role {
            MarkerRole::Varrock | MarkerRole::LowPlanks => "markers|null|1",
            _ => "",
        }));
        sync.activate_city(City::Varrock);
        sync.apply_supply_status(SupplyStatus::default());
        assert!(visible(&sync, 1));

        sync.disable_all();
        assert!(!visible(&sync, 1));
        assert_eq!(sync.current_city_marker(), None);
    }

    #[test]
    fn supply_condition_toggles_marker() {
        let mut sync = controller(MarkerBindings::from_raw(|role| match role {
            MarkerRole::LowPlanks => "markers|null|3",
            _ => "",
        }));
        sync.apply_supply_status(SupplyStatus {
            low_planks: true,
            low_steel: false,
        });
        assert!(visible(&sync, 3));
        sync.apply_supply_status(SupplyStatus::default());
        assert!(!visible(&sync, 3));
    }

    #[test]
    fn unresolved_marker_is_a_no_op() {
        let mut sync = controller(MarkerBindings::default());
        let before = sync.store().clone();
        assert_eq!(
            sync.set_visibility(&MarkerRef::plain(77), true),
            Some(VisibilityChange::NotFound)
        );
        assert_eq!(sync.set_visibility(&MarkerRef::plain(-1), true), None);
        assert_eq!(sync.store(), &before);
    }
}
