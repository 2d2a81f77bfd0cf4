//! Mahogany Homes Helper Engine
//!
//! Host-agnostic core of the Mahogany Homes helper: plank sack estimation,
//! contract and supply tracking, and marker visibility sync.
//! Hosts feed [`HostEvent`]s into a [`HelperSession`] and supply storage
//! through the [`ProfileStore`] and [`MarkerStore`] traits.

pub mod build_menu;
pub mod chat;
pub mod config;
pub mod constants;
pub mod contract;
pub mod error;
pub mod events;
pub mod inventory;
pub mod marker_store;
pub mod markers;
pub mod plank;
pub mod sack;
pub mod session;
pub mod sync;
pub mod tables;

#[cfg(feature = "async")]
pub mod actor;

// Re-export commonly used types
pub use build_menu::{BuildMenuTracker, BuildSlotState, MaterialRequirement};
pub use chat::{ChatChannel, TextEvent, classify_line};
pub use config::HelperConfig;
pub use contract::{City, Contract, ContractState, SupplyLevels, SupplyStatus, SupplyThresholds};
pub use error::{ConfigError, MarkerRefError, MarkerStoreError};
pub use events::{HostEvent, MenuActionEvent, MenuActionKind, MenuWidget};
pub use inventory::{InventorySnapshot, ItemStack};
pub use marker_store::{
    LiveMarkers, MarkerRecord, MarkerStore, MemoryMarkerStore, NoLiveMarkers, VisibilityChange,
    available_markers, read_markers, write_visibility,
};
pub use markers::{MarkerBindings, MarkerRef, MarkerRole, MarkerSource};
pub use plank::PlankGrade;
pub use sack::{PlankEstimate, SackEstimator};
pub use session::{EventOutcome, HelperSession, SessionSnapshot};
pub use sync::MarkerSyncController;

/// Profile-scoped persistence for the sack estimate.
///
/// Implementations store a single integer, `-1` meaning unknown, under
/// [`constants::SACK_CONFIG_GROUP`] / [`constants::SACK_KEY`] of the active
/// profile.
pub trait ProfileStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the stored estimate, `None` when nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load_estimate(&self) -> Result<Option<i32>, Self::Error>;

    /// Persist the estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn save_estimate(&mut self, value: i32) -> Result<(), Self::Error>;
}

/// Profile store kept in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryProfileStore {
    estimate: Option<i32>,
}

impl MemoryProfileStore {
    #[must_use]
    pub const fn new(estimate: Option<i32>) -> Self {
        Self { estimate }
    }

    #[must_use]
    pub const fn stored(&self) -> Option<i32> {
        self.estimate
    }
}

impl ProfileStore for MemoryProfileStore {
    type Error = std::convert::Infallible;

    fn load_estimate(&self) -> Result<Option<i32>, Self::Error> {
        Ok(self.estimate)
    }

    fn save_estimate(&mut self, value: i32) -> Result<(), Self::Error> {
        self.estimate = Some(value);
        Ok(())
    }
}
