//! Contract tracking and supply threshold resolution.
use serde::{Deserialize, Serialize};

use crate::config::HelperConfig;
use crate::plank::PlankGrade;
use crate::sack::PlankEstimate;
use crate::tables;

/// City a contract can be assigned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Varrock,
    Falador,
    Ardougne,
    Hosidius,
}

impl City {
    pub const ALL: [Self; 4] = [Self::Varrock, Self::Falador, Self::Ardougne, Self::Hosidius];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Varrock => "varrock",
            Self::Falador => "falador",
            Self::Ardougne => "ardougne",
            Self::Hosidius => "hosidius",
        }
    }

    /// Parse a city token as it appears in chat, ignoring case and a trailing
    /// ` market`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let lowered = token.trim().to_lowercase();
        let name = lowered.strip_suffix(" market").unwrap_or(&lowered);
        Self::ALL.into_iter().find(|city| city.key() == name)
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Currently assigned contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub city: City,
    pub npc: String,
}

impl Contract {
    #[must_use]
    pub fn new(city: City, npc: impl Into<String>) -> Self {
        Self {
            city,
            npc: npc.into(),
        }
    }
}

/// Minimum supplies before a warning marker is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyThresholds {
    pub min_planks: i32,
    pub min_steel_bars: i32,
}

/// Supply levels observed at one recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyLevels {
    pub inventory_planks: i32,
    pub inventory_steel_bars: i32,
}

/// Outcome of a low-supply recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupplyStatus {
    pub low_planks: bool,
    pub low_steel: bool,
}

/// Contract lifecycle. There is no way back to `NoContract`; a new
/// assignment simply replaces the active one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContractState {
    #[default]
    NoContract,
    Active(Contract),
}

/// Result of applying a new assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTransition {
    pub previous: Option<City>,
    pub current: Contract,
}

impl ContractState {
    #[must_use]
    pub const fn contract(&self) -> Option<&Contract> {
        match self {
            Self::NoContract => None,
            Self::Active(contract) => Some(contract),
        }
    }

    #[must_use]
    pub fn city(&self) -> Option<City> {
        self.contract().map(|contract| contract.city)
    }

    /// Replace the current contract wholesale.
    pub fn assign(&mut self, contract: Contract) -> ContractTransition {
        let previous = self.city();
        *self = Self::Active(contract.clone());
        ContractTransition {
            previous,
            current: contract,
        }
    }

    /// Thresholds in force for the current contract and configuration.
    ///
    /// Dynamic mode looks the contract up in the requirement table and falls
    /// back to the configured constants when no row exists.
    #[must_use]
    pub fn thresholds(&self, config: &HelperConfig) -> SupplyThresholds {
        let fixed = SupplyThresholds {
            min_planks: config.min_planks,
            min_steel_bars: config.min_steel_bars,
        };
        if !config.dynamic_minimums {
            return fixed;
        }
        self.contract()
            .and_then(|contract| dynamic_thresholds(contract, config.plank_grade))
            .unwrap_or(fixed)
    }
}

fn dynamic_thresholds(contract: &Contract, grade: PlankGrade) -> Option<SupplyThresholds> {
    tables::contract_requirement(contract.city, &contract.npc, grade).map(|req| SupplyThresholds {
        min_planks: req.max_planks,
        min_steel_bars: req.max_steel_bars,
    })
}

/// Evaluate both low-supply conditions. An unknown sack counts as empty.
#[must_use]
pub fn evaluate_supplies(
    levels: SupplyLevels,
    estimate: PlankEstimate,
    thresholds: SupplyThresholds,
) -> SupplyStatus {
    let sack = estimate.count().map_or(0, i32::from);
    SupplyStatus {
        low_planks: levels.inventory_planks.saturating_add(sack) < thresholds.min_planks,
        low_steel: levels.inventory_steel_bars < thresholds.min_steel_bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_tokens_normalize() {
        assert_eq!(City::from_token("VARROCK"), Some(City::Varrock));
        assert_eq!(City::from_token("Ardougne market"), Some(City::Ardougne));
        assert_eq!(City::from_token("Hosidius "), Some(City::Hosidius));
        assert_eq!(City::from_token("Lumbridge"), None);
    }

    #[test]
    fn assign_reports_previous_city() {
        let mut state = ContractState::default();
        let first = state.assign(Contract::new(City::Varrock, "Bob"));
        assert_eq!(first.previous, None);
        let second = state.assign(Contract::new(City::Falador, "Tau"));
        assert_eq!(second.previous, Some(City::Varrock));
        assert_eq!(state.city(), Some(City::Falador));
    }

    #[test]
    fn thresholds_use_table_in_dynamic_mode() {
        let mut config = HelperConfig::default();
        let mut state = ContractState::default();
        state.assign(Contract::new(City::Varrock, "BOB"));

        assert_eq!(
            state.thresholds(&config),
            SupplyThresholds {
                min_planks: 10,
                min_steel_bars: 1
            }
        );

        config.dynamic_minimums = true;
        config.plank_grade = PlankGrade::Teak;
        assert_eq!(
            state.thresholds(&config),
            SupplyThresholds {
                min_planks: 17,
                min_steel_bars: 0
            }
        );
    }

    #[test]
    fn dynamic_mode_falls_back_without_row() {
        let config = HelperConfig {
            dynamic_minimums: true,
            min_planks: 6,
            ..HelperConfig::default()
        };
        let mut state = ContractState::default();
        assert_eq!(state.thresholds(&config).min_planks, 6);
        state.assign(Contract::new(City::Varrock, "Stranger"));
        assert_eq!(state.thresholds(&config).min_planks, 6);
    }

    #[test]
    fn unknown_sack_counts_as_empty() {
        let thresholds = SupplyThresholds {
            min_planks: 10,
            min_steel_bars: 1,
        };
        let levels = SupplyLevels {
            inventory_planks: 6,
            inventory_steel_bars: 1,
        };
        let unknown = evaluate_supplies(levels, PlankEstimate::Unknown, thresholds);
        assert!(unknown.low_planks);
        assert!(!unknown.low_steel);

        let known = evaluate_supplies(levels, PlankEstimate::known(4), thresholds);
        assert!(!known.low_planks);
    }

    #[test]
    fn huge_plank_stack_saturates_instead_of_wrapping() {
        let thresholds = SupplyThresholds {
            min_planks: 10,
            min_steel_bars: 1,
        };
        let levels = SupplyLevels {
            inventory_planks: i32::MAX,
            inventory_steel_bars: 0,
        };
        let status = evaluate_supplies(levels, PlankEstimate::known(28), thresholds);
        assert!(!status.low_planks);
        assert!(status.low_steel);
    }
}
