//! Static lookup tables for contract furniture and supply requirements.
//!
//! The data ships as JSON next to the crate and is parsed once on first use.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::contract::City;
use crate::plank::PlankGrade;

const FURNITURE_COSTS_DATA: &str = include_str!("../assets/furniture_costs.json");
const FURNITURE_OBJECTS_DATA: &str = include_str!("../assets/furniture_objects.json");
const CONTRACT_REQUIREMENTS_DATA: &str = include_str!("../assets/contract_requirements.json");

/// Materials one piece of furniture consumes when repaired or built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FurnitureCost {
    #[serde(default)]
    pub planks: i32,
    #[serde(default)]
    pub bars: i32,
}

#[derive(Debug, Clone, Deserialize)]
struct FurnitureEntry {
    name: String,
    #[serde(flatten)]
    cost: FurnitureCost,
}

/// Largest plank and steel bar demand of a whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRequirement {
    pub max_planks: i32,
    pub max_steel_bars: i32,
}

type ByNpc<T> = BTreeMap<String, BTreeMap<String, T>>;

fn furniture_costs() -> &'static ByNpc<Vec<FurnitureEntry>> {
    static TABLE: OnceLock<ByNpc<Vec<FurnitureEntry>>> = OnceLock::new();
    TABLE.get_or_init(|| serde_json::from_str(FURNITURE_COSTS_DATA).expect("valid furniture costs"))
}

fn furniture_objects() -> &'static BTreeMap<i32, String> {
    static TABLE: OnceLock<BTreeMap<i32, String>> = OnceLock::new();
    TABLE.get_or_init(|| {
        serde_json::from_str(FURNITURE_OBJECTS_DATA).expect("valid furniture object ids")
    })
}

fn contract_requirements() -> &'static ByNpc<BTreeMap<String, (i32, i32)>> {
    static TABLE: OnceLock<ByNpc<BTreeMap<String, (i32, i32)>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        serde_json::from_str(CONTRACT_REQUIREMENTS_DATA).expect("valid contract requirements")
    })
}

fn instance_suffix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\(\d+\)$").expect("valid instance suffix pattern"))
}

/// Normalize a furniture name for lookup: trailing `(n)` removed, lowercased.
#[must_use]
pub fn normalize_furniture_name(name: &str) -> String {
    instance_suffix().replace(name.trim(), "").to_lowercase()
}

const fn grade_key(grade: PlankGrade) -> &'static str {
    match grade {
        PlankGrade::Plank => "plank",
        PlankGrade::Oak => "oak",
        PlankGrade::Teak => "teak",
        PlankGrade::Mahogany => "mahogany",
    }
}

fn npc_row<'a, T>(table: &'a ByNpc<T>, city: City, npc: &str) -> Option<&'a T> {
    table.get(city.key())?.get(&npc.trim().to_lowercase())
}

/// Cost of `furniture` in the given contract, matched case-insensitively.
#[must_use]
pub fn furniture_cost(city: City, npc: &str, furniture: &str) -> Option<FurnitureCost> {
    let wanted = normalize_furniture_name(furniture);
    npc_row(furniture_costs(), city, npc)?
        .iter()
        .find(|entry| entry.name.to_lowercase() == wanted)
        .map(|entry| entry.cost)
}

/// Furniture name for a buildable scene object.
#[must_use]
pub fn furniture_for_object(object_id: i32) -> Option<&'static str> {
    furniture_objects().get(&object_id).map(String::as_str)
}

/// Per-contract supply requirement for dynamic minimums.
#[must_use]
pub fn contract_requirement(city: City, npc: &str, grade: PlankGrade) -> Option<ContractRequirement> {
    let &(max_planks, max_steel_bars) = npc_row(contract_requirements(), city, npc)?.get(grade_key(grade))?;
    Some(ContractRequirement {
        max_planks,
        max_steel_bars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn furniture_lookup_ignores_case_and_instance_suffix() {
        let cost = furniture_cost(City::Varrock, "Bob", "LARGE TABLE (2)").unwrap();
        assert_eq!(cost, FurnitureCost { planks: 4, bars: 0 });
        assert_eq!(
            furniture_cost(City::Falador, "tau", "Sink"),
            Some(FurnitureCost { planks: 0, bars: 1 })
        );
        assert_eq!(furniture_cost(City::Falador, "tau", "Bathtub"), None);
        assert_eq!(furniture_cost(City::Falador, "Nobody", "Table"), None);
    }

    #[test]
    fn every_object_resolves_in_some_contract() {
        for (id, name) in furniture_objects() {
            let known = City::ALL.iter().any(|&city| {
                furniture_costs()
                    .get(city.key())
                    .into_iter()
                    .flat_map(BTreeMap::keys)
                    .any(|npc| furniture_cost(city, npc, name).is_some())
            });
            assert!(known, "object {id} ({name}) has no cost row");
        }
        assert_eq!(furniture_for_object(39981), Some("Large table"));
        assert_eq!(furniture_for_object(1), None);
    }

    #[test]
    fn requirements_cover_every_grade() {
        for (city_key, npcs) in contract_requirements() {
            for (npc, grades) in npcs {
                for grade in PlankGrade::ALL {
                    assert!(
                        grades.contains_key(grade_key(grade)),
                        "{city_key}/{npc} missing {grade:?}"
                    );
                }
            }
        }
        assert_eq!(
            contract_requirement(City::Hosidius, "Leela", PlankGrade::Mahogany),
            Some(ContractRequirement {
                max_planks: 13,
                max_steel_bars: 1
            })
        );
    }
}
