//! Plank grades accepted by contracts and the sack.
use serde::{Deserialize, Serialize};

use crate::constants::{ITEM_MAHOGANY_PLANK, ITEM_OAK_PLANK, ITEM_PLANK, ITEM_TEAK_PLANK};

/// Static data describing one plank grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlankGradeInfo {
    /// Label shown in configuration surfaces.
    pub display_name: &'static str,
    /// Name used by the construction menu material list.
    pub material_name: &'static str,
    /// Client item id.
    pub item_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlankGrade {
    #[default]
    Plank,
    Oak,
    Teak,
    Mahogany,
}

static GRADE_TABLE: [PlankGradeInfo; 4] = [
    PlankGradeInfo {
        display_name: "Planks",
        material_name: "Plank",
        item_id: ITEM_PLANK,
    },
    PlankGradeInfo {
        display_name: "Oak Planks",
        material_name: "Oak plank",
        item_id: ITEM_OAK_PLANK,
    },
    PlankGradeInfo {
        display_name: "Teak Planks",
        material_name: "Teak plank",
        item_id: ITEM_TEAK_PLANK,
    },
    PlankGradeInfo {
        display_name: "Mahogany Planks",
        material_name: "Mahogany plank",
        item_id: ITEM_MAHOGANY_PLANK,
    },
];

impl PlankGrade {
    pub const ALL: [Self; 4] = [Self::Plank, Self::Oak, Self::Teak, Self::Mahogany];

    #[must_use]
    pub fn info(self) -> &'static PlankGradeInfo {
        &GRADE_TABLE[self as usize]
    }

    #[must_use]
    pub fn item_id(self) -> u32 {
        self.info().item_id
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    #[must_use]
    pub fn from_item_id(item_id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|grade| grade.item_id() == item_id)
    }

    /// Resolve a construction menu material name (exact match).
    #[must_use]
    pub fn from_material_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|grade| grade.info().material_name == name)
    }

    /// Whether the item id is any tracked plank grade.
    #[must_use]
    pub fn is_plank(item_id: u32) -> bool {
        Self::from_item_id(item_id).is_some()
    }
}

impl std::fmt::Display for PlankGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookups_agree() {
        for grade in PlankGrade::ALL {
            assert_eq!(PlankGrade::from_item_id(grade.item_id()), Some(grade));
            assert_eq!(
                PlankGrade::from_material_name(grade.info().material_name),
                Some(grade)
            );
        }
        assert_eq!(PlankGrade::from_item_id(2353), None);
        assert_eq!(PlankGrade::from_material_name("oak plank"), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&PlankGrade::Mahogany).unwrap();
        assert_eq!(json, "\"mahogany\"");
        assert_eq!(PlankGrade::default().to_string(), "Planks");
    }
}
