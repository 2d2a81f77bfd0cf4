//! References to externally owned screen markers and the six roles they can
//! be bound to.
//!
//! A reference is stored as the composite string `source|group|id`, where
//! `group` is the literal `null` for ungrouped markers and an empty string
//! means "no marker selected".
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::constants::{
    GROUPED_MARKER_CONFIG_GROUP, GROUPED_MARKER_KEY, MARKER_REF_NULL_GROUP, MARKER_REF_SEPARATOR,
    PLAIN_MARKER_CONFIG_GROUP, PLAIN_MARKER_KEY,
};
use crate::contract::City;
use crate::error::MarkerRefError;

/// Which of the two marker stores a marker lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSource {
    /// A flat list of markers.
    Plain,
    /// Markers organised into named groups.
    Grouped,
}

impl MarkerSource {
    pub const ALL: [Self; 2] = [Self::Plain, Self::Grouped];

    /// Storage key, also used as the first part of a composite reference.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Plain => PLAIN_MARKER_KEY,
            Self::Grouped => GROUPED_MARKER_KEY,
        }
    }

    #[must_use]
    pub const fn config_group(self) -> &'static str {
        match self {
            Self::Plain => PLAIN_MARKER_CONFIG_GROUP,
            Self::Grouped => GROUPED_MARKER_CONFIG_GROUP,
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|source| source.key() == key)
    }
}

/// Identity of a foreign marker.
///
/// Equality and hashing use `id`, `group` and `source` only; the display name
/// is informational and absent when the reference was decoded from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerRef {
    pub id: i64,
    pub group: Option<String>,
    pub source: MarkerSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MarkerRef {
    #[must_use]
    pub const fn plain(id: i64) -> Self {
        Self {
            id,
            group: None,
            source: MarkerSource::Plain,
            name: None,
        }
    }

    #[must_use]
    pub fn grouped(id: i64, group: impl Into<String>) -> Self {
        Self {
            id,
            group: Some(group.into()),
            source: MarkerSource::Grouped,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label for selection lists: `name (group)` when grouped.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        match self.group.as_deref() {
            Some(group) if !group.is_empty() => format!("{name} ({group})"),
            _ => name.to_string(),
        }
    }

    /// Encode as a composite reference string.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for MarkerRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.group == other.group && self.source == other.source
    }
}

impl Eq for MarkerRef {}

impl Hash for MarkerRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.group.hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for MarkerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.group.as_deref().unwrap_or(MARKER_REF_NULL_GROUP);
        write!(
            f,
            "{}{MARKER_REF_SEPARATOR}{group}{MARKER_REF_SEPARATOR}{}",
            self.source.key(),
            self.id
        )
    }
}

impl FromStr for MarkerRef {
    type Err = MarkerRefError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(MarkerRefError::Empty);
        }
        let mut parts = raw.splitn(3, MARKER_REF_SEPARATOR);
        let (Some(key), Some(group), Some(id)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(MarkerRefError::Shape(raw.to_string()));
        };
        let source =
            MarkerSource::from_key(key).ok_or_else(|| MarkerRefError::UnknownSource(key.to_string()))?;
        let id = id
            .parse::<i64>()
            .ok()
            .filter(|id| *id >= 0)
            .ok_or_else(|| MarkerRefError::InvalidId(id.to_string()))?;
        let group = (!group.eq_ignore_ascii_case(MARKER_REF_NULL_GROUP)).then(|| group.to_string());
        Ok(Self {
            id,
            group,
            source,
            name: None,
        })
    }
}

/// Decode a stored binding; an empty or malformed string means "none".
#[must_use]
pub fn parse_binding(raw: &str) -> Option<MarkerRef> {
    match raw.parse::<MarkerRef>() {
        Ok(marker) => Some(marker),
        Err(MarkerRefError::Empty) => None,
        Err(err) => {
            log::debug!("ignoring marker binding: {err}");
            None
        }
    }
}

/// Encode an optional binding for storage.
#[must_use]
pub fn encode_binding(marker: Option<&MarkerRef>) -> String {
    marker.map(MarkerRef::encode).unwrap_or_default()
}

/// Logical marker slots the helper drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Varrock,
    Falador,
    Ardougne,
    Hosidius,
    LowPlanks,
    LowSteel,
}

impl MarkerRole {
    pub const ALL: [Self; 6] = [
        Self::Varrock,
        Self::Falador,
        Self::Ardougne,
        Self::Hosidius,
        Self::LowPlanks,
        Self::LowSteel,
    ];

    #[must_use]
    pub const fn for_city(city: City) -> Self {
        match city {
            City::Varrock => Self::Varrock,
            City::Falador => Self::Falador,
            City::Ardougne => Self::Ardougne,
            City::Hosidius => Self::Hosidius,
        }
    }

    #[must_use]
    pub const fn city(self) -> Option<City> {
        match self {
            Self::Varrock => Some(City::Varrock),
            Self::Falador => Some(City::Falador),
            Self::Ardougne => Some(City::Ardougne),
            Self::Hosidius => Some(City::Hosidius),
            Self::LowPlanks | Self::LowSteel => None,
        }
    }

    /// Configuration key holding this role's composite reference.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Varrock => "varrockMarkerInfo",
            Self::Falador => "faladorMarkerInfo",
            Self::Ardougne => "ardougneMarkerInfo",
            Self::Hosidius => "hosidiusMarkerInfo",
            Self::LowPlanks => "lowPlanksMarkerInfo",
            Self::LowSteel => "lowSteelMarkerInfo",
        }
    }
}

impl fmt::Display for MarkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Varrock => "Varrock",
            Self::Falador => "Falador",
            Self::Ardougne => "Ardougne",
            Self::Hosidius => "Hosidius",
            Self::LowPlanks => "Low planks",
            Self::LowSteel => "Low steel",
        };
        f.write_str(label)
    }
}

/// Resolved marker for each role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerBindings {
    slots: [Option<MarkerRef>; 6],
}

impl MarkerBindings {
    /// Decode every role from `raw(role)`.
    pub fn from_raw<'a>(mut raw: impl FnMut(MarkerRole) -> &'a str) -> Self {
        let mut bindings = Self::default();
        for role in MarkerRole::ALL {
            bindings.slots[role as usize] = parse_binding(raw(role));
        }
        bindings
    }

    #[must_use]
    pub fn get(&self, role: MarkerRole) -> Option<&MarkerRef> {
        self.slots[role as usize].as_ref()
    }

    pub fn set(&mut self, role: MarkerRole, marker: Option<MarkerRef>) {
        self.slots[role as usize] = marker;
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarkerRole, &MarkerRef)> + '_ {
        MarkerRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|marker| (role, marker)))
    }
}
