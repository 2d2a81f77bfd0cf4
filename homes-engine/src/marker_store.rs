//! Read-modify-write access to the external marker stores.
//!
//! The stores are owned by another component and hold more fields than this
//! crate understands. Every write therefore round-trips the complete JSON
//! document through [`serde_json::Value`] and only touches `visible`.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use crate::error::MarkerStoreError;
use crate::markers::{MarkerRef, MarkerSource};

/// Backing storage for the two marker documents.
pub trait MarkerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serialized document for `source`, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read_raw(&self, source: MarkerSource) -> Result<Option<String>, Self::Error>;

    /// Replace the serialized document for `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn write_raw(&mut self, source: MarkerSource, json: &str) -> Result<(), Self::Error>;
}

/// Rendered copy of the markers. Updates are best effort; the store is
/// reloaded as ground truth by its owner.
pub trait LiveMarkers {
    /// Returns whether a live marker was found and updated.
    fn set_visible(&mut self, marker: &MarkerRef, visible: bool) -> bool;
}

/// Live view for hosts that render straight from the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLiveMarkers;

impl LiveMarkers for NoLiveMarkers {
    fn set_visible(&mut self, _marker: &MarkerRef, _visible: bool) -> bool {
        false
    }
}

/// A marker as read from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: i64,
    pub name: String,
    pub visible: bool,
    /// Id of the plain marker this grouped marker was imported from.
    pub imported_id: Option<i64>,
    pub group: Option<String>,
    pub source: MarkerSource,
}

impl MarkerRecord {
    #[must_use]
    pub fn to_ref(&self) -> MarkerRef {
        MarkerRef {
            id: self.id,
            group: self.group.clone(),
            source: self.source,
            name: Some(self.name.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoredMarker {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    visible: bool,
    #[serde(default, rename = "importedId")]
    imported_id: Option<i64>,
}

/// Outcome of a visibility write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityChange {
    /// The store was rewritten.
    Updated,
    /// The marker already had the requested visibility.
    Unchanged,
    /// No marker with that identity exists.
    NotFound,
    /// Nothing is stored for the source.
    Empty,
}

fn backend<E>(source: MarkerSource) -> impl FnOnce(E) -> MarkerStoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |err| MarkerStoreError::Backend {
        key: source.key(),
        source: Box::new(err),
    }
}

fn load_document<S>(store: &S, source: MarkerSource) -> Result<Option<Value>, MarkerStoreError>
where
    S: MarkerStore + ?Sized,
{
    let raw = store.read_raw(source).map_err(backend(source))?;
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| MarkerStoreError::Decode {
            key: source.key(),
            source: err,
        })
}

fn decode_list(
    list: &Value,
    source: MarkerSource,
    group: Option<&str>,
) -> Result<Vec<MarkerRecord>, MarkerStoreError> {
    let stored: Vec<StoredMarker> =
        serde_json::from_value(list.clone()).map_err(|err| MarkerStoreError::Decode {
            key: source.key(),
            source: err,
        })?;
    Ok(stored
        .into_iter()
        .map(|marker| MarkerRecord {
            id: marker.id,
            name: marker.name,
            visible: marker.visible,
            imported_id: marker.imported_id,
            group: group.map(str::to_string),
            source,
        })
        .collect())
}

/// Every marker stored under `source`.
///
/// # Errors
///
/// Returns an error if the backend fails or the document cannot be decoded.
pub fn try_read_markers<S>(store: &S, source: MarkerSource) -> Result<Vec<MarkerRecord>, MarkerStoreError>
where
    S: MarkerStore + ?Sized,
{
    let Some(document) = load_document(store, source)? else {
        return Ok(Vec::new());
    };
    match (source, &document) {
        (MarkerSource::Plain, Value::Array(_)) => decode_list(&document, source, None),
        (MarkerSource::Grouped, Value::Object(groups)) => {
            let mut records = Vec::new();
            for (group, list) in groups {
                if list.is_null() {
                    continue;
                }
                records.extend(decode_list(list, source, Some(group.as_str()))?);
            }
            Ok(records)
        }
        _ => Err(MarkerStoreError::Shape { key: source.key() }),
    }
}

/// Every marker stored under `source`; empty when the store cannot be read.
#[must_use]
pub fn read_markers<S>(store: &S, source: MarkerSource) -> Vec<MarkerRecord>
where
    S: MarkerStore + ?Sized,
{
    try_read_markers(store, source).unwrap_or_else(|err| {
        log::warn!("could not read {}.{}: {err}", source.config_group(), source.key());
        Vec::new()
    })
}

fn find_in_list<'a>(list: &'a mut Value, id: i64) -> Option<&'a mut Map<String, Value>> {
    list.as_array_mut()?
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|marker| marker.get("id").and_then(Value::as_i64) == Some(id))
}

/// Set the `visible` flag of one marker, preserving every other field.
///
/// Grouped markers are only found inside `group`; a grouped lookup without a
/// group never matches.
///
/// # Errors
///
/// Returns an error if the backend fails or the stored document cannot be
/// decoded or re-encoded. Nothing is written in that case.
pub fn write_visibility<S>(
    store: &mut S,
    source: MarkerSource,
    id: i64,
    group: Option<&str>,
    visible: bool,
) -> Result<VisibilityChange, MarkerStoreError>
where
    S: MarkerStore + ?Sized,
{
    let Some(mut document) = load_document(store, source)? else {
        return Ok(VisibilityChange::Empty);
    };
    let list = match source {
        MarkerSource::Plain => {
            if !document.is_array() {
                return Err(MarkerStoreError::Shape { key: source.key() });
            }
            Some(&mut document)
        }
        MarkerSource::Grouped => {
            let groups = document
                .as_object_mut()
                .ok_or(MarkerStoreError::Shape { key: source.key() })?;
            group.and_then(|group| groups.get_mut(group))
        }
    };
    let Some(marker) = list.and_then(|list| find_in_list(list, id)) else {
        return Ok(VisibilityChange::NotFound);
    };
    if marker.get("visible").and_then(Value::as_bool).unwrap_or(false) == visible {
        return Ok(VisibilityChange::Unchanged);
    }
    marker.insert("visible".to_string(), Value::Bool(visible));

    let encoded = serde_json::to_string(&document).map_err(|err| MarkerStoreError::Encode {
        key: source.key(),
        source: err,
    })?;
    store.write_raw(source, &encoded).map_err(backend(source))?;
    Ok(VisibilityChange::Updated)
}

/// Markers offered for selection.
///
/// Grouped markers come first in the scan so that plain markers they were
/// imported from can be hidden. The result is sorted by display name,
/// ignoring case.
#[must_use]
pub fn available_markers<S>(store: &S) -> Vec<MarkerRef>
where
    S: MarkerStore + ?Sized,
{
    let grouped = read_markers(store, MarkerSource::Grouped);
    let imported: HashSet<i64> = grouped.iter().filter_map(|marker| marker.imported_id).collect();
    let plain = read_markers(store, MarkerSource::Plain)
        .into_iter()
        .filter(|marker| !imported.contains(&marker.id));

    let mut markers: Vec<MarkerRef> = grouped
        .iter()
        .map(MarkerRecord::to_ref)
        .chain(plain.map(|marker| marker.to_ref()))
        .collect();
    markers.sort_by_cached_key(|marker| marker.display_name().to_lowercase());
    markers
}

/// In-memory marker store, used by the replay tool and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMarkerStore {
    #[serde(default)]
    documents: BTreeMap<MarkerSource, String>,
}

impl MemoryMarkerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, source: MarkerSource, json: impl Into<String>) -> Self {
        self.documents.insert(source, json.into());
        self
    }

    #[must_use]
    pub fn document(&self, source: MarkerSource) -> Option<&str> {
        self.documents.get(&source).map(String::as_str)
    }
}

impl MarkerStore for MemoryMarkerStore {
    type Error = std::convert::Infallible;

    fn read_raw(&self, source: MarkerSource) -> Result<Option<String>, Self::Error> {
        Ok(self.documents.get(&source).cloned())
    }

    fn write_raw(&mut self, source: MarkerSource, json: &str) -> Result<(), Self::Error> {
        self.documents.insert(source, json.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryMarkerStore {
        MemoryMarkerStore::new()
            .with_document(
                MarkerSource::Plain,
                json!([
                    {"id": 1, "name": "bank", "visible": true, "color": {"value": -1}, "borderThickness": 3},
                    {"id": 2, "name": "Anvil", "visible": false}
                ])
                .to_string(),
            )
            .with_document(
                MarkerSource::Grouped,
                json!({
                    "Homes": [
                        {"id": 10, "name": "varrock", "visible": false, "importedId": 1, "labelled": true}
                    ]
                })
                .to_string(),
            )
    }

    #[test]
    fn write_preserves_unknown_fields() {
        let mut store = store();
        let change = write_visibility(&mut store, MarkerSource::Plain, 1, None, false).unwrap();
        assert_eq!(change, VisibilityChange::Updated);

        let written: Value = serde_json::from_str(store.document(MarkerSource::Plain).unwrap()).unwrap();
        assert_eq!(written[0]["visible"], json!(false));
        assert_eq!(written[0]["color"], json!({"value": -1}));
        assert_eq!(written[0]["borderThickness"], json!(3));
    }

    #[test]
    fn write_is_idempotent() {
        let mut store = store();
        let before = store.clone();
        assert_eq!(
            write_visibility(&mut store, MarkerSource::Plain, 2, None, false).unwrap(),
            VisibilityChange::Unchanged
        );
        assert_eq!(
            write_visibility(&mut store, MarkerSource::Plain, 99, None, true).unwrap(),
            VisibilityChange::NotFound
        );
        assert_eq!(store, before);
    }

    #[test]
    fn grouped_write_requires_matching_group() {
        let mut store = store();
        assert_eq!(
            write_visibility(&mut store, MarkerSource::Grouped, 10, None, true).unwrap(),
            VisibilityChange::NotFound
        );
        assert_eq!(
            write_visibility(&mut store, MarkerSource::Grouped, 10, Some("Other"), true).unwrap(),
            VisibilityChange::NotFound
        );
        assert_eq!(
            write_visibility(&mut store, MarkerSource::Grouped, 10, Some("Homes"), true).unwrap(),
            VisibilityChange::Updated
        );
        let markers = read_markers(&store, MarkerSource::Grouped);
        assert!(markers[0].visible);
        assert_eq!(markers[0].group.as_deref(), Some("Homes"));
    }

    #[test]
    fn corrupt_document_is_read_as_empty_and_never_written() {
        let mut store = MemoryMarkerStore::new().with_document(MarkerSource::Plain, "{not json");
        assert!(read_markers(&store, MarkerSource::Plain).is_empty());
        let err = write_visibility(&mut store, MarkerSource::Plain, 1, None, true).unwrap_err();
        assert!(matches!(err, MarkerStoreError::Decode { .. }));
        assert_eq!(store.document(MarkerSource::Plain), Some("{not json"));

        let mut empty = MemoryMarkerStore::new();
        assert_eq!(
            write_visibility(&mut empty, MarkerSource::Grouped, 1, Some("G"), true).unwrap(),
            VisibilityChange::Empty
        );
    }

    #[test]
    fn available_markers_hide_imported_duplicates() {
        let markers = available_markers(&store());
        let names: Vec<String> = markers.iter().map(MarkerRef::display_name).collect();
        assert_eq!(names, vec!["Anvil", "varrock (Homes)"]);
    }
}
