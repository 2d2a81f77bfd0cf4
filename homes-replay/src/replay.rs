//! Loading recorded inputs and driving them through a helper task.
use anyhow::{Context, Result, bail};
use serde::Serialize;

use homes_engine::actor::{self, DEFAULT_CAPACITY};
use homes_engine::{
    EventOutcome, HelperConfig, HelperSession, HostEvent, MarkerRecord, MarkerSource,
    MemoryMarkerStore, MemoryProfileStore, SessionSnapshot, read_markers,
};

/// Parse a recorded event stream.
///
/// Accepts either a JSON array of events or one event per line. Blank lines
/// and lines starting with `#` are skipped in the line form.
pub fn parse_events(text: &str) -> Result<Vec<HostEvent>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("events are not a valid JSON array");
    }
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("line {} is not a valid event", number + 1))
        })
        .collect()
}

/// Build a marker store from a JSON object keyed by storage key.
///
/// Each value is stored verbatim as the document for that key, so a corrupt
/// entry can be reproduced by giving a string instead of a list.
pub fn parse_marker_documents(text: &str) -> Result<MemoryMarkerStore> {
    let documents: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(text).context("marker documents must be a JSON object")?;
    let mut store = MemoryMarkerStore::new();
    for (key, value) in documents {
        let Some(source) = MarkerSource::from_key(&key) else {
            bail!("unknown marker storage key `{key}`");
        };
        let document = match value {
            serde_json::Value::String(raw) => raw,
            other => other.to_string(),
        };
        store = store.with_document(source, document);
    }
    Ok(store)
}

/// Everything a replay needs up front.
#[derive(Debug, Clone, Default)]
pub struct ReplayInput {
    pub config: HelperConfig,
    /// Stored profile value, `-1` for unknown, `None` when nothing was stored.
    pub estimate: Option<i32>,
    pub markers: MemoryMarkerStore,
    pub events: Vec<HostEvent>,
    /// Hide every helper marker after the last event.
    pub shutdown: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub index: usize,
    pub kind: &'static str,
    pub outcome: EventOutcome,
}

impl ReplayStep {
    pub fn changed(&self) -> bool {
        self.outcome != EventOutcome::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub final_state: SessionSnapshot,
    pub stored_estimate: Option<i32>,
    pub markers: Vec<MarkerRecord>,
}

impl ReplayReport {
    pub fn changed_steps(&self) -> impl Iterator<Item = &ReplayStep> {
        self.steps.iter().filter(|step| step.changed())
    }
}

/// Run every event through a spawned helper task, in order.
pub async fn run(input: ReplayInput) -> Result<ReplayReport> {
    let ReplayInput {
        config,
        estimate,
        markers,
        events,
        shutdown,
    } = input;
    let session = HelperSession::new(config, MemoryProfileStore::new(estimate), markers);
    let (handle, task) = actor::spawn(session, DEFAULT_CAPACITY);

    let mut steps = Vec::with_capacity(events.len());
    for (index, event) in events.into_iter().enumerate() {
        let kind = event.kind();
        let outcome = handle
            .send(event)
            .await
            .with_context(|| format!("event {index} ({kind}) was not applied"))?;
        log::debug!("event {index} ({kind}) -> {outcome:?}");
        steps.push(ReplayStep {
            index,
            kind,
            outcome,
        });
    }

    let final_state = handle
        .snapshot()
        .await
        .context("helper task did not report its state")?;
    if shutdown {
        handle
            .shutdown()
            .await
            .context("helper task did not acknowledge shutdown")?;
    }
    drop(handle);
    let session = task.await.context("helper task failed")?;

    let markers = MarkerSource::ALL
        .into_iter()
        .flat_map(|source| read_markers(session.marker_store(), source))
        .collect();
    Ok(ReplayReport {
        steps,
        final_state,
        stored_estimate: session.profile().stored(),
        markers,
    })
}
