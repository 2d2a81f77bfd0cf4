//! Task-owned session for hosts that deliver events from several threads.
//!
//! The session lives inside one tokio task. Callers talk to it through a
//! cloneable [`HelperHandle`]; commands are applied strictly in the order the
//! channel receives them.
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::ProfileStore;
use crate::error::ActorError;
use crate::events::HostEvent;
use crate::marker_store::{LiveMarkers, MarkerStore};
use crate::markers::{MarkerRef, MarkerRole};
use crate::session::{EventOutcome, HelperSession, SessionSnapshot};

/// Default command queue depth.
pub const DEFAULT_CAPACITY: usize = 256;

enum Command {
    Event {
        event: HostEvent,
        reply: Option<oneshot::Sender<EventOutcome>>,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
    AvailableMarkers(oneshot::Sender<Vec<MarkerRef>>),
    SetMarker {
        role: MarkerRole,
        marker: Option<MarkerRef>,
        reply: oneshot::Sender<EventOutcome>,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Sender side of the helper task.
#[derive(Debug, Clone)]
pub struct HelperHandle {
    tx: mpsc::Sender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Event { event, .. } => event.kind(),
            Self::Snapshot(_) => "snapshot",
            Self::AvailableMarkers(_) => "available_markers",
            Self::SetMarker { .. } => "set_marker",
            Self::Shutdown(_) => "shutdown",
        };
        f.write_str(name)
    }
}

impl HelperHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, ActorError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| ActorError::Closed)?;
        rx.await.map_err(|_| ActorError::NoReply)
    }

    /// Queue an event without waiting for it to be applied.
    ///
    /// # Errors
    ///
    /// Returns `ActorError::Closed` if the task has stopped.
    pub async fn post(&self, event: HostEvent) -> Result<(), ActorError> {
        self.tx
            .send(Command::Event { event, reply: None })
            .await
            .map_err(|_| ActorError::Closed)
    }

    /// Apply an event and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the task has stopped.
    pub async fn send(&self, event: HostEvent) -> Result<EventOutcome, ActorError> {
        self.request(|reply| Command::Event {
            event,
            reply: Some(reply),
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the task has stopped.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ActorError> {
        self.request(Command::Snapshot).await
    }

    /// # Errors
    ///
    /// Returns an error if the task has stopped.
    pub async fn available_markers(&self) -> Result<Vec<MarkerRef>, ActorError> {
        self.request(Command::AvailableMarkers).await
    }

    /// # Errors
    ///
    /// Returns an error if the task has stopped.
    pub async fn set_marker(&self, role: MarkerRole, marker: Option<MarkerRef>) -> Result<EventOutcome, ActorError> {
        self.request(|reply| Command::SetMarker { role, marker, reply })
            .await
    }

    /// Hide every helper marker and stop the task once queued commands ahead
    /// of this one are done.
    ///
    /// # Errors
    ///
    /// Returns an error if the task had already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> {
        self.request(Command::Shutdown).await
    }
}

/// Move `session` into a new task on the current runtime.
///
/// The join handle yields the session back once the task stops, either after
/// [`HelperHandle::shutdown`] or when every handle has been dropped.
pub fn spawn<P, M, L>(session: HelperSession<P, M, L>, capacity: usize) -> (HelperHandle, JoinHandle<HelperSession<P, M, L>>)
where
    P: ProfileStore + Send + 'static,
    M: MarkerStore + Send + 'static,
    L: LiveMarkers + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(run(session, rx));
    (HelperHandle { tx }, task)
}

async fn run<P, M, L>(mut session: HelperSession<P, M, L>, mut rx: mpsc::Receiver<Command>) -> HelperSession<P, M, L>
where
    P: ProfileStore,
    M: MarkerStore,
    L: LiveMarkers,
{
    while let Some(command) = rx.recv().await {
        log::trace!("helper task received {command:?}");
        match command {
            Command::Event { event, reply } => {
                let outcome = session.handle(event);
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(session.snapshot());
            }
            Command::AvailableMarkers(reply) => {
                let _ = reply.send(session.available_markers());
            }
            Command::SetMarker { role, marker, reply } => {
                let _ = reply.send(session.set_marker(role, marker.as_ref()));
            }
            Command::Shutdown(reply) => {
                session.disable_all_markers();
                let _ = reply.send(());
                break;
            }
        }
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryProfileStore;
    use crate::chat::ChatChannel;
    use crate::config::HelperConfig;
    use crate::marker_store::MemoryMarkerStore;
    use crate::sack::PlankEstimate;

    fn session() -> HelperSession<MemoryProfileStore, MemoryMarkerStore> {
        HelperSession::new(
            HelperConfig::default(),
            MemoryProfileStore::new(Some(4)),
            MemoryMarkerStore::new(),
        )
    }

    #[test]
    fn events_apply_in_order() {
        tokio_test::block_on(async {
            let (handle, task) = spawn(session(), 8);
            for text in ["Your sack is full.", "Your sack is empty."] {
                handle
                    .post(HostEvent::ChatLine {
                        channel: ChatChannel::GameMessage,
                        text: text.to_string(),
                    })
                    .await
                    .unwrap();
            }
            let snapshot = handle.snapshot().await.unwrap();
            assert_eq!(snapshot.estimate, PlankEstimate::Known(0));

            handle.shutdown().await.unwrap();
            let session = task.await.unwrap();
            assert_eq!(session.profile().stored(), Some(0));
            assert_eq!(handle.snapshot().await, Err(ActorError::Closed));
        });
    }

    #[test]
    fn task_stops_when_handles_drop() {
        tokio_test::block_on(async {
            let (handle, task) = spawn(session(), 1);
            let outcome = handle.send(HostEvent::Tick).await.unwrap();
            assert_eq!(outcome, EventOutcome::default());
            drop(handle);
            let session = task.await.unwrap();
            assert_eq!(session.estimate(), PlankEstimate::Known(4));
        });
    }
}
