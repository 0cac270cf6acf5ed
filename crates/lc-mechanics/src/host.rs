//! Host ports: where units live, where cards go, and how users are told
//! about problems.
//!
//! The resolver only talks to the host through these traits. The in-memory
//! implementations back the CLI and the tests.

use std::sync::Mutex;

use async_trait::async_trait;
use lc_core::{Actor, ActorId, CoreError, Item, ItemId, Roster, Writeback, WritebackReport};
use tokio::sync::RwLock;

use crate::card::ChatMessage;
use crate::error::{MechError, MechResult};

/// Read access to units and the single write path for changes.
#[async_trait]
pub trait UnitStore: Send + Sync {
    /// A snapshot of an actor.
    async fn actor(&self, id: ActorId) -> MechResult<Actor>;

    /// An item owned by the actor, or by its pilot when the actor is a mech.
    async fn owned_item(&self, actor: ActorId, item: ItemId) -> MechResult<Item>;

    /// The pilot of a mech, or the actor itself for pilots.
    async fn pilot_of(&self, actor: ActorId) -> MechResult<Option<Actor>>;

    /// Persist a change set. Called at most once per resolution.
    async fn writeback(&self, writeback: &Writeback) -> MechResult<WritebackReport>;
}

/// A [`Roster`] behind a lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    roster: RwLock<Roster>,
}

impl MemoryStore {
    /// Wrap a roster.
    pub fn new(roster: Roster) -> Self {
        Self {
            roster: RwLock::new(roster),
        }
    }

    /// A copy of the current roster.
    pub async fn snapshot(&self) -> Roster {
        self.roster.read().await.clone()
    }

    /// Take the roster back out.
    pub fn into_inner(self) -> Roster {
        self.roster.into_inner()
    }
}

#[async_trait]
impl UnitStore for MemoryStore {
    async fn actor(&self, id: ActorId) -> MechResult<Actor> {
        self.roster
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(MechError::ActorNotFound(id))
    }

    async fn owned_item(&self, actor: ActorId, item: ItemId) -> MechResult<Item> {
        let roster = self.roster.read().await;
        match roster.owned_item(actor, item) {
            Ok(found) => Ok(found.clone()),
            Err(CoreError::ActorNotFound(id)) => Err(MechError::ActorNotFound(id)),
            Err(_) => Err(MechError::ItemNotFound { actor, item }),
        }
    }

    async fn pilot_of(&self, actor: ActorId) -> MechResult<Option<Actor>> {
        let roster = self.roster.read().await;
        roster
            .require(actor)
            .map_err(|_| MechError::ActorNotFound(actor))?;
        Ok(roster.pilot_of(actor).cloned())
    }

    async fn writeback(&self, writeback: &Writeback) -> MechResult<WritebackReport> {
        let report = self.roster.write().await.apply(writeback)?;
        tracing::info!(
            actor = %writeback.actor,
            heat = writeback.heat_delta,
            overheat = report.overheat(),
            unloaded = report.unloaded,
            recharged = report.recharged,
            lock_ons = report.lock_ons_cleared,
            "applied writeback"
        );
        Ok(report)
    }
}

/// Receives result cards.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Post a card.
    async fn post(&self, message: ChatMessage) -> MechResult<()>;
}

/// Keeps every posted card in memory.
#[derive(Debug, Default)]
pub struct MemoryChat {
    messages: Mutex<Vec<ChatMessage>>,
}

impl MemoryChat {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message posted so far.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ChatSink for MemoryChat {
    async fn post(&self, message: ChatMessage) -> MechResult<()> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
        Ok(())
    }
}

/// How loud a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    /// Informational.
    Info,
    /// Something was skipped or looks wrong.
    Warning,
    /// Something failed.
    Error,
}

/// Shows short messages to the user.
pub trait Notifier: Send + Sync {
    /// Show `message`.
    fn notify(&self, level: NotifyLevel, message: &str);
}

/// Sends notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info => tracing::info!("{message}"),
            NotifyLevel::Warning => tracing::warn!("{message}"),
            NotifyLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Records notifications for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<(NotifyLevel, String)>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification so far, oldest first.
    pub fn entries(&self) -> Vec<(NotifyLevel, String)> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}
