//! The resolver: every user-facing flow, wired to the host ports.
//!
//! Each public `prepare_*` method is an entry point. It resolves the speaker
//! and item, prompts, rolls, writes back at most once, posts a card, and
//! returns it. Errors never escape an entry point: they are logged and
//! turned into one notification whose level follows
//! [`MechError::severity`], and the method returns `None`.

mod attack;
mod check;
mod dispatch;
mod item;
mod tech;
mod unit;

pub use attack::{AttackOptions, DamageBonus};
pub use item::ItemOptions;

use std::future::Future;
use std::sync::Arc;

use lc_core::{Actor, ActorId, TagInstance, Writeback, WritebackReport};

use crate::accdiff::{AccDiffData, AccDiffPrompt, AccDiffSerialized, AcceptPrompt, TargetRef};
use crate::card::{ChatCard, ChatMessage};
use crate::config::EngineConfig;
use crate::dice::{DiceRoller, LocalRoller};
use crate::error::{MechError, MechResult, Severity};
use crate::hit::{DefenseCheck, StandardDefense};
use crate::host::{ChatSink, MemoryChat, Notifier, NotifyLevel, TracingNotifier, UnitStore};

/// Who is acting and what they have targeted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroContext {
    /// The speaking actor.
    pub speaker: Option<ActorId>,
    /// Targeted actors, in targeting order.
    pub targets: Vec<ActorId>,
}

impl MacroContext {
    /// A context speaking as `speaker` with no targets.
    pub fn new(speaker: ActorId) -> Self {
        Self {
            speaker: Some(speaker),
            targets: Vec::new(),
        }
    }

    /// Set the targets.
    pub fn with_targets(mut self, targets: Vec<ActorId>) -> Self {
        self.targets = targets;
        self
    }

    fn require_speaker(&self) -> MechResult<ActorId> {
        self.speaker
            .ok_or_else(|| MechError::Lookup("no actor selected to act as".into()))
    }
}

/// Runs combat flows against a set of host ports.
pub struct Resolver {
    store: Arc<dyn UnitStore>,
    dice: Arc<dyn DiceRoller>,
    prompt: Arc<dyn AccDiffPrompt>,
    chat: Arc<dyn ChatSink>,
    notifier: Arc<dyn Notifier>,
    defense: Arc<dyn DefenseCheck>,
    config: EngineConfig,
}

impl Resolver {
    /// A resolver over `store` with in-process defaults for every other port:
    /// a local roller seeded from the config, a prompt that accepts as-is,
    /// an in-memory chat log, and notifications sent to `tracing`.
    pub fn new(store: Arc<dyn UnitStore>, config: EngineConfig) -> Self {
        let dice = LocalRoller::seeded(config.seed).with_explode_cap(config.explode_cap);
        Self {
            store,
            dice: Arc::new(dice),
            prompt: Arc::new(AcceptPrompt),
            chat: Arc::new(MemoryChat::new()),
            notifier: Arc::new(TracingNotifier),
            defense: Arc::new(StandardDefense),
            config,
        }
    }

    /// Replace the dice roller.
    pub fn with_dice(mut self, dice: Arc<dyn DiceRoller>) -> Self {
        self.dice = dice;
        self
    }

    /// Replace the accuracy/difficulty prompt.
    pub fn with_prompt(mut self, prompt: Arc<dyn AccDiffPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the chat sink.
    pub fn with_chat(mut self, chat: Arc<dyn ChatSink>) -> Self {
        self.chat = chat;
        self
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the hit comparison.
    pub fn with_defense(mut self, defense: Arc<dyn DefenseCheck>) -> Self {
        self.defense = defense;
        self
    }

    /// The configuration snapshot.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Boundary
    // -----------------------------------------------------------------------

    /// Run a flow, surfacing any error.
    async fn boundary<T>(&self, flow: &str, run: impl Future<Output = MechResult<T>>) -> Option<T> {
        match run.await {
            Ok(value) => Some(value),
            Err(err) => {
                self.surface(flow, &err);
                None
            }
        }
    }

    fn surface(&self, flow: &str, err: &MechError) {
        let message = err.to_string();
        match err.severity() {
            Severity::Silent => tracing::debug!(flow, "cancelled"),
            Severity::Warning => {
                tracing::warn!(flow, error = %message, "flow stopped");
                self.notifier.notify(NotifyLevel::Warning, &message);
            }
            Severity::Error => {
                tracing::error!(flow, error = %message, "flow failed");
                self.notifier.notify(NotifyLevel::Error, &message);
            }
        }
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        self.notifier.notify(NotifyLevel::Warning, message);
    }

    // -----------------------------------------------------------------------
    // Shared steps
    // -----------------------------------------------------------------------

    async fn speaker(&self, ctx: &MacroContext) -> MechResult<Actor> {
        self.store.actor(ctx.require_speaker()?).await
    }

    async fn target_refs(&self, ids: &[ActorId]) -> MechResult<Vec<TargetRef>> {
        let mut targets = Vec::with_capacity(ids.len());
        for &id in ids {
            targets.push(TargetRef::from_actor(&self.store.actor(id).await?));
        }
        Ok(targets)
    }

    /// Rebuild reroll data against `tags`, re-reading every target so the
    /// reroll sees current defenses and Lock On.
    async fn rebuild(&self, serialized: AccDiffSerialized, tags: &[TagInstance]) -> MechResult<AccDiffData> {
        let mut data = AccDiffData::from_object(serialized, tags);
        for t in &mut data.targets {
            t.target = TargetRef::from_actor(&self.store.actor(t.target.id).await?);
        }
        Ok(data)
    }

    async fn persist(&self, writeback: &Writeback) -> MechResult<Option<WritebackReport>> {
        if writeback.is_empty() {
            return Ok(None);
        }
        let report = self.store.writeback(writeback).await?;
        let overheat = report.overheat();
        if overheat > 0 && self.config.automation.structure {
            self.warn(&format!("Heat exceeds capacity by {overheat}"));
        } else if overheat > 0 {
            tracing::debug!(overheat, "overheat check is manual");
        }
        Ok(Some(report))
    }

    async fn emit(&self, speaker: &Actor, card: ChatCard) -> MechResult<ChatCard> {
        tracing::info!(speaker = %speaker.name, title = card.title(), "posting card");
        self.chat
            .post(ChatMessage {
                speaker: speaker.id,
                speaker_name: speaker.name.clone(),
                card: card.clone(),
            })
            .await?;
        Ok(card)
    }
}
