//! Combat resolution for Lancer.
//!
//! Turns an actor, a weapon or action, targets, and accuracy/difficulty
//! choices into dice formulas, rolls them, classifies hits and crits,
//! doubles crit dice, totals damage and heat, and returns a result card with
//! a replayable reroll token.
//!
//! The [`Resolver`] owns every flow. It reaches the host only through the
//! ports in [`host`], [`dice`], and [`accdiff`], so the same engine runs
//! against the in-memory roster used by the CLI and tests or against any
//! other store.

pub mod accdiff;
pub mod attack;
pub mod card;
pub mod config;
pub mod crit;
pub mod damage;
pub mod dice;
pub mod error;
pub mod heat;
pub mod hit;
pub mod host;
pub mod macros;
pub mod resolve;

pub use accdiff::{AccDiffData, AccDiffPrompt, AcceptPrompt, CancelPrompt, Cover, PresetPrompt};
pub use card::{ChatCard, ChatMessage};
pub use config::{AutomationSettings, EngineConfig};
pub use dice::{DiceRoller, EvaluatedRoll, FixedDice, LocalRoller};
pub use error::{MechError, MechResult, Severity};
pub use host::{ChatSink, MemoryChat, MemoryStore, Notifier, NotifyLevel, UnitStore};
pub use macros::{MacroDescriptor, MacroFn, StoredMacro};
pub use resolve::{AttackOptions, DamageBonus, ItemOptions, MacroContext, Resolver};
