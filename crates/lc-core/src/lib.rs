//! Core types for Lancer combat: actors, items, tags, and the roster.
//!
//! This crate is the capability surface the combat engine consumes. It knows
//! nothing about dice or prompts. You can build a [`Roster`] programmatically
//! or deserialize one from a JSON scenario file, and apply a [`Writeback`]
//! change set to it once a resolution has finished.

/// Actor identifiers, kinds, stats, and statuses.
pub mod actor;
/// Damage declarations and damage types.
pub mod damage;
/// Error types used throughout the crate.
pub mod error;
/// Item identifiers and the item variant union.
pub mod item;
/// The in-memory roster that owns every actor.
pub mod roster;
/// Tag instances attached to weapons and features.
pub mod tag;
/// Clamped resource tracks.
pub mod track;
/// Change sets persisted after a resolution.
pub mod writeback;

/// Re-export actor types.
pub use actor::{Actor, ActorId, ActorKind, ActorStats, CoreSystem, Statuses};
/// Re-export damage types.
pub use damage::{Damage, DamageType};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export item types.
pub use item::{
    ActivationType, Item, ItemAction, ItemData, ItemId, MechSystem, MechWeapon,
    MechWeaponProfile, NpcFeature, NpcFeatureType, PilotGear, PilotWeapon, Skill, Talent,
    TalentRank,
};
/// Re-export the roster.
pub use roster::Roster;
/// Re-export tag types.
pub use tag::{TagInstance, TagValue};
/// Re-export the track type.
pub use track::{Track, TrackChange};
/// Re-export writeback types.
pub use writeback::{Writeback, WritebackReport};
