//! Accuracy and difficulty.
//!
//! An [`AccDiffData`] holds the base accuracy/difficulty of an attack, one
//! entry per target, and the roll modifier plugins attached at each level.
//! It is built from the weapon's tags and the current targets, adjusted by
//! the user through an [`AccDiffPrompt`], consumed once to build the attack
//! rolls, and serialized into the reroll token with [`AccDiffData::to_object`].

pub mod plugin;
pub mod prompt;

pub use plugin::{Plugin, RollModifier, Transform, compose};
pub use prompt::{AcceptPrompt, AccDiffPrompt, CancelPrompt, PresetPrompt, PromptKind};

use indexmap::IndexMap;
use lc_core::{Actor, ActorId, TagInstance, tag};
use serde::{Deserialize, Serialize};

/// Plugins keyed by id, in insertion order.
pub type PluginMap = IndexMap<String, Plugin>;

/// Cover between attacker and target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cover {
    /// No cover.
    #[default]
    None,
    /// Soft cover: +1 difficulty.
    Soft,
    /// Hard cover: +2 difficulty.
    Hard,
}

impl Cover {
    /// Difficulty granted by this cover.
    pub fn difficulty(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Soft => 1,
            Self::Hard => 2,
        }
    }
}

/// A snapshot of a targeted actor, taken when the attack starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    /// The target's actor id.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Token image, passed through to the card.
    #[serde(default)]
    pub img: Option<String>,
    /// Evasion at snapshot time.
    pub evasion: i32,
    /// E-Defense at snapshot time.
    pub e_defense: i32,
    /// Whether the target was Locked On.
    pub lock_on: bool,
}

impl TargetRef {
    /// Snapshot an actor.
    pub fn from_actor(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name.clone(),
            img: actor.img.clone(),
            evasion: actor.stats.evasion,
            e_defense: actor.stats.e_defense,
            lock_on: actor.statuses.lock_on,
        }
    }
}

/// Weapon-level flags derived from tags, plus weapon plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccDiffWeapon {
    /// `tg_accurate`: +1 accuracy.
    pub accurate: bool,
    /// `tg_inaccurate`: +1 difficulty.
    pub inaccurate: bool,
    /// `tg_seeking`: cover is ignored.
    pub seeking: bool,
    /// Plugins applied to every roll of this attack.
    pub plugins: PluginMap,
}

impl AccDiffWeapon {
    /// Derive the flags from a tag list.
    pub fn from_tags(tags: &[TagInstance], plugins: PluginMap) -> Self {
        Self {
            accurate: tag::has(tags, tag::ACCURATE),
            inaccurate: tag::has(tags, tag::INACCURATE),
            seeking: tag::has(tags, tag::SEEKING),
            plugins,
        }
    }

    fn net(&self) -> i32 {
        i32::from(self.accurate) - i32::from(self.inaccurate)
    }

    fn cover(&self, cover: Cover) -> i32 {
        if self.seeking { 0 } else { cover.difficulty() }
    }
}

/// Base (untargeted) accuracy and difficulty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccDiffBase {
    /// Accuracy chosen by the user.
    pub accuracy: i32,
    /// Difficulty chosen by the user.
    pub difficulty: i32,
    /// Cover for the untargeted roll.
    pub cover: Cover,
    /// Plugins applied to the untargeted roll.
    pub plugins: PluginMap,
}

/// Per-target accuracy and difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccDiffTarget {
    /// The target.
    pub target: TargetRef,
    /// Extra accuracy against this target.
    pub accuracy: i32,
    /// Extra difficulty against this target.
    pub difficulty: i32,
    /// This target's cover.
    pub cover: Cover,
    /// Spend the target's Lock On for +1 accuracy.
    pub consume_lock_on: bool,
    /// Plugins applied to this target's roll.
    pub plugins: PluginMap,
}

impl AccDiffTarget {
    /// A target entry with no adjustments. Lock On is spent if present.
    pub fn new(target: TargetRef) -> Self {
        Self {
            consume_lock_on: target.lock_on,
            target,
            accuracy: 0,
            difficulty: 0,
            cover: Cover::None,
            plugins: PluginMap::new(),
        }
    }

    /// The actor whose Lock On this attack spends, if any.
    pub fn using_lock_on(&self) -> Option<ActorId> {
        (self.target.lock_on && self.consume_lock_on).then_some(self.target.id)
    }
}

/// The full accuracy/difficulty model of one attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccDiffData {
    /// Prompt title.
    pub title: String,
    /// Weapon flags and plugins.
    pub weapon: AccDiffWeapon,
    /// Base values.
    pub base: AccDiffBase,
    /// One entry per target, in targeting order.
    pub targets: Vec<AccDiffTarget>,
}

impl AccDiffData {
    /// Initial data for a prompt.
    ///
    /// `starting` is the `(accuracy, difficulty)` the weapon brings on its
    /// own, e.g. an NPC feature's tier accuracy.
    pub fn from_params(
        title: impl Into<String>,
        tags: &[TagInstance],
        targets: Vec<TargetRef>,
        starting: Option<(i32, i32)>,
    ) -> Self {
        let (accuracy, difficulty) = starting.unwrap_or((0, 0));
        Self {
            title: title.into(),
            weapon: AccDiffWeapon::from_tags(tags, PluginMap::new()),
            base: AccDiffBase {
                accuracy,
                difficulty,
                ..AccDiffBase::default()
            },
            targets: targets.into_iter().map(AccDiffTarget::new).collect(),
        }
    }

    /// `(accuracy, difficulty)` for a signed accuracy value: positive is
    /// accuracy, negative is difficulty.
    pub fn starting_from(acc: i32) -> (i32, i32) {
        if acc > 0 { (acc, 0) } else { (0, acc.saturating_neg()) }
    }

    /// Net accuracy of the untargeted roll. May be negative.
    ///
    /// Saturates: payloads read back from reroll tokens are untrusted.
    pub fn base_total(&self) -> i32 {
        self.base
            .accuracy
            .saturating_sub(self.base.difficulty)
            .saturating_add(self.weapon.net())
            .saturating_sub(self.weapon.cover(self.base.cover))
    }

    /// Net accuracy against one target. May be negative.
    pub fn target_total(&self, target: &AccDiffTarget) -> i32 {
        let lock_on = i32::from(target.using_lock_on().is_some());
        self.base
            .accuracy
            .saturating_add(target.accuracy)
            .saturating_add(lock_on)
            .saturating_add(self.weapon.net())
            .saturating_sub(self.base.difficulty)
            .saturating_sub(target.difficulty)
            .saturating_sub(self.weapon.cover(target.cover))
    }

    /// Serialize for the reroll token.
    pub fn to_object(&self) -> AccDiffSerialized {
        AccDiffSerialized {
            title: self.title.clone(),
            weapon_plugins: self.weapon.plugins.clone(),
            base: self.base.clone(),
            targets: self.targets.clone(),
        }
    }

    /// Rebuild from a reroll payload, re-deriving weapon flags from the
    /// (possibly different) item's tags.
    pub fn from_object(data: AccDiffSerialized, context_tags: &[TagInstance]) -> Self {
        Self {
            title: data.title,
            weapon: AccDiffWeapon::from_tags(context_tags, data.weapon_plugins),
            base: data.base,
            targets: data.targets,
        }
    }
}

/// The serialized form of [`AccDiffData`], embedded in reroll tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccDiffSerialized {
    /// Prompt title.
    pub title: String,
    /// Weapon-level plugins.
    pub weapon_plugins: PluginMap,
    /// Base values.
    pub base: AccDiffBase,
    /// Target entries.
    pub targets: Vec<AccDiffTarget>,
}
