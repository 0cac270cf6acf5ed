//! Result cards handed to the chat log.
//!
//! Cards are plain data for a templating layer. Every field is serialized
//! even when empty so templates never have to test for missing keys.

use lc_core::{ActorId, TagInstance};
use serde::{Deserialize, Serialize};

use crate::damage::DamageResult;
use crate::dice::EvaluatedRoll;
use crate::hit::{AttackResult, HitResult};

/// A weapon or basic attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackCard {
    /// Weapon or attack name.
    pub title: String,
    /// Evaluated attack rolls.
    pub attacks: Vec<AttackResult>,
    /// Per-target results; empty for manual resolution.
    pub hits: Vec<HitResult>,
    /// `EVASION` or `E-DEF`.
    pub defense: String,
    /// Normal damage; empty unless a non-crit hit landed.
    pub damages: Vec<DamageResult>,
    /// Crit damage; empty unless a crit landed.
    pub crit_damages: Vec<DamageResult>,
    /// Heat from exploded overkill dice.
    pub overkill_heat: u32,
    /// Heat from `Heat (Self)`.
    pub self_heat: i32,
    /// Effect text.
    pub effect: Option<String>,
    /// On-hit text.
    pub on_hit: Option<String>,
    /// Weapon tags.
    pub tags: Vec<TagInstance>,
    /// Encoded reroll token.
    pub reroll_macro: String,
}

/// A tech attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechAttackCard {
    /// Feature or action name.
    pub title: String,
    /// Evaluated attack rolls.
    pub attacks: Vec<AttackResult>,
    /// Per-target results; empty for manual resolution.
    pub hits: Vec<HitResult>,
    /// Action label, e.g. `Quick` or `INVADE`.
    pub action: String,
    /// Effect text.
    pub effect: Option<String>,
    /// Tags.
    pub tags: Vec<TagInstance>,
    /// Encoded reroll token.
    pub reroll_macro: String,
}

/// A stat or skill check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    /// Stat or skill name.
    pub title: String,
    /// The roll.
    pub roll: EvaluatedRoll,
    /// Per-die breakdown.
    pub tooltip: String,
    /// Effect text.
    pub effect: Option<String>,
}

/// Descriptive text, optionally with a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCard {
    /// Title.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Tags.
    pub tags: Vec<TagInstance>,
    /// A roll shown above the text.
    pub roll: Option<EvaluatedRoll>,
}

impl TextCard {
    /// A text card without a roll.
    pub fn new(title: impl Into<String>, description: impl Into<String>, tags: Vec<TagInstance>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags,
            roll: None,
        }
    }
}

/// An NPC reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCard {
    /// Reaction name.
    pub title: String,
    /// Trigger text.
    pub trigger: String,
    /// Effect text.
    pub effect: String,
    /// Tags.
    pub tags: Vec<TagInstance>,
}

/// An overcharge roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverchargeCard {
    /// The overcharging mech.
    pub actor_name: String,
    /// Overcharge level before this roll.
    pub level: u32,
    /// Heat roll.
    pub roll: EvaluatedRoll,
    /// Per-die breakdown.
    pub tooltip: String,
}

/// One feature considered by a recharge roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeEntry {
    /// Feature name.
    pub name: String,
    /// Recharge target, if the feature has a `Recharge` tag.
    pub target: Option<i64>,
    /// Whether the feature is charged after the roll.
    pub charged: bool,
}

/// An NPC recharge roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeCard {
    /// The NPC.
    pub actor_name: String,
    /// The 1d6 roll.
    pub roll: EvaluatedRoll,
    /// Per-die breakdown.
    pub tooltip: String,
    /// Every feature that was uncharged before the roll.
    pub changed: Vec<RechargeEntry>,
}

/// Any result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "card", rename_all = "snake_case")]
pub enum ChatCard {
    /// Weapon or basic attack.
    Attack(AttackCard),
    /// Tech attack.
    TechAttack(TechAttackCard),
    /// Stat check.
    Stat(StatCard),
    /// Text.
    Text(TextCard),
    /// NPC reaction.
    Reaction(ReactionCard),
    /// Overcharge.
    Overcharge(OverchargeCard),
    /// Recharge.
    Recharge(RechargeCard),
}

impl ChatCard {
    /// The headline shown on the card.
    pub fn title(&self) -> &str {
        match self {
            Self::Attack(c) => &c.title,
            Self::TechAttack(c) => &c.title,
            Self::Stat(c) => &c.title,
            Self::Text(c) => &c.title,
            Self::Reaction(c) => &c.title,
            Self::Overcharge(c) => &c.actor_name,
            Self::Recharge(c) => &c.actor_name,
        }
    }

    /// The reroll token, for cards that carry one.
    pub fn reroll_macro(&self) -> Option<&str> {
        match self {
            Self::Attack(c) => Some(&c.reroll_macro),
            Self::TechAttack(c) => Some(&c.reroll_macro),
            _ => None,
        }
    }
}

/// A card posted as an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaking actor.
    pub speaker: ActorId,
    /// Speaking actor's name.
    pub speaker_name: String,
    /// The card.
    pub card: ChatCard,
}

/// `None` for blank text.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_string())
}
