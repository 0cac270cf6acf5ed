use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::damage::Damage;
use crate::tag::{self, TagInstance};

/// Unique identifier for an item owned by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// An item owned by an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Variant-specific data.
    #[serde(flatten)]
    pub data: ItemData,
}

impl Item {
    /// Create an item with a random ID.
    pub fn new(name: impl Into<String>, data: ItemData) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            data,
        }
    }

    /// Tags of the item. For mech weapons, the tags of the selected profile.
    pub fn tags(&self) -> &[TagInstance] {
        match &self.data {
            ItemData::PilotWeapon(w) => &w.tags,
            ItemData::MechWeapon(w) => w.profile().map_or(&[], |p| p.tags.as_slice()),
            ItemData::MechSystem(s) => &s.tags,
            ItemData::NpcFeature(f) => &f.tags,
            ItemData::PilotGear(g) => &g.tags,
            ItemData::Skill(_) | ItemData::Talent(_) => &[],
        }
    }

    /// Returns true if the item carries the given tag.
    pub fn has_tag(&self, lid: &str) -> bool {
        tag::has(self.tags(), lid)
    }

    /// Short label for the item's variant.
    pub fn type_label(&self) -> &'static str {
        match &self.data {
            ItemData::PilotWeapon(_) => "pilot weapon",
            ItemData::MechWeapon(_) => "mech weapon",
            ItemData::MechSystem(_) => "mech system",
            ItemData::NpcFeature(_) => "npc feature",
            ItemData::Skill(_) => "skill",
            ItemData::Talent(_) => "talent",
            ItemData::PilotGear(_) => "pilot gear",
        }
    }
}

/// The item variant union.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemData {
    /// A weapon carried by a pilot.
    PilotWeapon(PilotWeapon),
    /// A weapon mounted on a mech.
    MechWeapon(MechWeapon),
    /// A mech system.
    MechSystem(MechSystem),
    /// An NPC feature (weapon, tech, system, trait, or reaction).
    NpcFeature(NpcFeature),
    /// A pilot skill trigger.
    Skill(Skill),
    /// A pilot talent.
    Talent(Talent),
    /// A piece of pilot gear.
    PilotGear(PilotGear),
}

fn loaded_default() -> bool {
    true
}

/// A pilot weapon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotWeapon {
    /// Loaded weapons can be fired.
    #[serde(default = "loaded_default")]
    pub loaded: bool,
    /// Damage declarations.
    #[serde(default)]
    pub damage: Vec<Damage>,
    /// Weapon tags.
    #[serde(default)]
    pub tags: Vec<TagInstance>,
    /// Effect text.
    #[serde(default)]
    pub effect: String,
}

impl Default for PilotWeapon {
    fn default() -> Self {
        Self {
            loaded: true,
            damage: Vec::new(),
            tags: Vec::new(),
            effect: String::new(),
        }
    }
}

/// One firing profile of a mech weapon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MechWeaponProfile {
    /// Profile name.
    pub name: String,
    /// Damage declarations.
    pub damage: Vec<Damage>,
    /// Profile tags.
    pub tags: Vec<TagInstance>,
    /// Effect text.
    pub effect: String,
    /// On-hit text.
    pub on_hit: String,
}

/// A mech weapon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechWeapon {
    /// Loaded weapons can be fired.
    #[serde(default = "loaded_default")]
    pub loaded: bool,
    /// Destroyed weapons cannot be fired.
    #[serde(default)]
    pub destroyed: bool,
    /// Firing profiles; most weapons have exactly one.
    #[serde(default)]
    pub profiles: Vec<MechWeaponProfile>,
    /// Index of the active profile.
    #[serde(default)]
    pub selected_profile: usize,
}

impl Default for MechWeapon {
    fn default() -> Self {
        Self {
            loaded: true,
            destroyed: false,
            profiles: vec![MechWeaponProfile::default()],
            selected_profile: 0,
        }
    }
}

impl MechWeapon {
    /// A single-profile weapon.
    pub fn with_profile(profile: MechWeaponProfile) -> Self {
        Self {
            profiles: vec![profile],
            ..Self::default()
        }
    }

    /// The active profile, if the selection is in range.
    pub fn profile(&self) -> Option<&MechWeaponProfile> {
        self.profiles.get(self.selected_profile)
    }
}

/// How an action is activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    /// Quick action.
    #[default]
    Quick,
    /// Full action.
    Full,
    /// Quick tech action.
    QuickTech,
    /// Full tech action.
    FullTech,
    /// Invade (a quick tech option).
    Invade,
    /// Reaction.
    Reaction,
    /// Free action.
    Free,
    /// Protocol, taken at the start of a turn.
    Protocol,
    /// Passive, always on.
    Passive,
}

impl fmt::Display for ActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Quick => "Quick",
            Self::Full => "Full",
            Self::QuickTech => "Quick Tech",
            Self::FullTech => "Full Tech",
            Self::Invade => "Invade",
            Self::Reaction => "Reaction",
            Self::Free => "Free",
            Self::Protocol => "Protocol",
            Self::Passive => "Passive",
        };
        write!(f, "{s}")
    }
}

/// An action granted by a system or talent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemAction {
    /// Action name.
    pub name: String,
    /// How the action is activated.
    pub activation: ActivationType,
    /// Rules text.
    pub detail: String,
}

/// A mech system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MechSystem {
    /// Effect text.
    pub effect: String,
    /// System tags.
    pub tags: Vec<TagInstance>,
    /// Granted actions.
    pub actions: Vec<ItemAction>,
    /// Destroyed systems cannot be used.
    pub destroyed: bool,
}

/// Category of an NPC feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcFeatureType {
    /// Attacks with accuracy, attack bonus, and damage per tier.
    Weapon,
    /// Tech attacks.
    Tech,
    /// A system.
    #[default]
    System,
    /// A passive trait.
    Trait,
    /// A triggered reaction.
    Reaction,
}

/// An NPC feature. Numeric arrays are indexed by tier (0-based).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcFeature {
    /// Category of the feature.
    #[serde(default)]
    pub feature_type: NpcFeatureType,
    /// Effect text.
    #[serde(default)]
    pub effect: String,
    /// On-hit text for weapons.
    #[serde(default)]
    pub on_hit: String,
    /// Trigger text for reactions.
    #[serde(default)]
    pub trigger: String,
    /// Feature tags.
    #[serde(default)]
    pub tags: Vec<TagInstance>,
    /// Damage declarations per tier.
    #[serde(default)]
    pub damage: Vec<Vec<Damage>>,
    /// Attack bonus per tier.
    #[serde(default)]
    pub attack_bonus: Vec<i32>,
    /// Accuracy per tier; negative values are difficulty.
    #[serde(default)]
    pub accuracy: Vec<i32>,
    /// Tier override (1-3). Zero means use the NPC's tier.
    #[serde(default)]
    pub tier_override: i32,
    /// Loaded features can be fired.
    #[serde(default = "loaded_default")]
    pub loaded: bool,
    /// Recharge features are usable only when charged.
    #[serde(default = "loaded_default")]
    pub charged: bool,
    /// Tech type label (e.g. "Quick", "Full") for tech features.
    #[serde(default)]
    pub tech_type: String,
}

impl Default for NpcFeature {
    fn default() -> Self {
        Self {
            feature_type: NpcFeatureType::default(),
            effect: String::new(),
            on_hit: String::new(),
            trigger: String::new(),
            tags: Vec::new(),
            damage: Vec::new(),
            attack_bonus: Vec::new(),
            accuracy: Vec::new(),
            tier_override: 0,
            loaded: true,
            charged: true,
            tech_type: String::new(),
        }
    }
}

impl NpcFeature {
    /// Zero-based tier index, honoring the override and clamping to 0-2.
    pub fn tier_index(&self, actor_tier: i32) -> usize {
        let tier = if self.tier_override > 0 {
            self.tier_override
        } else {
            actor_tier
        };
        (tier.clamp(1, 3) - 1) as usize
    }

    /// Attack bonus at the given tier index, or 0.
    pub fn attack_bonus_at(&self, tier: usize) -> i32 {
        self.attack_bonus.get(tier).copied().unwrap_or(0)
    }

    /// Accuracy at the given tier index, or 0.
    pub fn accuracy_at(&self, tier: usize) -> i32 {
        self.accuracy.get(tier).copied().unwrap_or(0)
    }

    /// Damage at the given tier index, or none.
    pub fn damage_at(&self, tier: usize) -> Vec<Damage> {
        self.damage.get(tier).cloned().unwrap_or_default()
    }
}

/// A pilot skill trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    /// Rank 1-3; each rank adds +2 to the roll.
    pub rank: i32,
    /// Trigger description.
    pub description: String,
}

/// A single rank of a talent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TalentRank {
    /// Rank name.
    pub name: String,
    /// Rank rules text.
    pub description: String,
}

/// A pilot talent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Talent {
    /// All ranks of the talent.
    pub ranks: Vec<TalentRank>,
    /// How many ranks the pilot has unlocked.
    pub current_rank: usize,
    /// Actions granted by the talent.
    pub actions: Vec<ItemAction>,
}

impl Talent {
    /// The ranks the pilot has unlocked.
    pub fn unlocked(&self) -> &[TalentRank] {
        let n = self.current_rank.min(self.ranks.len());
        &self.ranks[..n]
    }
}

/// A piece of pilot gear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotGear {
    /// Description text.
    pub description: String,
    /// Gear tags.
    pub tags: Vec<TagInstance>,
}
