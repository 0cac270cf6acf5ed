use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::{Item, ItemId};
use crate::tag::TagInstance;
use crate::track::Track;

/// Default heat capacity for a mech built with [`Actor::mech`].
pub const DEFAULT_HEAT_CAPACITY: i32 = 6;

/// Unique identifier for every actor in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Generate a new random actor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The kind of an actor. Drives which items it can attack with and whether
/// it tracks heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A pilot outside their mech.
    Pilot,
    /// A player-controlled mech.
    Mech,
    /// A GM-controlled unit.
    Npc,
    /// A drone, turret, or other deployable.
    Deployable,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pilot => write!(f, "pilot"),
            Self::Mech => write!(f, "mech"),
            Self::Npc => write!(f, "npc"),
            Self::Deployable => write!(f, "deployable"),
        }
    }
}

/// Numeric statistics of an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorStats {
    /// Pilot grit (attack bonus for pilots and their mechs).
    pub grit: i32,
    /// HASE: hull.
    pub hull: i32,
    /// HASE: agility.
    pub agility: i32,
    /// HASE: systems.
    pub systems: i32,
    /// HASE: engineering.
    pub engineering: i32,
    /// Tech attack bonus.
    pub tech_attack: i32,
    /// Evasion, the defense against standard attacks.
    pub evasion: i32,
    /// Electronic defense, the defense against smart and tech attacks.
    pub e_defense: i32,
    /// NPC tier (1-3). Zero for non-NPCs.
    pub tier: i32,
}

/// Transient conditions on an actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statuses {
    /// The actor is Locked On and the next attack against it may consume it.
    pub lock_on: bool,
}

/// A mech frame's core system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSystem {
    /// Name of the active effect.
    pub active_name: String,
    /// Rules text of the active effect.
    pub active_effect: String,
    /// Tags of the core system.
    pub tags: Vec<TagInstance>,
}

/// A unit in play: a pilot, mech, NPC, or deployable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier for this actor.
    #[serde(default)]
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// What kind of actor this is.
    pub kind: ActorKind,
    /// Optional token image path, passed through to result cards.
    #[serde(default)]
    pub img: Option<String>,
    /// Numeric statistics.
    #[serde(default)]
    pub stats: ActorStats,
    /// Heat track. Only mechs track heat.
    #[serde(default)]
    pub heat: Option<Track>,
    /// Remaining core power.
    #[serde(default)]
    pub core_energy: u32,
    /// How many times the mech has overcharged (0-3).
    #[serde(default)]
    pub overcharge_count: u32,
    /// The pilot of a mech; owned pilot items are visible through the mech.
    #[serde(default)]
    pub pilot: Option<ActorId>,
    /// Transient conditions.
    #[serde(default)]
    pub statuses: Statuses,
    /// The frame's core system, for mechs.
    #[serde(default)]
    pub core_system: Option<CoreSystem>,
    /// Items owned by this actor.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Actor {
    /// Create a new actor of the given kind with a random ID.
    pub fn new(kind: ActorKind, name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind,
            img: None,
            stats: ActorStats::default(),
            heat: None,
            core_energy: 0,
            overcharge_count: 0,
            pilot: None,
            statuses: Statuses::default(),
            core_system: None,
            items: Vec::new(),
        }
    }

    /// Create a mech with an empty heat track and one core power.
    pub fn mech(name: impl Into<String>) -> Self {
        let mut actor = Self::new(ActorKind::Mech, name);
        actor.heat = Some(Track::with_range("Heat", 0, 0, DEFAULT_HEAT_CAPACITY));
        actor.core_energy = 1;
        actor
    }

    /// Returns true if heat written to this actor is persisted.
    pub fn tracks_heat(&self) -> bool {
        self.kind == ActorKind::Mech && self.heat.is_some()
    }

    /// Current heat, or 0 for actors that do not track heat.
    pub fn current_heat(&self) -> i32 {
        self.heat.as_ref().map_or(0, |t| t.current)
    }

    /// Find an item owned directly by this actor.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Find an owned item by name (case-insensitive).
    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Mutable access to an owned item.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Look up a stat by key.
    ///
    /// Keys are case-insensitive and may carry an `mm.` prefix and a dotted
    /// path; only the last segment is significant (`mm.Pilot.Grit` → grit).
    pub fn stat(&self, key: &str) -> Option<i32> {
        let key = key.strip_prefix("mm.").unwrap_or(key);
        let last = key.rsplit('.').next().unwrap_or(key).to_lowercase();
        let s = &self.stats;
        let value = match last.as_str() {
            "grit" => s.grit,
            "hull" => s.hull,
            "agility" | "agi" => s.agility,
            "systems" | "sys" => s.systems,
            "engineering" | "eng" => s.engineering,
            "techattack" | "tech_attack" => s.tech_attack,
            "evasion" => s.evasion,
            "edef" | "e_defense" | "edefense" => s.e_defense,
            "tier" => s.tier,
            "heat" | "currentheat" => self.current_heat(),
            "corepower" | "core_energy" => self.core_energy as i32,
            _ => return None,
        };
        Some(value)
    }
}
