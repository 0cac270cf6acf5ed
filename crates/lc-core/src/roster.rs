use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorId, ActorKind};
use crate::error::{CoreError, CoreResult};
use crate::item::{Item, ItemData, ItemId};
use crate::writeback::{Writeback, WritebackReport};

/// Every actor taking part in an encounter.
///
/// Serializes as a plain list of actors; names must be unique
/// (case-insensitive).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Actor>", into = "Vec<Actor>")]
pub struct Roster {
    actors: HashMap<ActorId, Actor>,
    order: Vec<ActorId>,

    // Indexes
    by_name_lower: HashMap<String, ActorId>,
}

impl Roster {
    /// An empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Actor CRUD
    // -----------------------------------------------------------------------

    /// Add an actor. Returns its ID.
    pub fn add_actor(&mut self, actor: Actor) -> CoreResult<ActorId> {
        let name_lower = actor.name.to_lowercase();
        if self.by_name_lower.contains_key(&name_lower) || self.actors.contains_key(&actor.id) {
            return Err(CoreError::DuplicateName(actor.name.clone()));
        }
        let id = actor.id;
        self.by_name_lower.insert(name_lower, id);
        self.order.push(id);
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Get an actor by ID.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Get an actor by ID, or fail with [`CoreError::ActorNotFound`].
    pub fn require(&self, id: ActorId) -> CoreResult<&Actor> {
        self.actors.get(&id).ok_or(CoreError::ActorNotFound(id))
    }

    /// Mutable access to an actor.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Find an actor by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Actor> {
        self.by_name_lower
            .get(&name.to_lowercase())
            .and_then(|id| self.actors.get(id))
    }

    /// Find an actor ID by name, or fail with [`CoreError::ActorNameNotFound`].
    pub fn id_by_name(&self, name: &str) -> CoreResult<ActorId> {
        self.by_name_lower
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| CoreError::ActorNameNotFound(name.to_string()))
    }

    /// All actors in insertion order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.order.iter().filter_map(|id| self.actors.get(id))
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if the roster has no actors.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    // -----------------------------------------------------------------------
    // Item lookup
    // -----------------------------------------------------------------------

    /// The actor that owns `item` from `actor`'s point of view: the actor
    /// itself, or the pilot of a mech.
    fn owner_of(&self, actor: ActorId, item: ItemId) -> CoreResult<ActorId> {
        let a = self.require(actor)?;
        if a.item(item).is_some() {
            return Ok(actor);
        }
        if a.kind == ActorKind::Mech {
            if let Some(pilot) = a.pilot.and_then(|p| self.actors.get(&p)) {
                if pilot.item(item).is_some() {
                    return Ok(pilot.id);
                }
            }
        }
        Err(CoreError::ItemNotFound {
            actor: a.name.clone(),
            item,
        })
    }

    /// Resolve an item owned by the actor, or by its pilot when the actor is
    /// a mech (a pilot's skills and talents are usable from the cockpit).
    pub fn owned_item(&self, actor: ActorId, item: ItemId) -> CoreResult<&Item> {
        let owner = self.owner_of(actor, item)?;
        self.require(owner)?
            .item(item)
            .ok_or_else(|| CoreError::Validation(format!("item {item} vanished during lookup")))
    }

    /// Resolve an item by name with the same ownership rules as
    /// [`Roster::owned_item`].
    pub fn owned_item_by_name(&self, actor: ActorId, name: &str) -> CoreResult<&Item> {
        let a = self.require(actor)?;
        if let Some(item) = a.item_by_name(name) {
            return Ok(item);
        }
        if let Some(item) = a
            .pilot
            .filter(|_| a.kind == ActorKind::Mech)
            .and_then(|p| self.actors.get(&p))
            .and_then(|p| p.item_by_name(name))
        {
            return Ok(item);
        }
        Err(CoreError::ItemNameNotFound {
            actor: a.name.clone(),
            name: name.to_string(),
        })
    }

    /// The pilot of a mech, or the actor itself for pilots.
    pub fn pilot_of(&self, actor: ActorId) -> Option<&Actor> {
        let a = self.actors.get(&actor)?;
        match a.kind {
            ActorKind::Pilot => Some(a),
            ActorKind::Mech => a.pilot.and_then(|p| self.actors.get(&p)),
            ActorKind::Npc | ActorKind::Deployable => None,
        }
    }

    // -----------------------------------------------------------------------
    // Writeback
    // -----------------------------------------------------------------------

    /// Persist a change set.
    ///
    /// All referenced actors and items are validated before anything is
    /// written, so a failing writeback leaves the roster untouched.
    pub fn apply(&mut self, wb: &Writeback) -> CoreResult<WritebackReport> {
        self.require(wb.actor)?;
        let unload = wb
            .unload
            .iter()
            .map(|&item| self.owner_of(wb.actor, item).map(|owner| (owner, item)))
            .collect::<CoreResult<Vec<_>>>()?;
        let recharge = wb
            .recharge
            .iter()
            .map(|&item| self.owner_of(wb.actor, item).map(|owner| (owner, item)))
            .collect::<CoreResult<Vec<_>>>()?;
        for &target in &wb.spent_lock_ons {
            self.require(target)?;
        }

        let mut report = WritebackReport::default();

        if let Some(actor) = self.actors.get_mut(&wb.actor) {
            if wb.heat_delta != 0 && actor.tracks_heat() {
                if let Some(heat) = actor.heat.as_mut() {
                    report.heat = Some(heat.apply(wb.heat_delta));
                }
            }
            if wb.core_energy_delta != 0 {
                let energy = (actor.core_energy as i64 + wb.core_energy_delta as i64).max(0);
                actor.core_energy = u32::try_from(energy).unwrap_or(u32::MAX);
                report.core_energy = Some(actor.core_energy);
            }
            if let Some(level) = wb.overcharge_level {
                actor.overcharge_count = level;
            }
        }

        for (owner, item) in unload {
            if let Some(item) = self.actors.get_mut(&owner).and_then(|a| a.item_mut(item)) {
                let unloaded = match &mut item.data {
                    ItemData::PilotWeapon(w) => {
                        w.loaded = false;
                        true
                    }
                    ItemData::MechWeapon(w) => {
                        w.loaded = false;
                        true
                    }
                    ItemData::NpcFeature(f) => {
                        f.loaded = false;
                        true
                    }
                    _ => false,
                };
                if unloaded {
                    report.unloaded += 1;
                }
            }
        }

        for (owner, item) in recharge {
            if let Some(item) = self.actors.get_mut(&owner).and_then(|a| a.item_mut(item)) {
                if let ItemData::NpcFeature(f) = &mut item.data {
                    f.charged = true;
                    report.recharged += 1;
                }
            }
        }

        for target in &wb.spent_lock_ons {
            if let Some(t) = self.actors.get_mut(target) {
                if t.statuses.lock_on {
                    t.statuses.lock_on = false;
                    report.lock_ons_cleared += 1;
                }
            }
        }

        Ok(report)
    }
}

impl TryFrom<Vec<Actor>> for Roster {
    type Error = CoreError;

    fn try_from(actors: Vec<Actor>) -> CoreResult<Self> {
        let mut roster = Roster::new();
        for actor in actors {
            roster.add_actor(actor)?;
        }
        Ok(roster)
    }
}

impl From<Roster> for Vec<Actor> {
    fn from(mut roster: Roster) -> Self {
        roster
            .order
            .iter()
            .filter_map(|id| roster.actors.remove(id))
            .collect()
    }
}
