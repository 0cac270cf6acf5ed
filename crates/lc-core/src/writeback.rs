use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::item::ItemId;
use crate::track::TrackChange;

/// A change set produced by a resolution and persisted in one step.
///
/// Every field is a delta or a list of targets; an empty writeback is a
/// no-op. See [`crate::Roster::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Writeback {
    /// The acting unit.
    pub actor: ActorId,
    /// Heat to add to the actor. Ignored for actors that do not track heat.
    #[serde(default)]
    pub heat_delta: i32,
    /// Core power to add (negative to spend).
    #[serde(default)]
    pub core_energy_delta: i32,
    /// New overcharge level, if it changed.
    #[serde(default)]
    pub overcharge_level: Option<u32>,
    /// Weapons or features to mark unloaded.
    #[serde(default)]
    pub unload: Vec<ItemId>,
    /// NPC features to mark charged.
    #[serde(default)]
    pub recharge: Vec<ItemId>,
    /// Targets whose Lock On was consumed.
    #[serde(default)]
    pub spent_lock_ons: Vec<ActorId>,
}

impl Writeback {
    /// An empty change set for the given actor.
    pub fn for_actor(actor: ActorId) -> Self {
        Self {
            actor,
            ..Self::default()
        }
    }

    /// Add heat to the pending change set.
    pub fn add_heat(&mut self, amount: i32) {
        self.heat_delta = self.heat_delta.saturating_add(amount);
    }

    /// Returns true if applying this writeback changes nothing.
    pub fn is_empty(&self) -> bool {
        self.heat_delta == 0
            && self.core_energy_delta == 0
            && self.overcharge_level.is_none()
            && self.unload.is_empty()
            && self.recharge.is_empty()
            && self.spent_lock_ons.is_empty()
    }
}

/// What [`crate::Roster::apply`] actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritebackReport {
    /// The heat change, if the actor tracks heat and heat was written.
    pub heat: Option<TrackChange>,
    /// Core power after the change.
    pub core_energy: Option<u32>,
    /// Number of items unloaded.
    pub unloaded: usize,
    /// Number of features recharged.
    pub recharged: usize,
    /// Number of Lock On statuses cleared.
    pub lock_ons_cleared: usize,
}

impl WritebackReport {
    /// Heat in excess of the actor's capacity, or 0.
    pub fn overheat(&self) -> i32 {
        self.heat.map_or(0, |h| h.overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writeback() {
        let wb = Writeback::for_actor(ActorId::new());
        assert!(wb.is_empty());
    }

    #[test]
    fn add_heat_accumulates() {
        let mut wb = Writeback::for_actor(ActorId::new());
        wb.add_heat(2);
        wb.add_heat(3);
        assert_eq!(wb.heat_delta, 5);
        assert!(!wb.is_empty());
    }

    #[test]
    fn report_overheat() {
        let report = WritebackReport {
            heat: Some(TrackChange {
                before: 5,
                after: 6,
                overflow: 2,
            }),
            ..Default::default()
        };
        assert_eq!(report.overheat(), 2);
        assert_eq!(WritebackReport::default().overheat(), 0);
    }
}
