//! Unit-level flows: core power, structure, overcharge, recharge.

use lc_core::{Actor, ActorKind, ItemData, ItemId, Writeback, tag};

use super::{MacroContext, Resolver};
use crate::card::{ChatCard, OverchargeCard, RechargeCard, RechargeEntry, TextCard};
use crate::error::{MechError, MechResult};

/// Heat rolled at each overcharge level.
const OVERCHARGE_TRACK: [&str; 4] = ["1", "1d3", "1d6", "1d6+4"];

/// Highest overcharge level.
const MAX_OVERCHARGE: u32 = 3;

fn overcharge_formula(level: u32) -> &'static str {
    let index = level.min(MAX_OVERCHARGE) as usize;
    OVERCHARGE_TRACK[index]
}

fn require_mech(actor: &Actor, message: &str) -> MechResult<()> {
    if actor.kind == ActorKind::Mech {
        Ok(())
    } else {
        Err(MechError::Validation(message.to_string()))
    }
}

/// Which features a recharge roll of `total` charges, plus the entry for
/// every uncharged feature.
fn recharge_entries(actor: &Actor, total: i64) -> (Vec<ItemId>, Vec<RechargeEntry>) {
    let mut charged = Vec::new();
    let mut entries = Vec::new();
    for item in &actor.items {
        let ItemData::NpcFeature(feature) = &item.data else {
            continue;
        };
        if feature.charged {
            continue;
        }
        let target = tag::find(&feature.tags, tag::RECHARGE).map(|t| t.int_value());
        let now_charged = target.is_some_and(|t| t > 0 && t <= total);
        if now_charged {
            charged.push(item.id);
        }
        entries.push(RechargeEntry {
            name: item.name.clone(),
            target,
            charged: now_charged,
        });
    }
    (charged, entries)
}

fn has_uncharged(actor: &Actor) -> bool {
    actor
        .items
        .iter()
        .any(|i| matches!(&i.data, ItemData::NpcFeature(f) if !f.charged))
}

impl Resolver {
    /// Activate a mech's core power after confirming.
    pub async fn prepare_core_active(&self, ctx: &MacroContext) -> Option<ChatCard> {
        self.boundary("core active", self.run_core_active(ctx)).await
    }

    pub(super) async fn run_core_active(&self, ctx: &MacroContext) -> MechResult<ChatCard> {
        let mech = self.speaker(ctx).await?;
        require_mech(&mech, "Only mechs have core powers!")?;
        let core = mech
            .core_system
            .clone()
            .ok_or_else(|| MechError::Validation(format!("{} has no core system", mech.name)))?;
        if mech.core_energy == 0 {
            return Err(MechError::Validation("No core power remaining on this frame!".into()));
        }

        if !self
            .prompt
            .confirm("Consume Core Power?", "Consume your mech's core power?")
            .await?
        {
            return Err(MechError::Cancelled);
        }

        let mut writeback = Writeback::for_actor(mech.id);
        writeback.core_energy_delta = -1;
        self.persist(&writeback).await?;
        tracing::info!(mech = %mech.name, core = %core.active_name, "consumed core power");

        let card = TextCard::new(core.active_name, core.active_effect, core.tags);
        self.emit(&mech, ChatCard::Text(card)).await
    }

    /// Roll 1d6 on the structure secondary table.
    pub async fn prepare_structure_secondary(&self, ctx: &MacroContext) -> Option<ChatCard> {
        self.boundary("structure secondary", self.run_structure_secondary(ctx))
            .await
    }

    pub(super) async fn run_structure_secondary(&self, ctx: &MacroContext) -> MechResult<ChatCard> {
        let actor = self.speaker(ctx).await?;
        let roll = self.dice.roll("1d6").await?;
        let (title, description) = if roll.total <= 3 {
            (
                "Destroy Weapons",
                "On a 1-3, all weapons on one mount of your choice are destroyed",
            )
        } else {
            ("Destroy Systems", "On a 4-6, a system of your choice is destroyed")
        };
        let mut card = TextCard::new(title, description, Vec::new());
        card.roll = Some(roll);
        self.emit(&actor, ChatCard::Text(card)).await
    }

    /// Overcharge a mech: roll heat for the current level and step the
    /// level up.
    pub async fn prepare_overcharge(&self, ctx: &MacroContext) -> Option<ChatCard> {
        self.boundary("overcharge", async {
            let mech = self.speaker(ctx).await?;
            require_mech(&mech, "Only mechs can overcharge!")?;

            let level = mech.overcharge_count;
            let roll = self.dice.roll(overcharge_formula(level)).await?;

            let mut writeback = Writeback::for_actor(mech.id);
            writeback.overcharge_level = Some((level + 1).min(MAX_OVERCHARGE));
            if self.config.automation.overcharge_heat {
                writeback.add_heat(i32::try_from(roll.total).unwrap_or(i32::MAX));
            }
            self.persist(&writeback).await?;

            let card = OverchargeCard {
                actor_name: mech.name.clone(),
                level,
                tooltip: roll.tooltip(),
                roll,
            };
            self.emit(&mech, ChatCard::Overcharge(card)).await
        })
        .await
    }

    /// Roll 1d6 to recharge an NPC's features.
    ///
    /// Returns `None` without rolling when no feature is uncharged.
    pub async fn prepare_recharge(&self, ctx: &MacroContext) -> Option<ChatCard> {
        self.boundary("recharge", async {
            let npc = self.speaker(ctx).await?;
            if npc.kind != ActorKind::Npc {
                return Err(MechError::Validation("Only NPCs can recharge!".into()));
            }
            if !has_uncharged(&npc) {
                tracing::debug!(npc = %npc.name, "nothing to recharge");
                return Ok(None);
            }

            let roll = self.dice.roll("1d6").await?;
            let (charged, changed) = recharge_entries(&npc, roll.total);

            let mut writeback = Writeback::for_actor(npc.id);
            writeback.recharge = charged;
            self.persist(&writeback).await?;

            let card = RechargeCard {
                actor_name: npc.name.clone(),
                tooltip: roll.tooltip(),
                roll,
                changed,
            };
            self.emit(&npc, ChatCard::Recharge(card)).await.map(Some)
        })
        .await
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_core::{Item, NpcFeature, TagInstance};

    #[test]
    fn overcharge_track_caps_at_last_step() {
        assert_eq!(overcharge_formula(0), "1");
        assert_eq!(overcharge_formula(2), "1d6");
        assert_eq!(overcharge_formula(3), "1d6+4");
        assert_eq!(overcharge_formula(9), "1d6+4");
    }

    fn feature(name: &str, charged: bool, recharge: Option<i64>) -> Item {
        let tags = recharge
            .map(|v| vec![TagInstance::with_value(tag::RECHARGE, v)])
            .unwrap_or_default();
        Item::new(
            name,
            ItemData::NpcFeature(NpcFeature {
                charged,
                tags,
                ..Default::default()
            }),
        )
    }

    #[test]
    fn recharge_charges_at_or_below_roll() {
        let mut npc = Actor::new(ActorKind::Npc, "Pyro");
        npc.items.push(feature("Flamethrower", false, Some(5)));
        npc.items.push(feature("Napalm", false, Some(4)));
        npc.items.push(feature("Armor", true, Some(4)));
        npc.items.push(feature("Odd", false, None));
        assert!(has_uncharged(&npc));

        let (charged, entries) = recharge_entries(&npc, 4);
        assert_eq!(charged, vec![npc.items[1].id]);
        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.charged)).collect();
        assert_eq!(names, vec![("Flamethrower", false), ("Napalm", true), ("Odd", false)]);
        assert_eq!(entries[2].target, None);
    }

    #[test]
    fn fully_charged_npc_has_nothing_to_recharge() {
        let mut npc = Actor::new(ActorKind::Npc, "Pyro");
        npc.items.push(feature("Flamethrower", true, Some(5)));
        assert!(!has_uncharged(&npc));
    }
}
