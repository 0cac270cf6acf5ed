//! Using an item: routes to an attack, a check, or a text card.

use lc_core::{Item, ItemData, ItemId, NpcFeatureType};
use serde::{Deserialize, Serialize};

use super::attack::{AttackOptions, DamageBonus};
use super::{MacroContext, Resolver};
use crate::card::{ChatCard, ReactionCard, TextCard};
use crate::error::{MechError, MechResult};

/// Per-use adjustments to an item macro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOptions {
    /// Added to the attack bonus of weapons.
    pub acc_bonus: i32,
    /// Flat damage bonus for weapons.
    pub dam_bonus: Option<DamageBonus>,
    /// Talent rank to show; defaults to the pilot's current rank.
    pub rank: Option<usize>,
}

impl ItemOptions {
    fn attack(self) -> AttackOptions {
        AttackOptions {
            acc_bonus: self.acc_bonus,
            dam_bonus: self.dam_bonus,
        }
    }
}

fn talent_card(item: &Item, talent: &lc_core::Talent, rank: usize) -> MechResult<TextCard> {
    let unlocked = rank
        .checked_sub(1)
        .and_then(|i| talent.ranks.get(i))
        .ok_or_else(|| MechError::Lookup(format!("{} has no rank {rank}", item.name)))?;
    Ok(TextCard::new(
        format!("{} (Rank {rank})", item.name),
        format!("{}: {}", unlocked.name, unlocked.description),
        Vec::new(),
    ))
}

impl Resolver {
    /// Use an item the way its type is normally used.
    pub async fn prepare_item(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        options: ItemOptions,
    ) -> Option<ChatCard> {
        self.boundary("item", self.run_item(ctx, item, options)).await
    }

    pub(super) async fn run_item(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        options: ItemOptions,
    ) -> MechResult<ChatCard> {
        let actor = self.speaker(ctx).await?;
        let item = self.store.owned_item(actor.id, item).await?;
        tracing::debug!(actor = %actor.name, item = %item.name, kind = item.type_label(), "using item");

        let card = match &item.data {
            ItemData::Skill(skill) => {
                return self
                    .roll_stat(&actor, item.name.clone(), skill.rank.saturating_mul(2), &skill.description)
                    .await;
            }
            ItemData::PilotWeapon(_) | ItemData::MechWeapon(_) => {
                return self
                    .run_weapon_attack(ctx, &actor, &item, options.attack(), None)
                    .await;
            }
            ItemData::MechSystem(system) => ChatCard::Text(TextCard::new(
                item.name.clone(),
                system.effect.clone(),
                system.tags.clone(),
            )),
            ItemData::Talent(talent) => {
                let rank = options.rank.unwrap_or(talent.current_rank);
                ChatCard::Text(talent_card(&item, talent, rank)?)
            }
            ItemData::PilotGear(gear) => ChatCard::Text(TextCard::new(
                item.name.clone(),
                gear.description.clone(),
                gear.tags.clone(),
            )),
            ItemData::NpcFeature(feature) => match feature.feature_type {
                NpcFeatureType::Weapon => {
                    return self
                        .run_weapon_attack(ctx, &actor, &item, options.attack(), None)
                        .await;
                }
                NpcFeatureType::Tech => return self.run_tech(ctx, item.id, None).await,
                NpcFeatureType::System | NpcFeatureType::Trait => ChatCard::Text(TextCard::new(
                    item.name.clone(),
                    feature.effect.clone(),
                    feature.tags.clone(),
                )),
                NpcFeatureType::Reaction => ChatCard::Reaction(ReactionCard {
                    title: item.name.clone(),
                    trigger: feature.trigger.clone(),
                    effect: feature.effect.clone(),
                    tags: feature.tags.clone(),
                }),
            },
        };
        self.emit(&actor, card).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_core::{Talent, TalentRank};

    fn talent() -> (Item, Talent) {
        let talent = Talent {
            ranks: vec![
                TalentRank {
                    name: "Lucky".into(),
                    description: "Reroll once".into(),
                },
                TalentRank {
                    name: "Luckier".into(),
                    description: "Reroll twice".into(),
                },
            ],
            current_rank: 1,
            actions: Vec::new(),
        };
        (Item::new("Gambler", ItemData::Talent(talent.clone())), talent)
    }

    #[test]
    fn talent_card_shows_requested_rank() {
        let (item, talent) = talent();
        let card = talent_card(&item, &talent, 2).unwrap();
        assert_eq!(card.title, "Gambler (Rank 2)");
        assert_eq!(card.description, "Luckier: Reroll twice");
    }

    #[test]
    fn missing_rank_is_a_lookup_error() {
        let (item, talent) = talent();
        assert!(matches!(talent_card(&item, &talent, 0), Err(MechError::Lookup(_))));
        assert!(matches!(talent_card(&item, &talent, 3), Err(MechError::Lookup(_))));
    }

    #[test]
    fn options_split_attack_fields() {
        let options: ItemOptions = serde_json::from_str(r#"{"acc_bonus":1,"rank":2}"#).unwrap();
        assert_eq!(options.rank, Some(2));
        assert_eq!(options.attack().acc_bonus, 1);
        assert!(options.attack().dam_bonus.is_none());
    }
}
