//! Tech attacks from NPC features and item actions.

use lc_core::{
    Actor, ActorKind, ActivationType, Item, ItemData, ItemId, NpcFeatureType, TagInstance,
    Writeback,
};
use serde_json::Value;

use super::attack::to_value;
use super::{MacroContext, Resolver};
use crate::attack;
use crate::accdiff::{AccDiffData, AccDiffSerialized, PromptKind};
use crate::card::{ChatCard, TechAttackCard, TextCard, non_empty};
use crate::error::{MechError, MechResult};
use crate::hit::classify;
use crate::macros::{MacroDescriptor, MacroFn};

/// What a tech attack rolls with and prints.
#[derive(Debug, Clone, Default)]
pub(super) struct TechProfile {
    pub(super) title: String,
    pub(super) t_atk: i32,
    pub(super) acc: i32,
    pub(super) action: String,
    pub(super) effect: String,
    pub(super) tags: Vec<TagInstance>,
}

/// How to rebuild a tech attack from its card.
pub(super) struct TechReroll {
    pub(super) title: &'static str,
    pub(super) function: MacroFn,
    /// Arguments before the serialized accuracy/difficulty data.
    pub(super) args: Vec<Value>,
}

fn npc_tech_profile(actor: &Actor, item: &Item) -> MechResult<TechProfile> {
    match (actor.kind, &item.data) {
        (ActorKind::Npc, ItemData::NpcFeature(feature))
            if feature.feature_type == NpcFeatureType::Tech =>
        {
            let tier = feature.tier_index(actor.stats.tier);
            Ok(TechProfile {
                title: item.name.clone(),
                t_atk: feature.attack_bonus_at(tier),
                acc: feature.accuracy_at(tier),
                action: feature.tech_type.clone(),
                effect: feature.effect.clone(),
                tags: feature.tags.clone(),
            })
        }
        _ => Err(MechError::Validation(format!(
            "{} is not an NPC tech feature",
            item.name
        ))),
    }
}

fn is_tech_action(activation: ActivationType) -> bool {
    matches!(
        activation,
        ActivationType::QuickTech | ActivationType::FullTech | ActivationType::Invade
    )
}

impl Resolver {
    /// Roll a tech attack with an NPC tech feature.
    pub async fn prepare_tech(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        reroll: Option<AccDiffSerialized>,
    ) -> Option<ChatCard> {
        self.boundary("tech attack", self.run_tech(ctx, item, reroll))
            .await
    }

    pub(super) async fn run_tech(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        reroll: Option<AccDiffSerialized>,
    ) -> MechResult<ChatCard> {
        let actor = self.speaker(ctx).await?;
        let item = self.store.owned_item(actor.id, item).await?;
        let profile = npc_tech_profile(&actor, &item)?;
        let data = match reroll {
            Some(serialized) => Some(self.rebuild(serialized, &profile.tags).await?),
            None => None,
        };
        let reroll_with = TechReroll {
            title: "Reroll tech attack",
            function: MacroFn::Tech,
            args: vec![to_value(actor.id)?, to_value(item.id)?],
        };
        self.run_tech_attack(ctx, &actor, profile, data, reroll_with)
            .await
    }

    /// Use the action at `index` on a mech system or talent.
    ///
    /// Tech actions roll a tech attack; anything else posts the action text.
    pub async fn prepare_activation(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        index: usize,
        reroll: Option<AccDiffSerialized>,
    ) -> Option<ChatCard> {
        self.boundary("activation", self.run_activation(ctx, item, index, reroll))
            .await
    }

    pub(super) async fn run_activation(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        index: usize,
        reroll: Option<AccDiffSerialized>,
    ) -> MechResult<ChatCard> {
        let actor = self.speaker(ctx).await?;
        if !matches!(actor.kind, ActorKind::Mech | ActorKind::Pilot) {
            return Err(MechError::Validation(format!(
                "{} cannot use item activations",
                actor.name
            )));
        }
        let item = self.store.owned_item(actor.id, item).await?;
        let (actions, tags) = match &item.data {
            ItemData::MechSystem(system) => (&system.actions, system.tags.clone()),
            ItemData::Talent(talent) => (&talent.actions, Vec::new()),
            ItemData::NpcFeature(_) => {
                return Err(MechError::Validation(
                    "NPC feature activations are not supported".into(),
                ));
            }
            _ => {
                return Err(MechError::Validation(format!(
                    "{} is not a System or Talent",
                    item.name
                )));
            }
        };
        let action = actions.get(index).ok_or_else(|| {
            MechError::Lookup(format!("{} has no action at index {index}", item.name))
        })?;

        if !is_tech_action(action.activation) {
            let card = TextCard::new(
                format!("{} ({})", action.name, action.activation),
                action.detail.clone(),
                tags,
            );
            return self.emit(&actor, ChatCard::Text(card)).await;
        }

        let profile = TechProfile {
            title: action.name.clone(),
            t_atk: if actor.kind == ActorKind::Mech {
                actor.stats.tech_attack
            } else {
                0
            },
            acc: 0,
            action: action.name.to_uppercase(),
            effect: action.detail.clone(),
            tags,
        };
        let data = match reroll {
            Some(serialized) => Some(self.rebuild(serialized, &profile.tags).await?),
            None => None,
        };
        let reroll_with = TechReroll {
            title: "Reroll activation",
            function: MacroFn::Activation,
            args: vec![to_value(actor.id)?, to_value(item.id)?, to_value(index)?],
        };
        self.run_tech_attack(ctx, &actor, profile, data, reroll_with)
            .await
    }

    /// Prompt, roll, and classify a tech attack. Tech attacks are always
    /// compared against E-Defense and never roll damage.
    pub(super) async fn run_tech_attack(
        &self,
        ctx: &MacroContext,
        actor: &Actor,
        profile: TechProfile,
        reroll: Option<AccDiffData>,
        reroll_with: TechReroll,
    ) -> MechResult<ChatCard> {
        let initial = match reroll {
            Some(data) => data,
            None => AccDiffData::from_params(
                profile.title.as_str(),
                &profile.tags,
                self.target_refs(&ctx.targets).await?,
                Some(AccDiffData::starting_from(profile.acc)),
            ),
        };
        let accdiff = self.prompt.open(PromptKind::Attack, initial).await?;
        tracing::debug!(title = %profile.title, base_total = accdiff.base_total(), "tech attack confirmed");

        let rolls = attack::build(profile.t_atk, &accdiff);
        let classification = classify(
            &rolls,
            true,
            self.config.automation.attacks,
            self.dice.as_ref(),
            self.defense.as_ref(),
        )
        .await?;

        let mut writeback = Writeback::for_actor(actor.id);
        writeback.spent_lock_ons = classification.spent_lock_ons;
        self.persist(&writeback).await?;

        let mut args = reroll_with.args;
        args.push(to_value(accdiff.to_object())?);
        let reroll_macro = MacroDescriptor::new(reroll_with.title, reroll_with.function, args).encode()?;

        let card = TechAttackCard {
            title: profile.title,
            attacks: classification.attacks,
            hits: classification.hits,
            action: profile.action,
            effect: non_empty(&profile.effect),
            tags: profile.tags,
            reroll_macro,
        };
        self.emit(actor, ChatCard::TechAttack(card)).await
    }
}
