//! Weapon attacks, basic attacks, and attack rerolls.

use lc_core::{
    Actor, ActorKind, Damage, DamageType, Item, ItemData, ItemId, NpcFeatureType, TagInstance,
    Writeback, tag,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{MacroContext, Resolver};
use crate::accdiff::{AccDiffData, AccDiffSerialized, PromptKind};
use crate::card::{AttackCard, ChatCard, non_empty};
use crate::damage::{HitFlags, aggregate};
use crate::error::{MechError, MechResult};
use crate::hit::{classify, defense_label};
use crate::macros::{MacroDescriptor, MacroFn};
use crate::{attack, heat};

/// A flat damage bonus of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageBonus {
    /// Damage type the bonus applies to.
    #[serde(rename = "type")]
    pub damage_type: DamageType,
    /// Amount added.
    pub val: i64,
}

/// Per-use adjustments to a weapon attack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackOptions {
    /// Added to the attack bonus.
    pub acc_bonus: i32,
    /// Added to the first damage declaration of the same type, or declared
    /// separately if there is none.
    pub dam_bonus: Option<DamageBonus>,
}

/// Everything an attack needs to know about its weapon.
#[derive(Debug, Clone, Default)]
struct WeaponProfile {
    title: String,
    grit: i32,
    acc: i32,
    damage: Vec<Damage>,
    tags: Vec<TagInstance>,
    effect: String,
    on_hit: String,
    loaded: bool,
    destroyed: bool,
    /// `Loading` unloads this weapon after attacking.
    unloads: bool,
}

impl WeaponProfile {
    fn build(actor: &Actor, pilot: Option<&Actor>, item: &Item) -> MechResult<Self> {
        let pilot_grit = pilot.map_or(0, |p| p.stats.grit);
        match (actor.kind, &item.data) {
            (ActorKind::Mech, ItemData::MechWeapon(weapon)) => {
                let profile = weapon.profile().ok_or_else(|| {
                    MechError::Validation(format!("Weapon {} has no selected profile!", item.name))
                })?;
                Ok(Self {
                    title: item.name.clone(),
                    grit: pilot_grit,
                    acc: 0,
                    damage: profile.damage.clone(),
                    tags: profile.tags.clone(),
                    effect: profile.effect.clone(),
                    on_hit: profile.on_hit.clone(),
                    loaded: weapon.loaded,
                    destroyed: weapon.destroyed,
                    unloads: true,
                })
            }
            (ActorKind::Pilot, ItemData::PilotWeapon(weapon)) => Ok(Self {
                title: item.name.clone(),
                grit: actor.stats.grit,
                damage: weapon.damage.clone(),
                tags: weapon.tags.clone(),
                effect: weapon.effect.clone(),
                loaded: weapon.loaded,
                ..Self::default()
            }),
            (ActorKind::Npc, ItemData::NpcFeature(feature))
                if feature.feature_type == NpcFeatureType::Weapon =>
            {
                let tier = feature.tier_index(actor.stats.tier);
                Ok(Self {
                    title: item.name.clone(),
                    grit: feature.attack_bonus_at(tier),
                    acc: feature.accuracy_at(tier),
                    damage: feature.damage_at(tier),
                    tags: feature.tags.clone(),
                    effect: feature.effect.clone(),
                    on_hit: feature.on_hit.clone(),
                    loaded: feature.loaded,
                    ..Self::default()
                })
            }
            (kind, _) => Err(MechError::Validation(format!(
                "{} ({kind:?}) cannot attack with {} ({})",
                actor.name,
                item.name,
                item.type_label()
            ))),
        }
    }

    fn basic(actor: &Actor, pilot: Option<&Actor>) -> MechResult<Self> {
        let grit = match actor.kind {
            ActorKind::Mech | ActorKind::Pilot => pilot.map_or(0, |p| p.stats.grit),
            ActorKind::Npc => actor.stats.tier.saturating_sub(1),
            ActorKind::Deployable => {
                return Err(MechError::Validation(format!(
                    "{} cannot make a basic attack",
                    actor.name
                )));
            }
        };
        Ok(Self {
            title: "BASIC ATTACK".into(),
            grit,
            loaded: true,
            ..Self::default()
        })
    }

    fn apply_options(&mut self, options: &AttackOptions) {
        self.grit = self.grit.saturating_add(options.acc_bonus);
        let Some(bonus) = options.dam_bonus else {
            return;
        };
        match self
            .damage
            .iter_mut()
            .find(|d| d.damage_type == Some(bonus.damage_type))
        {
            Some(existing) => {
                existing.value = if tag::leading_int(&existing.value).is_some_and(|n| n > 0) {
                    format!("{}+{}", existing.value, bonus.val)
                } else {
                    bonus.val.to_string()
                };
            }
            None => self
                .damage
                .push(Damage::new(bonus.val.to_string(), bonus.damage_type)),
        }
    }
}

impl Resolver {
    /// Attack with a weapon.
    pub async fn prepare_attack(
        &self,
        ctx: &MacroContext,
        item: ItemId,
        options: AttackOptions,
    ) -> Option<ChatCard> {
        self.boundary("attack", async {
            let actor = self.speaker(ctx).await?;
            let item = self.store.owned_item(actor.id, item).await?;
            self.run_weapon_attack(ctx, &actor, &item, options, None).await
        })
        .await
    }

    /// Make a basic attack with no weapon.
    pub async fn open_basic_attack(&self, ctx: &MacroContext) -> Option<ChatCard> {
        self.boundary("basic attack", async {
            let actor = self.speaker(ctx).await?;
            self.run_basic_attack(ctx, &actor, None).await
        })
        .await
    }

    /// Rerun an attack from a reroll payload.
    ///
    /// Without an item this is a basic attack. Target snapshots are
    /// re-read from the store.
    pub async fn prepare_encoded_attack(
        &self,
        ctx: &MacroContext,
        item: Option<ItemId>,
        options: AttackOptions,
        reroll: AccDiffSerialized,
    ) -> Option<ChatCard> {
        self.boundary("attack reroll", self.run_encoded_attack(ctx, item, options, reroll))
            .await
    }

    pub(super) async fn run_encoded_attack(
        &self,
        ctx: &MacroContext,
        item: Option<ItemId>,
        options: AttackOptions,
        reroll: AccDiffSerialized,
    ) -> MechResult<ChatCard> {
        let actor = self.speaker(ctx).await?;
        match item {
            Some(id) => {
                let item = self.store.owned_item(actor.id, id).await?;
                let data = self.rebuild(reroll, item.tags()).await?;
                self.run_weapon_attack(ctx, &actor, &item, options, Some(data))
                    .await
            }
            None => {
                let data = self.rebuild(reroll, &[]).await?;
                self.run_basic_attack(ctx, &actor, Some(data)).await
            }
        }
    }

    pub(super) async fn run_weapon_attack(
        &self,
        ctx: &MacroContext,
        actor: &Actor,
        item: &Item,
        options: AttackOptions,
        reroll: Option<AccDiffData>,
    ) -> MechResult<ChatCard> {
        let pilot = self.store.pilot_of(actor.id).await?;
        let mut profile = WeaponProfile::build(actor, pilot.as_ref(), item)?;

        if profile.damage.iter().any(Damage::is_untyped) {
            self.warn(&format!("Warning: {} has a damage value without type!", item.name));
        }
        profile.apply_options(&options);

        if self.config.automation.attacks {
            if !profile.loaded {
                return Err(MechError::Validation(format!("Weapon {} is not loaded!", item.name)));
            }
            if profile.destroyed {
                return Err(MechError::Validation(format!("Weapon {} is destroyed!", item.name)));
            }
        }

        let reroll_args = |data: &AccDiffData| -> MechResult<Vec<Value>> {
            Ok(vec![
                to_value(actor.id)?,
                to_value(item.id)?,
                to_value(options)?,
                to_value(data.to_object())?,
            ])
        };
        self.run_attack(ctx, actor, Some(item), profile, reroll, reroll_args)
            .await
    }

    async fn run_basic_attack(
        &self,
        ctx: &MacroContext,
        actor: &Actor,
        reroll: Option<AccDiffData>,
    ) -> MechResult<ChatCard> {
        let pilot = self.store.pilot_of(actor.id).await?;
        let profile = WeaponProfile::basic(actor, pilot.as_ref())?;
        let reroll_args = |data: &AccDiffData| -> MechResult<Vec<Value>> {
            Ok(vec![
                to_value(actor.id)?,
                Value::Null,
                Value::Object(Default::default()),
                to_value(data.to_object())?,
            ])
        };
        self.run_attack(ctx, actor, None, profile, reroll, reroll_args)
            .await
    }

    async fn run_attack(
        &self,
        ctx: &MacroContext,
        actor: &Actor,
        item: Option<&Item>,
        profile: WeaponProfile,
        reroll: Option<AccDiffData>,
        reroll_args: impl Fn(&AccDiffData) -> MechResult<Vec<Value>>,
    ) -> MechResult<ChatCard> {
        let automation = self.config.automation;

        let initial = match reroll {
            Some(data) => data,
            None => {
                let title = if item.is_some() { profile.title.as_str() } else { "Basic Attack" };
                AccDiffData::from_params(
                    title,
                    &profile.tags,
                    self.target_refs(&ctx.targets).await?,
                    Some(AccDiffData::starting_from(profile.acc)),
                )
            }
        };
        let accdiff = self.prompt.open(PromptKind::Attack, initial).await?;
        tracing::debug!(title = %profile.title, base_total = accdiff.base_total(), "attack confirmed");

        let rolls = attack::build(profile.grit, &accdiff);

        let mut writeback = Writeback::for_actor(actor.id);
        let unloads =
            automation.attacks && profile.unloads && tag::has(&profile.tags, tag::LOADING);
        if let Some(item) = item.filter(|_| unloads) {
            writeback.unload.push(item.id);
        }

        let smart = tag::has(&profile.tags, tag::SMART);
        let classification = classify(
            &rolls,
            smart,
            automation.attacks,
            self.dice.as_ref(),
            self.defense.as_ref(),
        )
        .await?;
        writeback
            .spent_lock_ons
            .extend(classification.spent_lock_ons.iter().copied());

        let flags = HitFlags::from(&classification);
        let overkill = tag::has(&profile.tags, tag::OVERKILL);
        let outcome = aggregate(&profile.damage, overkill, flags, self.dice.as_ref()).await?;

        let self_heat = heat::self_heat(&profile.tags);
        heat::apply(
            actor,
            outcome.overkill_heat,
            self_heat,
            automation.attack_self_heat,
            &mut writeback,
        );
        self.persist(&writeback).await?;

        let reroll_macro =
            MacroDescriptor::new("Reroll attack", MacroFn::EncodedAttack, reroll_args(&accdiff)?)
                .encode()?;

        let card = AttackCard {
            title: profile.title,
            attacks: classification.attacks,
            hits: classification.hits,
            defense: defense_label(smart).to_string(),
            damages: if flags.has_normal_hit {
                outcome.normal
            } else {
                Vec::new()
            },
            crit_damages: outcome.crit,
            overkill_heat: outcome.overkill_heat,
            self_heat,
            effect: non_empty(&profile.effect),
            on_hit: non_empty(&profile.on_hit),
            tags: profile.tags,
            reroll_macro,
        };
        self.emit(actor, ChatCard::Attack(card)).await
    }
}

pub(super) fn to_value(value: impl Serialize) -> MechResult<Value> {
    serde_json::to_value(value).map_err(|e| MechError::Codec(e.to_string()))
}
