//! Stat and skill checks.

use lc_core::Actor;

use super::attack::to_value;
use super::tech::{TechProfile, TechReroll};
use super::{MacroContext, Resolver};
use crate::accdiff::{AccDiffData, AccDiffSerialized, PromptKind};
use crate::attack::roll_str;
use crate::card::{ChatCard, StatCard, non_empty};
use crate::error::{MechError, MechResult};
use crate::macros::MacroFn;

/// The card title for a stat key: its last path segment in upper case.
fn stat_title(key: &str) -> String {
    key.rsplit('.').next().unwrap_or(key).to_uppercase()
}

fn is_tech_attack(title: &str) -> bool {
    title.replace('_', "") == "TECHATTACK"
}

impl Resolver {
    /// Roll a stat check, e.g. `mm.Hull` or `agility`.
    ///
    /// Tech Attack is rolled as a targeted tech attack instead. `reroll`
    /// only applies to that case.
    pub async fn prepare_stat(
        &self,
        ctx: &MacroContext,
        key: &str,
        reroll: Option<AccDiffSerialized>,
    ) -> Option<ChatCard> {
        self.boundary("stat", self.run_stat(ctx, key, reroll)).await
    }

    pub(super) async fn run_stat(
        &self,
        ctx: &MacroContext,
        key: &str,
        reroll: Option<AccDiffSerialized>,
    ) -> MechResult<ChatCard> {
        let actor = self.speaker(ctx).await?;
        let bonus = actor
            .stat(key)
            .ok_or_else(|| MechError::Lookup(format!("{} has no stat \"{key}\"", actor.name)))?;
        let title = stat_title(key);

        if is_tech_attack(&title) {
            let profile = TechProfile {
                title: "TECH ATTACK".into(),
                t_atk: bonus,
                action: "Quick".into(),
                ..TechProfile::default()
            };
            let data = match reroll {
                Some(serialized) => Some(self.rebuild(serialized, &[]).await?),
                None => None,
            };
            let reroll_with = TechReroll {
                title: "Reroll stat macro",
                function: MacroFn::Stat,
                args: vec![to_value(actor.id)?, to_value(key)?],
            };
            return self
                .run_tech_attack(ctx, &actor, profile, data, reroll_with)
                .await;
        }

        self.roll_stat(&actor, title, bonus, "").await
    }

    /// Prompt for accuracy and difficulty, then roll `1d20 + bonus` with the
    /// resulting bonus or penalty die.
    pub(super) async fn roll_stat(
        &self,
        actor: &Actor,
        title: String,
        bonus: i32,
        effect: &str,
    ) -> MechResult<ChatCard> {
        let initial = AccDiffData::from_params(title.as_str(), &[], Vec::new(), None);
        let accdiff = self.prompt.open(PromptKind::Hase, initial).await?;
        let formula = roll_str(bonus, accdiff.base_total());
        tracing::debug!(%title, %formula, "rolling stat check");

        let roll = self.dice.roll(&formula).await?;
        let card = StatCard {
            title,
            tooltip: roll.tooltip(),
            roll,
            effect: non_empty(effect),
        };
        self.emit(actor, ChatCard::Stat(card)).await
    }
}
