//! Macro dispatch through the allow-list.

use lc_core::{ActorId, ItemId};

use super::attack::AttackOptions;
use super::item::ItemOptions;
use super::{MacroContext, Resolver};
use crate::accdiff::AccDiffSerialized;
use crate::card::ChatCard;
use crate::error::MechResult;
use crate::macros::{MacroDescriptor, MacroFn, StoredMacro};

impl Resolver {
    /// Decode a macro token and run it.
    pub async fn run_encoded_macro(&self, ctx: &MacroContext, token: &str) -> Option<ChatCard> {
        self.boundary("macro", async {
            let descriptor = MacroDescriptor::decode(token)?;
            self.dispatch(ctx, &descriptor).await
        })
        .await
    }

    /// Run a decoded macro.
    ///
    /// The function name must be on the allow-list. The first argument
    /// names the speaking actor; targets come from `ctx`.
    pub async fn invoke(&self, ctx: &MacroContext, descriptor: &MacroDescriptor) -> Option<ChatCard> {
        self.boundary("macro", self.dispatch(ctx, descriptor)).await
    }

    /// Store a macro dropped on the hotbar. Descriptors naming anything off
    /// the allow-list are refused.
    pub fn hotbar_drop(&self, descriptor: &MacroDescriptor) -> Option<StoredMacro> {
        match StoredMacro::from_descriptor(descriptor) {
            Ok(stored) => {
                tracing::info!(name = %stored.name, function = %descriptor.function, "stored hotbar macro");
                Some(stored)
            }
            Err(err) => {
                self.surface("hotbar drop", &err);
                None
            }
        }
    }

    async fn dispatch(&self, ctx: &MacroContext, d: &MacroDescriptor) -> MechResult<ChatCard> {
        let function = d.entry_point()?;
        let speaker: ActorId = d.arg(0)?;
        let ctx = MacroContext::new(speaker).with_targets(ctx.targets.clone());
        tracing::info!(%function, title = %d.title, %speaker, "dispatching macro");

        match function {
            MacroFn::Activation => {
                let item: ItemId = d.arg(1)?;
                let index: usize = d.arg(2)?;
                let reroll: Option<AccDiffSerialized> = d.arg(3)?;
                self.run_activation(&ctx, item, index, reroll).await
            }
            MacroFn::EncodedAttack => {
                let item: Option<ItemId> = d.arg(1)?;
                let options: Option<AttackOptions> = d.arg(2)?;
                let reroll: AccDiffSerialized = d.arg(3)?;
                self.run_encoded_attack(&ctx, item, options.unwrap_or_default(), reroll)
                    .await
            }
            MacroFn::Tech => {
                let item: ItemId = d.arg(1)?;
                let reroll: Option<AccDiffSerialized> = d.arg(2)?;
                self.run_tech(&ctx, item, reroll).await
            }
            MacroFn::Stat => {
                let key: String = d.arg(1)?;
                let reroll: Option<AccDiffSerialized> = d.arg(2)?;
                self.run_stat(&ctx, &key, reroll).await
            }
            MacroFn::Item => {
                let item: ItemId = d.arg(1)?;
                let options: Option<ItemOptions> = d.arg(2)?;
                self.run_item(&ctx, item, options.unwrap_or_default()).await
            }
            MacroFn::CoreActive => self.run_core_active(&ctx).await,
            MacroFn::StructureSecondaryRoll => self.run_structure_secondary(&ctx).await,
        }
    }
}
