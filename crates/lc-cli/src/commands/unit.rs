use lc_core::ActorKind;

use super::{ScenarioArgs, Session};

pub async fn run(args: &ScenarioArgs, action: &str) -> Result<(), String> {
    let session = Session::open(args)?;
    let ctx = session.context()?;
    let resolver = &session.resolver;

    let card = match action.to_lowercase().as_str() {
        "core" => resolver.prepare_core_active(&ctx).await,
        "structure" => resolver.prepare_structure_secondary(&ctx).await,
        "overcharge" => resolver.prepare_overcharge(&ctx).await,
        "recharge" => {
            let card = resolver.prepare_recharge(&ctx).await;
            let is_npc = session
                .roster
                .get(session.actor()?)
                .is_some_and(|a| a.kind == ActorKind::Npc);
            if card.is_none() && is_npc {
                println!("  Nothing to recharge.");
                return Ok(());
            }
            card
        }
        other => {
            return Err(format!(
                "unknown unit action \"{other}\" (expected core, structure, overcharge, recharge)"
            ));
        }
    };
    session.finish(card).await
}
