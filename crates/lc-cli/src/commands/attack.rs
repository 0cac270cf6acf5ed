use lc_mechanics::AttackOptions;

use super::{ScenarioArgs, Session};

pub async fn run(args: &ScenarioArgs, weapon: Option<&str>, acc_bonus: i32) -> Result<(), String> {
    let session = Session::open(args)?;
    let ctx = session.context()?;

    let card = match weapon {
        Some(name) => {
            let item = session.item(name)?.id;
            let options = AttackOptions {
                acc_bonus,
                dam_bonus: None,
            };
            session.resolver.prepare_attack(&ctx, item, options).await
        }
        None => session.resolver.open_basic_attack(&ctx).await,
    };
    session.finish(card).await
}
