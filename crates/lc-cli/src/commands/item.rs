use lc_mechanics::ItemOptions;

use super::{ScenarioArgs, Session};

pub async fn run(
    args: &ScenarioArgs,
    item: &str,
    action: Option<usize>,
    rank: Option<usize>,
) -> Result<(), String> {
    let session = Session::open(args)?;
    let ctx = session.context()?;
    let item = session.item(item)?.id;

    let card = match action {
        Some(index) => {
            session
                .resolver
                .prepare_activation(&ctx, item, index, None)
                .await
        }
        None => {
            let options = ItemOptions {
                rank,
                ..ItemOptions::default()
            };
            session.resolver.prepare_item(&ctx, item, options).await
        }
    };
    session.finish(card).await
}
