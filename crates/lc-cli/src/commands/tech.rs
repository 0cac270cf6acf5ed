use super::{ScenarioArgs, Session};

pub async fn run(args: &ScenarioArgs, item: &str) -> Result<(), String> {
    let session = Session::open(args)?;
    let ctx = session.context()?;
    let item = session.item(item)?.id;
    let card = session.resolver.prepare_tech(&ctx, item, None).await;
    session.finish(card).await
}
