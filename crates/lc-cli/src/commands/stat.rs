use super::{ScenarioArgs, Session};

pub async fn run(args: &ScenarioArgs, key: &str) -> Result<(), String> {
    let session = Session::open(args)?;
    let ctx = session.context()?;
    let card = session.resolver.prepare_stat(&ctx, key, None).await;
    session.finish(card).await
}
