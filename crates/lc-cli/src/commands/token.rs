use lc_mechanics::MacroDescriptor;
use serde_json::Value;

use super::{ScenarioArgs, Session};

pub fn encode(title: &str, function: &str, args: &str) -> Result<(), String> {
    let args: Vec<Value> =
        serde_json::from_str(args).map_err(|e| format!("--args must be a JSON array: {e}"))?;
    let descriptor = MacroDescriptor {
        title: title.to_string(),
        function: function.to_string(),
        args,
        icon_path: None,
    };
    descriptor.entry_point().map_err(|e| e.to_string())?;
    let token = descriptor.encode().map_err(|e| e.to_string())?;
    println!("{token}");
    Ok(())
}

pub fn decode(token: &str) -> Result<(), String> {
    let descriptor = MacroDescriptor::decode(token).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&descriptor).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

pub async fn run_macro(args: &ScenarioArgs, token: &str) -> Result<(), String> {
    let session = Session::open(args)?;
    let ctx = session.context()?;
    let card = session.resolver.run_encoded_macro(&ctx, token).await;
    session.finish(card).await
}
