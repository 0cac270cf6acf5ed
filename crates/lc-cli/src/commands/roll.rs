use lc_mechanics::DiceRoller;
use lc_mechanics::dice::LocalRoller;

pub async fn run(formula: &str, seed: Option<u64>, json: bool) -> Result<(), String> {
    let roller = LocalRoller::seeded(seed);
    let roll = roller.roll(formula).await.map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&roll).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        crate::render::print_roll(&roll);
    }
    Ok(())
}
