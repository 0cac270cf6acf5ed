pub mod attack;
pub mod item;
pub mod list;
pub mod roll;
pub mod stat;
pub mod tech;
pub mod token;
pub mod unit;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use lc_core::{ActorId, Item, Roster};
use lc_mechanics::host::{Notifier, NotifyLevel};
use lc_mechanics::{ChatCard, EngineConfig, MacroContext, MemoryStore, PresetPrompt, Resolver};
use serde::{Deserialize, Serialize};

/// Options shared by every command that resolves against a scenario.
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Scenario JSON file
    #[arg(short = 'S', long, default_value = "scenario.json")]
    pub scenario: PathBuf,

    /// Acting unit (case-insensitive name)
    #[arg(short, long)]
    pub actor: Option<String>,

    /// Targeted unit; repeat for several targets
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// RNG seed for deterministic rolls
    #[arg(long)]
    pub seed: Option<u64>,

    /// Accuracy to add in the accuracy/difficulty prompt
    #[arg(long, default_value = "0")]
    pub accuracy: i32,

    /// Difficulty to add in the accuracy/difficulty prompt
    #[arg(long, default_value = "0")]
    pub difficulty: i32,

    /// Keep the targets' Lock On
    #[arg(long)]
    pub keep_lock_on: bool,

    /// Answer "no" to confirmation questions
    #[arg(long)]
    pub decline: bool,

    /// Resolve attacks manually: no hit checks, loading, or heat
    #[arg(long)]
    pub manual: bool,

    /// Do not apply overkill and self heat
    #[arg(long)]
    pub no_self_heat: bool,

    /// Print the result card as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the updated roster back to the scenario file
    #[arg(long)]
    pub save: bool,
}

/// A scenario file: the roster plus optional engine settings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub actors: Roster,
    #[serde(default)]
    pub config: EngineConfig,
}

pub fn load_scenario(path: &Path) -> Result<Scenario, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid scenario {}: {e}", path.display()))
}

/// Prints notifications to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info => eprintln!("  {message}"),
            NotifyLevel::Warning => eprintln!("{} {message}", "warning:".yellow().bold()),
            NotifyLevel::Error => eprintln!("{} {message}", "error:".red().bold()),
        }
    }
}

/// A loaded scenario wired to a resolver.
pub struct Session {
    pub args: ScenarioArgs,
    pub store: Arc<MemoryStore>,
    pub resolver: Resolver,
    pub roster: Roster,
    config: EngineConfig,
}

impl Session {
    pub fn open(args: &ScenarioArgs) -> Result<Self, String> {
        let scenario = load_scenario(&args.scenario)?;
        tracing::debug!(
            path = %args.scenario.display(),
            actors = scenario.actors.len(),
            "loaded scenario"
        );
        let mut config = scenario.config;
        if let Some(seed) = args.seed {
            config.seed = Some(seed);
        }
        if args.manual {
            config.automation.attacks = false;
            config.automation.attack_self_heat = false;
        }
        if args.no_self_heat {
            config.automation.attack_self_heat = false;
        }

        let mut prompt = PresetPrompt::new(args.accuracy, args.difficulty).with_confirm(!args.decline);
        if args.keep_lock_on {
            prompt = prompt.with_consume_lock_on(false);
        }

        let store = Arc::new(MemoryStore::new(scenario.actors.clone()));
        let resolver = Resolver::new(store.clone(), config.clone())
            .with_prompt(Arc::new(prompt))
            .with_notifier(Arc::new(ConsoleNotifier));

        Ok(Self {
            args: args.clone(),
            store,
            resolver,
            roster: scenario.actors,
            config,
        })
    }

    /// The acting unit. Defaults to the first actor in the file.
    pub fn actor(&self) -> Result<ActorId, String> {
        match &self.args.actor {
            Some(name) => self.roster.id_by_name(name).map_err(|e| e.to_string()),
            None => self
                .roster
                .actors()
                .next()
                .map(|a| a.id)
                .ok_or_else(|| "scenario has no actors".to_string()),
        }
    }

    pub fn context(&self) -> Result<MacroContext, String> {
        let targets = self
            .args
            .targets
            .iter()
            .map(|name| self.roster.id_by_name(name).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MacroContext::new(self.actor()?).with_targets(targets))
    }

    pub fn item(&self, name: &str) -> Result<&Item, String> {
        self.roster
            .owned_item_by_name(self.actor()?, name)
            .map_err(|e| e.to_string())
    }

    /// Print the card, save if asked, and fail if nothing was resolved.
    pub async fn finish(self, card: Option<ChatCard>) -> Result<(), String> {
        let Some(card) = card else {
            return Err("nothing was resolved".into());
        };
        if self.args.json {
            let json = serde_json::to_string_pretty(&card).map_err(|e| e.to_string())?;
            println!("{json}");
        } else {
            crate::render::print_card(&card);
        }

        if self.args.save {
            let scenario = Scenario {
                actors: self.store.snapshot().await,
                config: self.config,
            };
            let json = serde_json::to_string_pretty(&scenario).map_err(|e| e.to_string())?;
            std::fs::write(&self.args.scenario, json)
                .map_err(|e| format!("cannot write {}: {e}", self.args.scenario.display()))?;
        }
        Ok(())
    }
}
