//! CLI frontend for the Lancer combat engine.

mod commands;
mod render;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::ScenarioArgs;

#[derive(Parser)]
#[command(
    name = "lc",
    about = "Lancer combat resolution from the command line",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine internals to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the actors in a scenario
    List {
        /// Scenario JSON file
        #[arg(short = 'S', long, default_value = "scenario.json")]
        scenario: PathBuf,
    },

    /// Attack with a weapon, or make a basic attack without one
    Attack {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Weapon name (omit for a basic attack)
        #[arg(short, long)]
        weapon: Option<String>,

        /// Flat bonus to the attack roll
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        acc_bonus: i32,
    },

    /// Roll a stat check, e.g. `hull` or `mm.Agility`
    Stat {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Stat key
        key: String,
    },

    /// Roll a tech attack with an NPC tech feature
    Tech {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Feature name
        #[arg(short, long)]
        item: String,
    },

    /// Use an item: weapons attack, skills roll, everything else prints
    Use {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Item name
        #[arg(short, long)]
        item: String,

        /// Action index for systems and talents with actions
        #[arg(long)]
        action: Option<usize>,

        /// Talent rank to show
        #[arg(long)]
        rank: Option<usize>,
    },

    /// Unit actions: core, structure, overcharge, recharge
    Unit {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// One of: core, structure, overcharge, recharge
        action: String,
    },

    /// Roll a dice formula
    Roll {
        /// Formula, e.g. `1d20 + 2 + 2d6kh1`
        formula: String,

        /// RNG seed for a deterministic roll
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the roll as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a macro descriptor as a token
    Encode {
        /// Macro title
        #[arg(short, long)]
        title: String,

        /// Entry point, e.g. prepareStatMacro
        #[arg(short, long = "fn")]
        function: String,

        /// Arguments as a JSON array
        #[arg(short, long, default_value = "[]")]
        args: String,
    },

    /// Decode a macro token and print the descriptor
    Decode {
        /// Token
        token: String,
    },

    /// Decode a macro token and run it against a scenario
    RunMacro {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Token
        token: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::List { scenario } => commands::list::run(&scenario),
        Commands::Attack {
            scenario,
            weapon,
            acc_bonus,
        } => commands::attack::run(&scenario, weapon.as_deref(), acc_bonus).await,
        Commands::Stat { scenario, key } => commands::stat::run(&scenario, &key).await,
        Commands::Tech { scenario, item } => commands::tech::run(&scenario, &item).await,
        Commands::Use {
            scenario,
            item,
            action,
            rank,
        } => commands::item::run(&scenario, &item, action, rank).await,
        Commands::Unit { scenario, action } => commands::unit::run(&scenario, &action).await,
        Commands::Roll {
            formula,
            seed,
            json,
        } => commands::roll::run(&formula, seed, json).await,
        Commands::Encode {
            title,
            function,
            args,
        } => commands::token::encode(&title, &function, &args),
        Commands::Decode { token } => commands::token::decode(&token),
        Commands::RunMacro { scenario, token } => {
            commands::token::run_macro(&scenario, &token).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
