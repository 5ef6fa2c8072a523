use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "tally", about = "Rule-based credit card transaction categorizer")]
struct Cli {
    /// Override the data directory (storage, config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a normalized export (CSV: date,description,amount,card),
    /// categorize the new rows, and commit.
    Import { file: PathBuf },
    /// Re-run categorization over all stored transactions and commit.
    Categorize {
        /// Also re-categorize manually overridden transactions.
        #[arg(long)]
        force: bool,
    },
    /// List uncategorized description clusters, optionally adding rules for
    /// them in bulk.
    Gaps {
        /// Map a cluster to a category, e.g. --map "uber trip=Travel".
        /// Repeatable; all mappings are validated before any rule is added.
        #[arg(long = "map", value_name = "PATTERN=CATEGORY")]
        mappings: Vec<String>,
    },
    /// Manage categorization rules.
    #[command(subcommand)]
    Rules(RulesCommand),
    /// Show stored counts and rule-set warnings.
    Status,
}

#[derive(Subcommand)]
enum RulesCommand {
    /// Add a rule; fails if the (pattern, category) pair already exists.
    Add {
        pattern: String,
        category: String,
        #[arg(long)]
        priority: Option<i32>,
    },
    /// Remove an existing rule.
    Remove { pattern: String, category: String },
    /// List all rules in declaration order.
    List,
    /// Case-insensitive substring search over pattern and category.
    Search { query: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let data_dir = config::data_dir(cli.data_dir)?;
    let config = config::Config::load(&data_dir)?;
    let ctx = commands::Context::open(&data_dir, &config)?;

    match cli.command {
        Command::Import { file } => commands::import(&ctx, &file),
        Command::Categorize { force } => commands::categorize(&ctx, force),
        Command::Gaps { mappings } => commands::gaps(&ctx, &mappings),
        Command::Rules(RulesCommand::Add { pattern, category, priority }) => {
            commands::rules_add(&ctx, &pattern, &category, priority)
        }
        Command::Rules(RulesCommand::Remove { pattern, category }) => {
            commands::rules_remove(&ctx, &pattern, &category)
        }
        Command::Rules(RulesCommand::List) => commands::rules_list(&ctx),
        Command::Rules(RulesCommand::Search { query }) => commands::rules_search(&ctx, &query),
        Command::Status => commands::status(&ctx),
    }
}
