use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context as _};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use tally_core::{Amount, Card, Category, Rule, Transaction, DEFAULT_CATEGORIES};
use tally_engine::{apply, bulk_add_rules, find_gaps, merge_imported, GapConfig, RuleSet};
use tally_storage::{LocalStore, SyncStore};

use crate::config::Config;

/// Session-scoped handle: one store, one config. Every command runs a full
/// load → mutate → commit cycle; nothing persists mid-computation.
pub struct Context {
    sync: SyncStore<LocalStore>,
    gap_config: GapConfig,
}

impl Context {
    pub fn open(data_dir: &Path, config: &Config) -> anyhow::Result<Self> {
        let store = LocalStore::new(data_dir)
            .with_context(|| format!("opening store at {}", data_dir.display()))?;
        Ok(Context {
            sync: SyncStore::with_retry(store, config.retry_policy()),
            gap_config: GapConfig {
                token_prefix: config.gap_token_prefix,
            },
        })
    }
}

/// One row of the normalized export format the import boundary produces.
/// Card-specific export quirks are resolved before data reaches this core.
#[derive(Debug, Deserialize)]
struct ImportRow {
    date: String,
    description: String,
    amount: String,
    card: String,
}

fn read_normalized_csv(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut transactions = Vec::new();

    for (i, row) in reader.deserialize::<ImportRow>().enumerate() {
        let row = row.with_context(|| format!("row {}", i + 1))?;
        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
            .with_context(|| format!("row {}: bad date {:?}", i + 1, row.date))?;
        let amount: Amount = row
            .amount
            .parse()
            .map_err(|e| anyhow::anyhow!("row {}: bad amount {:?}: {e}", i + 1, row.amount))?;
        let card: Card = row
            .card
            .parse()
            .with_context(|| format!("row {}", i + 1))?;
        transactions.push(Transaction::new(date, row.description, amount, card));
    }

    Ok(transactions)
}

pub fn import(ctx: &Context, file: &Path) -> anyhow::Result<()> {
    let incoming = read_normalized_csv(file)?;
    let (mut transactions, rules) = ctx.sync.load_all()?;

    let appended = merge_imported(&mut transactions, incoming);
    let changed = apply(&mut transactions, &rules, false)?;
    ctx.sync.commit(&transactions, &rules)?;

    println!("Imported {appended} new transactions ({changed} categorized).");
    report_ambiguities(&rules);
    Ok(())
}

pub fn categorize(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let (mut transactions, rules) = ctx.sync.load_all()?;

    let changed = apply(&mut transactions, &rules, force)?;
    ctx.sync.commit(&transactions, &rules)?;

    if changed == 0 {
        println!("No changes.");
    } else {
        println!("Recategorized {changed} transactions.");
    }
    report_ambiguities(&rules);
    Ok(())
}

pub fn gaps(ctx: &Context, mappings: &[String]) -> anyhow::Result<()> {
    let (mut transactions, mut rules) = ctx.sync.load_all()?;

    // Gap flags are session-only; a pass over the loaded batch rebuilds them
    // without changing any already-assigned category.
    apply(&mut transactions, &rules, false)?;
    let suggestions: Vec<_> = find_gaps(&transactions, &ctx.gap_config).collect();

    if suggestions.is_empty() {
        println!("No uncategorized transactions.");
        return Ok(());
    }

    if mappings.is_empty() {
        println!("Uncategorized description clusters:");
        for s in &suggestions {
            println!("  {:>4}x  {}", s.count, s.pattern);
        }
        return Ok(());
    }

    let mapping = parse_mappings(mappings)?;
    let added = bulk_add_rules(&mut rules, &suggestions, &mapping)?;
    let changed = apply(&mut transactions, &rules, false)?;
    ctx.sync.commit(&transactions, &rules)?;

    println!("Added {added} rules ({changed} transactions recategorized).");
    Ok(())
}

fn parse_mappings(mappings: &[String]) -> anyhow::Result<HashMap<String, Category>> {
    let mut map = HashMap::new();
    for entry in mappings {
        let Some((pattern, category)) = entry.split_once('=') else {
            bail!("bad mapping {entry:?}: expected PATTERN=CATEGORY");
        };
        let category = Category::new(category.trim());
        warn_if_unknown_category(&category);
        map.insert(pattern.trim().to_string(), category);
    }
    Ok(map)
}

/// The category set is extensible, so this is advisory: it catches typos
/// against the seeded list without blocking deliberate new categories.
fn warn_if_unknown_category(category: &Category) {
    if !DEFAULT_CATEGORIES.contains(&category.as_str()) {
        warn!(category = %category, "category is not in the default set");
    }
}

pub fn rules_add(
    ctx: &Context,
    pattern: &str,
    category: &str,
    priority: Option<i32>,
) -> anyhow::Result<()> {
    let (transactions, mut rules) = ctx.sync.load_all()?;

    let mut rule = Rule::new(pattern, category);
    if let Some(priority) = priority {
        rule = rule.with_priority(priority);
    }
    warn_if_unknown_category(&rule.category);
    rules.add(rule)?;
    ctx.sync.commit(&transactions, &rules)?;

    println!("Added rule: \"{pattern}\" -> {category}");
    report_ambiguities(&rules);
    Ok(())
}

pub fn rules_remove(ctx: &Context, pattern: &str, category: &str) -> anyhow::Result<()> {
    let (transactions, mut rules) = ctx.sync.load_all()?;

    if !rules.remove(pattern, &Category::new(category)) {
        bail!("no rule \"{pattern}\" -> {category}");
    }
    ctx.sync.commit(&transactions, &rules)?;

    println!("Removed rule: \"{pattern}\" -> {category}");
    Ok(())
}

pub fn rules_list(ctx: &Context) -> anyhow::Result<()> {
    let (_, rules) = ctx.sync.load_all()?;
    print_rules(rules.iter());
    Ok(())
}

pub fn rules_search(ctx: &Context, query: &str) -> anyhow::Result<()> {
    let (_, rules) = ctx.sync.load_all()?;
    print_rules(rules.search(query));
    Ok(())
}

fn print_rules<'a>(rules: impl Iterator<Item = &'a Rule>) {
    let mut any = false;
    for rule in rules {
        any = true;
        match rule.priority {
            Some(p) => println!("\"{}\" -> {} (priority {p})", rule.pattern, rule.category),
            None => println!("\"{}\" -> {}", rule.pattern, rule.category),
        }
    }
    if !any {
        println!("No rules.");
    }
}

pub fn status(ctx: &Context) -> anyhow::Result<()> {
    let (mut transactions, rules) = ctx.sync.load_all()?;

    let manual = transactions.iter().filter(|tx| tx.is_manual_override).count();
    apply(&mut transactions, &rules, false)?;
    let gaps = transactions.iter().filter(|tx| tx.is_gap()).count();

    println!("{} transactions ({manual} manual overrides)", transactions.len());
    println!("{} rules", rules.len());
    println!("{gaps} uncategorized");
    report_ambiguities(&rules);
    Ok(())
}

fn report_ambiguities(rules: &RuleSet) {
    for ambiguous in rules.ambiguities() {
        let categories: Vec<_> = ambiguous
            .categories
            .iter()
            .map(Category::as_str)
            .collect();
        warn!(
            pattern = %ambiguous.pattern,
            categories = categories.join(", "),
            "pattern maps to multiple categories; longest/first tie-break applies"
        );
    }
}
