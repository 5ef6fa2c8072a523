use std::collections::HashSet;

use tally_core::{Category, EngineError, Transaction};

use crate::matcher::Matcher;
use crate::ruleset::RuleSet;

/// Runs the matcher across a transaction batch, merging with existing manual
/// overrides. Returns the number of transactions whose category changed.
///
/// Manual overrides are skipped unless `force` is set. A no-match falls back
/// to Miscellaneous and sets the transaction's `unmatched` flag so the gap
/// detector can find it. Nothing is persisted here; callers commit through
/// the sync layer explicitly.
pub fn apply(
    transactions: &mut [Transaction],
    rules: &RuleSet,
    force: bool,
) -> Result<usize, EngineError> {
    // Validate the whole batch up front so a failure never leaves it
    // half-mutated.
    for tx in transactions.iter() {
        if tx.description.trim().is_empty() {
            return Err(EngineError::InvalidTransaction(format!(
                "transaction {} has no description",
                tx.id
            )));
        }
    }

    let matcher = Matcher::new(rules);
    let mut changed = 0;

    for tx in transactions.iter_mut() {
        if tx.is_manual_override && !force {
            continue;
        }

        let next = match matcher.categorize(&tx.description) {
            Some(category) => {
                tx.unmatched = false;
                Some(category.clone())
            }
            None => {
                tx.unmatched = true;
                Some(Category::miscellaneous())
            }
        };

        // A rule (or fallback) assignment is by definition not a manual one.
        // Releasing the override counts as a change even when the category
        // itself stays put.
        if tx.category != next || tx.is_manual_override {
            changed += 1;
        }
        tx.category = next;
        tx.is_manual_override = false;
    }

    tracing::debug!(total = transactions.len(), changed, force, "categorization pass");
    Ok(changed)
}

/// Append-only merge of a new import batch into the existing list,
/// de-duplicated by id. Existing transactions are never touched, so a
/// re-import can never regress a manual override.
pub fn merge_imported(
    existing: &mut Vec<Transaction>,
    incoming: impl IntoIterator<Item = Transaction>,
) -> usize {
    let mut seen: HashSet<_> = existing.iter().map(|tx| tx.id.clone()).collect();
    let mut appended = 0;

    for tx in incoming {
        if seen.insert(tx.id.clone()) {
            existing.push(tx);
            appended += 1;
        }
    }

    appended
}
