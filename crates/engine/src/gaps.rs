use std::collections::HashMap;

use tally_core::{Category, EngineError, Rule, Transaction};

use crate::ruleset::RuleSet;
use crate::util::{normalize, token_prefix};

#[derive(Debug, Clone, Default)]
pub struct GapConfig {
    /// When set, descriptions are clustered on their first N tokens instead
    /// of the full normalized text, so "UBER TRIP 8842" and "UBER TRIP 9911"
    /// produce one candidate rule.
    pub token_prefix: Option<usize>,
}

/// One candidate rule per distinct description cluster among the gaps.
/// `category` starts as the fallback; the caller remaps it before adding.
#[derive(Debug, Clone, PartialEq)]
pub struct GapSuggestion {
    pub pattern: String,
    pub category: Category,
    pub count: usize,
}

/// Finds transactions that fell back to Miscellaneous because no rule
/// matched (manual Miscellaneous assignments are not gaps), clustered by
/// normalized description and ordered most-frequent first.
pub fn find_gaps(
    transactions: &[Transaction],
    config: &GapConfig,
) -> impl Iterator<Item = GapSuggestion> {
    let mut clusters: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.is_gap()) {
        let key = match config.token_prefix {
            Some(n) => token_prefix(&tx.description, n),
            None => normalize(&tx.description),
        };
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => clusters[i].1 += 1,
            None => {
                index.insert(key.clone(), clusters.len());
                clusters.push((key, 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal frequencies.
    clusters.sort_by(|a, b| b.1.cmp(&a.1));

    clusters.into_iter().map(|(pattern, count)| GapSuggestion {
        pattern,
        category: Category::miscellaneous(),
        count,
    })
}

/// Adds one rule per mapped suggestion, writing through the rule store only
/// after the whole batch validates: a duplicate (pattern, category) pair —
/// against the store or within the batch — rejects the entire call.
/// Suggestions absent from `mapping` are skipped. Returns the added count.
pub fn bulk_add_rules(
    rules: &mut RuleSet,
    suggestions: &[GapSuggestion],
    mapping: &HashMap<String, Category>,
) -> Result<usize, EngineError> {
    let mut staged: Vec<Rule> = Vec::new();

    for suggestion in suggestions {
        let Some(category) = mapping.get(&suggestion.pattern) else {
            continue;
        };
        let duplicate_in_batch = staged
            .iter()
            .any(|r| normalize(&r.pattern) == normalize(&suggestion.pattern) && r.category == *category);
        if duplicate_in_batch || rules.contains(&suggestion.pattern, category) {
            return Err(EngineError::DuplicateRule {
                pattern: suggestion.pattern.clone(),
                category: category.to_string(),
            });
        }
        staged.push(Rule::new(suggestion.pattern.clone(), category.clone()));
    }

    let added = staged.len();
    for rule in staged {
        rules.add(rule)?;
    }

    tracing::debug!(added, "bulk rule add from gap suggestions");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::{Amount, Card};

    fn gap_tx(desc: &str) -> Transaction {
        let mut tx = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            desc,
            Amount::from_cents(500),
            Card::Amex,
        );
        tx.category = Some(Category::miscellaneous());
        tx.unmatched = true;
        tx
    }

    #[test]
    fn clusters_by_normalized_description_and_orders_by_frequency() {
        let batch = vec![
            gap_tx("CORNER  SHOP"),
            gap_tx("corner shop"),
            gap_tx("ODD VENDOR"),
            gap_tx("Corner Shop"),
            gap_tx("odd vendor"),
        ];

        let gaps: Vec<_> = find_gaps(&batch, &GapConfig::default()).collect();
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].pattern, "corner shop");
        assert_eq!(gaps[0].count, 3);
        assert_eq!(gaps[1].pattern, "odd vendor");
        assert_eq!(gaps[1].count, 2);
    }

    #[test]
    fn manual_miscellaneous_is_not_a_gap() {
        let mut manual = gap_tx("DELIBERATELY MISC");
        manual.set_manual_category(Category::miscellaneous());

        let batch = vec![manual, gap_tx("REAL GAP")];
        let gaps: Vec<_> = find_gaps(&batch, &GapConfig::default()).collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].pattern, "real gap");
    }

    #[test]
    fn matched_transactions_are_not_gaps() {
        let mut matched = gap_tx("AMAZON");
        matched.unmatched = false;
        matched.category = Some(Category::new("Shopping"));

        let gaps: Vec<_> = find_gaps(&[matched], &GapConfig::default()).collect();
        assert!(gaps.is_empty());
    }

    #[test]
    fn token_prefix_merges_reference_numbered_descriptions() {
        let batch = vec![gap_tx("UBER TRIP 8842-XJ"), gap_tx("UBER TRIP 9911-KD")];

        let whole: Vec<_> = find_gaps(&batch, &GapConfig::default()).collect();
        assert_eq!(whole.len(), 2);

        let prefixed: Vec<_> =
            find_gaps(&batch, &GapConfig { token_prefix: Some(2) }).collect();
        assert_eq!(prefixed.len(), 1);
        assert_eq!(prefixed[0].pattern, "uber trip");
        assert_eq!(prefixed[0].count, 2);
    }

    #[test]
    fn bulk_add_writes_mapped_suggestions() {
        let mut rules = RuleSet::new();
        let suggestions = vec![
            GapSuggestion { pattern: "corner shop".into(), category: Category::miscellaneous(), count: 3 },
            GapSuggestion { pattern: "odd vendor".into(), category: Category::miscellaneous(), count: 2 },
        ];
        let mapping: HashMap<String, Category> = [
            ("corner shop".to_string(), Category::new("Groceries")),
        ]
        .into();

        let added = bulk_add_rules(&mut rules, &suggestions, &mapping).unwrap();
        assert_eq!(added, 1);
        assert!(rules.contains("corner shop", &Category::new("Groceries")));
        // Unmapped suggestion is skipped, not added as Miscellaneous.
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn bulk_add_rejects_the_whole_batch_on_duplicate() {
        let mut rules = RuleSet::new();
        rules.add(Rule::new("corner shop", "Groceries")).unwrap();

        let suggestions = vec![
            GapSuggestion { pattern: "odd vendor".into(), category: Category::miscellaneous(), count: 2 },
            GapSuggestion { pattern: "corner shop".into(), category: Category::miscellaneous(), count: 3 },
        ];
        let mapping: HashMap<String, Category> = [
            ("odd vendor".to_string(), Category::new("Shopping")),
            ("corner shop".to_string(), Category::new("Groceries")),
        ]
        .into();

        let err = bulk_add_rules(&mut rules, &suggestions, &mapping).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateRule { .. }));
        // Nothing from the batch landed.
        assert_eq!(rules.len(), 1);
        assert!(!rules.contains("odd vendor", &Category::new("Shopping")));
    }
}
