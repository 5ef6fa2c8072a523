use tally_core::Category;

use crate::ruleset::RuleSet;
use crate::util::normalize;

/// Pairing of a rule with its pre-normalized pattern, so a batch pass does
/// not re-normalize every pattern per transaction.
struct MatchEntry {
    pattern: String,
    category: Category,
    priority: i32,
    index: usize,
}

/// Pure, deterministic description matcher built from a rule snapshot.
///
/// Tie-break when several patterns match: longest pattern wins (the more
/// specific rule), then higher explicit priority, then earliest declared.
pub struct Matcher {
    entries: Vec<MatchEntry>,
}

impl Matcher {
    pub fn new(rules: &RuleSet) -> Self {
        let entries = rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                let pattern = normalize(&rule.pattern);
                // A blank pattern would match everything.
                if pattern.is_empty() {
                    return None;
                }
                Some(MatchEntry {
                    pattern,
                    category: rule.category.clone(),
                    priority: rule.priority.unwrap_or(0),
                    index,
                })
            })
            .collect();
        Matcher { entries }
    }

    /// `None` means no rule matched; that is a normal result, not an error.
    pub fn categorize(&self, description: &str) -> Option<&Category> {
        let haystack = normalize(description);
        if haystack.is_empty() {
            return None;
        }

        self.entries
            .iter()
            .filter(|e| haystack.contains(&e.pattern))
            .max_by(|a, b| {
                a.pattern
                    .len()
                    .cmp(&b.pattern.len())
                    .then(a.priority.cmp(&b.priority))
                    // Smaller index ranks higher; max_by picks the greater.
                    .then(b.index.cmp(&a.index))
            })
            .map(|e| &e.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Rule;

    fn set(rules: Vec<Rule>) -> RuleSet {
        RuleSet::from_rules(rules)
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let matcher = Matcher::new(&set(vec![Rule::new("amazon", "Shopping")]));
        let cat = matcher.categorize("AMAZON.COM*123").unwrap();
        assert_eq!(cat.as_str(), "Shopping");
    }

    #[test]
    fn no_match_returns_none() {
        let matcher = Matcher::new(&set(vec![Rule::new("amazon", "Shopping")]));
        assert!(matcher.categorize("Unknown Merchant").is_none());
    }

    #[test]
    fn longest_pattern_wins() {
        let matcher = Matcher::new(&set(vec![
            Rule::new("coffee", "Food & Drink"),
            Rule::new("blue coffee", "Shopping"),
        ]));
        let cat = matcher.categorize("Blue Coffee Co").unwrap();
        assert_eq!(cat.as_str(), "Shopping");
    }

    #[test]
    fn equal_length_tie_goes_to_first_declared() {
        let matcher = Matcher::new(&set(vec![
            Rule::new("abcd", "First"),
            Rule::new("bcde", "Second"),
        ]));
        let cat = matcher.categorize("xx abcde xx").unwrap();
        assert_eq!(cat.as_str(), "First");
    }

    #[test]
    fn explicit_priority_overrides_declaration_order() {
        let matcher = Matcher::new(&set(vec![
            Rule::new("abcd", "First"),
            Rule::new("bcde", "Second").with_priority(10),
        ]));
        let cat = matcher.categorize("xx abcde xx").unwrap();
        assert_eq!(cat.as_str(), "Second");
    }

    #[test]
    fn pattern_whitespace_is_collapsed_before_matching() {
        let matcher = Matcher::new(&set(vec![Rule::new("  Blue   Coffee ", "Shopping")]));
        assert!(matcher.categorize("BLUE COFFEE CO").is_some());
    }

    #[test]
    fn blank_patterns_never_match() {
        let matcher = Matcher::new(&set(vec![Rule::new("   ", "Shopping")]));
        assert!(matcher.categorize("anything at all").is_none());
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let matcher = Matcher::new(&set(vec![
            Rule::new("coffee", "Food & Drink"),
            Rule::new("blue coffee", "Shopping"),
            Rule::new("co", "Home"),
        ]));
        let first = matcher.categorize("Blue Coffee Co").cloned();
        for _ in 0..50 {
            assert_eq!(matcher.categorize("Blue Coffee Co").cloned(), first);
        }
    }
}
