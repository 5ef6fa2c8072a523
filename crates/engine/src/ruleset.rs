use std::collections::HashMap;

use tally_core::{AmbiguousRule, Category, EngineError, Rule};

use crate::util::normalize;

/// Ordered collection of categorization rules. Order is load/declaration
/// order and is significant: it is the final tie-break when two equal-length
/// patterns match the same description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Wraps an already-ordered rule list, e.g. one deserialized from the
    /// rule file.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if an identical (pattern, category) pair exists, compared on the
    /// normalized pattern text.
    pub fn contains(&self, pattern: &str, category: &Category) -> bool {
        let key = normalize(pattern);
        self.rules
            .iter()
            .any(|r| normalize(&r.pattern) == key && r.category == *category)
    }

    pub fn add(&mut self, rule: Rule) -> Result<(), EngineError> {
        if self.contains(&rule.pattern, &rule.category) {
            return Err(EngineError::DuplicateRule {
                pattern: rule.pattern,
                category: rule.category.to_string(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Removes the matching (pattern, category) pair. Returns whether a rule
    /// was actually removed.
    pub fn remove(&mut self, pattern: &str, category: &Category) -> bool {
        let key = normalize(pattern);
        let before = self.rules.len();
        self.rules
            .retain(|r| !(normalize(&r.pattern) == key && r.category == *category));
        self.rules.len() != before
    }

    /// Lazy case-insensitive substring search over pattern and category.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Rule> {
        let query = query.to_lowercase();
        self.rules.iter().filter(move |r| {
            r.pattern.to_lowercase().contains(&query)
                || r.category.as_str().to_lowercase().contains(&query)
        })
    }

    /// Pattern texts mapped to more than one category. Legal, but worth
    /// review: the matcher's tie-break will silently pick one of them.
    pub fn ambiguities(&self) -> Vec<AmbiguousRule> {
        let mut by_pattern: Vec<(String, Vec<Category>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for rule in &self.rules {
            let key = normalize(&rule.pattern);
            match index.get(&key) {
                Some(&i) => {
                    if !by_pattern[i].1.contains(&rule.category) {
                        by_pattern[i].1.push(rule.category.clone());
                    }
                }
                None => {
                    index.insert(key.clone(), by_pattern.len());
                    by_pattern.push((key, vec![rule.category.clone()]));
                }
            }
        }

        by_pattern
            .into_iter()
            .filter(|(_, categories)| categories.len() > 1)
            .map(|(pattern, categories)| AmbiguousRule { pattern, categories })
            .collect()
    }
}
