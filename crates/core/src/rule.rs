use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A (pattern, category) pair used to auto-assign categories by
/// case-insensitive substring match against transaction descriptions.
///
/// `priority` is an optional explicit tie-break for equal-length patterns;
/// when absent, declaration order decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, category: impl Into<Category>) -> Self {
        Rule {
            pattern: pattern.into(),
            category: category.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// The same pattern text mapped to more than one category. Allowed, but
/// surfaced for user review since the tie-break silently picks one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousRule {
    pub pattern: String,
    pub categories: Vec<Category>,
}
