use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved fallback category for transactions no rule matched.
pub const MISCELLANEOUS: &str = "Miscellaneous";

/// Spending category. The set is user-extensible, so this is a validated
/// string rather than a closed enum; `DEFAULT_CATEGORIES` seeds new stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Category(name.into())
    }

    pub fn miscellaneous() -> Self {
        Category(MISCELLANEOUS.to_string())
    }

    pub fn is_miscellaneous(&self) -> bool {
        self.0 == MISCELLANEOUS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::new(s)
    }
}

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Bills & Utilities",
    "Food & Drink",
    "Shopping",
    "Travel",
    "Groceries",
    "Home",
    "Professional Services",
    "Health & Wellness",
    "Gas",
    "Automotive",
    "Entertainment",
    "Fees & Adjustments",
    "Education",
    MISCELLANEOUS,
];
