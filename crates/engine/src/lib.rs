pub mod gaps;
pub mod matcher;
pub mod pass;
pub mod ruleset;
pub(crate) mod util;

pub use gaps::{bulk_add_rules, find_gaps, GapConfig, GapSuggestion};
pub use matcher::Matcher;
pub use pass::{apply, merge_imported};
pub use ruleset::RuleSet;
