pub mod amount;
pub mod card;
pub mod category;
pub mod error;
pub mod rule;
pub mod transaction;

pub use amount::Amount;
pub use card::Card;
pub use category::{Category, DEFAULT_CATEGORIES};
pub use error::EngineError;
pub use rule::{AmbiguousRule, Rule};
pub use transaction::{Transaction, TransactionId};
