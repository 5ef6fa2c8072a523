pub mod codec;
pub mod object;
pub mod sync;

pub use object::{LocalStore, ObjectStore};
pub use sync::{PersistenceError, RetryPolicy, SyncStore, RULES_KEY, TRANSACTIONS_KEY};
