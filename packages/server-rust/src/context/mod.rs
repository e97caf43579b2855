//! Request-scoped value storage: the store, its middleware, and extractors.

pub mod error;
pub mod extract;
pub mod layer;
pub mod store;
pub mod sweeper;

pub use error::ContextError;
pub use extract::CurrentRequest;
pub use layer::{ContextLayer, ContextService};
pub use store::{ContextGuard, ContextStore};
pub use sweeper::spawn_purge_task;
