//! `reqscope` core: request identity, untyped context values, and the typed request context.

pub mod context;
pub mod types;

pub use context::{RequestContext, UserProfile};
pub use types::{RequestId, Value, ValueTypeError};
