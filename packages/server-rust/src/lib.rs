//! `reqscope` server -- HTTP service demonstrating request-scoped values.

pub mod context;
pub mod network;

pub use context::{ContextError, ContextStore};
pub use network::{NetworkConfig, NetworkModule};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
