//! Built-in backends.

pub mod rustcrypto;

use crate::crypto::registry::Registry;
use std::sync::Arc;

pub use rustcrypto::RustCryptoBackend;

/// Register every backend shipped with this crate. Hosts with their own
/// backends call this first (or not at all) and then register theirs.
pub fn register_builtin_backends(registry: &mut Registry) {
    registry.register(Arc::new(RustCryptoBackend::new()));
}
