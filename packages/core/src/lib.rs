// Agility Core
// Pluggable cryptography layer: ciphers, hashes and MACs resolved by name

#![warn(clippy::all)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;

// Re-exports для удобства
pub use config::Config;
pub use crypto::registry::Registry;
pub use error::{CryptoError, Result};
