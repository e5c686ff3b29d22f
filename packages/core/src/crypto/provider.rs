//! Defines the CryptoProvider trait for crypto-agility.
//!
//! A provider is one backend: it advertises what it implements through
//! [`CryptoProvider::register_algorithms`] and builds raw engines on demand.
//! Padding, IV/key checks and the finalize lifecycle are the registry's
//! sessions' job, so a provider only has to do the native work.

use crate::crypto::algorithms::{CipherId, HashId, MacId, ModeId, SubAlgorithm};
use crate::crypto::cipher::CipherPrimitive;
use crate::crypto::hash::HashEngine;
use crate::crypto::mac::MacEngine;
use crate::crypto::registry::Registrar;
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a backend implements its primitives. Used by
/// [`ResolutionPolicy::ImplementationRank`](crate::crypto::registry::ResolutionPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplementationType {
    /// Hand-written assembly / hardware instructions
    Assembly,
    /// Native compiled code
    Compiled,
    /// Interpreted or otherwise "slow path" code
    Userland,
}

impl ImplementationType {
    /// Lower is better.
    pub fn rank(&self) -> u8 {
        match self {
            ImplementationType::Assembly => 0,
            ImplementationType::Compiled => 1,
            ImplementationType::Userland => 2,
        }
    }
}

impl fmt::Display for ImplementationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImplementationType::Assembly => "assembly",
            ImplementationType::Compiled => "compiled",
            ImplementationType::Userland => "userland",
        };
        f.write_str(name)
    }
}

/// Trait that every cryptographic backend implements.
///
/// Constructors must reject identifiers missing from the backend's own
/// support maps with [`CryptoError::UnsupportedAlgorithm`] (ciphers, hashes)
/// or [`CryptoError::InvalidArgument`] (MACs and their inner algorithms),
/// even if the registry never routes such a request to them.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Stable backend name, used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Advertise every supported capability. Called once per registration.
    fn register_algorithms(&self, registrar: &mut Registrar<'_>);

    /// Build a raw cipher for `cipher` in `mode`. `tag_length` only matters
    /// for AEAD modes.
    fn new_cipher(
        &self,
        cipher: CipherId,
        mode: ModeId,
        tag_length: usize,
    ) -> Result<Box<dyn CipherPrimitive>> {
        let _ = tag_length;
        Err(CryptoError::UnsupportedAlgorithm(format!(
            "{}/{} is not provided by {}",
            cipher,
            mode,
            self.name()
        )))
    }

    /// Build a fresh hash accumulator.
    fn new_hash(&self, hash: HashId) -> Result<Box<dyn HashEngine>> {
        Err(CryptoError::UnsupportedAlgorithm(format!(
            "{} is not provided by {}",
            hash,
            self.name()
        )))
    }

    /// Build a keyed MAC accumulator.
    fn new_mac(
        &self,
        mac: MacId,
        inner: SubAlgorithm,
        key: &[u8],
        nonce: &[u8],
    ) -> Result<Box<dyn MacEngine>> {
        let _ = (key, nonce);
        Err(CryptoError::UnsupportedAlgorithm(format!(
            "{}({}) is not provided by {}",
            mac,
            inner,
            self.name()
        )))
    }
}

impl fmt::Debug for dyn CryptoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("name", &self.name())
            .finish()
    }
}
