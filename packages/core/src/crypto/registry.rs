//! Capability registry and algorithm resolution.
//!
//! Backends advertise (cipher, mode), hash and MAC capabilities through
//! [`Registry::register`]. Callers then ask for a capability by symbolic
//! name; the registry picks one entry according to its
//! [`ResolutionPolicy`] and builds a session on top of that entry's backend.
//!
//! Several backends may advertise the same capability. Entries are never
//! deduplicated or mutated; resolution is deterministic under both policies.

use crate::config::Config;
use crate::crypto::algorithms::{AlgorithmId, CipherId, HashId, MacId, ModeId, SubAlgorithm};
use crate::crypto::cipher::{CipherSession, KeyedCipher};
use crate::crypto::hash::HashSession;
use crate::crypto::mac::MacSession;
use crate::crypto::padding::Padding;
use crate::crypto::provider::{CryptoProvider, ImplementationType};
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Процесс-глобальный реестр со встроенными бэкендами
static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

// ============================================================================
// Capability / Entry
// ============================================================================

/// Something a backend can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Cipher(CipherId, ModeId),
    Hash(HashId),
    Mac(MacId),
}

impl Capability {
    /// Whether this capability names `id` (as cipher, mode, hash or MAC).
    pub fn involves(&self, id: AlgorithmId) -> bool {
        match (*self, id) {
            (Capability::Cipher(cipher, _), AlgorithmId::Cipher(wanted)) => cipher == wanted,
            (Capability::Cipher(_, mode), AlgorithmId::Mode(wanted)) => mode == wanted,
            (Capability::Hash(hash), AlgorithmId::Hash(wanted)) => hash == wanted,
            (Capability::Mac(mac), AlgorithmId::Mac(wanted)) => mac == wanted,
            _ => false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Cipher(cipher, mode) => write!(f, "{}/{}", cipher, mode),
            Capability::Hash(hash) => write!(f, "{}", hash),
            Capability::Mac(mac) => write!(f, "{}", mac),
        }
    }
}

/// One advertised capability. Immutable once inserted.
#[derive(Clone)]
pub struct RegistryEntry {
    capability: Capability,
    backend: Arc<dyn CryptoProvider>,
    implementation: ImplementationType,
    seq: u64,
}

impl RegistryEntry {
    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn backend(&self) -> &Arc<dyn CryptoProvider> {
        &self.backend
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn implementation(&self) -> ImplementationType {
        self.implementation
    }

    /// Registration order; lower was inserted earlier.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("capability", &self.capability)
            .field("backend", &self.backend.name())
            .field("implementation", &self.implementation)
            .field("seq", &self.seq)
            .finish()
    }
}

// ============================================================================
// Resolution policy
// ============================================================================

/// How to choose between entries advertising the same capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionPolicy {
    /// Earliest registered entry wins.
    #[default]
    #[serde(rename = "first-registered")]
    FirstRegistered,
    /// Best [`ImplementationType`] wins (Assembly > Compiled > Userland);
    /// ties go to the earliest registered entry.
    #[serde(rename = "implementation-rank")]
    ImplementationRank,
}

impl ResolutionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionPolicy::FirstRegistered => "first-registered",
            ResolutionPolicy::ImplementationRank => "implementation-rank",
        }
    }

    fn pick<'a>(&self, candidates: impl Iterator<Item = &'a RegistryEntry>) -> Option<&'a RegistryEntry> {
        match self {
            ResolutionPolicy::FirstRegistered => candidates.min_by_key(|e| e.seq),
            ResolutionPolicy::ImplementationRank => {
                candidates.min_by_key(|e| (e.implementation.rank(), e.seq))
            }
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResolutionPolicy {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-registered" => Ok(ResolutionPolicy::FirstRegistered),
            "implementation-rank" => Ok(ResolutionPolicy::ImplementationRank),
            _ => Err(CryptoError::InvalidArgument(format!(
                "Unknown resolution policy: {}",
                s
            ))),
        }
    }
}

// ============================================================================
// Registrar
// ============================================================================

/// Handed to [`CryptoProvider::register_algorithms`]. Binds every entry to
/// the backend being registered, so the backend only names identifiers.
pub struct Registrar<'a> {
    registry: &'a mut Registry,
    backend: Arc<dyn CryptoProvider>,
    added: usize,
}

impl Registrar<'_> {
    pub fn add_cipher(&mut self, cipher: CipherId, mode: ModeId, implementation: ImplementationType) {
        self.registry
            .add_cipher(Arc::clone(&self.backend), cipher, mode, implementation);
        self.added += 1;
    }

    pub fn add_hash(&mut self, hash: HashId, implementation: ImplementationType) {
        self.registry
            .add_hash(Arc::clone(&self.backend), hash, implementation);
        self.added += 1;
    }

    pub fn add_mac(&mut self, mac: MacId, implementation: ImplementationType) {
        self.registry
            .add_mac(Arc::clone(&self.backend), mac, implementation);
        self.added += 1;
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

// ============================================================================
// Registry
// ============================================================================

pub struct Registry {
    entries: Vec<RegistryEntry>,
    policy: ResolutionPolicy,
    next_seq: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry using the policy from [`Config::global`].
    pub fn new() -> Self {
        Self::with_policy(Config::global().resolution_policy)
    }

    pub fn with_policy(policy: ResolutionPolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
            next_seq: 0,
        }
    }

    /// Registry with every built-in backend registered.
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        crate::crypto::backends::register_builtin_backends(&mut registry);
        registry
    }

    /// Process-wide registry with the built-in backends, built on first use.
    pub fn global() -> &'static Registry {
        GLOBAL_REGISTRY.get_or_init(Registry::with_builtin_backends)
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ResolutionPolicy) {
        self.policy = policy;
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Let `backend` advertise its capabilities. Returns how many entries
    /// were added.
    pub fn register(&mut self, backend: Arc<dyn CryptoProvider>) -> usize {
        let name = backend.name();
        let mut registrar = Registrar {
            registry: self,
            backend: Arc::clone(&backend),
            added: 0,
        };
        backend.register_algorithms(&mut registrar);
        let added = registrar.added;

        debug!(target: "crypto::registry", backend = name, entries = added, "Backend registered");
        added
    }

    fn push(&mut self, capability: Capability, backend: Arc<dyn CryptoProvider>, implementation: ImplementationType) {
        trace!(
            target: "crypto::registry",
            capability = %capability,
            backend = backend.name(),
            implementation = %implementation,
            "Adding entry"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(RegistryEntry {
            capability,
            backend,
            implementation,
            seq,
        });
    }

    pub fn add_cipher(
        &mut self,
        backend: Arc<dyn CryptoProvider>,
        cipher: CipherId,
        mode: ModeId,
        implementation: ImplementationType,
    ) {
        self.push(Capability::Cipher(cipher, mode), backend, implementation);
    }

    pub fn add_hash(&mut self, backend: Arc<dyn CryptoProvider>, hash: HashId, implementation: ImplementationType) {
        self.push(Capability::Hash(hash), backend, implementation);
    }

    pub fn add_mac(&mut self, backend: Arc<dyn CryptoProvider>, mac: MacId, implementation: ImplementationType) {
        self.push(Capability::Mac(mac), backend, implementation);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn supports(&self, capability: &Capability) -> bool {
        self.entries.iter().any(|e| e.capability == *capability)
    }

    /// Whether any entry names `id`, e.g. "is SHA3-256 available at all".
    pub fn supports_algorithm(&self, id: impl Into<AlgorithmId>) -> bool {
        let id = id.into();
        self.entries.iter().any(|e| e.capability.involves(id))
    }

    /// Backends advertising `capability`, in insertion order. A backend that
    /// registered the same capability twice is listed twice.
    pub fn backends_for(&self, capability: &Capability) -> Vec<Arc<dyn CryptoProvider>> {
        self.entries
            .iter()
            .filter(|e| e.capability == *capability)
            .map(|e| Arc::clone(&e.backend))
            .collect()
    }

    /// Resolve using the registry's own policy.
    pub fn resolve(&self, capability: &Capability) -> Result<&RegistryEntry> {
        self.resolve_with(capability, self.policy)
    }

    pub fn resolve_with(&self, capability: &Capability, policy: ResolutionPolicy) -> Result<&RegistryEntry> {
        let candidates = self.entries.iter().filter(|e| e.capability == *capability);
        let entry = policy
            .pick(candidates)
            .ok_or_else(|| CryptoError::NotSupported(capability.to_string()))?;

        trace!(
            target: "crypto::registry",
            capability = %capability,
            backend = entry.backend.name(),
            policy = %policy,
            "Resolved"
        );
        Ok(entry)
    }

    pub fn resolve_cipher(&self, cipher: CipherId, mode: ModeId) -> Result<&RegistryEntry> {
        self.resolve(&Capability::Cipher(cipher, mode))
    }

    pub fn resolve_hash(&self, hash: HashId) -> Result<&RegistryEntry> {
        self.resolve(&Capability::Hash(hash))
    }

    pub fn resolve_mac(&self, mac: MacId) -> Result<&RegistryEntry> {
        self.resolve(&Capability::Mac(mac))
    }

    // ------------------------------------------------------------------------
    // Session builders
    // ------------------------------------------------------------------------

    /// Resolve `cipher`/`mode` and build a session. `tag_length` only matters
    /// for AEAD modes.
    pub fn cipher(
        &self,
        cipher: CipherId,
        mode: ModeId,
        padding: Arc<dyn Padding>,
        tag_length: usize,
    ) -> Result<CipherSession> {
        let entry = self.resolve_cipher(cipher, mode)?;
        let primitive = entry.backend.new_cipher(cipher, mode, tag_length)?;
        Ok(CipherSession::new(
            cipher,
            mode,
            entry.backend.name(),
            primitive,
            padding,
            tag_length,
        ))
    }

    /// Like [`cipher`](Self::cipher), with padding and tag length taken from
    /// [`Config::global`].
    pub fn cipher_with_defaults(&self, cipher: CipherId, mode: ModeId) -> Result<CipherSession> {
        let config = Config::global();
        self.cipher(
            cipher,
            mode,
            config.default_padding.strategy(),
            config.default_tag_length,
        )
    }

    pub fn keyed_cipher(
        &self,
        cipher: CipherId,
        mode: ModeId,
        padding: Arc<dyn Padding>,
        tag_length: usize,
        key: &[u8],
    ) -> Result<KeyedCipher> {
        let session = self.cipher(cipher, mode, padding, tag_length)?;
        KeyedCipher::new(session, key)
    }

    pub fn hash(&self, hash: HashId) -> Result<HashSession> {
        let entry = self.resolve_hash(hash)?;
        let engine = entry.backend.new_hash(hash)?;
        Ok(HashSession::new(hash, entry.backend.name(), engine))
    }

    /// Resolve `mac` and key it. `inner` is the cipher or hash the MAC is
    /// built on; `nonce` must be empty for MACs that take none.
    pub fn mac(&self, mac: MacId, inner: SubAlgorithm, key: &[u8], nonce: &[u8]) -> Result<MacSession> {
        let entry = self.resolve_mac(mac)?;
        let engine = entry.backend.new_mac(mac, inner, key, nonce)?;
        Ok(MacSession::new(mac, inner, entry.backend.name(), engine))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("policy", &self.policy)
            .field("entries", &self.entries.len())
            .finish()
    }
}
