//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │   registry.cipher(AES-256, GCM, pkcs7, 16) / hash / mac     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Registry (resolution)                     │
//! │  - Упорядоченный список (capability, backend, impl type)    │
//! │  - Политика: first-registered / implementation-rank         │
//! │  - NotSupported, если никто не объявил возможность          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │   CipherSession           │  │  HashSession/MacSession  │
//! │  - Проверка ключа и IV    │  │  - update* → finalize    │
//! │  - Паддинг (Padding)      │  │  - SessionFinalized      │
//! │  - AEAD тег (Sealed)      │  │                          │
//! └───────────────────────────┘  └──────────────────────────┘
//!                │                           │
//!                └─────────────┬─────────────┘
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (backends)                      │
//! │  - SupportMap: кандидаты ∩ то, что реализует движок         │
//! │  - rustcrypto: AES, Twofish, DES, 3DES, Blowfish, CAST5, RC2│
//! │    ECB/CBC/CFB/OFB/CTR/GCM/EAX, MD*/SHA*/RIPEMD, H/C/PMAC   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! ### Core
//! - [`algorithms`]: символьные идентификаторы алгоритмов
//! - [`provider`]: CryptoProvider trait для crypto-agility
//! - [`registry`]: реестр возможностей и выбор бэкенда
//!
//! ### Sessions
//! - [`cipher`]: единый контракт шифрования (паддинг, IV, AEAD)
//! - [`hash`], [`mac`]: потоковые хеши и MAC
//!
//! ### Collaborators
//! - [`padding`]: схемы паддинга
//! - [`support`]: построение SupportMap
//! - [`backends`]: встроенные бэкенды

// ============================================================================
// Core
// ============================================================================

pub mod algorithms;

/// CryptoProvider trait для crypto-agility
pub mod provider;

pub mod registry;

// ============================================================================
// Sessions
// ============================================================================

pub mod cipher;
pub mod hash;
pub mod mac;

// ============================================================================
// Collaborators
// ============================================================================

pub mod padding;
pub mod support;

/// Встроенные бэкенды
pub mod backends;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use algorithms::{AlgorithmId, CipherId, HashId, MacId, ModeId, SubAlgorithm};
pub use backends::{register_builtin_backends, RustCryptoBackend};
pub use cipher::{CipherPrimitive, CipherSession, KeyedCipher, Sealed};
pub use hash::{HashEngine, HashSession};
pub use mac::{MacEngine, MacSession};
pub use padding::{AnsiX923, Iso10126, Iso7816, NoPadding, Padding, PaddingScheme, Pkcs7};
pub use provider::{CryptoProvider, ImplementationType};
pub use registry::{Capability, Registrar, Registry, RegistryEntry, ResolutionPolicy};
