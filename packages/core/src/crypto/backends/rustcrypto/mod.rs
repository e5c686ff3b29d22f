//! Pure-Rust backend built on the RustCrypto crates.
//!
//! # Поддержка
//!
//! The engine is described by candidate tables (identifier → native handle)
//! and by the lists of handles it actually implements. [`check_support`]
//! intersects the two; the result is computed once per process.
//!
//! | category | implemented                                          |
//! |----------|------------------------------------------------------|
//! | ciphers  | Rijndael (AES-128/192/256), Twofish, DES, 3DES, Blowfish, CAST5, RC2 |
//! | modes    | ECB, CBC, CFB, OFB, CTR, GCM, EAX                    |
//! | hashes   | MD2, MD4, MD5, RIPEMD-160, SHA-1, SHA-2, SHA-3       |
//! | MACs     | CMAC, HMAC, PMAC                                     |
//!
//! GCM and EAX are only offered with AES. AEAD tags are 16 bytes.

mod cipher;
mod hash;
mod mac;
mod modes;

pub use self::cipher::TAG_LENGTH;

use self::cipher::RustCryptoCipher;
use crate::crypto::algorithms::{CipherId, HashId, MacId, ModeId, SubAlgorithm};
use crate::crypto::cipher::CipherPrimitive;
use crate::crypto::hash::HashEngine;
use crate::crypto::mac::MacEngine;
use crate::crypto::provider::{CryptoProvider, ImplementationType};
use crate::crypto::registry::Registrar;
use crate::crypto::support::SupportMap;
use crate::error::{CryptoError, Result};
use once_cell::sync::OnceCell;
use tracing::debug;

pub const BACKEND_NAME: &str = "rustcrypto";

static SUPPORT: OnceCell<Support> = OnceCell::new();

// ============================================================================
// Native handles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCipher {
    Rijndael,
    Twofish,
    Des,
    TripleDes,
    Blowfish,
    Cast5,
    Rc2,
    Seed,
    Arc4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
    Ctr,
    Gcm,
    Eax,
    Ccm,
    Ocb,
}

impl NativeMode {
    fn is_aead(&self) -> bool {
        matches!(self, NativeMode::Gcm | NativeMode::Eax | NativeMode::Ccm | NativeMode::Ocb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeHash {
    Md2,
    Md4,
    Md5,
    Ripemd160,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMac {
    Cmac,
    Hmac,
    Pmac,
}

// ============================================================================
// Candidate tables and what the engine implements
// ============================================================================

const CIPHER_CANDIDATES: &[(CipherId, NativeCipher)] = &[
    (CipherId::TripleDes, NativeCipher::TripleDes),
    (CipherId::Blowfish, NativeCipher::Blowfish),
    (CipherId::Cast5, NativeCipher::Cast5),
    (CipherId::Des, NativeCipher::Des),
    (CipherId::Rc2, NativeCipher::Rc2),
    (CipherId::Rc4, NativeCipher::Arc4),
    (CipherId::Seed, NativeCipher::Seed),
    (CipherId::Twofish, NativeCipher::Twofish),
    // Все три AES используют один примитив; вариант определяется длиной ключа
    (CipherId::Aes128, NativeCipher::Rijndael),
    (CipherId::Aes192, NativeCipher::Rijndael),
    (CipherId::Aes256, NativeCipher::Rijndael),
];

const IMPLEMENTED_CIPHERS: &[NativeCipher] = &[
    NativeCipher::Rijndael,
    NativeCipher::Twofish,
    NativeCipher::Des,
    NativeCipher::TripleDes,
    NativeCipher::Blowfish,
    NativeCipher::Cast5,
    NativeCipher::Rc2,
];

const MODE_CANDIDATES: &[(ModeId, NativeMode)] = &[
    (ModeId::Cbc, NativeMode::Cbc),
    (ModeId::Ccm, NativeMode::Ccm),
    (ModeId::Cfb, NativeMode::Cfb),
    (ModeId::Ctr, NativeMode::Ctr),
    (ModeId::Eax, NativeMode::Eax),
    (ModeId::Ecb, NativeMode::Ecb),
    (ModeId::Gcm, NativeMode::Gcm),
    (ModeId::Ocb, NativeMode::Ocb),
    (ModeId::Ofb, NativeMode::Ofb),
];

// CCM/OCB nonces can't be block-sized
const IMPLEMENTED_MODES: &[NativeMode] = &[
    NativeMode::Ecb,
    NativeMode::Cbc,
    NativeMode::Cfb,
    NativeMode::Ofb,
    NativeMode::Ctr,
    NativeMode::Gcm,
    NativeMode::Eax,
];

const HASH_CANDIDATES: &[(HashId, NativeHash)] = &[
    (HashId::Md2, NativeHash::Md2),
    (HashId::Md4, NativeHash::Md4),
    (HashId::Md5, NativeHash::Md5),
    (HashId::Ripemd160, NativeHash::Ripemd160),
    (HashId::Sha1, NativeHash::Sha1),
    (HashId::Sha2_224, NativeHash::Sha224),
    (HashId::Sha2_256, NativeHash::Sha256),
    (HashId::Sha2_384, NativeHash::Sha384),
    (HashId::Sha2_512, NativeHash::Sha512),
    (HashId::Sha3_224, NativeHash::Sha3_224),
    (HashId::Sha3_256, NativeHash::Sha3_256),
    (HashId::Sha3_384, NativeHash::Sha3_384),
    (HashId::Sha3_512, NativeHash::Sha3_512),
];

const IMPLEMENTED_HASHES: &[NativeHash] = &[
    NativeHash::Md2,
    NativeHash::Md4,
    NativeHash::Md5,
    NativeHash::Ripemd160,
    NativeHash::Sha1,
    NativeHash::Sha224,
    NativeHash::Sha256,
    NativeHash::Sha384,
    NativeHash::Sha512,
    NativeHash::Sha3_224,
    NativeHash::Sha3_256,
    NativeHash::Sha3_384,
    NativeHash::Sha3_512,
];

const MAC_CANDIDATES: &[(MacId, NativeMac)] = &[
    (MacId::Cmac, NativeMac::Cmac),
    (MacId::Hmac, NativeMac::Hmac),
    (MacId::Pmac, NativeMac::Pmac),
];

const IMPLEMENTED_MACS: &[NativeMac] = &[NativeMac::Cmac, NativeMac::Hmac, NativeMac::Pmac];

/// Whether the engine can run `cipher` in `mode`.
fn pair_supported(cipher: NativeCipher, mode: NativeMode) -> bool {
    match mode {
        NativeMode::Gcm | NativeMode::Eax => cipher == NativeCipher::Rijndael,
        NativeMode::Ccm | NativeMode::Ocb => false,
        _ => true,
    }
}

// ============================================================================
// Support maps
// ============================================================================

/// The backend's support maps, one per category.
#[derive(Debug)]
pub struct Support {
    pub ciphers: SupportMap<CipherId, NativeCipher>,
    pub modes: SupportMap<ModeId, NativeMode>,
    pub hashes: SupportMap<HashId, NativeHash>,
    pub macs: SupportMap<MacId, NativeMac>,
}

/// Probe the engine. Pure; callers normally go through [`support`].
pub fn check_support() -> Support {
    let support = Support {
        ciphers: SupportMap::probe(CIPHER_CANDIDATES, IMPLEMENTED_CIPHERS),
        modes: SupportMap::probe(MODE_CANDIDATES, IMPLEMENTED_MODES),
        hashes: SupportMap::probe(HASH_CANDIDATES, IMPLEMENTED_HASHES),
        macs: SupportMap::probe(MAC_CANDIDATES, IMPLEMENTED_MACS),
    };
    debug!(
        target: "crypto::probe",
        backend = BACKEND_NAME,
        ciphers = support.ciphers.len(),
        modes = support.modes.len(),
        hashes = support.hashes.len(),
        macs = support.macs.len(),
        "Support maps built"
    );
    support
}

/// Process-wide support maps, probed on first access.
pub fn support() -> &'static Support {
    SUPPORT.get_or_init(check_support)
}

// ============================================================================
// Provider
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoBackend;

impl RustCryptoBackend {
    pub fn new() -> Self {
        Self
    }

    fn new_cipher_inner(&self, cipher: CipherId, mode: ModeId, tag_length: usize) -> Result<RustCryptoCipher> {
        let support = support();
        let native_cipher = *support.ciphers.get(&cipher).ok_or_else(|| {
            CryptoError::UnsupportedAlgorithm(format!("Unsupported cipher algorithm: {}", cipher))
        })?;
        let native_mode = *support.modes.get(&mode).ok_or_else(|| {
            CryptoError::UnsupportedAlgorithm(format!("Unsupported mode: {}", mode))
        })?;
        if !pair_supported(native_cipher, native_mode) {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "{} cannot be used in {} mode",
                cipher, mode
            )));
        }
        if native_mode.is_aead() && tag_length != TAG_LENGTH {
            return Err(CryptoError::InvalidArgument(format!(
                "{} supports {}-byte tags only, got {}",
                mode, TAG_LENGTH, tag_length
            )));
        }
        Ok(RustCryptoCipher::new(native_cipher, native_mode))
    }
}

impl CryptoProvider for RustCryptoBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn register_algorithms(&self, registrar: &mut Registrar<'_>) {
        let support = support();

        for (&mode, &native_mode) in support.modes.iter() {
            for (&cipher, &native_cipher) in support.ciphers.iter() {
                if pair_supported(native_cipher, native_mode) {
                    registrar.add_cipher(cipher, mode, ImplementationType::Compiled);
                }
            }
        }
        for &hash in support.hashes.keys() {
            registrar.add_hash(hash, ImplementationType::Compiled);
        }
        for &mac in support.macs.keys() {
            registrar.add_mac(mac, ImplementationType::Compiled);
        }
    }

    fn new_cipher(&self, cipher: CipherId, mode: ModeId, tag_length: usize) -> Result<Box<dyn CipherPrimitive>> {
        Ok(Box::new(self.new_cipher_inner(cipher, mode, tag_length)?))
    }

    fn new_hash(&self, hash: HashId) -> Result<Box<dyn HashEngine>> {
        let native = *support().hashes.get(&hash).ok_or_else(|| {
            CryptoError::UnsupportedAlgorithm(format!("Unsupported hashing algorithm: {}", hash))
        })?;
        Ok(hash::new_engine(native))
    }

    fn new_mac(&self, mac: MacId, inner: SubAlgorithm, key: &[u8], nonce: &[u8]) -> Result<Box<dyn MacEngine>> {
        let support = support();

        let native = *support
            .macs
            .get(&mac)
            .ok_or_else(|| CryptoError::InvalidArgument(format!("Unsupported MAC algorithm: {}", mac)))?;

        match inner {
            SubAlgorithm::Cipher(cipher) if !support.ciphers.contains(&cipher) => {
                return Err(CryptoError::InvalidArgument(format!(
                    "Unsupported cipher algorithm: {}",
                    cipher
                )));
            }
            SubAlgorithm::Hash(hash) if !support.hashes.contains(&hash) => {
                return Err(CryptoError::InvalidArgument(format!(
                    "Unsupported hashing algorithm: {}",
                    hash
                )));
            }
            _ => {}
        }

        if !nonce.is_empty() {
            return Err(CryptoError::InvalidArgument(format!("{} does not take a nonce", mac)));
        }

        match (native, inner) {
            (NativeMac::Hmac, SubAlgorithm::Hash(hash)) => mac::hmac(hash, key),
            (NativeMac::Cmac, SubAlgorithm::Cipher(cipher)) => {
                check_mac_key(cipher, key)?;
                mac::cmac(cipher, key)
            }
            (NativeMac::Pmac, SubAlgorithm::Cipher(cipher)) => {
                check_mac_key(cipher, key)?;
                mac::pmac(cipher, key)
            }
            (_, inner) => Err(mac::not_pairable(mac, inner)),
        }
    }
}

fn check_mac_key(cipher: CipherId, key: &[u8]) -> Result<()> {
    let sizes = cipher.key_sizes();
    if !sizes.contains(key.len()) {
        return Err(CryptoError::InvalidKeyLength {
            algorithm: cipher.to_string(),
            expected: sizes.to_string(),
            got: key.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_omits_unimplemented() {
        let support = check_support();
        assert_eq!(support.ciphers.len(), 9);
        assert!(!support.ciphers.contains(&CipherId::Seed));
        assert!(!support.ciphers.contains(&CipherId::Rc4));
        assert_eq!(support.modes.len(), 7);
        assert!(!support.modes.contains(&ModeId::Ccm));
        assert!(!support.modes.contains(&ModeId::Ocb));
        assert_eq!(support.hashes.len(), 13);
        assert_eq!(support.macs.len(), 3);
    }

    #[test]
    fn test_support_is_cached() {
        assert!(std::ptr::eq(support(), support()));
    }

    #[test]
    fn test_aes_variants_share_primitive() {
        let support = support();
        for id in [CipherId::Aes128, CipherId::Aes192, CipherId::Aes256] {
            assert_eq!(support.ciphers.get(&id), Some(&NativeCipher::Rijndael));
        }
    }

    #[test]
    fn test_new_cipher_rejections() {
        let backend = RustCryptoBackend::new();
        assert!(matches!(
            backend.new_cipher(CipherId::Seed, ModeId::Cbc, 16),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            backend.new_cipher(CipherId::Aes128, ModeId::Ocb, 16),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            backend.new_cipher(CipherId::Des, ModeId::Gcm, 16),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            backend.new_cipher(CipherId::Aes128, ModeId::Gcm, 12),
            Err(CryptoError::InvalidArgument(_))
        ));
        // Длина тега для не-AEAD режимов не важна
        assert!(backend.new_cipher(CipherId::Aes128, ModeId::Cbc, 0).is_ok());
    }

    #[test]
    fn test_cipher_macs_cover_every_supported_cipher() {
        let backend = RustCryptoBackend::new();
        for &cipher in support().ciphers.keys() {
            let key = vec![0x2bu8; cipher.default_key_size()];
            for mac in [MacId::Cmac, MacId::Pmac] {
                let engine = backend.new_mac(mac, cipher.into(), &key, b"");
                assert!(engine.is_ok(), "{} over {}: {:?}", mac, cipher, engine.err());
            }
        }
    }

    #[test]
    fn test_new_mac_rejections() {
        let backend = RustCryptoBackend::new();
        let key = [0u8; 16];
        assert!(matches!(
            backend.new_mac(MacId::Hmac, CipherId::Aes128.into(), &key, b""),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(matches!(
            backend.new_mac(MacId::Cmac, HashId::Sha1.into(), &key, b""),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(matches!(
            backend.new_mac(MacId::Cmac, CipherId::Seed.into(), &key, b""),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(matches!(
            backend.new_mac(MacId::Pmac, CipherId::Rc4.into(), &[0u8; 8], b""),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(matches!(
            backend.new_mac(MacId::Hmac, HashId::Sha1.into(), &key, b"nonce"),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(matches!(
            backend.new_mac(MacId::Cmac, CipherId::Aes256.into(), &key, b""),
            Err(CryptoError::InvalidKeyLength { got: 16, .. })
        ));
    }

    #[test]
    fn test_registration_pairs() {
        let mut registry = crate::crypto::registry::Registry::with_policy(Default::default());
        let added = registry.register(std::sync::Arc::new(RustCryptoBackend::new()));
        // 5 классических режимов × 9 шифров + GCM/EAX × 3 AES + 13 хешей + 3 MAC
        assert_eq!(added, 5 * 9 + 2 * 3 + 13 + 3);
        assert!(registry.entries().iter().all(|e| e.backend_name() == BACKEND_NAME));
        assert!(registry.entries().iter().all(|e| e.implementation() == ImplementationType::Compiled));
    }
}
