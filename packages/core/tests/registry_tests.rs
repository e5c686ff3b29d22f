//! Registry tests with competing backends
//!
//! A stub "accelerated" backend advertises a subset of what the built-in
//! backend offers; the tests check who wins under each resolution policy.

use agility_core::crypto::padding::Pkcs7;
use agility_core::crypto::{
    register_builtin_backends, Capability, CipherId, CipherPrimitive, CryptoProvider, HashEngine,
    HashId, ImplementationType, MacId, ModeId, Registrar, Registry, ResolutionPolicy, Sealed,
};
use agility_core::crypto::backends::rustcrypto::BACKEND_NAME;
use agility_core::{CryptoError, Result};
use std::sync::Arc;

/// Pretends to be a hardware backend; its "cipher" is the identity function
/// so tests can tell which backend actually ran.
struct Accelerated;

struct Identity;

impl CipherPrimitive for Identity {
    fn block_size(&self) -> Result<usize> {
        Ok(16)
    }

    fn seal(&self, _key: &[u8], _iv: &[u8], data: &[u8], _aad: &[u8]) -> Result<Sealed> {
        Ok(Sealed {
            ciphertext: data.to_vec(),
            tag: None,
        })
    }

    fn open(&self, _key: &[u8], _iv: &[u8], data: &[u8], _tag: Option<&[u8]>, _aad: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

struct ConstantHash;

impl HashEngine for ConstantHash {
    fn update(&mut self, _data: &[u8]) {}

    fn finalize(self: Box<Self>) -> Vec<u8> {
        vec![0xAA; 32]
    }

    fn output_size(&self) -> usize {
        32
    }
}

impl CryptoProvider for Accelerated {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn register_algorithms(&self, registrar: &mut Registrar<'_>) {
        registrar.add_cipher(CipherId::Aes128, ModeId::Cbc, ImplementationType::Assembly);
        registrar.add_hash(HashId::Sha2_256, ImplementationType::Assembly);
    }

    fn new_cipher(&self, cipher: CipherId, mode: ModeId, _tag_length: usize) -> Result<Box<dyn CipherPrimitive>> {
        match (cipher, mode) {
            (CipherId::Aes128, ModeId::Cbc) => Ok(Box::new(Identity)),
            _ => Err(CryptoError::UnsupportedAlgorithm(format!("{}/{}", cipher, mode))),
        }
    }

    fn new_hash(&self, hash: HashId) -> Result<Box<dyn HashEngine>> {
        match hash {
            HashId::Sha2_256 => Ok(Box::new(ConstantHash)),
            _ => Err(CryptoError::UnsupportedAlgorithm(hash.to_string())),
        }
    }
}

fn registry(policy: ResolutionPolicy) -> Registry {
    let mut registry = Registry::with_policy(policy);
    register_builtin_backends(&mut registry);
    registry.register(Arc::new(Accelerated));
    registry
}

/// Test that the earliest registration wins under FirstRegistered
#[test]
fn test_first_registered_prefers_builtin() {
    let registry = registry(ResolutionPolicy::FirstRegistered);

    let session = registry
        .cipher(CipherId::Aes128, ModeId::Cbc, Arc::new(Pkcs7), 16)
        .unwrap();
    assert_eq!(session.backend_name(), BACKEND_NAME);

    let hash = registry.hash(HashId::Sha2_256).unwrap();
    assert_eq!(hash.backend_name(), BACKEND_NAME);
}

/// Test that the better implementation wins under ImplementationRank
#[test]
fn test_rank_prefers_assembly() {
    let registry = registry(ResolutionPolicy::ImplementationRank);

    let session = registry
        .cipher(CipherId::Aes128, ModeId::Cbc, Arc::new(Pkcs7), 16)
        .unwrap();
    assert_eq!(session.backend_name(), "accelerated");

    // Identity "cipher": output is the padded plaintext
    let sealed = session.encrypt(&[0u8; 16], &[0u8; 16], b"abc", b"").unwrap();
    assert_eq!(&sealed.ciphertext[..3], b"abc");
    assert_eq!(sealed.ciphertext.len(), 16);

    let digest = registry.hash(HashId::Sha2_256).unwrap().digest(b"").unwrap();
    assert_eq!(digest, vec![0xAA; 32]);
}

/// Test that capabilities only the built-in backend has still resolve to it
#[test]
fn test_rank_falls_back_for_unique_capabilities() {
    let registry = registry(ResolutionPolicy::ImplementationRank);
    let session = registry
        .cipher(CipherId::Aes256, ModeId::Gcm, Arc::new(Pkcs7), 16)
        .unwrap();
    assert_eq!(session.backend_name(), BACKEND_NAME);

    let mac = registry.mac(MacId::Hmac, HashId::Sha1.into(), b"k", b"").unwrap();
    assert_eq!(mac.backend_name(), BACKEND_NAME);
}

/// Test that both backends are listed for a shared capability
#[test]
fn test_backends_for_shared_capability() {
    let registry = registry(ResolutionPolicy::FirstRegistered);
    let capability = Capability::Cipher(CipherId::Aes128, ModeId::Cbc);

    let names: Vec<&str> = registry
        .backends_for(&capability)
        .iter()
        .map(|b| b.name())
        .collect();
    assert_eq!(names, vec![BACKEND_NAME, "accelerated"]);
    assert!(registry.supports(&capability));
    assert!(!registry.supports(&Capability::Cipher(CipherId::Seed, ModeId::Cbc)));
}

/// Test that resolution is stable across repeated calls and explicit policies
#[test]
fn test_resolution_is_deterministic() {
    let registry = registry(ResolutionPolicy::FirstRegistered);
    let capability = Capability::Hash(HashId::Sha2_256);

    for _ in 0..5 {
        assert_eq!(registry.resolve(&capability).unwrap().backend_name(), BACKEND_NAME);
        assert_eq!(
            registry
                .resolve_with(&capability, ResolutionPolicy::ImplementationRank)
                .unwrap()
                .backend_name(),
            "accelerated"
        );
    }
}

/// Test registering the same backend twice
#[test]
fn test_double_registration_does_not_crash() {
    let mut registry = Registry::with_policy(ResolutionPolicy::ImplementationRank);
    let first = registry.register(Arc::new(Accelerated));
    let second = registry.register(Arc::new(Accelerated));
    assert_eq!(first, second);
    assert_eq!(registry.len(), first + second);
    assert!(registry.hash(HashId::Sha2_256).is_ok());
}

/// Test that an empty registry reports NotSupported
#[test]
fn test_empty_registry() {
    let registry = Registry::with_policy(ResolutionPolicy::FirstRegistered);
    assert!(matches!(
        registry.resolve_hash(HashId::Md5),
        Err(CryptoError::NotSupported(_))
    ));
    assert!(matches!(
        registry.mac(MacId::Cmac, CipherId::Aes128.into(), &[0u8; 16], b""),
        Err(CryptoError::NotSupported(_))
    ));
}

/// Test the process-wide registry
#[test]
fn test_global_registry() {
    let global = Registry::global();
    assert!(std::ptr::eq(global, Registry::global()));
    assert!(global.supports(&Capability::Cipher(CipherId::Aes128, ModeId::Gcm)));
    assert!(global.supports_algorithm(HashId::Sha3_512));

    let session = global.cipher_with_defaults(CipherId::Aes128, ModeId::Gcm).unwrap();
    assert_eq!(session.tag_length(), 16);
    let sealed = session.encrypt(&[9u8; 16], &[8u8; 16], b"defaults", b"").unwrap();
    assert_eq!(
        session
            .decrypt(&[9u8; 16], &[8u8; 16], &sealed.ciphertext, sealed.tag.as_deref(), b"")
            .unwrap(),
        b"defaults"
    );
}
