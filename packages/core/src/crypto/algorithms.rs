//! Symbolic algorithm identifiers.
//!
//! These names are the contract between callers and the registry: they never
//! carry backend-specific constants, and their string forms are stable.

use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! algorithm_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every identifier of this kind, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical (stable) name.
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = CryptoError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|id| id.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        CryptoError::InvalidArgument(format!("Unknown {} identifier: {}", $kind, s))
                    })
            }
        }
    };
}

algorithm_enum! {
    /// Block and stream ciphers. Key length is part of the identity where the
    /// primitive is length-polymorphic (AES).
    pub enum CipherId ("cipher") {
        TripleDes => "3DES",
        Blowfish => "BLOWFISH",
        Cast5 => "CAST5",
        Des => "DES",
        Rc2 => "RC2",
        Rc4 => "RC4",
        Seed => "SEED",
        Twofish => "TWOFISH",
        Aes128 => "AES-128",
        Aes192 => "AES-192",
        Aes256 => "AES-256",
    }
}

algorithm_enum! {
    /// Block cipher modes of operation.
    pub enum ModeId ("mode") {
        Cbc => "CBC",
        Ccm => "CCM",
        Cfb => "CFB",
        Ctr => "CTR",
        Eax => "EAX",
        Ecb => "ECB",
        Gcm => "GCM",
        Ocb => "OCB",
        Ofb => "OFB",
    }
}

algorithm_enum! {
    pub enum HashId ("hash") {
        Md2 => "MD2",
        Md4 => "MD4",
        Md5 => "MD5",
        Ripemd160 => "RIPEMD-160",
        Sha1 => "SHA-1",
        Sha2_224 => "SHA2-224",
        Sha2_256 => "SHA2-256",
        Sha2_384 => "SHA2-384",
        Sha2_512 => "SHA2-512",
        Sha3_224 => "SHA3-224",
        Sha3_256 => "SHA3-256",
        Sha3_384 => "SHA3-384",
        Sha3_512 => "SHA3-512",
    }
}

algorithm_enum! {
    pub enum MacId ("MAC") {
        Cmac => "CMAC",
        Hmac => "HMAC",
        Pmac => "PMAC",
    }
}

/// Accepted key lengths (in bytes) for a cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySizes {
    Fixed(usize),
    /// Inclusive range.
    Range(usize, usize),
    OneOf(&'static [usize]),
}

impl KeySizes {
    pub fn contains(&self, len: usize) -> bool {
        match *self {
            KeySizes::Fixed(size) => len == size,
            KeySizes::Range(min, max) => (min..=max).contains(&len),
            KeySizes::OneOf(sizes) => sizes.contains(&len),
        }
    }
}

impl fmt::Display for KeySizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySizes::Fixed(size) => write!(f, "{}", size),
            KeySizes::Range(min, max) => write!(f, "{}..={}", min, max),
            KeySizes::OneOf(sizes) => {
                let joined: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
                write!(f, "one of [{}]", joined.join(", "))
            }
        }
    }
}

impl CipherId {
    /// Key lengths this identifier accepts. A key outside this set is an
    /// error, it is never truncated or extended.
    pub fn key_sizes(&self) -> KeySizes {
        match self {
            CipherId::TripleDes => KeySizes::Fixed(24),
            CipherId::Blowfish => KeySizes::Range(4, 56),
            CipherId::Cast5 => KeySizes::Range(5, 16),
            CipherId::Des => KeySizes::Fixed(8),
            CipherId::Rc2 => KeySizes::Range(1, 128),
            CipherId::Rc4 => KeySizes::Range(5, 256),
            CipherId::Seed => KeySizes::Fixed(16),
            CipherId::Twofish => KeySizes::OneOf(&[16, 24, 32]),
            CipherId::Aes128 => KeySizes::Fixed(16),
            CipherId::Aes192 => KeySizes::Fixed(24),
            CipherId::Aes256 => KeySizes::Fixed(32),
        }
    }

    /// A reasonable key length for callers that do not care.
    pub fn default_key_size(&self) -> usize {
        match self.key_sizes() {
            KeySizes::Fixed(size) => size,
            KeySizes::Range(min, max) => 16usize.clamp(min, max),
            KeySizes::OneOf(sizes) => sizes.last().copied().unwrap_or(16),
        }
    }
}

impl ModeId {
    /// Authenticated modes produce and verify a tag.
    pub fn is_aead(&self) -> bool {
        matches!(self, ModeId::Ccm | ModeId::Eax | ModeId::Gcm | ModeId::Ocb)
    }

    /// ECB is the only mode that ignores the IV.
    pub fn uses_iv(&self) -> bool {
        !matches!(self, ModeId::Ecb)
    }
}

impl HashId {
    /// Digest length in bytes.
    pub fn digest_size(&self) -> usize {
        match self {
            HashId::Md2 | HashId::Md4 | HashId::Md5 => 16,
            HashId::Ripemd160 | HashId::Sha1 => 20,
            HashId::Sha2_224 | HashId::Sha3_224 => 28,
            HashId::Sha2_256 | HashId::Sha3_256 => 32,
            HashId::Sha2_384 | HashId::Sha3_384 => 48,
            HashId::Sha2_512 | HashId::Sha3_512 => 64,
        }
    }
}

/// The primitive a MAC construction is built on: a cipher (CMAC, PMAC) or a
/// hash (HMAC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubAlgorithm {
    Cipher(CipherId),
    Hash(HashId),
}

impl From<CipherId> for SubAlgorithm {
    fn from(id: CipherId) -> Self {
        SubAlgorithm::Cipher(id)
    }
}

impl From<HashId> for SubAlgorithm {
    fn from(id: HashId) -> Self {
        SubAlgorithm::Hash(id)
    }
}

impl fmt::Display for SubAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubAlgorithm::Cipher(id) => fmt::Display::fmt(id, f),
            SubAlgorithm::Hash(id) => fmt::Display::fmt(id, f),
        }
    }
}

impl FromStr for SubAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(cipher) = s.parse::<CipherId>() {
            return Ok(SubAlgorithm::Cipher(cipher));
        }
        if let Ok(hash) = s.parse::<HashId>() {
            return Ok(SubAlgorithm::Hash(hash));
        }
        Err(CryptoError::InvalidArgument(format!(
            "Unsupported inner algorithm: {} is neither a cipher nor a hash",
            s
        )))
    }
}

/// Any symbolic identifier, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    Cipher(CipherId),
    Mode(ModeId),
    Hash(HashId),
    Mac(MacId),
}

impl From<CipherId> for AlgorithmId {
    fn from(id: CipherId) -> Self {
        AlgorithmId::Cipher(id)
    }
}

impl From<ModeId> for AlgorithmId {
    fn from(id: ModeId) -> Self {
        AlgorithmId::Mode(id)
    }
}

impl From<HashId> for AlgorithmId {
    fn from(id: HashId) -> Self {
        AlgorithmId::Hash(id)
    }
}

impl From<MacId> for AlgorithmId {
    fn from(id: MacId) -> Self {
        AlgorithmId::Mac(id)
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmId::Cipher(id) => write!(f, "cipher {}", id),
            AlgorithmId::Mode(id) => write!(f, "mode {}", id),
            AlgorithmId::Hash(id) => write!(f, "hash {}", id),
            AlgorithmId::Mac(id) => write!(f, "MAC {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for id in CipherId::ALL {
            assert_eq!(id.name().parse::<CipherId>().unwrap(), *id);
        }
        for id in ModeId::ALL {
            assert_eq!(id.name().parse::<ModeId>().unwrap(), *id);
        }
        for id in HashId::ALL {
            assert_eq!(id.name().parse::<HashId>().unwrap(), *id);
        }
        for id in MacId::ALL {
            assert_eq!(id.name().parse::<MacId>().unwrap(), *id);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("aes-256".parse::<CipherId>().unwrap(), CipherId::Aes256);
        assert_eq!(" gcm ".parse::<ModeId>().unwrap(), ModeId::Gcm);
        assert_eq!("sha2-256".parse::<HashId>().unwrap(), HashId::Sha2_256);
    }

    #[test]
    fn test_unknown_name_is_invalid_argument() {
        let err = "AES-512".parse::<CipherId>().unwrap_err();
        assert!(matches!(err, CryptoError::InvalidArgument(_)));
    }

    #[test]
    fn test_identifier_sets_are_complete() {
        assert_eq!(CipherId::ALL.len(), 11);
        assert_eq!(ModeId::ALL.len(), 9);
        assert_eq!(HashId::ALL.len(), 13);
        assert_eq!(MacId::ALL.len(), 3);
    }

    #[test]
    fn test_aes_identifiers_encode_key_length() {
        assert!(CipherId::Aes128.key_sizes().contains(16));
        assert!(!CipherId::Aes128.key_sizes().contains(32));
        assert!(CipherId::Aes256.key_sizes().contains(32));
        assert!(!CipherId::Aes256.key_sizes().contains(16));
        assert!(CipherId::Aes192.key_sizes().contains(24));
    }

    #[test]
    fn test_default_key_size_is_accepted() {
        for id in CipherId::ALL {
            assert!(
                id.key_sizes().contains(id.default_key_size()),
                "default key size rejected for {}",
                id
            );
        }
    }

    #[test]
    fn test_sub_algorithm_parse() {
        assert_eq!(
            "AES-128".parse::<SubAlgorithm>().unwrap(),
            SubAlgorithm::Cipher(CipherId::Aes128)
        );
        assert_eq!(
            "SHA2-256".parse::<SubAlgorithm>().unwrap(),
            SubAlgorithm::Hash(HashId::Sha2_256)
        );
        // Ни шифр, ни хеш
        let err = "HMAC".parse::<SubAlgorithm>().unwrap_err();
        assert!(matches!(err, CryptoError::InvalidArgument(_)));
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&CipherId::TripleDes).unwrap();
        assert_eq!(json, "\"3DES\"");
        let parsed: HashId = serde_json::from_str("\"RIPEMD-160\"").unwrap();
        assert_eq!(parsed, HashId::Ripemd160);
    }

    #[test]
    fn test_mode_properties() {
        assert!(ModeId::Gcm.is_aead());
        assert!(ModeId::Eax.is_aead());
        assert!(!ModeId::Cbc.is_aead());
        assert!(!ModeId::Ecb.uses_iv());
        assert!(ModeId::Ctr.uses_iv());
    }
}
