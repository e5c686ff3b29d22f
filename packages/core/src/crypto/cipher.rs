//! Cipher sessions.
//!
//! Backends implement [`CipherPrimitive`], which only knows how to run a
//! cipher/mode pair over block-aligned input. [`CipherSession`] layers the
//! uniform contract on top: key and IV length checks, padding, AEAD tag
//! handling. Every backend therefore behaves the same from the caller's side.

use crate::crypto::algorithms::{CipherId, ModeId};
use crate::crypto::padding::Padding;
use crate::error::{CryptoError, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};
use zeroize::Zeroizing;

/// Output of an encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    /// Authentication tag; `Some` exactly for AEAD modes.
    pub tag: Option<Vec<u8>>,
}

/// Raw backend cipher bound to one (cipher, mode) pair.
pub trait CipherPrimitive: Send + Sync {
    /// Block size of the underlying cipher, in bytes.
    fn block_size(&self) -> Result<usize>;

    /// Encrypt already padded data. AEAD modes return a tag.
    fn seal(&self, key: &[u8], iv: &[u8], data: &[u8], aad: &[u8]) -> Result<Sealed>;

    /// Decrypt without touching padding. AEAD modes must verify `tag` and
    /// fail with [`CryptoError::AuthenticationFailed`] on mismatch.
    fn open(
        &self,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        tag: Option<&[u8]>,
        aad: &[u8],
    ) -> Result<Vec<u8>>;
}

/// A resolved cipher. Immutable; `encrypt`/`decrypt` may be called any
/// number of times, from any thread.
pub struct CipherSession {
    cipher: CipherId,
    mode: ModeId,
    backend: &'static str,
    primitive: Box<dyn CipherPrimitive>,
    padding: Arc<dyn Padding>,
    tag_length: usize,
}

impl CipherSession {
    pub fn new(
        cipher: CipherId,
        mode: ModeId,
        backend: &'static str,
        primitive: Box<dyn CipherPrimitive>,
        padding: Arc<dyn Padding>,
        tag_length: usize,
    ) -> Self {
        Self {
            cipher,
            mode,
            backend,
            primitive,
            padding,
            tag_length,
        }
    }

    pub fn cipher(&self) -> CipherId {
        self.cipher
    }

    pub fn mode(&self) -> ModeId {
        self.mode
    }

    /// Name of the backend this session was resolved to.
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    pub fn tag_length(&self) -> usize {
        self.tag_length
    }

    /// Block size reported by the backend. Zero is treated as a failed query.
    pub fn block_size(&self) -> Result<usize> {
        match self.primitive.block_size()? {
            0 => Err(CryptoError::UnsupportedAlgorithm(format!(
                "{} reported a zero block size for {}/{}",
                self.backend, self.cipher, self.mode
            ))),
            size => Ok(size),
        }
    }

    /// Always equal to [`block_size`](Self::block_size), including for ECB
    /// (which ignores the IV).
    pub fn iv_size(&self) -> Result<usize> {
        self.block_size()
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        let sizes = self.cipher.key_sizes();
        if !sizes.contains(key.len()) {
            return Err(CryptoError::InvalidKeyLength {
                algorithm: self.cipher.to_string(),
                expected: sizes.to_string(),
                got: key.len(),
            });
        }
        Ok(())
    }

    fn check_iv(&self, iv: &[u8]) -> Result<()> {
        if !self.mode.uses_iv() {
            return Ok(());
        }
        let expected = self.iv_size()?;
        if iv.len() != expected {
            return Err(CryptoError::InvalidIvLength {
                expected,
                got: iv.len(),
            });
        }
        Ok(())
    }

    /// Pad `plaintext` to a whole number of blocks and encrypt it.
    ///
    /// Block-aligned input still receives a full block of padding.
    pub fn encrypt(&self, iv: &[u8], key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Sealed> {
        self.check_key(key)?;
        self.check_iv(iv)?;

        let block_size = self.block_size()?;
        let missing = block_size - (plaintext.len() % block_size);
        let padding = self.padding.padding_data(block_size, missing)?;

        let mut buffer = Zeroizing::new(Vec::with_capacity(plaintext.len() + padding.len()));
        buffer.extend_from_slice(plaintext);
        buffer.extend_from_slice(&padding);

        trace!(
            target: "crypto::session",
            cipher = %self.cipher,
            mode = %self.mode,
            backend = self.backend,
            len = buffer.len(),
            "Encrypting"
        );

        let sealed = self.primitive.seal(key, iv, &buffer, aad)?;
        if self.mode.is_aead() != sealed.tag.is_some() {
            return Err(CryptoError::EncryptionError(format!(
                "{} returned an inconsistent tag for {}/{}",
                self.backend, self.cipher, self.mode
            )));
        }
        Ok(sealed)
    }

    /// Decrypt and strip padding. AEAD modes require `tag`.
    pub fn decrypt(
        &self,
        iv: &[u8],
        key: &[u8],
        ciphertext: &[u8],
        tag: Option<&[u8]>,
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        self.check_key(key)?;
        self.check_iv(iv)?;

        let tag = if self.mode.is_aead() {
            let tag = tag.ok_or_else(|| {
                CryptoError::InvalidArgument(format!("{} requires an authentication tag", self.mode))
            })?;
            if tag.len() != self.tag_length {
                warn!(
                    target: "crypto::session",
                    cipher = %self.cipher,
                    mode = %self.mode,
                    expected = self.tag_length,
                    got = tag.len(),
                    "Rejecting tag of unexpected length"
                );
                return Err(CryptoError::AuthenticationFailed(format!(
                    "expected a {}-byte tag, got {}",
                    self.tag_length,
                    tag.len()
                )));
            }
            Some(tag)
        } else {
            None
        };

        let block_size = self.block_size()?;
        let mut plaintext = match self.primitive.open(key, iv, ciphertext, tag, aad) {
            Ok(plaintext) => plaintext,
            Err(e @ CryptoError::AuthenticationFailed(_)) => {
                warn!(
                    target: "crypto::session",
                    cipher = %self.cipher,
                    mode = %self.mode,
                    backend = self.backend,
                    "Authentication failed"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let strip = self.padding.padding_size(&plaintext, block_size)?;
        if strip > plaintext.len() {
            return Err(CryptoError::InvalidPadding(format!(
                "padding of {} bytes exceeds {}-byte plaintext",
                strip,
                plaintext.len()
            )));
        }
        plaintext.truncate(plaintext.len() - strip);
        Ok(plaintext)
    }
}

impl fmt::Debug for CipherSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSession")
            .field("cipher", &self.cipher)
            .field("mode", &self.mode)
            .field("backend", &self.backend)
            .field("tag_length", &self.tag_length)
            .finish_non_exhaustive()
    }
}

/// A [`CipherSession`] bound to one key. The key is zeroized on drop.
pub struct KeyedCipher {
    session: CipherSession,
    key: Zeroizing<Vec<u8>>,
}

impl KeyedCipher {
    /// Fails with [`CryptoError::InvalidKeyLength`] right away rather than on
    /// first use.
    pub fn new(session: CipherSession, key: &[u8]) -> Result<Self> {
        session.check_key(key)?;
        Ok(Self {
            session,
            key: Zeroizing::new(key.to_vec()),
        })
    }

    pub fn session(&self) -> &CipherSession {
        &self.session
    }

    pub fn encrypt(&self, iv: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Sealed> {
        self.session.encrypt(iv, &self.key, plaintext, aad)
    }

    pub fn decrypt(
        &self,
        iv: &[u8],
        ciphertext: &[u8],
        tag: Option<&[u8]>,
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        self.session.decrypt(iv, &self.key, ciphertext, tag, aad)
    }
}

impl fmt::Debug for KeyedCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedCipher")
            .field("session", &self.session)
            .field("key", &"<redacted>")
            .finish()
    }
}
