//! RustCrypto cipher primitive: one native cipher in one native mode.

use super::modes::{self, Direction};
use super::{NativeCipher, NativeMode};
use crate::crypto::cipher::{CipherPrimitive, Sealed};
use crate::error::{CryptoError, Result};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::AesGcm;
use blowfish::Blowfish;
use cast5::Cast5;
use cipher::typenum::{IsLess, Le, NonZero, Unsigned, U256};
use cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut};
use ctr::flavors::{Ctr128BE, Ctr64BE, CtrFlavor};
use des::{Des, TdesEde3};
use eax::Eax;
use rc2::Rc2;
use twofish::Twofish;

/// AEAD tag length supported by this backend, in bytes.
pub const TAG_LENGTH: usize = 16;

#[derive(Debug)]
pub struct RustCryptoCipher {
    cipher: NativeCipher,
    mode: NativeMode,
}

impl RustCryptoCipher {
    pub(super) fn new(cipher: NativeCipher, mode: NativeMode) -> Self {
        Self { cipher, mode }
    }

    fn run_block_mode(&self, direction: Direction, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        match self.cipher {
            // Один примитив на все варианты AES, вариант выбирается длиной ключа
            NativeCipher::Rijndael => match key.len() {
                16 => block_mode::<Aes128, Ctr128BE>(self.mode, direction, key, iv, data),
                24 => block_mode::<Aes192, Ctr128BE>(self.mode, direction, key, iv, data),
                32 => block_mode::<Aes256, Ctr128BE>(self.mode, direction, key, iv, data),
                got => Err(invalid_key("Rijndael", got)),
            },
            NativeCipher::Twofish => block_mode::<Twofish, Ctr128BE>(self.mode, direction, key, iv, data),
            NativeCipher::Des => block_mode::<Des, Ctr64BE>(self.mode, direction, key, iv, data),
            NativeCipher::TripleDes => block_mode::<TdesEde3, Ctr64BE>(self.mode, direction, key, iv, data),
            NativeCipher::Blowfish => block_mode::<Blowfish, Ctr64BE>(self.mode, direction, key, iv, data),
            NativeCipher::Cast5 => block_mode::<Cast5, Ctr64BE>(self.mode, direction, key, iv, data),
            NativeCipher::Rc2 => block_mode::<Rc2, Ctr64BE>(self.mode, direction, key, iv, data),
            NativeCipher::Seed | NativeCipher::Arc4 => Err(unsupported(self.cipher)),
        }
    }

    fn seal_aead(&self, key: &[u8], iv: &[u8], data: &[u8], aad: &[u8]) -> Result<Sealed> {
        match (self.mode, key.len()) {
            (NativeMode::Gcm, 16) => seal::<AesGcm<Aes128, U16>>(key, iv, data, aad),
            (NativeMode::Gcm, 24) => seal::<AesGcm<Aes192, U16>>(key, iv, data, aad),
            (NativeMode::Gcm, 32) => seal::<AesGcm<Aes256, U16>>(key, iv, data, aad),
            (NativeMode::Eax, 16) => seal::<Eax<Aes128>>(key, iv, data, aad),
            (NativeMode::Eax, 24) => seal::<Eax<Aes192>>(key, iv, data, aad),
            (NativeMode::Eax, 32) => seal::<Eax<Aes256>>(key, iv, data, aad),
            (_, got) => Err(invalid_key("Rijndael", got)),
        }
    }

    fn open_aead(&self, key: &[u8], iv: &[u8], data: &[u8], tag: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        match (self.mode, key.len()) {
            (NativeMode::Gcm, 16) => open::<AesGcm<Aes128, U16>>(key, iv, data, tag, aad),
            (NativeMode::Gcm, 24) => open::<AesGcm<Aes192, U16>>(key, iv, data, tag, aad),
            (NativeMode::Gcm, 32) => open::<AesGcm<Aes256, U16>>(key, iv, data, tag, aad),
            (NativeMode::Eax, 16) => open::<Eax<Aes128>>(key, iv, data, tag, aad),
            (NativeMode::Eax, 24) => open::<Eax<Aes192>>(key, iv, data, tag, aad),
            (NativeMode::Eax, 32) => open::<Eax<Aes256>>(key, iv, data, tag, aad),
            (_, got) => Err(invalid_key("Rijndael", got)),
        }
    }
}

impl CipherPrimitive for RustCryptoCipher {
    fn block_size(&self) -> Result<usize> {
        match self.cipher {
            NativeCipher::Rijndael | NativeCipher::Twofish => Ok(16),
            NativeCipher::Des
            | NativeCipher::TripleDes
            | NativeCipher::Blowfish
            | NativeCipher::Cast5
            | NativeCipher::Rc2 => Ok(8),
            NativeCipher::Seed | NativeCipher::Arc4 => Err(unsupported(self.cipher)),
        }
    }

    fn seal(&self, key: &[u8], iv: &[u8], data: &[u8], aad: &[u8]) -> Result<Sealed> {
        if self.mode.is_aead() {
            return self.seal_aead(key, iv, data, aad);
        }
        Ok(Sealed {
            ciphertext: self.run_block_mode(Direction::Encrypt, key, iv, data)?,
            tag: None,
        })
    }

    fn open(
        &self,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        tag: Option<&[u8]>,
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        if self.mode.is_aead() {
            let tag = tag.ok_or_else(|| {
                CryptoError::InvalidArgument("authenticated mode requires a tag".to_string())
            })?;
            return self.open_aead(key, iv, data, tag, aad);
        }
        self.run_block_mode(Direction::Decrypt, key, iv, data)
    }
}

fn unsupported(cipher: NativeCipher) -> CryptoError {
    CryptoError::UnsupportedAlgorithm(format!("{:?} is not implemented by rustcrypto", cipher))
}

fn invalid_key(algorithm: &str, got: usize) -> CryptoError {
    CryptoError::InvalidKeyLength {
        algorithm: algorithm.to_string(),
        expected: "16, 24 or 32".to_string(),
        got,
    }
}

/// `F` is the CTR counter flavor covering the whole block of `C`.
fn block_mode<C, F>(mode: NativeMode, direction: Direction, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + BlockDecryptMut + KeyInit,
    C::BlockSize: IsLess<U256>,
    Le<C::BlockSize, U256>: NonZero,
    F: CtrFlavor<C::BlockSize>,
{
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        algorithm: std::any::type_name::<C>().to_string(),
        expected: "a length accepted by the cipher".to_string(),
        got: key.len(),
    })?;

    match mode {
        NativeMode::Ecb => modes::ecb_apply(cipher, direction, data),
        NativeMode::Cbc => modes::cbc_apply(cipher, direction, iv, data),
        NativeMode::Cfb => modes::cfb_apply(cipher, direction, iv, data),
        NativeMode::Ofb => modes::ofb_apply(cipher, direction, iv, data),
        NativeMode::Ctr => modes::ctr_apply::<C, F>(cipher, direction, iv, data),
        other => Err(CryptoError::UnsupportedAlgorithm(format!(
            "{:?} is not a plain block mode",
            other
        ))),
    }
}

fn nonce_of<A: AeadInPlace>(iv: &[u8]) -> Result<&Nonce<A>> {
    let expected = A::NonceSize::USIZE;
    if iv.len() != expected {
        return Err(CryptoError::InvalidIvLength {
            expected,
            got: iv.len(),
        });
    }
    Ok(Nonce::<A>::from_slice(iv))
}

fn seal<A: AeadInPlace + KeyInit>(key: &[u8], iv: &[u8], data: &[u8], aad: &[u8]) -> Result<Sealed> {
    let aead = A::new_from_slice(key).map_err(|_| invalid_key("Rijndael", key.len()))?;
    let nonce = nonce_of::<A>(iv)?;

    let mut buffer = data.to_vec();
    let tag = aead
        .encrypt_in_place_detached(nonce, aad, &mut buffer)
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;
    Ok(Sealed {
        ciphertext: buffer,
        tag: Some(tag.to_vec()),
    })
}

fn open<A: AeadInPlace + KeyInit>(key: &[u8], iv: &[u8], data: &[u8], tag: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let aead = A::new_from_slice(key).map_err(|_| invalid_key("Rijndael", key.len()))?;
    let nonce = nonce_of::<A>(iv)?;
    if tag.len() != A::TagSize::USIZE {
        return Err(CryptoError::AuthenticationFailed(format!(
            "expected a {}-byte tag, got {}",
            A::TagSize::USIZE,
            tag.len()
        )));
    }

    let mut buffer = data.to_vec();
    aead.decrypt_in_place_detached(nonce, aad, &mut buffer, Tag::<A>::from_slice(tag))?;
    Ok(buffer)
}
