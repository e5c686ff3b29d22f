//! Classic block cipher modes, delegated to the RustCrypto mode crates.
//!
//! The caller keys the inner cipher with `new_from_slice` and the mode wraps
//! it through `InnerInit` / `InnerIvInit`, so variable-key ciphers (Blowfish,
//! CAST5, RC2) take the same path as AES. CFB is the full-block variant. CTR
//! counts over the whole block (`Ctr128BE` for 128-bit ciphers, `Ctr64BE`
//! for 64-bit ones). CFB, OFB and CTR accept a trailing partial block.

use crate::error::{CryptoError, Result};
use cipher::crypto_common::{InnerInit, InnerIvInit};
use cipher::generic_array::GenericArray;
use cipher::typenum::{IsLess, Le, NonZero, U256};
use cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, StreamCipher, StreamCipherCoreWrapper};
use ctr::flavors::CtrFlavor;
use ctr::CtrCore;
use ofb::OfbCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    fn failure(self, message: String) -> CryptoError {
        match self {
            Direction::Encrypt => CryptoError::EncryptionError(message),
            Direction::Decrypt => CryptoError::DecryptionError(message),
        }
    }
}

fn check_aligned<C: BlockCipher>(direction: Direction, len: usize, what: &str) -> Result<()> {
    let block_size = C::block_size();
    if len % block_size != 0 {
        return Err(direction.failure(format!(
            "{} input of {} bytes is not a multiple of the {}-byte block size",
            what, len, block_size
        )));
    }
    Ok(())
}

fn invalid_iv<C: BlockCipher>(iv: &[u8]) -> CryptoError {
    CryptoError::InvalidIvLength {
        expected: C::block_size(),
        got: iv.len(),
    }
}

// ============================================================================
// ECB / CBC (whole blocks only)
// ============================================================================

pub fn ecb_apply<C>(cipher: C, direction: Direction, data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + BlockDecryptMut,
{
    check_aligned::<C>(direction, data.len(), "ECB")?;

    let mut out = data.to_vec();
    let blocks = out.chunks_exact_mut(C::block_size());
    match direction {
        Direction::Encrypt => {
            let mut mode = ecb::Encryptor::<C>::inner_init(cipher);
            for block in blocks {
                mode.encrypt_block_mut(GenericArray::from_mut_slice(block));
            }
        }
        Direction::Decrypt => {
            let mut mode = ecb::Decryptor::<C>::inner_init(cipher);
            for block in blocks {
                mode.decrypt_block_mut(GenericArray::from_mut_slice(block));
            }
        }
    }
    Ok(out)
}

pub fn cbc_apply<C>(cipher: C, direction: Direction, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut + BlockDecryptMut,
{
    check_aligned::<C>(direction, data.len(), "CBC")?;

    let mut out = data.to_vec();
    let blocks = out.chunks_exact_mut(C::block_size());
    match direction {
        Direction::Encrypt => {
            let mut mode = cbc::Encryptor::<C>::inner_iv_slice_init(cipher, iv)
                .map_err(|_| invalid_iv::<C>(iv))?;
            for block in blocks {
                mode.encrypt_block_mut(GenericArray::from_mut_slice(block));
            }
        }
        Direction::Decrypt => {
            let mut mode = cbc::Decryptor::<C>::inner_iv_slice_init(cipher, iv)
                .map_err(|_| invalid_iv::<C>(iv))?;
            for block in blocks {
                mode.decrypt_block_mut(GenericArray::from_mut_slice(block));
            }
        }
    }
    Ok(out)
}

// ============================================================================
// CFB / OFB / CTR (any length)
// ============================================================================

pub fn cfb_apply<C>(cipher: C, direction: Direction, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut,
{
    let mut out = data.to_vec();
    match direction {
        Direction::Encrypt => cfb_mode::BufEncryptor::<C>::inner_iv_slice_init(cipher, iv)
            .map_err(|_| invalid_iv::<C>(iv))?
            .encrypt(&mut out),
        Direction::Decrypt => cfb_mode::BufDecryptor::<C>::inner_iv_slice_init(cipher, iv)
            .map_err(|_| invalid_iv::<C>(iv))?
            .decrypt(&mut out),
    }
    Ok(out)
}

pub fn ofb_apply<C>(cipher: C, direction: Direction, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut,
    C::BlockSize: IsLess<U256>,
    Le<C::BlockSize, U256>: NonZero,
{
    let core = OfbCore::<C>::inner_iv_slice_init(cipher, iv).map_err(|_| invalid_iv::<C>(iv))?;
    keystream(StreamCipherCoreWrapper::from_core(core), direction, data)
}

/// `F` is the counter flavor matching the cipher's block size.
pub fn ctr_apply<C, F>(cipher: C, direction: Direction, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    C: BlockCipher + BlockEncryptMut,
    C::BlockSize: IsLess<U256>,
    Le<C::BlockSize, U256>: NonZero,
    F: CtrFlavor<C::BlockSize>,
{
    let core = CtrCore::<C, F>::inner_iv_slice_init(cipher, iv).map_err(|_| invalid_iv::<C>(iv))?;
    keystream(StreamCipherCoreWrapper::from_core(core), direction, data)
}

fn keystream<S: StreamCipher>(mut stream: S, direction: Direction, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = data.to_vec();
    stream
        .try_apply_keystream(&mut out)
        .map_err(|_| direction.failure("keystream exhausted: counter would wrap".to_string()))?;
    Ok(out)
}
