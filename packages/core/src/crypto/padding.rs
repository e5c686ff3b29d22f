//! Padding strategies.
//!
//! The cipher session only depends on the [`Padding`] contract; the schemes
//! below are the ones callers usually want.

use crate::error::{CryptoError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Contract between a cipher session and a padding scheme.
pub trait Padding: Send + Sync {
    /// Bytes to append so that the plaintext reaches block alignment.
    /// `missing` is always in `1..=block_size`.
    fn padding_data(&self, block_size: usize, missing: usize) -> Result<Vec<u8>>;

    /// Number of trailing bytes to strip from a decrypted buffer. Zero means
    /// "no padding present".
    fn padding_size(&self, data: &[u8], block_size: usize) -> Result<usize>;
}

fn check_request(block_size: usize, missing: usize) -> Result<()> {
    if block_size == 0 || missing == 0 || missing > block_size {
        return Err(CryptoError::InvalidPadding(format!(
            "cannot pad {} bytes for block size {}",
            missing, block_size
        )));
    }
    if missing > u8::MAX as usize {
        return Err(CryptoError::InvalidPadding(format!(
            "padding length {} does not fit in one byte",
            missing
        )));
    }
    Ok(())
}

/// Reads the trailing length byte shared by PKCS#7, ANSI X.923 and ISO 10126.
fn trailing_length(data: &[u8], block_size: usize) -> Result<usize> {
    let last = *data
        .last()
        .ok_or_else(|| CryptoError::InvalidPadding("empty buffer".to_string()))?;
    let len = last as usize;
    if len == 0 || len > block_size || len > data.len() {
        return Err(CryptoError::InvalidPadding(format!(
            "invalid padding length byte {}",
            len
        )));
    }
    Ok(len)
}

/// Appends nothing and strips nothing. Only usable with stream-like modes or
/// with input the caller already aligned.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPadding;

impl Padding for NoPadding {
    fn padding_data(&self, _block_size: usize, _missing: usize) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn padding_size(&self, _data: &[u8], _block_size: usize) -> Result<usize> {
        Ok(0)
    }
}

/// PKCS#7 (RFC 5652): `n` bytes of value `n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pkcs7;

impl Padding for Pkcs7 {
    fn padding_data(&self, block_size: usize, missing: usize) -> Result<Vec<u8>> {
        check_request(block_size, missing)?;
        Ok(vec![missing as u8; missing])
    }

    fn padding_size(&self, data: &[u8], block_size: usize) -> Result<usize> {
        let len = trailing_length(data, block_size)?;
        if data[data.len() - len..].iter().any(|&b| b as usize != len) {
            return Err(CryptoError::InvalidPadding("invalid PKCS#7 padding bytes".to_string()));
        }
        Ok(len)
    }
}

/// ANSI X.923: zero bytes followed by the padding length.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiX923;

impl Padding for AnsiX923 {
    fn padding_data(&self, block_size: usize, missing: usize) -> Result<Vec<u8>> {
        check_request(block_size, missing)?;
        let mut pad = vec![0u8; missing];
        pad[missing - 1] = missing as u8;
        Ok(pad)
    }

    fn padding_size(&self, data: &[u8], block_size: usize) -> Result<usize> {
        let len = trailing_length(data, block_size)?;
        let filler = &data[data.len() - len..data.len() - 1];
        if filler.iter().any(|&b| b != 0) {
            return Err(CryptoError::InvalidPadding("invalid ANSI X.923 padding bytes".to_string()));
        }
        Ok(len)
    }
}

/// ISO/IEC 7816-4: a single `0x80` marker followed by zero bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso7816;

impl Padding for Iso7816 {
    fn padding_data(&self, block_size: usize, missing: usize) -> Result<Vec<u8>> {
        check_request(block_size, missing)?;
        let mut pad = vec![0u8; missing];
        pad[0] = 0x80;
        Ok(pad)
    }

    fn padding_size(&self, data: &[u8], block_size: usize) -> Result<usize> {
        let window = data.len().min(block_size);
        for (offset, &byte) in data.iter().rev().take(window).enumerate() {
            match byte {
                0x00 => continue,
                0x80 => return Ok(offset + 1),
                _ => break,
            }
        }
        Err(CryptoError::InvalidPadding("missing ISO/IEC 7816-4 marker".to_string()))
    }
}

/// ISO 10126: random filler followed by the padding length.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iso10126;

impl Padding for Iso10126 {
    fn padding_data(&self, block_size: usize, missing: usize) -> Result<Vec<u8>> {
        check_request(block_size, missing)?;
        let mut pad = vec![0u8; missing];
        OsRng.fill_bytes(&mut pad[..missing - 1]);
        pad[missing - 1] = missing as u8;
        Ok(pad)
    }

    fn padding_size(&self, data: &[u8], block_size: usize) -> Result<usize> {
        trailing_length(data, block_size)
    }
}

/// Named padding schemes, for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaddingScheme {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "pkcs7")]
    Pkcs7,
    #[serde(rename = "ansi-x923")]
    AnsiX923,
    #[serde(rename = "iso7816-4")]
    Iso7816,
    #[serde(rename = "iso10126")]
    Iso10126,
}

impl PaddingScheme {
    pub const ALL: &'static [PaddingScheme] = &[
        PaddingScheme::None,
        PaddingScheme::Pkcs7,
        PaddingScheme::AnsiX923,
        PaddingScheme::Iso7816,
        PaddingScheme::Iso10126,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PaddingScheme::None => "none",
            PaddingScheme::Pkcs7 => "pkcs7",
            PaddingScheme::AnsiX923 => "ansi-x923",
            PaddingScheme::Iso7816 => "iso7816-4",
            PaddingScheme::Iso10126 => "iso10126",
        }
    }

    /// Shared strategy object for this scheme.
    pub fn strategy(&self) -> Arc<dyn Padding> {
        match self {
            PaddingScheme::None => Arc::new(NoPadding),
            PaddingScheme::Pkcs7 => Arc::new(Pkcs7),
            PaddingScheme::AnsiX923 => Arc::new(AnsiX923),
            PaddingScheme::Iso7816 => Arc::new(Iso7816),
            PaddingScheme::Iso10126 => Arc::new(Iso10126),
        }
    }
}

impl fmt::Display for PaddingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaddingScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        PaddingScheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CryptoError::InvalidArgument(format!("Unknown padding scheme: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(padding: &dyn Padding, data: &[u8], block_size: usize) -> Vec<u8> {
        let missing = block_size - (data.len() % block_size);
        let mut out = data.to_vec();
        out.extend(padding.padding_data(block_size, missing).unwrap());
        out
    }

    #[test]
    fn test_pkcs7_pad_partial_block() {
        let padded = pad(&Pkcs7, b"Hello World", 16);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[11..], &[5, 5, 5, 5, 5]);
        assert_eq!(Pkcs7.padding_size(&padded, 16).unwrap(), 5);
    }

    #[test]
    fn test_pkcs7_aligned_input_gets_full_block() {
        let padded = pad(&Pkcs7, b"1234567890123456", 16);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
        assert_eq!(Pkcs7.padding_size(&padded, 16).unwrap(), 16);
    }

    #[test]
    fn test_pkcs7_rejects_corrupt_padding() {
        let mut data = vec![1u8; 16];
        data[15] = 20; // больше размера блока
        assert!(Pkcs7.padding_size(&data, 16).is_err());

        let mut data = vec![0u8; 16];
        data[13] = 9;
        data[14] = 3;
        data[15] = 3;
        assert!(Pkcs7.padding_size(&data, 16).is_err());
    }

    #[test]
    fn test_ansi_x923_layout() {
        let padded = pad(&AnsiX923, b"abc", 8);
        assert_eq!(padded, vec![b'a', b'b', b'c', 0, 0, 0, 0, 5]);
        assert_eq!(AnsiX923.padding_size(&padded, 8).unwrap(), 5);

        let mut corrupt = padded.clone();
        corrupt[4] = 1;
        assert!(AnsiX923.padding_size(&corrupt, 8).is_err());
    }

    #[test]
    fn test_iso7816_layout() {
        let padded = pad(&Iso7816, b"abcde", 8);
        assert_eq!(padded, vec![b'a', b'b', b'c', b'd', b'e', 0x80, 0, 0]);
        assert_eq!(Iso7816.padding_size(&padded, 8).unwrap(), 3);

        let full = pad(&Iso7816, b"", 8);
        assert_eq!(full.len(), 8);
        assert_eq!(Iso7816.padding_size(&full, 8).unwrap(), 8);

        assert!(Iso7816.padding_size(&[1, 2, 3, 0, 0], 8).is_err());
    }

    #[test]
    fn test_iso10126_length_byte() {
        let padded = pad(&Iso10126, b"abcdef", 8);
        assert_eq!(padded.len(), 8);
        assert_eq!(padded[7], 2);
        assert_eq!(Iso10126.padding_size(&padded, 8).unwrap(), 2);
    }

    #[test]
    fn test_no_padding_is_a_no_op() {
        assert!(NoPadding.padding_data(16, 16).unwrap().is_empty());
        assert_eq!(NoPadding.padding_size(b"anything", 16).unwrap(), 0);
    }

    #[test]
    fn test_invalid_requests() {
        assert!(Pkcs7.padding_data(16, 0).is_err());
        assert!(Pkcs7.padding_data(16, 17).is_err());
        assert!(Pkcs7.padding_data(0, 0).is_err());
        assert!(Pkcs7.padding_data(512, 300).is_err());
        assert!(Pkcs7.padding_size(&[], 16).is_err());
    }

    #[test]
    fn test_scheme_names() {
        for scheme in PaddingScheme::ALL {
            assert_eq!(scheme.name().parse::<PaddingScheme>().unwrap(), *scheme);
        }
        assert!("zero".parse::<PaddingScheme>().is_err());
    }
}
