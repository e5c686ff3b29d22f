use crate::crypto::algorithms::{CipherId, HashId, MacId};
use crate::crypto::mac::MacEngine;
use crate::error::{CryptoError, Result};
use aes::{Aes128, Aes192, Aes256};
use blowfish::Blowfish;
use cast5::Cast5;
use cmac::Cmac;
use des::{Des, TdesEde3};
use digest::{KeyInit, Mac};
use hmac::SimpleHmac;
use pmac::Pmac;
use rc2::Rc2;
use twofish::Twofish;

/// Any `digest::Mac` as a [`MacEngine`].
struct MacAdapter<M>(M);

impl<M: Mac + Send + 'static> MacEngine for MacAdapter<M> {
    fn update(&mut self, data: &[u8]) {
        Mac::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        <M as digest::OutputSizeUser>::output_size()
    }
}

fn keyed<M: Mac + KeyInit + Send + 'static>(algorithm: &str, key: &[u8]) -> Result<Box<dyn MacEngine>> {
    let mac = <M as KeyInit>::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        algorithm: algorithm.to_string(),
        expected: "a length accepted by the MAC".to_string(),
        got: key.len(),
    })?;
    Ok(Box::new(MacAdapter(mac)))
}

pub(super) fn hmac(hash: HashId, key: &[u8]) -> Result<Box<dyn MacEngine>> {
    let name = format!("HMAC-{}", hash);
    match hash {
        HashId::Md2 => keyed::<SimpleHmac<md2::Md2>>(&name, key),
        HashId::Md4 => keyed::<SimpleHmac<md4::Md4>>(&name, key),
        HashId::Md5 => keyed::<SimpleHmac<md5::Md5>>(&name, key),
        HashId::Ripemd160 => keyed::<SimpleHmac<ripemd::Ripemd160>>(&name, key),
        HashId::Sha1 => keyed::<SimpleHmac<sha1::Sha1>>(&name, key),
        HashId::Sha2_224 => keyed::<SimpleHmac<sha2::Sha224>>(&name, key),
        HashId::Sha2_256 => keyed::<SimpleHmac<sha2::Sha256>>(&name, key),
        HashId::Sha2_384 => keyed::<SimpleHmac<sha2::Sha384>>(&name, key),
        HashId::Sha2_512 => keyed::<SimpleHmac<sha2::Sha512>>(&name, key),
        HashId::Sha3_224 => keyed::<SimpleHmac<sha3::Sha3_224>>(&name, key),
        HashId::Sha3_256 => keyed::<SimpleHmac<sha3::Sha3_256>>(&name, key),
        HashId::Sha3_384 => keyed::<SimpleHmac<sha3::Sha3_384>>(&name, key),
        HashId::Sha3_512 => keyed::<SimpleHmac<sha3::Sha3_512>>(&name, key),
    }
}

pub(super) fn cmac(cipher: CipherId, key: &[u8]) -> Result<Box<dyn MacEngine>> {
    let name = format!("CMAC-{}", cipher);
    match cipher {
        CipherId::Aes128 => keyed::<Cmac<Aes128>>(&name, key),
        CipherId::Aes192 => keyed::<Cmac<Aes192>>(&name, key),
        CipherId::Aes256 => keyed::<Cmac<Aes256>>(&name, key),
        CipherId::Des => keyed::<Cmac<Des>>(&name, key),
        CipherId::TripleDes => keyed::<Cmac<TdesEde3>>(&name, key),
        CipherId::Twofish => keyed::<Cmac<Twofish>>(&name, key),
        CipherId::Blowfish => keyed::<Cmac<Blowfish>>(&name, key),
        CipherId::Cast5 => keyed::<Cmac<Cast5>>(&name, key),
        CipherId::Rc2 => keyed::<Cmac<Rc2>>(&name, key),
        other => Err(not_pairable(MacId::Cmac, other)),
    }
}

pub(super) fn pmac(cipher: CipherId, key: &[u8]) -> Result<Box<dyn MacEngine>> {
    let name = format!("PMAC-{}", cipher);
    match cipher {
        CipherId::Aes128 => keyed::<Pmac<Aes128>>(&name, key),
        CipherId::Aes192 => keyed::<Pmac<Aes192>>(&name, key),
        CipherId::Aes256 => keyed::<Pmac<Aes256>>(&name, key),
        CipherId::Des => keyed::<Pmac<Des>>(&name, key),
        CipherId::TripleDes => keyed::<Pmac<TdesEde3>>(&name, key),
        CipherId::Twofish => keyed::<Pmac<Twofish>>(&name, key),
        CipherId::Blowfish => keyed::<Pmac<Blowfish>>(&name, key),
        CipherId::Cast5 => keyed::<Pmac<Cast5>>(&name, key),
        CipherId::Rc2 => keyed::<Pmac<Rc2>>(&name, key),
        other => Err(not_pairable(MacId::Pmac, other)),
    }
}

pub(super) fn not_pairable(mac: MacId, inner: impl std::fmt::Display) -> CryptoError {
    CryptoError::InvalidArgument(format!("{} cannot be built on {}", mac, inner))
}
