use super::NativeHash;
use crate::crypto::hash::HashEngine;
use digest::Digest;

/// Any `digest` 0.10 hasher as a [`HashEngine`].
struct DigestEngine<D>(D);

impl<D: Digest + Send + 'static> HashEngine for DigestEngine<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

fn engine<D: Digest + Send + 'static>() -> Box<dyn HashEngine> {
    Box::new(DigestEngine(D::new()))
}

pub(super) fn new_engine(hash: NativeHash) -> Box<dyn HashEngine> {
    match hash {
        NativeHash::Md2 => engine::<md2::Md2>(),
        NativeHash::Md4 => engine::<md4::Md4>(),
        NativeHash::Md5 => engine::<md5::Md5>(),
        NativeHash::Ripemd160 => engine::<ripemd::Ripemd160>(),
        NativeHash::Sha1 => engine::<sha1::Sha1>(),
        NativeHash::Sha224 => engine::<sha2::Sha224>(),
        NativeHash::Sha256 => engine::<sha2::Sha256>(),
        NativeHash::Sha384 => engine::<sha2::Sha384>(),
        NativeHash::Sha512 => engine::<sha2::Sha512>(),
        NativeHash::Sha3_224 => engine::<sha3::Sha3_224>(),
        NativeHash::Sha3_256 => engine::<sha3::Sha3_256>(),
        NativeHash::Sha3_384 => engine::<sha3::Sha3_384>(),
        NativeHash::Sha3_512 => engine::<sha3::Sha3_512>(),
    }
}
