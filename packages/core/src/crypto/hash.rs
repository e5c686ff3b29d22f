//! Streaming hash sessions.

use crate::crypto::algorithms::HashId;
use crate::error::{CryptoError, Result};
use std::fmt;
use tracing::trace;

/// Backend-side hash accumulator.
pub trait HashEngine: Send {
    fn update(&mut self, data: &[u8]);

    /// Consume the accumulator and return the raw digest.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Digest length in bytes.
    fn output_size(&self) -> usize;
}

/// created → `update`* → `finalize` (exactly once).
///
/// Using a session after `finalize` fails with
/// [`CryptoError::SessionFinalized`]; it never restarts silently.
pub struct HashSession {
    hash: HashId,
    backend: &'static str,
    output_size: usize,
    engine: Option<Box<dyn HashEngine>>,
}

impl HashSession {
    pub fn new(hash: HashId, backend: &'static str, engine: Box<dyn HashEngine>) -> Self {
        Self {
            hash,
            backend,
            output_size: engine.output_size(),
            engine: Some(engine),
        }
    }

    pub fn algorithm(&self) -> HashId {
        self.hash
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn is_finalized(&self) -> bool {
        self.engine.is_none()
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(CryptoError::SessionFinalized)?;
        engine.update(data);
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<Vec<u8>> {
        let engine = self.engine.take().ok_or(CryptoError::SessionFinalized)?;
        trace!(target: "crypto::session", hash = %self.hash, backend = self.backend, "Finalizing digest");
        Ok(engine.finalize())
    }

    /// Hash `data` in one go.
    pub fn digest(mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.update(data)?;
        self.finalize()
    }
}

impl fmt::Debug for HashSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashSession")
            .field("hash", &self.hash)
            .field("backend", &self.backend)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Сумма байтов: достаточно для проверки жизненного цикла
    struct SumEngine(u8);

    impl HashEngine for SumEngine {
        fn update(&mut self, data: &[u8]) {
            for b in data {
                self.0 = self.0.wrapping_add(*b);
            }
        }

        fn finalize(self: Box<Self>) -> Vec<u8> {
            vec![self.0]
        }

        fn output_size(&self) -> usize {
            1
        }
    }

    fn session() -> HashSession {
        HashSession::new(HashId::Md5, "sum", Box::new(SumEngine(0)))
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut s = session();
        s.update(&[1, 2]).unwrap();
        s.update(&[]).unwrap();
        s.update(&[3]).unwrap();
        assert_eq!(s.finalize().unwrap(), vec![6]);
        assert_eq!(session().digest(&[1, 2, 3]).unwrap(), vec![6]);
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut s = session();
        assert!(!s.is_finalized());
        s.finalize().unwrap();
        assert!(s.is_finalized());
        assert!(matches!(s.finalize(), Err(CryptoError::SessionFinalized)));
        assert!(matches!(s.update(b"x"), Err(CryptoError::SessionFinalized)));
    }

    #[test]
    fn test_output_size_survives_finalize() {
        let mut s = session();
        s.finalize().unwrap();
        assert_eq!(s.output_size(), 1);
    }
}
