//! Streaming MAC sessions. Same lifecycle as [`HashSession`](super::hash::HashSession).

use crate::crypto::algorithms::{MacId, SubAlgorithm};
use crate::error::{CryptoError, Result};
use std::fmt;
use tracing::trace;

/// Backend-side MAC accumulator. The key is consumed at construction.
pub trait MacEngine: Send {
    fn update(&mut self, data: &[u8]);

    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Tag length in bytes.
    fn output_size(&self) -> usize;
}

pub struct MacSession {
    mac: MacId,
    inner: SubAlgorithm,
    backend: &'static str,
    output_size: usize,
    engine: Option<Box<dyn MacEngine>>,
}

impl MacSession {
    pub fn new(
        mac: MacId,
        inner: SubAlgorithm,
        backend: &'static str,
        engine: Box<dyn MacEngine>,
    ) -> Self {
        Self {
            mac,
            inner,
            backend,
            output_size: engine.output_size(),
            engine: Some(engine),
        }
    }

    pub fn algorithm(&self) -> MacId {
        self.mac
    }

    pub fn inner(&self) -> SubAlgorithm {
        self.inner
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
        trace!(
            target: "crypto::session",
            mac = %self.mac,
            inner = %self.inner,
            backend = self.backend,
            "Finalizing MAC"
        );
        Ok(engine.finalize())
    }

    /// MAC `data` in one go.
    pub fn compute(mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.update(data)?;
        self.finalize()
    }
}

impl fmt::Debug for MacSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacSession")
            .field("mac", &self.mac)
            .field("inner", &self.inner)
            .field("backend", &self.backend)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}
