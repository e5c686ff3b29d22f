use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No registered backend supports {0}")]
    NotSupported(String),
    #[error("Invalid key length for {algorithm}: expected {expected}, got {got} bytes")]
    InvalidKeyLength {
        algorithm: String,
        expected: String,
        got: usize,
    },
    #[error("Invalid IV length: expected {expected}, got {got} bytes")]
    InvalidIvLength { expected: usize, got: usize },
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Invalid padding: {0}")]
    InvalidPadding(String),
    #[error("Encryption failed: {0}")]
    EncryptionError(String),
    #[error("Decryption failed: {0}")]
    DecryptionError(String),
    #[error("Session already finalized")]
    SessionFinalized,
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<aes_gcm::aead::Error> for CryptoError {
    fn from(err: aes_gcm::aead::Error) -> Self {
        CryptoError::AuthenticationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for CryptoError {
    fn from(err: serde_json::Error) -> Self {
        CryptoError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
