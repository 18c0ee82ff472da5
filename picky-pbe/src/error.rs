use picky_asn1::restricted_string::CharSetError;
use picky_asn1_der::Asn1DerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PbeError>;

#[derive(Debug, Error)]
pub enum PbeError {
    /// Algorithm identifier (or scheme name) is not one of the registered PBE schemes
    #[error("algorithm {algorithm} is not supported")]
    NotSupported { algorithm: String },

    #[error("(asn1) couldn't deserialize {element}: {source}")]
    ParameterDecode {
        element: &'static str,
        #[source]
        source: Asn1DerError,
    },

    #[error("(asn1) couldn't serialize {element}: {source}")]
    ParameterEncode {
        element: &'static str,
        #[source]
        source: Asn1DerError,
    },

    #[error("invalid PBE parameters: {context}")]
    InvalidParameters { context: String },

    #[error("key derivation failed: {context}")]
    KeyDerivation { context: String },

    #[error("{cipher} initialization failed: {context}")]
    CipherConstruction { cipher: &'static str, context: String },

    #[error("invalid ciphertext length {len} (must be a non-zero multiple of {block_size})")]
    InvalidCiphertextLength { len: usize, block_size: usize },

    #[error("password can't be represented as a BMPString: {source}")]
    InvalidPassword {
        #[source]
        source: CharSetError,
    },

    /// Generic decryption failure.
    ///
    /// Intentionally carries no detail: wrong password, bad padding length and inconsistent
    /// padding bytes all produce this same value.
    #[error("decryption error")]
    Decryption,
}

impl From<CharSetError> for PbeError {
    fn from(source: CharSetError) -> Self {
        Self::InvalidPassword { source }
    }
}
