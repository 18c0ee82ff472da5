use crate::scheme::PbeScheme;
use crate::{PbeError, Result};
use oid::ObjectIdentifier;
use picky_asn1::wrapper::{ObjectIdentifierAsn1, OctetStringAsn1};
use picky_asn1_der::Asn1RawDer;
use serde::{Deserialize, Serialize};

/// ```not_rust
/// pkcs-12PbeParams ::= SEQUENCE {
///     salt        OCTET STRING,
///     iterations  INTEGER
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct PbeParamsAsn1 {
    salt: OctetStringAsn1,
    iterations: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct AlgorithmIdentifierAsn1 {
    algorithm: ObjectIdentifierAsn1,
    parameters: Asn1RawDer,
}

/// Decoded PBE parameters (salt and KDF iteration count)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbeParams {
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl PbeParams {
    pub fn new(salt: Vec<u8>, iterations: u32) -> Self {
        Self { salt, iterations }
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let params: PbeParamsAsn1 = picky_asn1_der::from_bytes(der).map_err(|source| PbeError::ParameterDecode {
            element: "pkcs-12PbeParams",
            source,
        })?;

        if params.iterations == 0 {
            return Err(PbeError::InvalidParameters {
                context: "iteration count must be positive".to_owned(),
            });
        }

        Ok(Self {
            salt: params.salt.0,
            iterations: params.iterations,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let params = PbeParamsAsn1 {
            salt: OctetStringAsn1(self.salt.clone()),
            iterations: self.iterations,
        };

        picky_asn1_der::to_vec(&params).map_err(|source| PbeError::ParameterEncode {
            element: "pkcs-12PbeParams",
            source,
        })
    }
}

/// Algorithm OID along with its still encoded parameters, as found in an
/// `EncryptedPrivateKeyInfo` or `EncryptedData` structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbeAlgorithmIdentifier {
    algorithm: ObjectIdentifier,
    parameters: Vec<u8>,
}

impl PbeAlgorithmIdentifier {
    /// Builds the identifier for `scheme` with DER-encoded PBE parameters.
    pub fn new(scheme: PbeScheme, salt: Vec<u8>, iterations: u32) -> Result<Self> {
        let parameters = PbeParams::new(salt, iterations).to_der()?;

        Ok(Self {
            algorithm: scheme.oid(),
            parameters,
        })
    }

    /// Wraps an arbitrary OID and raw parameter bytes. Nothing is validated until the identifier
    /// is used for decryption.
    pub fn from_raw_parts(algorithm: ObjectIdentifier, parameters: Vec<u8>) -> Self {
        Self { algorithm, parameters }
    }

    /// Decodes a DER `AlgorithmIdentifier` structure.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let identifier: AlgorithmIdentifierAsn1 =
            picky_asn1_der::from_bytes(der).map_err(|source| PbeError::ParameterDecode {
                element: "AlgorithmIdentifier",
                source,
            })?;

        Ok(Self {
            algorithm: identifier.algorithm.0,
            parameters: identifier.parameters.0,
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let identifier = AlgorithmIdentifierAsn1 {
            algorithm: self.algorithm.clone().into(),
            parameters: Asn1RawDer(self.parameters.clone()),
        };

        picky_asn1_der::to_vec(&identifier).map_err(|source| PbeError::ParameterEncode {
            element: "AlgorithmIdentifier",
            source,
        })
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    /// Raw DER-encoded parameters
    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }

    pub fn scheme(&self) -> Result<PbeScheme> {
        PbeScheme::resolve(&self.algorithm)
    }

    pub fn pbe_params(&self) -> Result<PbeParams> {
        PbeParams::from_der(&self.parameters)
    }
}

/// Any record carrying an encryption algorithm identifier and the matching ciphertext.
pub trait Decryptable {
    fn algorithm(&self) -> &PbeAlgorithmIdentifier;
    fn data(&self) -> &[u8];
}

/// Ciphertext together with the algorithm used to produce it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub algorithm: PbeAlgorithmIdentifier,
    pub data: Vec<u8>,
}

impl Decryptable for EncryptedData {
    fn algorithm(&self) -> &PbeAlgorithmIdentifier {
        &self.algorithm
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

impl<T: Decryptable + ?Sized> Decryptable for &T {
    fn algorithm(&self) -> &PbeAlgorithmIdentifier {
        (**self).algorithm()
    }

    fn data(&self) -> &[u8] {
        (**self).data()
    }
}
