//! Registry of the supported PBE schemes

use crate::oids;
use crate::{PbeError, Result};
use oid::ObjectIdentifier;
use std::fmt;
use std::str::FromStr;

/// Block cipher backing a PBE scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCipherKind {
    /// Three-key triple DES (DES-EDE3)
    TripleDes,
    /// RC2 with the given effective key length in bits
    Rc2 { effective_key_bits: usize },
}

/// Static description of a PBE scheme: everything needed to derive key material and build
/// the block cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeDescriptor {
    pub name: &'static str,
    pub oid: &'static str,
    /// Derived key size in bytes
    pub key_size: usize,
    /// Derived IV size in bytes
    pub iv_size: usize,
    pub block_size: usize,
    pub cipher: BlockCipherKind,
}

const TRIPLE_DES_CBC: SchemeDescriptor = SchemeDescriptor {
    name: "pbeWithSHAAnd3-KeyTripleDES-CBC",
    oid: oids::PBE_WITH_SHA_AND_3_KEY_TRIPLE_DES_CBC,
    key_size: 24,
    iv_size: 8,
    block_size: 8,
    cipher: BlockCipherKind::TripleDes,
};

const RC2_40_CBC: SchemeDescriptor = SchemeDescriptor {
    name: "pbeWithSHAAnd40BitRC2-CBC",
    oid: oids::PBE_WITH_SHA_AND_40BIT_RC2_CBC,
    key_size: 5,
    iv_size: 8,
    block_size: 8,
    cipher: BlockCipherKind::Rc2 { effective_key_bits: 40 },
};

/// Supported PKCS#12 PBES1 schemes, both driven by the SHA-1 PKCS#12 KDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PbeScheme {
    ShaAnd3KeyTripleDesCbc,
    ShaAnd40BitRc2Cbc,
}

// Lookup is an exact match on the dotted OID string; new schemes are added here.
static REGISTRY: [PbeScheme; 2] = [PbeScheme::ShaAnd3KeyTripleDesCbc, PbeScheme::ShaAnd40BitRc2Cbc];

impl PbeScheme {
    /// Resolves an algorithm OID to its scheme.
    pub fn resolve(oid: &ObjectIdentifier) -> Result<Self> {
        let oid = Into::<String>::into(oid);

        match REGISTRY.iter().find(|scheme| scheme.descriptor().oid == oid) {
            Some(scheme) => {
                log::debug!("resolved PBE scheme {scheme} for {oid}");
                Ok(*scheme)
            }
            None => {
                log::debug!("PBE algorithm {oid} is not registered");
                Err(PbeError::NotSupported { algorithm: oid })
            }
        }
    }

    /// Resolves a canonical scheme name (e.g. `pbeWithSHAAnd3-KeyTripleDES-CBC`).
    pub fn from_name(name: &str) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|scheme| scheme.descriptor().name == name)
            .copied()
            .ok_or_else(|| PbeError::NotSupported {
                algorithm: name.to_owned(),
            })
    }

    pub fn descriptor(self) -> &'static SchemeDescriptor {
        match self {
            Self::ShaAnd3KeyTripleDesCbc => &TRIPLE_DES_CBC,
            Self::ShaAnd40BitRc2Cbc => &RC2_40_CBC,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Self::ShaAnd3KeyTripleDesCbc => oids::pbe_with_sha_and_3_key_triple_des_cbc(),
            Self::ShaAnd40BitRc2Cbc => oids::pbe_with_sha_and_40bit_rc2_cbc(),
        }
    }

    pub fn key_size(self) -> usize {
        self.descriptor().key_size
    }

    pub fn iv_size(self) -> usize {
        self.descriptor().iv_size
    }

    pub fn block_size(self) -> usize {
        self.descriptor().block_size
    }
}

impl fmt::Display for PbeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PbeScheme {
    type Err = PbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
