//! [![Crates.io](https://img.shields.io/crates/v/picky-pbe.svg)](https://crates.io/crates/picky-pbe)
//! [![docs.rs](https://docs.rs/picky-pbe/badge.svg)](https://docs.rs/picky-pbe)
//! ![Crates.io](https://img.shields.io/crates/l/picky-pbe)
//! # picky-pbe
//!
//! Legacy password-based encryption for PKCS#12 containers, as described in
//! [RFC 2898 section 6.1.2](https://datatracker.ietf.org/doc/html/rfc2898#section-6.1.2) combined with
//! the key derivation of [RFC 7292 appendix B](https://datatracker.ietf.org/doc/html/rfc7292#appendix-B).
//!
//! Two schemes are supported:
//! - `pbeWithSHAAnd3-KeyTripleDES-CBC` (`1.2.840.113549.1.12.1.3`)
//! - `pbeWithSHAAnd40BitRC2-CBC` (`1.2.840.113549.1.12.1.6`)
//!
//! These schemes are only provided for interoperability with existing PFX files. CBC with PKCS#5
//! padding is malleable and has no integrity protection of its own.

pub mod context;
pub mod error;
pub mod kdf;
pub mod mode;
pub mod oids;
pub mod params;
pub mod password;
pub mod scheme;
pub mod transform;

pub use context::PbeContext;
pub use error::{PbeError, Result};
pub use params::{Decryptable, EncryptedData, PbeAlgorithmIdentifier, PbeParams};
pub use password::Pkcs12Password;
pub use scheme::{BlockCipherKind, PbeScheme, SchemeDescriptor};
pub use transform::{decrypt, encrypt};
