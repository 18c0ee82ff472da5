//! Key/IV derivation and CBC mode construction for the registered PBE schemes

use crate::kdf::{pbkdf1, Pbkdf1Usage};
use crate::params::PbeAlgorithmIdentifier;
use crate::password::Pkcs12Password;
use crate::scheme::{BlockCipherKind, PbeScheme};
use crate::{PbeError, Result};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, BlockSizeUser, InnerIvInit, KeyInit};
use des::TdesEde3;
use rc2::Rc2;
use zeroize::Zeroizing;

type TdesCbcEncryptor = cbc::Encryptor<TdesEde3>;
type TdesCbcDecryptor = cbc::Decryptor<TdesEde3>;
type Rc2CbcEncryptor = cbc::Encryptor<Rc2>;
type Rc2CbcDecryptor = cbc::Decryptor<Rc2>;

/// CBC encryption engine for one of the registered schemes.
pub enum CbcEncryptor {
    TripleDes(TdesCbcEncryptor),
    Rc2(Rc2CbcEncryptor),
}

impl CbcEncryptor {
    pub fn block_size(&self) -> usize {
        match self {
            Self::TripleDes(_) => TdesCbcEncryptor::block_size(),
            Self::Rc2(_) => Rc2CbcEncryptor::block_size(),
        }
    }

    /// Encrypts `buf` in place. `buf` length must be a multiple of the block size.
    pub fn encrypt_blocks(&mut self, buf: &mut [u8]) -> Result<()> {
        check_block_aligned(buf.len(), self.block_size())?;

        match self {
            Self::TripleDes(mode) => encrypt_blocks_with(mode, buf),
            Self::Rc2(mode) => encrypt_blocks_with(mode, buf),
        }

        Ok(())
    }

    /// Appends PKCS#5 padding to `message` and encrypts it, consuming the engine.
    ///
    /// At least one padding byte is always added, so a block-aligned message grows by a full block.
    pub fn encrypt_padded(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::TripleDes(mode) => mode.encrypt_padded_vec_mut::<Pkcs7>(message),
            Self::Rc2(mode) => mode.encrypt_padded_vec_mut::<Pkcs7>(message),
        }
    }
}

/// CBC decryption engine for one of the registered schemes.
pub enum CbcDecryptor {
    TripleDes(TdesCbcDecryptor),
    Rc2(Rc2CbcDecryptor),
}

impl CbcDecryptor {
    pub fn block_size(&self) -> usize {
        match self {
            Self::TripleDes(_) => TdesCbcDecryptor::block_size(),
            Self::Rc2(_) => Rc2CbcDecryptor::block_size(),
        }
    }

    /// Decrypts `buf` in place. `buf` length must be a multiple of the block size.
    pub fn decrypt_blocks(&mut self, buf: &mut [u8]) -> Result<()> {
        check_block_aligned(buf.len(), self.block_size())?;

        match self {
            Self::TripleDes(mode) => decrypt_blocks_with(mode, buf),
            Self::Rc2(mode) => decrypt_blocks_with(mode, buf),
        }

        Ok(())
    }
}

/// Builds the CBC encryption engine for `scheme`.
///
/// `password` is consumed and zeroed as soon as key and IV are derived.
pub fn build_encrypt_mode(
    scheme: PbeScheme,
    password: Pkcs12Password,
    salt: &[u8],
    iterations: u32,
) -> Result<CbcEncryptor> {
    let KeyMaterial { key, iv } = derive_key_material(scheme, password, salt, iterations)?;

    let mode = match scheme.descriptor().cipher {
        BlockCipherKind::TripleDes => {
            let cipher = construct_triple_des(&key)?;
            drop(key);
            CbcEncryptor::TripleDes(wrap_cbc(cipher, &iv, "3DES")?)
        }
        BlockCipherKind::Rc2 { effective_key_bits } => {
            let cipher = construct_rc2(&key, effective_key_bits)?;
            drop(key);
            CbcEncryptor::Rc2(wrap_cbc(cipher, &iv, "RC2")?)
        }
    };

    Ok(mode)
}

/// Builds the CBC decryption engine described by `algorithm`.
///
/// `password` is consumed and zeroed as soon as key and IV are derived.
pub fn build_decrypt_mode(algorithm: &PbeAlgorithmIdentifier, password: Pkcs12Password) -> Result<CbcDecryptor> {
    let scheme = algorithm.scheme()?;
    build_decrypt_mode_for_scheme(scheme, algorithm, password)
}

/// Same as [`build_decrypt_mode`] when the algorithm OID was already resolved to `scheme`.
pub(crate) fn build_decrypt_mode_for_scheme(
    scheme: PbeScheme,
    algorithm: &PbeAlgorithmIdentifier,
    password: Pkcs12Password,
) -> Result<CbcDecryptor> {
    let params = algorithm.pbe_params()?;

    let KeyMaterial { key, iv } = derive_key_material(scheme, password, &params.salt, params.iterations)?;

    let mode = match scheme.descriptor().cipher {
        BlockCipherKind::TripleDes => {
            let cipher = construct_triple_des(&key)?;
            drop(key);
            CbcDecryptor::TripleDes(wrap_cbc(cipher, &iv, "3DES")?)
        }
        BlockCipherKind::Rc2 { effective_key_bits } => {
            let cipher = construct_rc2(&key, effective_key_bits)?;
            drop(key);
            CbcDecryptor::Rc2(wrap_cbc(cipher, &iv, "RC2")?)
        }
    };

    Ok(mode)
}

struct KeyMaterial {
    key: Zeroizing<Vec<u8>>,
    iv: Zeroizing<Vec<u8>>,
}

fn derive_key_material(
    scheme: PbeScheme,
    password: Pkcs12Password,
    salt: &[u8],
    iterations: u32,
) -> Result<KeyMaterial> {
    let descriptor = scheme.descriptor();

    log::debug!(
        "deriving {} key material ({} iterations, {} bytes of salt)",
        descriptor.name,
        iterations,
        salt.len()
    );

    let iterations = iterations as usize;
    let key = pbkdf1::<sha1::Sha1>(password.as_bytes(), salt, iterations, Pbkdf1Usage::Key, descriptor.key_size)?;
    let iv = pbkdf1::<sha1::Sha1>(password.as_bytes(), salt, iterations, Pbkdf1Usage::Iv, descriptor.iv_size)?;

    // Last use of the password
    drop(password);

    if key.len() != descriptor.key_size || iv.len() != descriptor.iv_size {
        return Err(PbeError::KeyDerivation {
            context: format!(
                "{} requires a {} bytes key and a {} bytes IV, got {} and {}",
                descriptor.name,
                descriptor.key_size,
                descriptor.iv_size,
                key.len(),
                iv.len()
            ),
        });
    }

    Ok(KeyMaterial { key, iv })
}

fn construct_triple_des(key: &[u8]) -> Result<TdesEde3> {
    TdesEde3::new_from_slice(key).map_err(|_| PbeError::CipherConstruction {
        cipher: "3DES",
        context: format!("invalid key length {}", key.len()),
    })
}

fn construct_rc2(key: &[u8], effective_key_bits: usize) -> Result<Rc2> {
    if key.is_empty() || key.len() > 128 {
        return Err(PbeError::CipherConstruction {
            cipher: "RC2",
            context: format!("invalid key length {}", key.len()),
        });
    }

    if effective_key_bits == 0 || effective_key_bits > 1024 {
        return Err(PbeError::CipherConstruction {
            cipher: "RC2",
            context: format!("invalid effective key length {effective_key_bits}"),
        });
    }

    Ok(Rc2::new_with_eff_key_len(key, effective_key_bits))
}

fn wrap_cbc<M: InnerIvInit>(cipher: M::Inner, iv: &[u8], cipher_name: &'static str) -> Result<M> {
    M::inner_iv_slice_init(cipher, iv).map_err(|_| PbeError::CipherConstruction {
        cipher: cipher_name,
        context: format!("invalid IV length {}", iv.len()),
    })
}

fn check_block_aligned(len: usize, block_size: usize) -> Result<()> {
    if len == 0 || len % block_size != 0 {
        return Err(PbeError::InvalidCiphertextLength { len, block_size });
    }

    Ok(())
}

fn encrypt_blocks_with<M: BlockEncryptMut>(mode: &mut M, buf: &mut [u8]) {
    for block in buf.chunks_exact_mut(M::block_size()) {
        mode.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

fn decrypt_blocks_with<M: BlockDecryptMut>(mode: &mut M, buf: &mut [u8]) {
    for block in buf.chunks_exact_mut(M::block_size()) {
        mode.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SALT: &[u8] = &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];

    fn password() -> Pkcs12Password {
        Pkcs12Password::from_bmp_str("sesame").unwrap()
    }

    #[rstest]
    #[case(PbeScheme::ShaAnd3KeyTripleDesCbc)]
    #[case(PbeScheme::ShaAnd40BitRc2Cbc)]
    fn encrypt_and_decrypt_modes_agree(#[case] scheme: PbeScheme) {
        let algorithm = PbeAlgorithmIdentifier::new(scheme, SALT.to_vec(), 100).unwrap();

        let mut encryptor = build_encrypt_mode(scheme, password(), SALT, 100).unwrap();
        let mut decryptor = build_decrypt_mode(&algorithm, password()).unwrap();
        assert_eq!(encryptor.block_size(), 8);
        assert_eq!(decryptor.block_size(), 8);

        let plaintext: Vec<u8> = (0..32).collect();
        let mut buf = plaintext.clone();
        encryptor.encrypt_blocks(&mut buf).unwrap();
        assert_ne!(buf, plaintext);

        decryptor.decrypt_blocks(&mut buf).unwrap();
        assert_eq!(buf, plaintext);
    }

    #[rstest]
    #[case(PbeScheme::ShaAnd3KeyTripleDesCbc)]
    #[case(PbeScheme::ShaAnd40BitRc2Cbc)]
    fn padded_encryption_matches_manual_padding(#[case] scheme: PbeScheme) {
        let message = b"thirteen byte";
        let encrypted = build_encrypt_mode(scheme, password(), SALT, 10)
            .unwrap()
            .encrypt_padded(message);

        let mut manually_padded = message.to_vec();
        manually_padded.extend_from_slice(&[0x03; 3]);
        build_encrypt_mode(scheme, password(), SALT, 10)
            .unwrap()
            .encrypt_blocks(&mut manually_padded)
            .unwrap();

        assert_eq!(encrypted, manually_padded);
    }

    fn assert_zeroize_on_drop<T: zeroize::ZeroizeOnDrop>() {}

    #[test]
    fn cbc_engines_scrub_key_schedule_on_drop() {
        assert_zeroize_on_drop::<TdesEde3>();
        assert_zeroize_on_drop::<Rc2>();
        assert_zeroize_on_drop::<TdesCbcEncryptor>();
        assert_zeroize_on_drop::<TdesCbcDecryptor>();
        assert_zeroize_on_drop::<Rc2CbcEncryptor>();
        assert_zeroize_on_drop::<Rc2CbcDecryptor>();
    }

    #[test]
    fn cbc_chains_blocks() {
        let mut encryptor = build_encrypt_mode(PbeScheme::ShaAnd3KeyTripleDesCbc, password(), SALT, 1).unwrap();
        let mut buf = [0x42u8; 16];
        encryptor.encrypt_blocks(&mut buf).unwrap();
        assert_ne!(&buf[..8], &buf[8..]);
    }

    #[test]
    fn different_schemes_produce_different_ciphertexts() {
        let mut tdes = build_encrypt_mode(PbeScheme::ShaAnd3KeyTripleDesCbc, password(), SALT, 1).unwrap();
        let mut rc2 = build_encrypt_mode(PbeScheme::ShaAnd40BitRc2Cbc, password(), SALT, 1).unwrap();

        let mut tdes_buf = [0u8; 8];
        let mut rc2_buf = [0u8; 8];
        tdes.encrypt_blocks(&mut tdes_buf).unwrap();
        rc2.encrypt_blocks(&mut rc2_buf).unwrap();
        assert_ne!(tdes_buf, rc2_buf);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(12)]
    fn misaligned_buffer_is_rejected(#[case] len: usize) {
        let mut encryptor = build_encrypt_mode(PbeScheme::ShaAnd40BitRc2Cbc, password(), SALT, 1).unwrap();
        let mut buf = vec![0u8; len];
        let err = encryptor.encrypt_blocks(&mut buf).unwrap_err();
        assert!(matches!(err, PbeError::InvalidCiphertextLength { block_size: 8, .. }));
    }

    #[test]
    fn unregistered_algorithm_is_not_supported() {
        let oid = oid::ObjectIdentifier::try_from("1.2.840.113549.1.12.1.5").unwrap();
        let params = crate::params::PbeParams::new(SALT.to_vec(), 1).to_der().unwrap();
        let algorithm = PbeAlgorithmIdentifier::from_raw_parts(oid, params);

        match build_decrypt_mode(&algorithm, password()) {
            Err(PbeError::NotSupported { algorithm }) => assert_eq!(algorithm, "1.2.840.113549.1.12.1.5"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("unregistered algorithm accepted"),
        }
    }

    #[test]
    fn malformed_parameters_are_rejected() {
        let algorithm =
            PbeAlgorithmIdentifier::from_raw_parts(PbeScheme::ShaAnd3KeyTripleDesCbc.oid(), vec![0x30, 0x03, 0x04]);
        assert!(matches!(
            build_decrypt_mode(&algorithm, password()),
            Err(PbeError::ParameterDecode { .. })
        ));
    }

    #[test]
    fn zero_iterations_is_a_derivation_error() {
        assert!(matches!(
            build_encrypt_mode(PbeScheme::ShaAnd3KeyTripleDesCbc, password(), SALT, 0),
            Err(PbeError::KeyDerivation { .. })
        ));
    }

    #[test]
    fn cipher_constructors_reject_bad_keys() {
        assert!(matches!(
            construct_triple_des(&[0u8; 5]),
            Err(PbeError::CipherConstruction { cipher: "3DES", .. })
        ));
        assert!(matches!(
            construct_rc2(&[], 40),
            Err(PbeError::CipherConstruction { cipher: "RC2", .. })
        ));
        assert!(matches!(
            wrap_cbc::<TdesCbcEncryptor>(construct_triple_des(&[7u8; 24]).unwrap(), &[0u8; 4], "3DES"),
            Err(PbeError::CipherConstruction { .. })
        ));
    }
}
