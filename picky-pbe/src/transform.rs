//! PKCS#5 padded encryption and decryption entry points

use crate::mode::{build_decrypt_mode_for_scheme, build_encrypt_mode};
use crate::params::Decryptable;
use crate::password::Pkcs12Password;
use crate::scheme::PbeScheme;
use crate::{PbeError, Result};
use subtle::{Choice, ConstantTimeEq, ConstantTimeGreater, ConstantTimeLess};
use zeroize::Zeroize;

/// Encrypts `message` with `scheme`, appending PKCS#5 padding.
///
/// At least one padding byte is always added, so a block-aligned message grows by a full block.
pub fn encrypt(
    scheme: PbeScheme,
    message: &[u8],
    salt: &[u8],
    password: Pkcs12Password,
    iterations: u32,
) -> Result<Vec<u8>> {
    let cbc = build_encrypt_mode(scheme, password, salt, iterations)?;
    Ok(cbc.encrypt_padded(message))
}

/// Decrypts `info` and strips its PKCS#5 padding.
///
/// Any padding inconsistency is reported as [`PbeError::Decryption`], whatever the cause.
pub fn decrypt<D: Decryptable + ?Sized>(info: &D, password: Pkcs12Password) -> Result<Vec<u8>> {
    let algorithm = info.algorithm();
    let encrypted = info.data();

    // Reject before spending any time in the KDF
    let scheme = algorithm.scheme()?;
    let block_size = scheme.block_size();
    if encrypted.is_empty() || encrypted.len() % block_size != 0 {
        log::debug!("rejecting ciphertext of invalid length {}", encrypted.len());
        return Err(PbeError::InvalidCiphertextLength {
            len: encrypted.len(),
            block_size,
        });
    }

    let mut cbc = build_decrypt_mode_for_scheme(scheme, algorithm, password)?;

    let mut decrypted = encrypted.to_vec();
    cbc.decrypt_blocks(&mut decrypted)?;

    match unpadded_len(&decrypted, cbc.block_size()) {
        Some(len) => {
            decrypted.truncate(len);
            Ok(decrypted)
        }
        None => {
            decrypted.zeroize();
            log::debug!("PBE decryption failed");
            Err(PbeError::Decryption)
        }
    }
}

/// Returns the plaintext length once padding is removed, or `None` if padding is invalid.
///
/// The last byte `n` must satisfy `1 <= n <= block_size` and the last `n` bytes must all equal `n`.
/// The whole final block is inspected whatever the value of `n`.
fn unpadded_len(decrypted: &[u8], block_size: usize) -> Option<usize> {
    if decrypted.len() < block_size || block_size == 0 || block_size > usize::from(u8::MAX) {
        return None;
    }

    let last_block = &decrypted[decrypted.len() - block_size..];
    let pad_count = last_block[block_size - 1];

    let mut valid: Choice = !pad_count.ct_eq(&0);
    valid &= !pad_count.ct_gt(&(block_size as u8));

    for (distance, byte) in last_block.iter().rev().enumerate() {
        let in_padding = (distance as u8).ct_lt(&pad_count);
        valid &= !in_padding | byte.ct_eq(&pad_count);
    }

    if bool::from(valid) {
        Some(decrypted.len() - usize::from(pad_count))
    } else {
        None
    }
}
