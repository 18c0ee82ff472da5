use crate::{PbeError, Result};
use digest::core_api::BlockSizeUser;
use digest::{Digest, FixedOutputReset};
use zeroize::Zeroizing;

/// Diversifier ID selecting which kind of material the KDF produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pbkdf1Usage {
    Key,
    Iv,
    Mac,
}

impl Pbkdf1Usage {
    fn to_id_byte(self) -> u8 {
        match self {
            Pbkdf1Usage::Key => 1,
            Pbkdf1Usage::Iv => 2,
            Pbkdf1Usage::Mac => 3,
        }
    }
}

/// PBKDF1 variant for PKCS#12 as defined in [RFC 7292](https://datatracker.ietf.org/doc/html/rfc7292#appendix-B.2)
///
/// `u` is the digest output size and `v` the digest block size of `D`.
pub fn pbkdf1<D>(
    password: &[u8],
    salt: &[u8],
    kdf_iterations: usize,
    usage: Pbkdf1Usage,
    output_size: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    D: Digest + FixedOutputReset + BlockSizeUser,
{
    if kdf_iterations == 0 {
        return Err(PbeError::KeyDerivation {
            context: "iteration count must be positive".to_owned(),
        });
    }

    let u = <D as Digest>::output_size();
    let v = <D as BlockSizeUser>::block_size();

    // Construct "diversifier" string
    let d = vec![usage.to_id_byte(); v];

    let expanded_length = |len: usize| v * len.div_ceil(v);

    // Expand salt and password length to multiple of V
    let expanded_salt = salt.iter().cycle().take(expanded_length(salt.len()));
    let expanded_password = password.iter().cycle().take(expanded_length(password.len()));

    // I = S || P
    let mut key_material: Zeroizing<Vec<u8>> =
        Zeroizing::new(expanded_salt.chain(expanded_password).copied().collect());

    let c = output_size.div_ceil(u);

    let mut output = Zeroizing::new(Vec::with_capacity(c * u));

    // Temporary buffer for key blocks produced by the hash rounds
    let mut key_block = Zeroizing::new(Vec::with_capacity(u));

    let mut b = Zeroizing::new(Vec::with_capacity(v));

    for _ in 1..c {
        hash_round::<D>(&d, &key_material, kdf_iterations, &mut key_block);
        output.extend_from_slice(&key_block);

        // Create concatenated string B of length V
        b.clear();
        b.extend(key_block.iter().cycle().take(v).copied());

        // Treating I as a concatenation I_0, I_1, ..., I_(k-1) of v-bit blocks, modify I by
        // setting I_j=(I_j+B+1) mod 2^v for each j.
        let b_iter = b.iter().rev().cycle().take(key_material.len());
        let i_b_iter = key_material.iter_mut().rev().zip(b_iter);
        let mut carry = 1u8;
        for (idx, (ij, bj)) in i_b_iter.enumerate() {
            if idx % v == 0 {
                carry = 1;
            }
            let (sum, overflow1) = ij.overflowing_add(*bj);
            let (sum, overflow2) = sum.overflowing_add(carry);
            carry = (overflow1 || overflow2) as u8;
            *ij = sum;
        }
    }

    hash_round::<D>(&d, &key_material, kdf_iterations, &mut key_block);
    output.extend_from_slice(&key_block);

    output.truncate(output_size);
    Ok(output)
}

fn hash_round<D: Digest + FixedOutputReset>(d: &[u8], i: &[u8], iterations: usize, output_buffer: &mut Vec<u8>) {
    let mut hasher = D::new();
    output_buffer.clear();
    output_buffer.extend_from_slice(d);
    output_buffer.extend_from_slice(i);

    for _ in 0..iterations {
        Digest::update(&mut hasher, &output_buffer);
        let hash = hasher.finalize_reset();
        output_buffer.clear();
        output_buffer.extend_from_slice(&hash[..]);
    }
}
