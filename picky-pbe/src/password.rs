use crate::Result;
use picky_asn1::restricted_string::BmpString;
use std::str::FromStr as _;
use zeroize::Zeroizing;

/// Password bytes as consumed by the PKCS#12 KDF.
///
/// The buffer is zeroed when the value is dropped. Key derivation takes the password by value, so
/// handing it to [`crate::encrypt`] or [`crate::decrypt`] is a destructive read: it's scrubbed as soon as
/// key and IV are derived, on every exit path.
pub struct Pkcs12Password(Zeroizing<Vec<u8>>);

impl Pkcs12Password {
    /// PKCS#12 password representation: BMPString (big-endian UCS-2) with a two bytes null
    /// terminator. The empty password is encoded as `[0, 0]`.
    pub fn from_bmp_str(password: &str) -> Result<Self> {
        let mut bmp = Zeroizing::new(BmpString::from_str(password)?.into_bytes());
        bmp.extend_from_slice(&[0, 0]);

        Ok(Self(bmp))
    }

    /// Takes already encoded password bytes as-is.
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl std::fmt::Debug for Pkcs12Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pkcs12Password").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bmp_encoding_with_terminator() {
        let password = Pkcs12Password::from_bmp_str("abc").unwrap();
        assert_eq!(password.as_bytes(), b"\0a\0b\0c\0\0");
    }

    #[test]
    fn empty_password_is_terminator_only() {
        let password = Pkcs12Password::from_bmp_str("").unwrap();
        assert_eq!(password.as_bytes(), &[0, 0]);
    }

    #[test]
    fn non_ascii_password() {
        let password = Pkcs12Password::from_bmp_str("pé").unwrap();
        assert_eq!(password.as_bytes(), &[0x00, 0x70, 0x00, 0xe9, 0x00, 0x00]);
    }

    #[test]
    fn debug_does_not_leak() {
        let password = Pkcs12Password::from_raw(b"hunter2".to_vec());
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
