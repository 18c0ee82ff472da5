//! OIDs of the PKCS#12 password-based encryption schemes

macro_rules! define_oid {
    ($uppercase:ident => $lowercase:ident => $str_value:literal) => {
        pub const $uppercase: &'static str = $str_value;

        pub fn $lowercase() -> oid::ObjectIdentifier {
            use std::sync::OnceLock;

            static OID: OnceLock<oid::ObjectIdentifier> = OnceLock::new();
            OID.get_or_init(|| {
                oid::ObjectIdentifier::try_from($uppercase).expect("statically defined OID is well formed")
            })
            .clone()
        }
    };
    ( $( $uppercase:ident => $lowercase:ident => $str_value:literal, )+ ) => {
        $( define_oid! { $uppercase => $lowercase => $str_value } )+
    };
}

define_oid! {
    // PKCS#12 PBE IDs (RFC 7292 appendix C)
    PBE_WITH_SHA_AND_3_KEY_TRIPLE_DES_CBC => pbe_with_sha_and_3_key_triple_des_cbc => "1.2.840.113549.1.12.1.3",
    PBE_WITH_SHA_AND_40BIT_RC2_CBC => pbe_with_sha_and_40bit_rc2_cbc => "1.2.840.113549.1.12.1.6",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oid_functions_match_constants() {
        assert_eq!(
            Into::<String>::into(&pbe_with_sha_and_3_key_triple_des_cbc()),
            PBE_WITH_SHA_AND_3_KEY_TRIPLE_DES_CBC
        );
        assert_eq!(
            Into::<String>::into(&pbe_with_sha_and_40bit_rc2_cbc()),
            PBE_WITH_SHA_AND_40BIT_RC2_CBC
        );
    }
}
