use pki_sig::config::{current_strictness, get_config, init_pki_config, is_initialized, DerStrictness};
use pki_sig::signature::{der_signature_to_raw, SignatureError};

/// Runs in its own test binary so the process-wide config starts uninitialized.
#[test]
fn test_init_config_switches_foreign_api_to_lenient() {
    // The INTEGER tags are wrong; only lenient parsing accepts this.
    let der = vec![0x30, 0x06, 0x04, 0x01, 0x01, 0x04, 0x01, 0x02];

    assert!(!is_initialized());
    assert_eq!(current_strictness(), DerStrictness::Strict);
    assert!(matches!(
        der_signature_to_raw(Some(der.clone())).unwrap_err(),
        SignatureError::MalformedEncoding { .. }
    ));

    init_pki_config(DerStrictness::Lenient);
    // Only the first initialization takes effect.
    init_pki_config(DerStrictness::Strict);

    assert!(is_initialized());
    assert_eq!(current_strictness(), DerStrictness::Lenient);
    assert_eq!(
        get_config().map(pki_sig::config::PkiConfig::strictness),
        Some(DerStrictness::Lenient)
    );

    let raw = der_signature_to_raw(Some(der)).unwrap();
    assert_eq!(raw[31], 0x01);
    assert_eq!(raw[63], 0x02);
}
