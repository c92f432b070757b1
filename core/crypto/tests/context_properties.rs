//! Behavioral properties of crypto contexts across instances.

use proptest::prelude::*;

use sealfield_common::ErrorKind;
use sealfield_crypto::{
    BaseCryptoContext, ContextParams, CryptoContext, Envelope, PasswordCryptoContext,
};

/// Written by an earlier deployment with password `Password1` and the
/// default parameters.
const LEGACY_ENVELOPE: &str = r#"{"salt":"IRqsz99no75sx9SCGrzOSEdoMVw=","iv":"bfKvxBhq7X5su9VtvDdOGQ==","value":"pXWsFPzCnmPieitbGfkvofeQE3fj0Kb4mSP7e28+Jc0="}"#;

fn seal(context: &dyn CryptoContext, plaintext: &[u8]) -> Envelope {
    Envelope::new(
        context.salt().to_vec(),
        context.iv().to_vec(),
        context.encrypt(plaintext).unwrap(),
    )
}

#[test]
fn test_reads_legacy_envelope() {
    let context = PasswordCryptoContext::new("Password1").unwrap();
    let envelope = Envelope::from_json(LEGACY_ENVELOPE).unwrap();

    let plaintext = context.decrypt(&envelope).unwrap();
    assert_eq!(plaintext, b"\"Something very secure ...\"");
}

#[test]
fn test_legacy_envelope_wrong_password_fails() {
    let context = PasswordCryptoContext::with_passwords("Password2", "Password2").unwrap();
    let envelope = Envelope::from_json(LEGACY_ENVELOPE).unwrap();

    let err = context.decrypt(&envelope).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cryptographic);
}

#[test]
fn test_cross_context_roundtrip() {
    let params = ContextParams::fast();
    let a = PasswordCryptoContext::with_params("Password1", "XPassword", &params).unwrap();
    let b = PasswordCryptoContext::with_params("XPassword", "Password9", &params).unwrap();

    assert_ne!(a.salt(), b.salt());
    assert_ne!(a.iv(), b.iv());

    let envelope = seal(&a, b"carried across a password change");
    assert_eq!(b.decrypt(&envelope).unwrap(), b"carried across a password change");
}

#[test]
fn test_wrong_password_never_yields_plaintext() {
    let params = ContextParams::fast();
    let a = PasswordCryptoContext::with_params("XPassword", "XPassword", &params).unwrap();
    let b = PasswordCryptoContext::with_params("YPassword", "YPassword", &params).unwrap();

    let envelope = seal(&a, b"secret");
    match b.decrypt(&envelope) {
        Ok(plaintext) => assert_ne!(plaintext, b"secret"),
        Err(e) => assert_eq!(e.kind(), ErrorKind::Cryptographic),
    }
}

#[test]
fn test_iteration_floor_boundaries() {
    let with_iterations = |iterations| ContextParams {
        iterations,
        ..ContextParams::standard()
    };

    let err = BaseCryptoContext::new("password1", "password1", &with_iterations(2000)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(BaseCryptoContext::new("password1", "password1", &with_iterations(4999)).is_err());
    assert!(BaseCryptoContext::new("password1", "password1", &with_iterations(5000)).is_ok());
    assert!(BaseCryptoContext::new("password1", "password1", &with_iterations(8000)).is_ok());
}

#[test]
fn test_legacy_params_roundtrip() {
    let context = BaseCryptoContext::new("password1", "password1", &ContextParams {
        iterations: 8000,
        ..ContextParams::legacy()
    })
    .unwrap();

    let envelope = seal(&context, b"sha256 derived");
    assert_eq!(context.decrypt(&envelope).unwrap(), b"sha256 derived");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let context = PasswordCryptoContext::with_params("password1", "password1", &ContextParams::fast()).unwrap();
        let envelope = seal(&context, &payload);
        prop_assert_eq!(context.decrypt(&envelope).unwrap(), payload);
    }
}
