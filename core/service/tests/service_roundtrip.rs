//! End-to-end behavior of the encryption service.

use std::sync::Arc;

use proptest::prelude::*;

use sealfield_common::{Error, ErrorKind};
use sealfield_crypto::{ContextParams, CryptoContext, Envelope, PasswordCryptoContext};
use sealfield_service::{EncryptionService, NOT_NULL};

const LEGACY_ENVELOPE: &str = r#"{"salt":"IRqsz99no75sx9SCGrzOSEdoMVw=","iv":"bfKvxBhq7X5su9VtvDdOGQ==","value":"pXWsFPzCnmPieitbGfkvofeQE3fj0Kb4mSP7e28+Jc0="}"#;
const NULL_SALT: &str = r#"{"salt":null,"iv":"bfKvxBhq7X5su9VtvDdOGQ==","value":"pXWsFPzCnmPieitbGfkvofeQE3fj0Kb4mSP7e28+Jc0="}"#;
const NULL_IV: &str = r#"{"salt":"IRqsz99no75sx9SCGrzOSEdoMVw=","iv":null,"value":"pXWsFPzCnmPieitbGfkvofeQE3fj0Kb4mSP7e28+Jc0="}"#;
const NULL_VALUE: &str = r#"{"salt":"IRqsz99no75sx9SCGrzOSEdoMVw=","iv":"bfKvxBhq7X5su9VtvDdOGQ==","value":null}"#;
const ALL_NULL: &str = r#"{"salt":null,"iv":null,"value":null}"#;

fn service(read: &str, write: &str) -> EncryptionService {
    let context = PasswordCryptoContext::with_params(read, write, &ContextParams::fast()).unwrap();
    EncryptionService::new(Arc::new(context))
}

fn rejected_fields(service: &EncryptionService, json: &str) -> Vec<String> {
    let envelope = Envelope::from_json(json).unwrap();
    match service.decrypt(&envelope) {
        Err(Error::Validation(violations)) => {
            assert!(violations.iter().all(|v| v.message == NOT_NULL));
            violations.into_iter().map(|v| v.field).collect()
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_validation_lists_missing_fields() {
    let service = service("Password1", "Password1");

    assert_eq!(rejected_fields(&service, NULL_SALT), vec!["salt"]);
    assert_eq!(rejected_fields(&service, NULL_IV), vec!["iv"]);
    assert_eq!(rejected_fields(&service, NULL_VALUE), vec!["value"]);
    assert_eq!(rejected_fields(&service, ALL_NULL), vec!["salt", "iv", "value"]);
    assert_eq!(rejected_fields(&service, "{}"), vec!["salt", "iv", "value"]);
}

#[test]
fn test_reload_legacy_value() {
    let context = PasswordCryptoContext::new("Password1").unwrap();
    let service = EncryptionService::new(Arc::new(context));

    let value: String = service
        .decrypt_value(&Envelope::from_json(LEGACY_ENVELOPE).unwrap())
        .unwrap();
    assert_eq!(value, "Something very secure ...");
}

#[test]
fn test_changed_write_password_cannot_read_back() {
    // Reads with Password1 but writes with Password2.
    let rotating = service("Password1", "Password2");

    let envelope = rotating.encrypt_value("Something very secure ...").unwrap();
    let err = rotating.decrypt_value::<String>(&envelope).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Cryptographic | ErrorKind::Data));
}

#[test]
fn test_second_service_reads_rotated_values() {
    let rotating = service("Password1", "Password2");
    let current = service("Password2", "Password2");

    let envelope = rotating.encrypt_value("Something very secure ...").unwrap();
    let json = envelope.to_json().unwrap();

    let value: String = current.decrypt_value(&Envelope::from_json(&json).unwrap()).unwrap();
    assert_eq!(value, "Something very secure ...");
}

#[test]
fn test_salt_and_iv_stable_across_calls() {
    let service = service("Password1", "Password1");

    let first = service.encrypt(b"first payload").unwrap();
    let second = service.encrypt(b"second payload").unwrap();
    let repeat = service.encrypt(b"first payload").unwrap();

    assert_eq!(first.salt, second.salt);
    assert_eq!(first.iv, second.iv);
    assert_ne!(first.ciphertext, second.ciphertext);
    assert_eq!(first.ciphertext, repeat.ciphertext);
}

#[test]
fn test_independent_services_differ() {
    let a = service("Password1", "Password1");
    let b = service("Password1", "Password1");

    assert_ne!(a.context().salt(), b.context().salt());
    assert_ne!(a.context().iv(), b.context().iv());
}

#[test]
fn test_wire_roundtrip_through_json() {
    let service = service("Password1", "Password1");

    let json = service.encrypt_text("über secret", "UTF-16").unwrap().to_json().unwrap();
    let envelope = Envelope::from_json(&json).unwrap();
    assert_eq!(service.decrypt_text(&envelope, "UTF-16").unwrap(), "über secret");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_service_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
        let service = service("Password1", "Password1");
        let envelope = service.encrypt(&payload).unwrap();
        prop_assert_eq!(service.decrypt(&envelope).unwrap(), payload);
    }
}
