mod common;

use common::{sample_signature, FakeEngine};
use liquid_ct::engine::{EngineFailure, Secp256k1Engine};
use liquid_ct::{ByteData, CtError, CtErrorCode, SigHashType, SignatureHashType, SignatureParameter};
use rand::RngCore;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

fn random_signature() -> (ByteData, PublicKey) {
    let secp = Secp256k1::new();
    let mut rng = rand::thread_rng();

    let mut key_bytes = [0u8; 32];
    let key = loop {
        rng.fill_bytes(&mut key_bytes);
        if let Ok(key) = SecretKey::from_slice(&key_bytes) {
            break key;
        }
    };
    let mut digest = [0u8; 32];
    rng.fill_bytes(&mut digest);

    let message = Message::from_digest_slice(&digest).unwrap();
    let signature = secp.sign_ecdsa(&message, &key);
    (
        ByteData::new(signature.serialize_compact().to_vec()),
        PublicKey::from_secret_key(&secp, &key),
    )
}

#[test]
fn test_fresh_parameter_is_not_der_encoded() {
    let engine = FakeEngine::new();
    let parameter = SignatureParameter::from_bytes(&sample_signature());

    assert!(!parameter.is_der_encode());
    let err = parameter.to_der_encode(&engine).unwrap_err();
    assert_eq!(err.code(), CtErrorCode::IllegalState);
    assert_eq!(engine.acquired(), 0);
}

#[test]
fn test_null_signature_is_invalid_argument() {
    let err = SignatureParameter::try_from(None).unwrap_err();
    assert_eq!(err.code(), CtErrorCode::InvalidArgument);

    let err = serde_json::from_str::<SignatureParameter>(r#"{"data":null}"#).unwrap_err();
    assert!(err.to_string().contains("Invalid argument: Signature data is null."));

    let err = serde_json::from_str::<SignatureParameter>(r#"{"der_encoded":true}"#).unwrap_err();
    assert!(err.to_string().contains("Invalid argument"));
}

#[test]
fn test_explicit_der_encode_ignores_flag() {
    let engine = FakeEngine::new();
    let parameter = SignatureParameter::from_bytes(&sample_signature());
    let sighash = SignatureHashType::new(SigHashType::None, true);

    let der = parameter.to_der_encode_with(&engine, sighash).unwrap();
    assert_eq!(der.to_hex(), format!("30{}82", hex::encode(sample_signature())));
    assert!(!parameter.is_der_encode());
}

#[test]
fn test_set_der_encode_uses_stored_sighash() {
    let engine = FakeEngine::new();
    let mut parameter = SignatureParameter::from_bytes(&sample_signature());
    parameter.set_der_encode(SignatureHashType::new(SigHashType::Single, false));

    let der = parameter.to_der_encode(&engine).unwrap();
    assert!(der.to_hex().ends_with("03"));
}

#[test]
fn test_set_signature_hash_type_keeps_flag() {
    let mut parameter = SignatureParameter::from_bytes(&sample_signature());
    parameter.set_signature_hash_type(SignatureHashType::new(SigHashType::None, false));

    assert!(!parameter.is_der_encode());
    assert_eq!(parameter.signature_hash_type().sighash_type, SigHashType::None);
}

#[test]
fn test_decode_from_der_with_fake_engine() {
    let engine = FakeEngine::new();
    let der = ByteData::from_hex(&format!("30{}81", hex::encode(sample_signature()))).unwrap();

    let parameter = SignatureParameter::decode_from_der(&engine, &der).unwrap();
    assert_eq!(parameter.to_bytes(), sample_signature());
    assert!(parameter.is_der_encode());
    assert_eq!(
        parameter.signature_hash_type(),
        SignatureHashType::new(SigHashType::All, true)
    );
    assert_eq!(engine.acquired(), 1);
    assert_eq!(engine.released(), 1);
}

#[test]
fn test_decode_unknown_sighash_from_engine() {
    let engine = FakeEngine::new();
    let der = ByteData::from_hex(&format!("30{}07", hex::encode(sample_signature()))).unwrap();

    let err = SignatureParameter::decode_from_der(&engine, &der).unwrap_err();
    assert_eq!(err.code(), CtErrorCode::InvalidArgument);
}

#[test]
fn test_engine_failure_propagates_verbatim() {
    let engine = FakeEngine::failing(EngineFailure::new(1, "Failed to parse signature"));
    let signature = ByteData::new(sample_signature());

    let results = [
        SignatureParameter::normalize_signature(&engine, &signature).unwrap_err(),
        SignatureParameter::encode_to_der(&engine, &signature, SignatureHashType::all()).unwrap_err(),
        SignatureParameter::decode_from_der(&engine, &signature).unwrap_err(),
    ];
    for err in results {
        match err {
            CtError::Engine { code, message, .. } => {
                assert_eq!(code, 1);
                assert_eq!(message, "Failed to parse signature");
            }
            other => panic!("Expected Engine error, got {:?}", other),
        }
    }
    assert_eq!(engine.acquired(), 3);
    assert_eq!(engine.released(), 3);
}

#[test]
fn test_unavailable_engine() {
    let engine = FakeEngine::unavailable();
    let err = SignatureParameter::normalize_signature(&engine, &ByteData::new(sample_signature()))
        .unwrap_err();
    assert_eq!(err.code(), CtErrorCode::EngineFailure);
}

#[test]
fn test_secp_round_trip_random_signatures() {
    let engine = Secp256k1Engine::new();
    let sighash_types = [
        SignatureHashType::new(SigHashType::All, false),
        SignatureHashType::new(SigHashType::None, false),
        SignatureHashType::new(SigHashType::Single, false),
        SignatureHashType::new(SigHashType::All, true),
        SignatureHashType::new(SigHashType::None, true),
        SignatureHashType::new(SigHashType::Single, true),
    ];

    for sighash in sighash_types {
        let (signature, _) = random_signature();
        let der = SignatureParameter::encode_to_der(&engine, &signature, sighash).unwrap();
        let decoded = SignatureParameter::decode_from_der(&engine, &der).unwrap();

        assert_eq!(decoded.to_hex(), signature.to_hex());
        assert_eq!(decoded.signature_hash_type(), sighash);
    }
    assert_eq!(engine.open_handles(), 0);
}

#[test]
fn test_secp_rejects_undefined_sighash_bits() {
    let engine = Secp256k1Engine::new();
    let (signature, _) = random_signature();
    let der = SignatureParameter::encode_to_der(
        &engine,
        &signature,
        SignatureHashType::new(SigHashType::All, false),
    )
    .unwrap();

    let mut bytes = der.into_bytes();
    for byte in [0x41u8, 0x21] {
        *bytes.last_mut().unwrap() = byte;
        let err = SignatureParameter::decode_from_der(&engine, &ByteData::new(bytes.clone()))
            .unwrap_err();
        assert_eq!(err.code(), CtErrorCode::EngineFailure);
    }
    assert_eq!(engine.open_handles(), 0);
}

#[test]
fn test_secp_normalize_is_idempotent() {
    let engine = Secp256k1Engine::new();
    let (signature, _) = random_signature();

    let normalized = SignatureParameter::normalize_signature(&engine, &signature).unwrap();
    assert_eq!(normalized, signature);
}

#[test]
fn test_secp_rejects_default_sighash() {
    let engine = Secp256k1Engine::new();
    let (signature, _) = random_signature();

    let err = SignatureParameter::encode_to_der(
        &engine,
        &signature,
        SignatureHashType::new(SigHashType::Default, false),
    )
    .unwrap_err();
    assert_eq!(err.code(), CtErrorCode::EngineFailure);
    assert_eq!(engine.open_handles(), 0);
}

#[test]
fn test_signing_workflow() {
    let engine = Secp256k1Engine::new();
    let (signature, pubkey) = random_signature();

    let normalized = SignatureParameter::normalize_signature(&engine, &signature).unwrap();
    let mut parameter = SignatureParameter::from_bytes(normalized.as_bytes());
    parameter.set_related_pubkey(pubkey);
    parameter.set_der_encode(SignatureHashType::all());

    let der = parameter.to_der_encode(&engine).unwrap();
    let decoded = SignatureParameter::decode_from_der(&engine, &der).unwrap();
    assert_eq!(decoded.to_hex(), parameter.to_hex());
    assert_eq!(parameter.related_pubkey(), Some(&pubkey));
    assert!(decoded.related_pubkey().is_none());
}
