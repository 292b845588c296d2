//! Additional authenticated data for the AEAD step.
//!
//! The AEAD never sees the external AAD directly. It is wrapped into the COSE `Enc_structure`
//! for an `Encrypt0` object whose protected header is empty, since the algorithm is never sent.
use serde_cbor::Value;

use crate::message::Code;
use crate::proto::{Algorithm, COAP_VERSION};

/// `[version, code, integrity options, algorithm, kid, partial IV]` as CBOR.
pub fn external_aad(
    code: Code,
    integrity_options: &[u8],
    algorithm: Algorithm,
    kid: &[u8],
    partial_iv: &[u8],
) -> Result<Vec<u8>, serde_cbor::Error> {
    serde_cbor::to_vec(&Value::Array(vec![
        Value::Integer(COAP_VERSION.into()),
        Value::Integer(code.0.into()),
        Value::Bytes(integrity_options.to_vec()),
        Value::Integer(algorithm.id().into()),
        Value::Bytes(kid.to_vec()),
        Value::Bytes(partial_iv.to_vec()),
    ]))
}

/// `["Encrypt0", h'', external_aad]` as CBOR, the bytes handed to the AEAD as its AAD.
pub fn enc_structure(external_aad: &[u8]) -> Result<Vec<u8>, serde_cbor::Error> {
    serde_cbor::to_vec(&Value::Array(vec![
        Value::Text("Encrypt0".to_string()),
        Value::Bytes(Vec::new()),
        Value::Bytes(external_aad.to_vec()),
    ]))
}

/// Build the full AEAD input in one go.
pub(crate) fn build(
    code: Code,
    integrity_options: &[u8],
    algorithm: Algorithm,
    kid: &[u8],
    partial_iv: &[u8],
) -> Result<Vec<u8>, serde_cbor::Error> {
    enc_structure(&external_aad(code, integrity_options, algorithm, kid, partial_iv)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_aad_bytes() {
        let ext = external_aad(Code::GET, &[], Algorithm::AesCcm64_64_128, b"client", &[0x00]).unwrap();
        assert_eq!(hex::encode(&ext), "860101400c46636c69656e744100");
        let full = enc_structure(&ext).unwrap();
        assert_eq!(hex::encode(&full), format!("8368456e63727970743040{}{}", "4e", hex::encode(&ext)));
    }

    #[test]
    fn notification_aad_binds_observe() {
        // Observe 5 encoded as a single option: delta 6, length 1.
        let ext = external_aad(Code::CONTENT, &[0x61, 0x05], Algorithm::AesCcm64_64_128, b"server", &[0x05]).unwrap();
        assert_eq!(hex::encode(&ext), "860118454261050c467365727665724105");
    }

    #[test]
    fn every_field_changes_the_aad() {
        let base = build(Code::POST, &[], Algorithm::AesCcm64_64_128, b"kid", &[1]).unwrap();
        assert_ne!(base, build(Code::PUT, &[], Algorithm::AesCcm64_64_128, b"kid", &[1]).unwrap());
        assert_ne!(base, build(Code::POST, &[0x60], Algorithm::AesCcm64_64_128, b"kid", &[1]).unwrap());
        assert_ne!(base, build(Code::POST, &[], Algorithm::AesCcm64_64_128, b"kie", &[1]).unwrap());
        assert_ne!(base, build(Code::POST, &[], Algorithm::AesCcm64_64_128, b"kid", &[2]).unwrap());
        assert_ne!(base, build(Code::POST, &[], Algorithm::AesCcm64_64_128, b"kid", &[0, 1]).unwrap());
    }
}
