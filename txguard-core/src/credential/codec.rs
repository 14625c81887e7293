//! Attestation/assertion payload encoding.
//!
//! Two formats carry the same logical fields: a structurally-equivalent
//! mock JSON form for development (end-to-end testing without hardware
//! signing) and genuine CBOR bytes for production. Both travel base64url
//! encoded, and both decode back to identical [`AttestationPayload`] /
//! [`AssertionPayload`] values, so nothing downstream branches on the
//! environment after format selection.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::environment::CredentialEnvironment;
use crate::error::CredentialError;

/// Logical content of an attestation object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationPayload {
    /// Attestation statement format identifier (e.g. "packed", "none").
    pub fmt: String,
    /// Authenticator data flags byte.
    pub flags: u8,
    pub sign_count: u32,
    /// COSE public key bytes (placeholder bytes under the mock format).
    pub credential_public_key: Vec<u8>,
}

/// Logical content of an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionPayload {
    /// Authenticator data flags byte.
    pub flags: u8,
    pub sign_count: u32,
    /// Signature over authenticator data + client data hash (placeholder
    /// bytes under the mock format).
    pub signature: Vec<u8>,
}

// UP (user present) and UV (user verified) flag bits.
const FLAG_UP_UV: u8 = 0b0000_0101;

impl AttestationPayload {
    /// Payload a mock authenticator produces at registration.
    pub fn mock() -> Self {
        Self {
            fmt: "none".into(),
            flags: FLAG_UP_UV,
            sign_count: 0,
            credential_public_key: vec![0xA5; 16],
        }
    }
}

impl AssertionPayload {
    /// Payload a mock authenticator produces at authentication.
    pub fn mock(sign_count: u32) -> Self {
        Self {
            flags: FLAG_UP_UV,
            sign_count,
            signature: vec![0x30; 16],
        }
    }
}

/// Encoding strategy selected once per process from the credential
/// environment. Implementations must be inverses of themselves:
/// `decode(encode(p)) == p`.
pub trait CredentialFormat: Send + Sync {
    fn environment(&self) -> CredentialEnvironment;

    /// Encode to the base64url transport form.
    fn encode_attestation(&self, payload: &AttestationPayload) -> Result<String, CredentialError>;
    fn decode_attestation(&self, encoded: &str) -> Result<AttestationPayload, CredentialError>;
    fn encode_assertion(&self, payload: &AssertionPayload) -> Result<String, CredentialError>;
    fn decode_assertion(&self, encoded: &str) -> Result<AssertionPayload, CredentialError>;
}

/// Select the format implementation for an environment.
pub fn format_for(environment: CredentialEnvironment) -> Box<dyn CredentialFormat> {
    match environment {
        CredentialEnvironment::Development => Box::new(MockJsonFormat),
        CredentialEnvironment::Production => Box::new(CborFormat),
    }
}

/// Development format: mock JSON-in-base64url.
pub struct MockJsonFormat;

impl CredentialFormat for MockJsonFormat {
    fn environment(&self) -> CredentialEnvironment {
        CredentialEnvironment::Development
    }

    fn encode_attestation(&self, payload: &AttestationPayload) -> Result<String, CredentialError> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?))
    }

    fn decode_attestation(&self, encoded: &str) -> Result<AttestationPayload, CredentialError> {
        Ok(serde_json::from_slice(&URL_SAFE_NO_PAD.decode(encoded)?)?)
    }

    fn encode_assertion(&self, payload: &AssertionPayload) -> Result<String, CredentialError> {
        Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?))
    }

    fn decode_assertion(&self, encoded: &str) -> Result<AssertionPayload, CredentialError> {
        Ok(serde_json::from_slice(&URL_SAFE_NO_PAD.decode(encoded)?)?)
    }
}

/// Production format: CBOR-binary-in-base64url.
pub struct CborFormat;

impl CborFormat {
    fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, CredentialError> {
        let mut bytes = Vec::new();
        ciborium::into_writer(value, &mut bytes)
            .map_err(|e| CredentialError::Cbor(e.to_string()))?;
        Ok(bytes)
    }

    fn from_cbor<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, CredentialError> {
        ciborium::from_reader(bytes).map_err(|e| CredentialError::Cbor(e.to_string()))
    }
}

impl CredentialFormat for CborFormat {
    fn environment(&self) -> CredentialEnvironment {
        CredentialEnvironment::Production
    }

    fn encode_attestation(&self, payload: &AttestationPayload) -> Result<String, CredentialError> {
        Ok(URL_SAFE_NO_PAD.encode(Self::to_cbor(payload)?))
    }

    fn decode_attestation(&self, encoded: &str) -> Result<AttestationPayload, CredentialError> {
        Self::from_cbor(&URL_SAFE_NO_PAD.decode(encoded)?)
    }

    fn encode_assertion(&self, payload: &AssertionPayload) -> Result<String, CredentialError> {
        Ok(URL_SAFE_NO_PAD.encode(Self::to_cbor(payload)?))
    }

    fn decode_assertion(&self, encoded: &str) -> Result<AssertionPayload, CredentialError> {
        Self::from_cbor(&URL_SAFE_NO_PAD.decode(encoded)?)
    }
}

/// Base64url encode without padding, the transport encoding for all
/// credential byte strings.
pub fn base64_url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Inverse of [`base64_url_encode`].
pub fn base64_url_decode(encoded: &str) -> Result<Vec<u8>, CredentialError> {
    Ok(URL_SAFE_NO_PAD.decode(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_json_attestation_round_trip() {
        let format = MockJsonFormat;
        let payload = AttestationPayload::mock();
        let encoded = format.encode_attestation(&payload).unwrap();
        assert_eq!(format.decode_attestation(&encoded).unwrap(), payload);

        // Development payloads are really JSON under the base64.
        let raw = base64_url_decode(&encoded).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_ok());
    }

    #[test]
    fn test_cbor_assertion_round_trip() {
        let format = CborFormat;
        let payload = AssertionPayload::mock(7);
        let encoded = format.encode_assertion(&payload).unwrap();
        assert_eq!(format.decode_assertion(&encoded).unwrap(), payload);

        // Production payloads are not JSON.
        let raw = base64_url_decode(&encoded).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_err());
    }

    #[test]
    fn test_formats_agree_on_logical_fields() {
        let payload = AttestationPayload {
            fmt: "packed".into(),
            flags: FLAG_UP_UV,
            sign_count: 42,
            credential_public_key: vec![1, 2, 3, 4],
        };

        let via_json = MockJsonFormat
            .decode_attestation(&MockJsonFormat.encode_attestation(&payload).unwrap())
            .unwrap();
        let via_cbor = CborFormat
            .decode_attestation(&CborFormat.encode_attestation(&payload).unwrap())
            .unwrap();
        assert_eq!(via_json, via_cbor);
    }

    #[test]
    fn test_format_selection() {
        assert_eq!(
            format_for(CredentialEnvironment::Development).environment(),
            CredentialEnvironment::Development
        );
        assert_eq!(
            format_for(CredentialEnvironment::Production).environment(),
            CredentialEnvironment::Production
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(MockJsonFormat.decode_attestation("not base64 !!!").is_err());
        assert!(CborFormat.decode_assertion("AAAA").is_err());
    }
}
