//! WebAuthn-style credential protocol.
//!
//! ## Architecture
//!
//! - `types`: wire contracts shared with the relying party (options,
//!   responses, enrollment and audit records)
//! - `codec`: attestation/assertion payload encoding (mock JSON vs CBOR)
//! - [`CredentialAuthenticator`]: seam over the platform credential API,
//!   with [`MockAuthenticator`] for development
//! - [`CredentialProducer`]: builds registration/authentication responses
//!   from server-issued options, passing the challenge through opaquely

pub mod codec;
mod types;

pub use codec::{
    base64_url_decode, base64_url_encode, format_for, AssertionPayload, AttestationPayload,
    CborFormat, CredentialFormat, MockJsonFormat,
};
pub use types::{
    AllowedCredential, AuditAction, AuditStatus, AuthenticationOptions, AuthenticationResponse,
    BiometricAuditLog, BiometricEnrollment, ClientData, CredentialParameter, DeviceMetadata,
    RegistrationOptions, RegistrationResponse, RelyingParty, RevokeEnrollmentRequest,
    UserDescriptor, CEREMONY_CREATE, CEREMONY_GET,
};

use async_trait::async_trait;

use crate::environment::CredentialEnvironment;
use crate::error::CredentialError;

/// Seam over the platform credential API.
///
/// Production wraps the device's real authenticator; development uses
/// [`MockAuthenticator`]. A refusal (user cancel, no authenticator) is the
/// typed [`CredentialError::Declined`], never a panic, so the
/// orchestrator's fallback logic stays environment-independent.
#[async_trait]
pub trait CredentialAuthenticator: Send + Sync {
    /// Credential id bytes for this authenticator.
    fn credential_id(&self) -> Vec<u8>;

    /// Produce attestation material for a new credential.
    async fn create_attestation(
        &self,
        options: &RegistrationOptions,
    ) -> Result<AttestationPayload, CredentialError>;

    /// Produce assertion material for an existing credential.
    async fn create_assertion(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<AssertionPayload, CredentialError>;
}

/// Deterministic authenticator for development and tests.
pub struct MockAuthenticator {
    credential_id: Vec<u8>,
    sign_count: std::sync::atomic::AtomicU32,
    decline: bool,
}

impl MockAuthenticator {
    pub fn new(credential_id: Vec<u8>) -> Self {
        Self {
            credential_id,
            sign_count: std::sync::atomic::AtomicU32::new(0),
            decline: false,
        }
    }

    /// An authenticator that refuses every ceremony, as a cancelled prompt
    /// or missing authenticator would.
    pub fn declining() -> Self {
        Self {
            credential_id: Vec::new(),
            sign_count: std::sync::atomic::AtomicU32::new(0),
            decline: true,
        }
    }
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self::new(b"mock-credential".to_vec())
    }
}

#[async_trait]
impl CredentialAuthenticator for MockAuthenticator {
    fn credential_id(&self) -> Vec<u8> {
        self.credential_id.clone()
    }

    async fn create_attestation(
        &self,
        _options: &RegistrationOptions,
    ) -> Result<AttestationPayload, CredentialError> {
        if self.decline {
            return Err(CredentialError::Declined("user cancelled".into()));
        }
        Ok(AttestationPayload::mock())
    }

    async fn create_assertion(
        &self,
        _options: &AuthenticationOptions,
    ) -> Result<AssertionPayload, CredentialError> {
        if self.decline {
            return Err(CredentialError::Declined("user cancelled".into()));
        }
        let count = self
            .sign_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1;
        Ok(AssertionPayload::mock(count))
    }
}

/// Builds wire responses from server-issued options.
///
/// The encoding format is fixed at construction from one environment
/// resolution; nothing here branches on the environment afterwards.
pub struct CredentialProducer {
    format: Box<dyn CredentialFormat>,
    origin: String,
}

impl CredentialProducer {
    pub fn new(environment: CredentialEnvironment, origin: impl Into<String>) -> Self {
        Self {
            format: format_for(environment),
            origin: origin.into(),
        }
    }

    /// Producer for the process-wide environment.
    pub fn from_environment(origin: impl Into<String>) -> Self {
        Self::new(CredentialEnvironment::current(), origin)
    }

    pub fn environment(&self) -> CredentialEnvironment {
        self.format.environment()
    }

    fn client_data(&self, ceremony_type: &str, challenge: &str) -> Result<String, CredentialError> {
        // The challenge string is carried verbatim; re-encoding it would
        // break the relying party's signature check.
        let data = ClientData {
            ceremony_type: ceremony_type.into(),
            challenge: challenge.into(),
            origin: self.origin.clone(),
        };
        Ok(base64_url_encode(&serde_json::to_vec(&data)?))
    }

    /// Build a registration (attestation) response.
    pub async fn build_registration_response(
        &self,
        authenticator: &dyn CredentialAuthenticator,
        options: &RegistrationOptions,
        metadata: DeviceMetadata,
    ) -> Result<RegistrationResponse, CredentialError> {
        let attestation = authenticator.create_attestation(options).await?;
        let id = base64_url_encode(&authenticator.credential_id());

        tracing::debug!(
            environment = ?self.environment(),
            rp_id = %options.rp.id,
            "Building registration response"
        );

        Ok(RegistrationResponse {
            raw_id: id.clone(),
            id,
            client_data_json: self.client_data(CEREMONY_CREATE, &options.challenge)?,
            attestation_object: self.format.encode_attestation(&attestation)?,
            credential_type: "public-key".into(),
            device_name: metadata.device_name,
            platform: metadata.platform,
            authenticator_attachment: metadata.authenticator_attachment,
        })
    }

    /// Build an authentication (assertion) response.
    pub async fn build_authentication_response(
        &self,
        authenticator: &dyn CredentialAuthenticator,
        options: &AuthenticationOptions,
    ) -> Result<AuthenticationResponse, CredentialError> {
        let assertion = authenticator.create_assertion(options).await?;
        let id = base64_url_encode(&authenticator.credential_id());

        tracing::debug!(
            environment = ?self.environment(),
            rp_id = %options.rp_id,
            "Building authentication response"
        );

        // authenticator_data carries the flags/counter half of the
        // assertion; signature carries the proof half. Both are encoded by
        // the same format so they decode to one consistent payload.
        let authenticator_data = self.format.encode_assertion(&AssertionPayload {
            signature: Vec::new(),
            ..assertion.clone()
        })?;

        Ok(AuthenticationResponse {
            raw_id: id.clone(),
            id,
            client_data_json: self.client_data(CEREMONY_GET, &options.challenge)?,
            authenticator_data,
            signature: base64_url_encode(&assertion.signature),
            credential_type: "public-key".into(),
        })
    }
}
