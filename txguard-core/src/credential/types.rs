//! WebAuthn-style wire contracts shared with the relying party.
//!
//! Field names and nesting are fixed by the backend; serde renames pin the
//! exact transport spelling. The client consumes options verbatim and never
//! transforms the challenge: the relying party recomputes signatures over
//! the original bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relying-party descriptor issued inside registration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelyingParty {
    pub name: String,
    pub id: String,
}

/// User descriptor issued inside registration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDescriptor {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// One entry of the acceptable-algorithm list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialParameter {
    /// COSE algorithm identifier (e.g. -7 for ES256).
    pub alg: i64,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Server-issued options for credential registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    /// Opaque challenge, base64url in transit. Passed through unmodified
    /// into the attested payload.
    pub challenge: String,
    pub rp: RelyingParty,
    pub user: UserDescriptor,
    pub pub_key_cred_params: Vec<CredentialParameter>,
    pub timeout: u64,
    pub attestation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

/// Server-issued options for credential authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptions {
    pub challenge: String,
    pub rp_id: String,
    pub timeout: u64,
    pub user_verification: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_credentials: Vec<AllowedCredential>,
}

/// Credential descriptor inside authentication options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedCredential {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Client response completing a registration (attestation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub attestation_object: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
}

/// Client response completing an authentication (assertion).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Logical fields of `clientDataJSON`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    #[serde(rename = "type")]
    pub ceremony_type: String,
    pub challenge: String,
    pub origin: String,
}

/// Ceremony type for registration client data.
pub const CEREMONY_CREATE: &str = "webauthn.create";
/// Ceremony type for authentication client data.
pub const CEREMONY_GET: &str = "webauthn.get";

/// Optional device metadata attached to a registration response.
#[derive(Debug, Clone, Default)]
pub struct DeviceMetadata {
    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub authenticator_attachment: Option<String>,
}

/// Server-confirmed device enrollment record.
///
/// Owned by the backend: the client creates a registration request and
/// consumes the confirmed record, but never mutates `verification_count` or
/// `last_verified_at` locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricEnrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_id: String,
    pub device_name: String,
    pub platform: String,
    pub authenticator_attachment: String,
    pub is_active: bool,
    pub enrolled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<DateTime<Utc>>,
    pub verification_count: u32,
}

/// Request to revoke an enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeEnrollmentRequest {
    pub enrollment_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Action recorded in the biometric audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Register,
    Authenticate,
    Revoke,
    Update,
}

/// Outcome recorded in the biometric audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Failed,
    Blocked,
}

/// Audit-log entry appended by the backend in response to client actions.
///
/// Write-only from the client's perspective; the client must not infer
/// state from an entry's absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricAuditLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_type: AuditAction,
    pub action_status: AuditStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
