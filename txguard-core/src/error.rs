use thiserror::Error;

/// Errors raised by the biometric adapter layer.
///
/// The verification orchestrator catches all of these and converts them to a
/// PIN-fallback outcome; they only reach callers that talk to a
/// [`crate::biometric::BiometricDevice`] directly.
#[derive(Error, Debug)]
pub enum BiometricError {
    #[error("Biometric platform error: {0}")]
    Platform(String),

    #[error("Biometric prompt already in progress")]
    PromptInProgress,
}

/// Errors raised while encoding or decoding credential payloads.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The platform declined to produce a credential (user cancelled, no
    /// authenticator available). A typed outcome, not an exceptional one, so
    /// fallback logic stays environment-independent.
    #[error("Authenticator declined to produce a credential: {0}")]
    Declined(String),

    #[error("Invalid credential payload: {0}")]
    InvalidPayload(String),

    #[error("CBOR error: {0}")]
    Cbor(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors raised by the optimistic top-up pipeline.
#[derive(Error, Debug)]
pub enum TopupError {
    /// Verification precondition not met: the caller handed the pipeline a
    /// failed [`crate::verification::VerificationResult`].
    #[error("Transaction requires a successful verification result")]
    NotVerified,

    #[error("Invalid top-up amount: {0}")]
    InvalidAmount(f64),

    /// Remote mutation failed. `message` has already been extracted from the
    /// richest available server error field.
    #[error("Top-up failed: {message}")]
    Remote { message: String },

    #[cfg(feature = "network")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Unified error type for callers that cross component boundaries.
#[derive(Error, Debug)]
pub enum TxguardError {
    #[error(transparent)]
    Biometric(#[from] BiometricError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Topup(#[from] TopupError),
}

pub type Result<T, E = TxguardError> = std::result::Result<T, E>;
