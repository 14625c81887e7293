//! Txguard Core - client-side transaction security verification engine.
//!
//! Gates sensitive operations (fund transfers, top-ups) behind a layered
//! authentication challenge: platform biometrics first, a local PIN
//! fallback, and a WebAuthn-style credential lifecycle for device
//! registration and challenge/response authentication.
//!
//! # Features
//!
//! - Biometric capability probing and prompting behind a device seam
//! - Uniform degradation to PIN on any biometric non-success
//! - Environment-selected credential encoding: mock JSON in development,
//!   CBOR in production, both decoding to identical logical fields
//! - Optimistic top-up mutations with snapshot/rollback and forced cache
//!   resynchronization on settle
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use txguard_core::biometric::ScriptedDevice;
//! use txguard_core::topup::{LogNotifier, MockApi, TopupPipeline, TopupRequest, UserCache};
//! use txguard_core::verification::{SecurityOrchestrator, VerificationCallbacks};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let device = Arc::new(ScriptedDevice::enrolled());
//! let mut orchestrator = SecurityOrchestrator::new(device, VerificationCallbacks::new());
//!
//! // Biometric first; any non-success degrades to the PIN pad.
//! let verification = orchestrator.start_verification().await;
//!
//! let pipeline = TopupPipeline::new(
//!     Arc::new(MockApi::new()),
//!     Arc::new(UserCache::new()),
//!     Arc::new(LogNotifier),
//! );
//! let request = TopupRequest::new(500.0, "MTN-AIRTIME", "+2348012345678");
//! pipeline.execute(request, &verification).await?;
//! # Ok(())
//! # }
//! ```

pub mod biometric;
pub mod credential;
pub mod environment;
pub mod error;
pub mod topup;
pub mod verification;

// Re-export main types for convenience
pub use biometric::{BiometricCapability, BiometricDevice, Modality, ScriptedDevice};
pub use credential::{
    AuthenticationOptions, AuthenticationResponse, CredentialAuthenticator, CredentialProducer,
    RegistrationOptions, RegistrationResponse,
};
pub use environment::CredentialEnvironment;
pub use error::{BiometricError, CredentialError, Result, TopupError, TxguardError};
pub use topup::{TopupPipeline, TopupRequest, TopupResponse, User, UserCache};
pub use verification::{
    SecurityOrchestrator, VerificationCallbacks, VerificationMethod, VerificationResult,
};
