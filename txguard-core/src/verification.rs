//! Security verification orchestrator.
//!
//! The state machine gating sensitive operations: probe capability, attempt
//! biometric, degrade uniformly to PIN. Biometric is always attempted first
//! when available; any non-success (hardware absent, nothing enrolled, user
//! cancellation, authentication failure, platform exception) requests a PIN
//! instead, because PIN is the only fallback guaranteed to exist for every
//! account. No error escapes [`SecurityOrchestrator`] as a raw error: every
//! entry point returns a typed [`VerificationResult`].

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::biometric::BiometricDevice;

/// Informational message when the device cannot do biometrics at all.
pub const MSG_BIOMETRIC_UNAVAILABLE: &str = "Biometric not available. Please use PIN.";
/// Message for a failed, cancelled or errored biometric attempt.
pub const MSG_BIOMETRIC_FAILED: &str = "Biometric authentication failed. Please use PIN.";
/// Message for a malformed PIN submission.
pub const MSG_PIN_LENGTH: &str = "PIN must be 4 digits";

/// Placeholder token signalling "verified by device".
///
/// A server-verified deployment carries the assertion bytes from
/// [`crate::credential::CredentialProducer::build_authentication_response`]
/// here instead; the fixed string only attests local-device trust.
pub const BIOMETRIC_VERIFIED_TOKEN: &str = "biometric-verified";

/// How a verification attempt concluded, or `None` when no method ran to
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMethod {
    Biometric,
    Pin,
    None,
}

/// Outcome of one verification attempt.
///
/// A tagged variant per method: a successful biometric outcome carries only
/// its token and a successful PIN outcome only its PIN, so the two payloads
/// can never be populated together. Produced once per attempt, consumed
/// immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Biometric { verification_token: String },
    Pin { pin: String },
    Failed { method: VerificationMethod, error: String },
}

impl VerificationResult {
    pub fn success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn method(&self) -> VerificationMethod {
        match self {
            Self::Biometric { .. } => VerificationMethod::Biometric,
            Self::Pin { .. } => VerificationMethod::Pin,
            Self::Failed { method, .. } => *method,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn verification_token(&self) -> Option<&str> {
        match self {
            Self::Biometric { verification_token } => Some(verification_token),
            _ => None,
        }
    }

    pub fn pin(&self) -> Option<&str> {
        match self {
            Self::Pin { pin } => Some(pin),
            _ => None,
        }
    }
}

type Callback = Box<dyn Fn() + Send + Sync>;
type PinCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Capability set of UI-facing side effects.
///
/// Passed in at construction so the state machine's effects are enumerable
/// and testable without a running UI. Each callback is optional and fires
/// at most once per [`SecurityOrchestrator::start_verification`] call.
#[derive(Default)]
pub struct VerificationCallbacks {
    on_biometric_success: Option<Callback>,
    on_biometric_fail: Option<Callback>,
    on_pin_submit: Option<PinCallback>,
}

impl VerificationCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_biometric_success(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_biometric_success = Some(Box::new(f));
        self
    }

    pub fn on_biometric_fail(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_biometric_fail = Some(Box::new(f));
        self
    }

    pub fn on_pin_submit(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_pin_submit = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for VerificationCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationCallbacks")
            .field("on_biometric_success", &self.on_biometric_success.is_some())
            .field("on_biometric_fail", &self.on_biometric_fail.is_some())
            .field("on_pin_submit", &self.on_pin_submit.is_some())
            .finish()
    }
}

/// Sequences capability probe, biometric attempt and PIN fallback, and owns
/// the transient UI-facing state (in-progress flag, pin-pad visibility,
/// last error). State is not retained between attempts: each
/// [`start_verification`](Self::start_verification) call resets error state.
pub struct SecurityOrchestrator {
    device: Arc<dyn BiometricDevice>,
    callbacks: VerificationCallbacks,
    verifying: bool,
    pin_pad_visible: bool,
    last_error: Option<String>,
}

impl SecurityOrchestrator {
    pub fn new(device: Arc<dyn BiometricDevice>, callbacks: VerificationCallbacks) -> Self {
        Self {
            device,
            callbacks,
            verifying: false,
            pin_pad_visible: false,
            last_error: None,
        }
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn pin_pad_visible(&self) -> bool {
        self.pin_pad_visible
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run one verification attempt: probe, biometric when usable, PIN
    /// fallback otherwise. Never returns an error; every branch resolves to
    /// a [`VerificationResult`] and clears the in-progress flag.
    #[instrument(level = "info", skip(self))]
    pub async fn start_verification(&mut self) -> VerificationResult {
        self.verifying = true;
        self.last_error = None;

        let result = match self.try_biometric().await {
            Ok(result) => result,
            Err(e) => {
                // Platform exceptions degrade exactly like a failed prompt.
                warn!(error = %e, "Biometric layer error, falling back to PIN");
                self.biometric_failed(MSG_BIOMETRIC_FAILED)
            }
        };

        self.verifying = false;
        result
    }

    async fn try_biometric(
        &mut self,
    ) -> Result<VerificationResult, crate::error::BiometricError> {
        let capability = self.device.check_support().await?;

        if !capability.usable() {
            // Skip the prompt entirely; degrade with the informational
            // message rather than the failure one.
            self.pin_pad_visible = true;
            self.last_error = Some(MSG_BIOMETRIC_UNAVAILABLE.to_string());
            return Ok(VerificationResult::Failed {
                method: VerificationMethod::None,
                error: MSG_BIOMETRIC_UNAVAILABLE.to_string(),
            });
        }

        if self.device.authenticate().await? {
            if let Some(cb) = &self.callbacks.on_biometric_success {
                cb();
            }
            Ok(VerificationResult::Biometric {
                verification_token: BIOMETRIC_VERIFIED_TOKEN.to_string(),
            })
        } else {
            Ok(self.biometric_failed(MSG_BIOMETRIC_FAILED))
        }
    }

    fn biometric_failed(&mut self, message: &str) -> VerificationResult {
        if let Some(cb) = &self.callbacks.on_biometric_fail {
            cb();
        }
        self.pin_pad_visible = true;
        self.last_error = Some(message.to_string());
        VerificationResult::Failed {
            method: VerificationMethod::None,
            error: message.to_string(),
        }
    }

    /// Accept a PIN from the pin-pad.
    ///
    /// Length is validated here; checking the PIN against a stored secret
    /// is the collaborator's job via the submit callback. A malformed PIN
    /// leaves the pin-pad open for re-entry.
    pub fn handle_pin_submit(&mut self, pin: &str) -> VerificationResult {
        if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
            self.last_error = Some(MSG_PIN_LENGTH.to_string());
            return VerificationResult::Failed {
                method: VerificationMethod::Pin,
                error: MSG_PIN_LENGTH.to_string(),
            };
        }

        if let Some(cb) = &self.callbacks.on_pin_submit {
            cb(pin);
        }
        self.pin_pad_visible = false;
        self.last_error = None;
        VerificationResult::Pin { pin: pin.to_string() }
    }

    /// Hide the pin-pad. Idempotent, safe from any state.
    pub fn close_pin_pad(&mut self) {
        self.pin_pad_visible = false;
    }

    /// Clear pin-pad visibility, error and in-progress state. Idempotent,
    /// safe from any state.
    pub fn reset_verification(&mut self) {
        self.verifying = false;
        self.pin_pad_visible = false;
        self.last_error = None;
    }
}
