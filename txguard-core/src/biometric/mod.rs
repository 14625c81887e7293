//! Hardware biometric adapter.
//!
//! A thin capability probe and prompt-and-authenticate seam over the
//! device's biometric subsystem. The orchestrator is written against the
//! [`BiometricDevice`] trait; [`ScriptedDevice`] is the in-memory
//! implementation used in development and tests.
//!
//! Failure semantics: low-level platform errors may propagate from these
//! calls to the direct caller. The verification orchestrator wraps every
//! device call in a guarded scope and converts any error to a PIN-fallback
//! decision, so errors never escape the engine itself.

mod scripted;

pub use scripted::{ScriptedDevice, ScriptedOutcome};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BiometricError;

/// Primary message shown on the platform prompt. Fixed by this layer, not
/// parameterized by callers.
pub const PROMPT_MESSAGE: &str = "Verify your identity to continue";

/// Label for the prompt's fallback affordance.
pub const PROMPT_FALLBACK_LABEL: &str = "Use PIN";

/// Biometric modalities a device can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Fingerprint,
    FacialRecognition,
    Iris,
}

/// Snapshot of the device's biometric state.
///
/// Derived fresh on each probe and never cached across probes: hardware and
/// enrollment state can change between app foreground/background
/// transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricCapability {
    pub has_hardware: bool,
    pub is_enrolled: bool,
    pub supported_types: Vec<Modality>,
}

impl BiometricCapability {
    /// A device with no sensor and nothing enrolled.
    pub fn unavailable() -> Self {
        Self {
            has_hardware: false,
            is_enrolled: false,
            supported_types: Vec::new(),
        }
    }

    /// Whether a biometric prompt can possibly succeed.
    pub fn usable(&self) -> bool {
        self.has_hardware && self.is_enrolled
    }
}

/// Seam over the platform biometric subsystem.
#[async_trait]
pub trait BiometricDevice: Send + Sync {
    /// Issue the platform prompt and collapse its outcome to a boolean.
    ///
    /// Returns `false` immediately, without showing a prompt, when hardware
    /// is absent or nothing is enrolled. Cancellation is reported the same
    /// as failure: callers must not distinguish them, since the uniform
    /// response to any non-success is PIN fallback.
    async fn authenticate(&self) -> Result<bool, BiometricError>;

    /// Pure read of current hardware/enrollment/modality state. No side
    /// effects; safe to call repeatedly and in any order relative to
    /// [`authenticate`](Self::authenticate).
    async fn check_support(&self) -> Result<BiometricCapability, BiometricError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_usable() {
        let cap = BiometricCapability {
            has_hardware: true,
            is_enrolled: true,
            supported_types: vec![Modality::Fingerprint],
        };
        assert!(cap.usable());

        assert!(!BiometricCapability::unavailable().usable());

        let hardware_only = BiometricCapability {
            has_hardware: true,
            is_enrolled: false,
            supported_types: vec![Modality::FacialRecognition],
        };
        assert!(!hardware_only.usable());
    }

    #[test]
    fn test_prompt_copy_is_fixed_and_distinct() {
        assert!(!PROMPT_MESSAGE.is_empty());
        assert!(!PROMPT_FALLBACK_LABEL.is_empty());
        assert_ne!(PROMPT_MESSAGE, PROMPT_FALLBACK_LABEL);
    }

    #[test]
    fn test_modality_serialization() {
        let json = serde_json::to_string(&Modality::FacialRecognition).unwrap();
        assert_eq!(json, "\"facial_recognition\"");
    }
}
