//! Scripted biometric device for development and tests.
//!
//! Plays back a configured capability snapshot and a queue of prompt
//! outcomes, so verification flows can be exercised without hardware.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::{
    BiometricCapability, BiometricDevice, Modality, PROMPT_FALLBACK_LABEL, PROMPT_MESSAGE,
};
use crate::error::BiometricError;

/// One scripted prompt outcome.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// The user passed the prompt.
    Success,
    /// The user failed or cancelled the prompt.
    Failure,
    /// The platform threw mid-prompt.
    PlatformError(String),
}

/// In-memory [`BiometricDevice`] with queued outcomes.
///
/// When the outcome queue is empty, prompts succeed. Capability is fixed at
/// construction but can be swapped with [`set_capability`](Self::set_capability)
/// to simulate enrollment changes between probes.
pub struct ScriptedDevice {
    capability: Mutex<BiometricCapability>,
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    prompts_shown: Mutex<u32>,
}

impl ScriptedDevice {
    /// An enrolled fingerprint device.
    pub fn enrolled() -> Self {
        Self::with_capability(BiometricCapability {
            has_hardware: true,
            is_enrolled: true,
            supported_types: vec![Modality::Fingerprint],
        })
    }

    /// A device with no biometric hardware at all.
    pub fn without_hardware() -> Self {
        Self::with_capability(BiometricCapability::unavailable())
    }

    /// A device with a sensor but nothing enrolled.
    pub fn not_enrolled() -> Self {
        Self::with_capability(BiometricCapability {
            has_hardware: true,
            is_enrolled: false,
            supported_types: vec![Modality::Fingerprint],
        })
    }

    pub fn with_capability(capability: BiometricCapability) -> Self {
        Self {
            capability: Mutex::new(capability),
            outcomes: Mutex::new(VecDeque::new()),
            prompts_shown: Mutex::new(0),
        }
    }

    /// Queue the outcome of the next prompt.
    pub fn push_outcome(&self, outcome: ScriptedOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Replace the capability snapshot reported by future probes.
    pub fn set_capability(&self, capability: BiometricCapability) {
        *self.capability.lock().unwrap() = capability;
    }

    /// How many prompts have actually been shown. Lets tests assert that
    /// unusable devices never prompt.
    pub fn prompts_shown(&self) -> u32 {
        *self.prompts_shown.lock().unwrap()
    }
}

#[async_trait]
impl BiometricDevice for ScriptedDevice {
    async fn authenticate(&self) -> Result<bool, BiometricError> {
        let capability = self.capability.lock().unwrap().clone();
        if !capability.usable() {
            return Ok(false);
        }

        *self.prompts_shown.lock().unwrap() += 1;
        debug!(
            message = PROMPT_MESSAGE,
            fallback_label = PROMPT_FALLBACK_LABEL,
            "Scripted biometric prompt shown"
        );

        match self.outcomes.lock().unwrap().pop_front() {
            None | Some(ScriptedOutcome::Success) => Ok(true),
            Some(ScriptedOutcome::Failure) => Ok(false),
            Some(ScriptedOutcome::PlatformError(reason)) => {
                Err(BiometricError::Platform(reason))
            }
        }
    }

    async fn check_support(&self) -> Result<BiometricCapability, BiometricError> {
        Ok(self.capability.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_prompt_without_hardware() {
        let device = ScriptedDevice::without_hardware();
        assert!(!device.authenticate().await.unwrap());
        assert_eq!(device.prompts_shown(), 0);
    }

    #[tokio::test]
    async fn test_no_prompt_when_not_enrolled() {
        let device = ScriptedDevice::not_enrolled();
        assert!(!device.authenticate().await.unwrap());
        assert_eq!(device.prompts_shown(), 0);
    }

    #[tokio::test]
    async fn test_queued_outcomes_play_in_order() {
        let device = ScriptedDevice::enrolled();
        device.push_outcome(ScriptedOutcome::Failure);
        device.push_outcome(ScriptedOutcome::Success);

        assert!(!device.authenticate().await.unwrap());
        assert!(device.authenticate().await.unwrap());
        // Empty queue defaults to success.
        assert!(device.authenticate().await.unwrap());
        assert_eq!(device.prompts_shown(), 3);
    }

    #[tokio::test]
    async fn test_platform_error_propagates() {
        let device = ScriptedDevice::enrolled();
        device.push_outcome(ScriptedOutcome::PlatformError("sensor busy".into()));
        let err = device.authenticate().await.unwrap_err();
        assert!(matches!(err, BiometricError::Platform(_)));
    }

    #[tokio::test]
    async fn test_probe_reflects_capability_changes() {
        let device = ScriptedDevice::enrolled();
        assert!(device.check_support().await.unwrap().usable());

        device.set_capability(BiometricCapability::unavailable());
        assert!(!device.check_support().await.unwrap().usable());
    }
}
