//! Verify command implementation.

use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use tracing::info;
use txguard_core::biometric::{ScriptedDevice, ScriptedOutcome};
use txguard_core::verification::{SecurityOrchestrator, VerificationCallbacks};

/// Execute the verify command.
pub async fn execute(no_hardware: bool, fail_biometric: bool, pin: Option<String>) -> Result<()> {
    let device = if no_hardware {
        Arc::new(ScriptedDevice::without_hardware())
    } else {
        Arc::new(ScriptedDevice::enrolled())
    };
    if fail_biometric {
        device.push_outcome(ScriptedOutcome::Failure);
    }

    let callbacks = VerificationCallbacks::new()
        .on_biometric_success(|| println!("{}", "✓ Biometric accepted".green()))
        .on_biometric_fail(|| println!("{}", "✗ Biometric rejected".yellow()));
    let mut orchestrator = SecurityOrchestrator::new(device, callbacks);

    let result = orchestrator.start_verification().await;
    info!(success = result.success(), method = ?result.method(), "Verification attempt finished");

    if let Some(token) = result.verification_token() {
        println!("{} token={token}", "Verified by biometric".green().bold());
        return Ok(());
    }

    // Degraded to the pin-pad.
    println!(
        "{}",
        result.error().unwrap_or("Verification failed").yellow()
    );
    let Some(pin) = pin else {
        bail!("pin-pad shown; re-run with --pin <4 digits> to complete verification");
    };

    let result = orchestrator.handle_pin_submit(&pin);
    if result.success() {
        println!("{}", "Verified by PIN".green().bold());
        Ok(())
    } else {
        bail!("{}", result.error().unwrap_or("PIN rejected"));
    }
}
