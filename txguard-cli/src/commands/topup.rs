//! Topup command implementation.

use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::json;
use uuid::Uuid;
use txguard_core::biometric::ScriptedDevice;
use txguard_core::topup::{
    ApiFailure, MockApi, TopupNotifier, TopupPipeline, TopupRequest, User, UserCache,
    CURRENT_USER_KEY,
};
use txguard_core::verification::{SecurityOrchestrator, VerificationCallbacks};

struct ConsoleNotifier;

impl TopupNotifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        println!("{} {message}", "✓".green().bold());
    }

    fn notify_failure(&self, message: &str) {
        println!("{} {message}", "✗".red().bold());
    }
}

/// Execute the topup command against the in-process mock backend.
pub async fn execute(
    amount: f64,
    product: String,
    recipient: String,
    balance: f64,
    fail_remote: bool,
) -> Result<()> {
    // Gate the mutation behind a verification round first.
    let device = Arc::new(ScriptedDevice::enrolled());
    let mut orchestrator = SecurityOrchestrator::new(device, VerificationCallbacks::new());
    let verification = orchestrator.start_verification().await;

    let cache = Arc::new(UserCache::new());
    cache.set(
        CURRENT_USER_KEY,
        User {
            id: Uuid::new_v4(),
            name: "Demo Account".into(),
            phone: recipient.clone(),
            balance,
            cashback_balance: 0.0,
        },
    );

    let api = Arc::new(MockApi::new());
    if fail_remote {
        api.push_failure(ApiFailure::body(json!({
            "data": {"msg": "Insufficient balance"}
        })));
    } else {
        api.push_success((balance - amount).max(0.0));
    }

    let pipeline = TopupPipeline::new(api, cache.clone(), Arc::new(ConsoleNotifier));
    let outcome = pipeline
        .execute(TopupRequest::new(amount, product, recipient), &verification)
        .await;

    let user = cache
        .get(CURRENT_USER_KEY)
        .expect("demo account seeded above");
    println!(
        "balance: {} (stale: {})",
        format!("{:.2}", user.balance).bold(),
        cache.is_stale(CURRENT_USER_KEY)
    );

    match outcome {
        Ok(response) => {
            if let Some(data) = response.data {
                println!("transaction: {} [{}]", data.transaction_id, data.status);
            }
            Ok(())
        }
        Err(e) => bail!("{e}"),
    }
}
