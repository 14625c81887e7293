//! Optimistic transaction mutation pipeline.
//!
//! Applies a verification result to a guarded monetary mutation: snapshot
//! the cached aggregate, write the optimistic balance, issue the remote
//! call, then commit or roll back. Cache invalidation on settle is
//! unconditional and independent of the branches, so the aggregate always
//! resynchronizes with the server even if the optimistic path drifted.
//!
//! Verification is a precondition, not embedded: the pipeline never calls
//! the orchestrator itself.

pub mod api;
mod cache;
#[cfg(feature = "network")]
pub mod http;

pub use api::{
    extract_error_message, ApiFailure, MockApi, TopupData, TopupRequest, TopupResponse,
    TransactionApi, GENERIC_FAILURE_MESSAGE,
};
pub use cache::{User, UserCache, CURRENT_USER_KEY};
#[cfg(feature = "network")]
pub use http::{HttpApiConfig, HttpTransactionApi};

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::TopupError;
use crate::verification::VerificationResult;

/// Snapshot taken at the start of one optimistic mutation. Owned by that
/// mutation's lifetime and discarded on settlement.
#[derive(Debug, Clone)]
pub struct TopupMutationContext {
    pub previous_user: Option<User>,
}

/// User-visible settlement signals. The pipeline surfaces outcomes through
/// this seam instead of talking to any UI directly.
pub trait TopupNotifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_failure(&self, message: &str);
}

/// Default notifier: structured log lines only.
pub struct LogNotifier;

impl TopupNotifier for LogNotifier {
    fn notify_success(&self, message: &str) {
        info!(message, "Top-up succeeded");
    }

    fn notify_failure(&self, message: &str) {
        warn!(message, "Top-up failed");
    }
}

/// Round to two decimal places, the precision of every balance on the wire.
fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The guarded top-up mutation.
pub struct TopupPipeline {
    api: Arc<dyn TransactionApi>,
    cache: Arc<UserCache>,
    notifier: Arc<dyn TopupNotifier>,
}

impl TopupPipeline {
    pub fn new(
        api: Arc<dyn TransactionApi>,
        cache: Arc<UserCache>,
        notifier: Arc<dyn TopupNotifier>,
    ) -> Self {
        Self { api, cache, notifier }
    }

    /// Execute one top-up guarded by `verification`.
    ///
    /// Ordering within a call: refresh cancellation and the optimistic
    /// write strictly precede the remote call; invalidation strictly
    /// follows both settle branches.
    #[instrument(level = "info", skip(self, request, verification), fields(amount = request.amount))]
    pub async fn execute(
        &self,
        mut request: TopupRequest,
        verification: &VerificationResult,
    ) -> Result<TopupResponse, TopupError> {
        if !(request.amount > 0.0 && request.amount.is_finite()) {
            return Err(TopupError::InvalidAmount(request.amount));
        }
        attach_verification(&mut request, verification)?;

        // A stale refresh landing after the optimistic write would clobber
        // it; cancel before touching the cache.
        self.cache.cancel_refresh(CURRENT_USER_KEY);
        let context = TopupMutationContext {
            previous_user: self.cache.get(CURRENT_USER_KEY),
        };
        if let Some(user) = &context.previous_user {
            let mut optimistic = user.clone();
            optimistic.balance = round_currency((user.balance - request.amount).max(0.0));
            self.cache.set(CURRENT_USER_KEY, optimistic);
        }

        let outcome = self.api.submit_topup(&request).await;

        let result = match outcome {
            Ok(response) if response.success => {
                // No inline reconciliation against the server balance; the
                // forced invalidation below re-fetches ground truth.
                self.notifier.notify_success(&response.message);
                Ok(response)
            }
            Ok(response) => {
                // 200-with-failure body; treat like any rejection.
                let body = serde_json::to_value(&response).ok();
                self.rollback(&context);
                let message = extract_error_message(&ApiFailure {
                    body,
                    transport: None,
                });
                self.notifier.notify_failure(&message);
                Err(TopupError::Remote { message })
            }
            Err(failure) => {
                self.rollback(&context);
                let message = extract_error_message(&failure);
                self.notifier.notify_failure(&message);
                Err(TopupError::Remote { message })
            }
        };

        // Settle: unconditional, on both branches.
        self.cache.invalidate(CURRENT_USER_KEY);
        result
    }

    /// Full overwrite from the snapshot, not a merge.
    fn rollback(&self, context: &TopupMutationContext) {
        match &context.previous_user {
            Some(user) => self.cache.set(CURRENT_USER_KEY, user.clone()),
            None => self.cache.remove(CURRENT_USER_KEY),
        }
    }
}

/// Copy the verification proof into the request: PIN or token, never both.
fn attach_verification(
    request: &mut TopupRequest,
    verification: &VerificationResult,
) -> Result<(), TopupError> {
    match verification {
        VerificationResult::Biometric { verification_token } => {
            request.verification_token = Some(verification_token.clone());
            request.pin = None;
            Ok(())
        }
        VerificationResult::Pin { pin } => {
            request.pin = Some(pin.clone());
            request.verification_token = None;
            Ok(())
        }
        VerificationResult::Failed { .. } => Err(TopupError::NotVerified),
    }
}
