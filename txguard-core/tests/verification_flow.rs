//! End-to-end flow: verification gating an optimistic top-up.

use std::sync::Arc;

use txguard_core::biometric::{ScriptedDevice, ScriptedOutcome};
use txguard_core::credential::{
    CredentialProducer, DeviceMetadata, MockAuthenticator, MockJsonFormat, CborFormat,
    CredentialFormat, CredentialParameter, RegistrationOptions, RelyingParty, UserDescriptor,
};
use txguard_core::environment::CredentialEnvironment;
use txguard_core::topup::{
    ApiFailure, LogNotifier, MockApi, TopupPipeline, TopupRequest, UserCache, CURRENT_USER_KEY,
};
use txguard_core::verification::{
    SecurityOrchestrator, VerificationCallbacks, VerificationMethod,
};
use txguard_core::User;
use uuid::Uuid;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

fn seeded_cache(balance: f64) -> Arc<UserCache> {
    let cache = Arc::new(UserCache::new());
    cache.set(
        CURRENT_USER_KEY,
        User {
            id: Uuid::new_v4(),
            name: "Amina".into(),
            phone: "+2348012345678".into(),
            balance,
            cashback_balance: 0.0,
        },
    );
    cache
}

/// Biometric success feeds the pipeline and the top-up settles optimistically.
#[tokio::test]
async fn test_biometric_verify_then_topup() {
    init_tracing();
    let device = Arc::new(ScriptedDevice::enrolled());
    let mut orchestrator = SecurityOrchestrator::new(device, VerificationCallbacks::new());

    let verification = orchestrator.start_verification().await;
    assert!(verification.success());
    assert_eq!(verification.method(), VerificationMethod::Biometric);

    let api = Arc::new(MockApi::new());
    api.push_success(750.0);
    let cache = seeded_cache(1000.0);
    let pipeline = TopupPipeline::new(api.clone(), cache.clone(), Arc::new(LogNotifier));

    let response = pipeline
        .execute(
            TopupRequest::new(250.0, "MTN-AIRTIME", "+2348012345678"),
            &verification,
        )
        .await
        .expect("top-up should settle");
    assert!(response.success);

    assert_eq!(cache.get(CURRENT_USER_KEY).unwrap().balance, 750.0);
    assert!(cache.is_stale(CURRENT_USER_KEY));
    assert_eq!(
        api.requests()[0].verification_token.as_deref(),
        Some("biometric-verified")
    );
}

/// A failed prompt degrades to PIN, and the PIN-backed top-up rolls back on
/// a server rejection.
#[tokio::test]
async fn test_pin_fallback_then_failed_topup_rolls_back() {
    init_tracing();
    let device = Arc::new(ScriptedDevice::enrolled());
    device.push_outcome(ScriptedOutcome::Failure);
    let mut orchestrator = SecurityOrchestrator::new(device, VerificationCallbacks::new());

    let first = orchestrator.start_verification().await;
    assert!(!first.success());
    assert!(orchestrator.pin_pad_visible());

    let verification = orchestrator.handle_pin_submit("0427");
    assert!(verification.success());
    assert!(!orchestrator.pin_pad_visible());

    let api = Arc::new(MockApi::new());
    api.push_failure(ApiFailure::body(serde_json::json!({
        "data": {"msg": "Insufficient balance"}
    })));
    let cache = seeded_cache(100.0);
    let pipeline = TopupPipeline::new(api.clone(), cache.clone(), Arc::new(LogNotifier));

    let err = pipeline
        .execute(
            TopupRequest::new(80.0, "MTN-AIRTIME", "+2348012345678"),
            &verification,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Top-up failed: Insufficient balance");

    // Exact restore, then forced resynchronization.
    assert_eq!(cache.get(CURRENT_USER_KEY).unwrap().balance, 100.0);
    assert!(cache.is_stale(CURRENT_USER_KEY));
    assert_eq!(api.requests()[0].pin.as_deref(), Some("0427"));
}

/// The registration ceremony produces environment-correct payloads that
/// decode to the same logical fields in both environments.
#[tokio::test]
async fn test_credential_registration_both_environments() {
    init_tracing();
    let options = RegistrationOptions {
        challenge: "c2VydmVyLWNoYWxsZW5nZQ".into(),
        rp: RelyingParty {
            name: "Example Pay".into(),
            id: "pay.example.com".into(),
        },
        user: UserDescriptor {
            id: "dXNlcg".into(),
            name: "amina".into(),
            display_name: "Amina".into(),
        },
        pub_key_cred_params: vec![CredentialParameter {
            alg: -7,
            credential_type: "public-key".into(),
        }],
        timeout: 60_000,
        attestation: "none".into(),
        user_verification: Some("required".into()),
    };
    let authenticator = MockAuthenticator::default();
    let metadata = DeviceMetadata {
        device_name: Some("Pixel 9".into()),
        platform: Some("android".into()),
        authenticator_attachment: Some("platform".into()),
    };

    let dev = CredentialProducer::new(CredentialEnvironment::Development, "https://pay.example.com")
        .build_registration_response(&authenticator, &options, metadata.clone())
        .await
        .unwrap();
    let prod = CredentialProducer::new(CredentialEnvironment::Production, "https://pay.example.com")
        .build_registration_response(&authenticator, &options, metadata)
        .await
        .unwrap();

    let dev_payload = MockJsonFormat.decode_attestation(&dev.attestation_object).unwrap();
    let prod_payload = CborFormat.decode_attestation(&prod.attestation_object).unwrap();
    assert_eq!(dev_payload, prod_payload);
    assert_eq!(dev.device_name.as_deref(), Some("Pixel 9"));
}
