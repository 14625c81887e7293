//! Credential environment resolution.
//!
//! Decides once per process which credential-encoding mode is active:
//! `Development` (mock JSON attestations, no hardware signing) or
//! `Production` (real CBOR attestation bytes). The resolution consults the
//! `TXGUARD_CREDENTIAL_ENV` override variable first and falls back to the
//! build profile. It is memoized: re-reading the override mid-session would
//! desynchronize in-flight credential encodings.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the build-profile default.
/// Recognised values are exactly `"production"` and `"development"`;
/// anything else is ignored.
pub const ENV_OVERRIDE_VAR: &str = "TXGUARD_CREDENTIAL_ENV";

/// Which credential-encoding mode the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialEnvironment {
    /// Mock JSON attestations/assertions, structurally equivalent to the
    /// real thing. For end-to-end testing without hardware signing.
    Development,
    /// Genuine CBOR attestation/assertion bytes from the platform API.
    Production,
}

impl CredentialEnvironment {
    /// Pure resolution over the two inputs. First match wins:
    /// recognised override value, then the debug-build flag.
    pub fn resolve(override_value: Option<&str>, debug_build: bool) -> Self {
        match override_value {
            Some("production") => Self::Production,
            Some("development") => Self::Development,
            _ => {
                if debug_build {
                    Self::Development
                } else {
                    Self::Production
                }
            }
        }
    }

    /// The process-wide environment, resolved lazily on first access and
    /// constant thereafter.
    pub fn current() -> Self {
        if let Some(env) = *CACHED.read().expect("environment cache poisoned") {
            return env;
        }
        let mut guard = CACHED.write().expect("environment cache poisoned");
        *guard.get_or_insert_with(|| {
            let override_value = std::env::var(ENV_OVERRIDE_VAR).ok();
            let resolved = Self::resolve(override_value.as_deref(), cfg!(debug_assertions));
            tracing::info!(environment = ?resolved, "Credential environment resolved");
            resolved
        })
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

static CACHED: RwLock<Option<CredentialEnvironment>> = RwLock::new(None);

/// Clear the memoized resolution so the next [`CredentialEnvironment::current`]
/// call re-reads its inputs. Test harnesses only.
#[cfg(any(test, feature = "test-util"))]
pub fn reset_environment_cache() {
    *CACHED.write().expect("environment cache poisoned") = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_build_flag() {
        assert_eq!(
            CredentialEnvironment::resolve(Some("production"), true),
            CredentialEnvironment::Production
        );
        assert_eq!(
            CredentialEnvironment::resolve(Some("development"), false),
            CredentialEnvironment::Development
        );
    }

    #[test]
    fn test_unrecognised_override_falls_back_to_build_flag() {
        assert_eq!(
            CredentialEnvironment::resolve(Some("staging"), true),
            CredentialEnvironment::Development
        );
        assert_eq!(
            CredentialEnvironment::resolve(Some(""), false),
            CredentialEnvironment::Production
        );
    }

    #[test]
    fn test_no_override_uses_build_flag() {
        assert_eq!(
            CredentialEnvironment::resolve(None, true),
            CredentialEnvironment::Development
        );
        assert_eq!(
            CredentialEnvironment::resolve(None, false),
            CredentialEnvironment::Production
        );
    }

    #[test]
    fn test_current_is_stable_within_process() {
        reset_environment_cache();
        let first = CredentialEnvironment::current();
        let second = CredentialEnvironment::current();
        assert_eq!(first, second);
        assert_eq!(first.is_development(), !first.is_production());
    }
}
